use crate::inpainting::domain::frame_inpainter::{FrameInpainter, InpaintMode};
use crate::shared::error::{to_source, PipelineError};
use crate::shared::mask::Mask;
use crate::shared::video_asset::VideoAsset;

/// Repairs every frame under one shared mask.
///
/// The mask is computed once per batch and only borrowed here; it is never
/// regenerated per frame.
pub struct Dewatermarker {
    inpainter: Box<dyn FrameInpainter>,
    radius: u32,
    mode: InpaintMode,
}

impl Dewatermarker {
    pub fn new(inpainter: Box<dyn FrameInpainter>, radius: u32) -> Self {
        Self {
            inpainter,
            radius,
            mode: InpaintMode::NavierStokes,
        }
    }

    pub fn with_mode(mut self, mode: InpaintMode) -> Self {
        self.mode = mode;
        self
    }

    /// Inpaints the masked pixels of each frame. A missing or blank mask
    /// leaves the clip untouched without calling the inpainter.
    pub fn apply(
        &self,
        asset: VideoAsset,
        mask: Option<&Mask>,
    ) -> Result<VideoAsset, PipelineError> {
        let Some(mask) = mask.filter(|m| !m.is_blank()) else {
            return Ok(asset);
        };
        if mask.width() != asset.width() || mask.height() != asset.height() {
            return Err(PipelineError::configuration(format!(
                "watermark mask is {}x{} but frames are {}x{}",
                mask.width(),
                mask.height(),
                asset.width(),
                asset.height()
            )));
        }

        let (metadata, mut frames) = asset.into_parts();
        for frame in frames.iter_mut() {
            self.inpainter
                .inpaint(frame, mask, self.radius, self.mode)
                .map_err(|e| PipelineError::Inpaint {
                    frame: frame.index(),
                    source: to_source(e),
                })?;
        }
        Ok(VideoAsset::new(metadata, frames))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::shared::frame::Frame;
    use crate::shared::video_asset::test_support::make_asset;

    struct RecordingInpainter {
        calls: Arc<Mutex<Vec<(usize, u32, InpaintMode)>>>,
        fail_on: Option<usize>,
    }

    impl FrameInpainter for RecordingInpainter {
        fn inpaint(
            &self,
            frame: &mut Frame,
            mask: &Mask,
            radius: u32,
            mode: InpaintMode,
        ) -> Result<(), Box<dyn std::error::Error>> {
            if self.fail_on == Some(frame.index()) {
                return Err("inpaint exploded".into());
            }
            self.calls
                .lock()
                .unwrap()
                .push((frame.index(), radius, mode));
            let w = frame.width();
            let channels = frame.channels() as usize;
            for (i, px) in frame.data_mut().chunks_mut(channels).enumerate() {
                if mask.is_set(i as u32 % w, i as u32 / w) {
                    px.fill(1);
                }
            }
            Ok(())
        }
    }

    #[allow(clippy::type_complexity)]
    fn stage(fail_on: Option<usize>) -> (Dewatermarker, Arc<Mutex<Vec<(usize, u32, InpaintMode)>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let inpainter = RecordingInpainter {
            calls: calls.clone(),
            fail_on,
        };
        (Dewatermarker::new(Box::new(inpainter), 3), calls)
    }

    fn corner_mask(width: u32, height: u32) -> Mask {
        let mut raw = vec![0u8; (width * height) as usize];
        raw[0] = 255;
        Mask::from_raw(raw, width, height)
    }

    #[test]
    fn test_inpaints_every_frame_with_same_mask() {
        let (dewm, calls) = stage(None);
        let out = dewm.apply(make_asset(4, 10.0, 3, 3), Some(&corner_mask(3, 3))).unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 4);
        assert!(calls
            .iter()
            .all(|&(_, radius, mode)| radius == 3 && mode == InpaintMode::NavierStokes));
        assert!(out.frames().iter().all(|f| f.data()[0] == 1));
        assert_eq!(out.frames()[3].data()[3], 3);
    }

    #[test]
    fn test_missing_or_blank_mask_passes_through() {
        let (dewm, calls) = stage(None);
        dewm.apply(make_asset(2, 10.0, 3, 3), None).unwrap();
        dewm.apply(make_asset(2, 10.0, 3, 3), Some(&Mask::zeros(3, 3)))
            .unwrap();
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_mask_size_mismatch_is_error() {
        let (dewm, _) = stage(None);
        let err = dewm
            .apply(make_asset(2, 10.0, 3, 3), Some(&corner_mask(4, 4)))
            .unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }

    #[test]
    fn test_inpainter_failure_names_frame() {
        let (dewm, _) = stage(Some(1));
        let err = dewm
            .apply(make_asset(3, 10.0, 3, 3), Some(&corner_mask(3, 3)))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Inpaint { frame: 1, .. }));
    }

    #[test]
    fn test_mode_override() {
        let (dewm, calls) = stage(None);
        let dewm = dewm.with_mode(InpaintMode::Telea);
        dewm.apply(make_asset(1, 10.0, 3, 3), Some(&corner_mask(3, 3)))
            .unwrap();
        assert_eq!(calls.lock().unwrap()[0].2, InpaintMode::Telea);
    }
}
