use crate::shared::frame_window::{FrameWindow, WindowedClip};
use crate::shared::video_asset::VideoAsset;
use crate::shared::video_metadata::VideoMetadata;

/// Result of trimming: either the kept range or a deliberate exclusion.
#[derive(Debug)]
pub enum TrimOutcome {
    Trimmed(VideoAsset),
    /// The skips consume the whole clip; the video is dropped from the batch.
    Skip,
}

/// Cuts `skip_start` seconds from the head and `skip_end` from the tail,
/// then caps what is left at `max_duration` measured from the new start.
///
/// Trimming happens in two steps. [`Trimmer::window`] tells the decoder
/// which frames can possibly survive, and [`Trimmer::finish`] applies the
/// tail cut once the stream length is known.
#[derive(Clone, Debug, PartialEq)]
pub struct Trimmer {
    skip_start: f64,
    skip_end: f64,
    max_duration: Option<f64>,
}

impl Trimmer {
    pub fn new(skip_start: f64, skip_end: f64, max_duration: Option<f64>) -> Self {
        Self {
            skip_start: skip_start.max(0.0),
            skip_end: skip_end.max(0.0),
            max_duration,
        }
    }

    /// Frames that can survive the trim. The tail cut depends on the
    /// stream length, so the window only ends early under a duration cap.
    pub fn window(&self, metadata: &VideoMetadata) -> FrameWindow {
        FrameWindow::new(
            metadata.frames_for(self.skip_start),
            self.max_duration
                .map(|max| metadata.frames_for(self.skip_start + max.max(0.0))),
        )
    }

    pub fn finish(&self, clip: WindowedClip) -> TrimOutcome {
        let duration = clip.source_duration();
        if self.skip_start + self.skip_end >= duration {
            log::info!(
                "Skips {:.2}s + {:.2}s cover the whole {duration:.2}s clip",
                self.skip_start,
                self.skip_end
            );
            return TrimOutcome::Skip;
        }

        let mut end = duration - self.skip_end;
        if let Some(max) = self.max_duration {
            end = end.min(self.skip_start + max);
        }

        let meta = clip.asset.metadata();
        let start = meta.frames_for(self.skip_start).saturating_sub(clip.offset);
        let stop = meta.frames_for(end).saturating_sub(clip.offset);
        let trimmed = clip.asset.slice(start..stop);
        if trimmed.frame_count() == 0 {
            return TrimOutcome::Skip;
        }
        TrimOutcome::Trimmed(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::video_asset::test_support::make_asset;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn trim(trimmer: Trimmer, asset: VideoAsset) -> TrimOutcome {
        trimmer.finish(WindowedClip::whole(asset))
    }

    /// Decodes only the trimmer's window, the way the pipeline does.
    fn trim_windowed(trimmer: Trimmer, asset: VideoAsset) -> TrimOutcome {
        let source_frames = asset.frame_count();
        let window = trimmer.window(asset.metadata());
        let end = window.end.unwrap_or(source_frames);
        trimmer.finish(WindowedClip {
            asset: asset.slice(window.start..end),
            offset: window.start,
            source_frames,
        })
    }

    fn trimmed(outcome: TrimOutcome) -> VideoAsset {
        match outcome {
            TrimOutcome::Trimmed(asset) => asset,
            TrimOutcome::Skip => panic!("expected a trimmed clip"),
        }
    }

    #[test]
    fn test_skip_and_max_duration_on_long_clip() {
        // 200s at 10 fps
        let asset = make_asset(2000, 10.0, 1, 1);
        let out = trimmed(trim(Trimmer::new(5.0, 10.0, Some(120.0)), asset));
        assert_relative_eq!(out.duration(), 120.0);
        // First kept frame is the one at 5s.
        assert_eq!(out.frames()[0].data()[0], (50 % 256) as u8);
    }

    #[test]
    fn test_without_max_keeps_middle() {
        let asset = make_asset(100, 10.0, 1, 1);
        let out = trimmed(trim(Trimmer::new(1.0, 2.0, None), asset));
        assert_relative_eq!(out.duration(), 7.0);
        assert_eq!(out.frames()[0].data()[0], 10);
        assert_eq!(out.frames().last().unwrap().data()[0], 79);
    }

    #[test]
    fn test_max_longer_than_remaining_has_no_effect() {
        let asset = make_asset(100, 10.0, 1, 1);
        let out = trimmed(trim(Trimmer::new(0.0, 0.0, Some(60.0)), asset));
        assert_eq!(out.frame_count(), 100);
    }

    #[rstest]
    #[case(5.0, 5.0)]
    #[case(10.0, 0.0)]
    #[case(0.0, 12.0)]
    #[case(7.5, 2.5)]
    fn test_skips_covering_clip_exclude_it(#[case] start: f64, #[case] end: f64) {
        let asset = make_asset(100, 10.0, 1, 1);
        assert!(matches!(
            trim(Trimmer::new(start, end, None), asset),
            TrimOutcome::Skip
        ));
    }

    #[test]
    fn test_sub_frame_remainder_is_skipped() {
        // 0.04s would be kept, which rounds to zero frames at 10 fps.
        let asset = make_asset(10, 10.0, 1, 1);
        assert!(matches!(
            trim(Trimmer::new(0.48, 0.48, None), asset),
            TrimOutcome::Skip
        ));
    }

    #[test]
    fn test_negative_skips_treated_as_zero() {
        let asset = make_asset(10, 10.0, 1, 1);
        let out = trimmed(trim(Trimmer::new(-1.0, -1.0, None), asset));
        assert_eq!(out.frame_count(), 10);
    }

    #[rstest]
    #[case(5.0, 10.0, Some(120.0))]
    #[case(1.0, 2.0, None)]
    #[case(0.0, 0.0, Some(60.0))]
    #[case(0.48, 0.48, None)]
    #[case(30.0, 0.0, Some(0.05))]
    fn test_windowed_decode_matches_full_decode(
        #[case] start: f64,
        #[case] end: f64,
        #[case] max: Option<f64>,
    ) {
        let full = trim(Trimmer::new(start, end, max), make_asset(400, 10.0, 1, 1));
        let windowed = trim_windowed(Trimmer::new(start, end, max), make_asset(400, 10.0, 1, 1));
        match (full, windowed) {
            (TrimOutcome::Trimmed(a), TrimOutcome::Trimmed(b)) => {
                assert_eq!(a.frames(), b.frames());
                assert_eq!(a.metadata(), b.metadata());
            }
            (TrimOutcome::Skip, TrimOutcome::Skip) => {}
            (a, b) => panic!("full {a:?} but windowed {b:?}"),
        }
    }

    #[test]
    fn test_window_bounds_buffered_frames() {
        let trimmer = Trimmer::new(5.0, 10.0, Some(120.0));
        let meta = make_asset(0, 10.0, 1, 1).metadata().clone();
        assert_eq!(trimmer.window(&meta), FrameWindow::new(50, Some(1250)));
        assert_eq!(Trimmer::new(2.0, 3.0, None).window(&meta), FrameWindow::new(20, None));
    }
}
