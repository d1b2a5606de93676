use ndarray::{s, Array2};

use crate::masking::{frame_sampler, morphology, otsu};
use crate::shared::constants::{DEFAULT_MIN_VOTE_COUNT, DEFAULT_SAMPLE_FRAMES, DILATE_KERNEL_SIZE};
use crate::shared::frame::Frame;
use crate::shared::mask::{Mask, MASK_OFF, MASK_ON};
use crate::shared::region::Region;
use crate::shared::video_asset::VideoAsset;

/// Builds a watermark removal mask by temporal voting.
///
/// Each region of each sampled frame is binarized at its own Otsu
/// threshold. A pixel is kept when it came out bright in at least
/// `min_vote_count` of those samples, so static overlays survive while
/// moving scene content is voted out. Survivors are then dilated to cover
/// anti-aliased edges.
#[derive(Clone, Debug)]
pub struct MaskSynthesizer {
    sample_frames: usize,
    min_vote_count: usize,
    kernel_size: usize,
}

impl MaskSynthesizer {
    pub fn new(sample_frames: usize, min_vote_count: usize) -> Self {
        Self {
            sample_frames,
            min_vote_count,
            kernel_size: DILATE_KERNEL_SIZE,
        }
    }

    pub fn sample_frames(&self) -> usize {
        self.sample_frames
    }

    pub fn min_vote_count(&self) -> usize {
        self.min_vote_count
    }

    /// Samples the clip and votes over the given native-resolution regions.
    pub fn synthesize(&self, asset: &VideoAsset, regions: &[Region]) -> Mask {
        let frames: Vec<&Frame> = frame_sampler::sample(asset, self.sample_frames)
            .into_iter()
            .map(|(_, frame)| frame)
            .collect();
        self.synthesize_from_frames(&frames, asset.width(), asset.height(), regions)
    }

    /// Votes over an explicit frame set. Identical inputs always give a
    /// bit-identical mask.
    pub fn synthesize_from_frames(
        &self,
        frames: &[&Frame],
        width: u32,
        height: u32,
        regions: &[Region],
    ) -> Mask {
        if regions.is_empty() || frames.is_empty() {
            return Mask::zeros(width, height);
        }

        let mut votes = Array2::<u32>::zeros((height as usize, width as usize));
        for region in regions {
            let Some(r) = region.clamp_to(width, height) else {
                log::warn!("Watermark region {region} lies outside the {width}x{height} frame");
                continue;
            };
            if r != *region {
                log::debug!("Watermark region {region} clamped to {r}");
            }

            let (x, y) = (r.x as usize, r.y as usize);
            let (w, h) = (r.width as usize, r.height as usize);
            for frame in frames {
                if frame.width() != width || frame.height() != height {
                    log::warn!(
                        "Skipping frame {} ({}x{}) while voting on a {width}x{height} mask",
                        frame.index(),
                        frame.width(),
                        frame.height()
                    );
                    continue;
                }
                let foreground = otsu::binarize(&frame.luma_of(&r));
                let mut window = votes.slice_mut(s![y..y + h, x..x + w]);
                for (count, &value) in window.iter_mut().zip(&foreground) {
                    if value == MASK_ON {
                        *count += 1;
                    }
                }
            }
        }

        let min_votes = self.min_vote_count as u32;
        let survivors = votes.mapv(|count| if count >= min_votes { MASK_ON } else { MASK_OFF });
        let grown = morphology::dilate(survivors.view(), self.kernel_size);
        Mask::from_raw(grown.iter().copied().collect(), width, height)
    }
}

impl Default for MaskSynthesizer {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_FRAMES, DEFAULT_MIN_VOTE_COUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::video_asset::test_support::metadata;
    use rstest::rstest;

    const W: u32 = 40;
    const H: u32 = 30;

    /// Dark frame with a bright static logo at (10..14, 10..14) and a bright
    /// "cloud" pixel block at (20..22, 5..7) present only when `cloud` is set.
    fn scene(index: usize, cloud: bool) -> Frame {
        let mut data = vec![20u8; (W * H * 3) as usize];
        let mut paint = |x0: u32, y0: u32, side: u32| {
            for y in y0..y0 + side {
                for x in x0..x0 + side {
                    let i = ((y * W + x) * 3) as usize;
                    data[i..i + 3].copy_from_slice(&[230, 230, 230]);
                }
            }
        };
        paint(10, 10, 4);
        if cloud {
            paint(20, 5, 2);
        }
        Frame::new(data, W, H, 3, index)
    }

    /// Ten frames; the cloud shows in the first three only.
    fn frames() -> Vec<Frame> {
        (0..10).map(|i| scene(i, i < 3)).collect()
    }

    fn region() -> Vec<Region> {
        vec![Region::new(5, 2, 25, 20)]
    }

    #[test]
    fn test_static_logo_kept_moving_content_dropped() {
        let frames = frames();
        let refs: Vec<&Frame> = frames.iter().collect();
        let mask = MaskSynthesizer::new(10, 7).synthesize_from_frames(&refs, W, H, &region());

        assert!(mask.is_set(10, 10));
        assert!(mask.is_set(13, 13));
        // Dilation grows the logo by two pixels on every side.
        assert!(mask.is_set(8, 8));
        assert!(mask.is_set(15, 15));
        assert!(!mask.is_set(7, 7));
        // Cloud was bright in 3 of 10 frames only.
        assert!(!mask.is_set(20, 5));
        assert!(!mask.is_set(21, 6));
        assert_eq!(mask.count_set(), 8 * 8);
    }

    #[test]
    fn test_low_vote_threshold_admits_cloud() {
        let frames = frames();
        let refs: Vec<&Frame> = frames.iter().collect();
        let mask = MaskSynthesizer::new(10, 3).synthesize_from_frames(&refs, W, H, &region());
        assert!(mask.is_set(20, 5));
    }

    #[test]
    fn test_synthesize_samples_from_asset() {
        let asset = VideoAsset::new(metadata(10.0, W, H), frames());
        let mask = MaskSynthesizer::default().synthesize(&asset, &region());
        assert!(mask.is_set(12, 12));
        assert!(!mask.is_set(20, 5));
        assert_eq!((mask.width(), mask.height()), (W, H));
    }

    #[test]
    fn test_empty_regions_give_blank_mask() {
        let asset = VideoAsset::new(metadata(10.0, W, H), frames());
        let mask = MaskSynthesizer::default().synthesize(&asset, &[]);
        assert!(mask.is_blank());
        assert_eq!((mask.width(), mask.height()), (W, H));
    }

    #[test]
    fn test_fewer_frames_than_requested_are_clamped() {
        let few: Vec<Frame> = (0..3).map(|i| scene(i, false)).collect();
        let asset = VideoAsset::new(metadata(10.0, W, H), few);
        // Only 3 frames exist, so 3 votes is the most any pixel can get.
        let strict = MaskSynthesizer::new(10, 7).synthesize(&asset, &region());
        let lenient = MaskSynthesizer::new(10, 3).synthesize(&asset, &region());
        assert!(strict.is_blank());
        assert!(lenient.is_set(11, 11));
    }

    #[test]
    fn test_region_outside_frame_is_ignored() {
        let frames = frames();
        let refs: Vec<&Frame> = frames.iter().collect();
        let mask = MaskSynthesizer::new(10, 7).synthesize_from_frames(
            &refs,
            W,
            H,
            &[Region::new(100, 100, 10, 10)],
        );
        assert!(mask.is_blank());
    }

    #[test]
    fn test_deterministic() {
        let frames = frames();
        let refs: Vec<&Frame> = frames.iter().collect();
        let synth = MaskSynthesizer::new(10, 7);
        assert_eq!(
            synth.synthesize_from_frames(&refs, W, H, &region()),
            synth.synthesize_from_frames(&refs, W, H, &region())
        );
    }

    #[rstest]
    #[case(1, 2)]
    #[case(2, 3)]
    #[case(3, 4)]
    #[case(6, 7)]
    #[case(9, 10)]
    fn test_raising_vote_count_never_grows_mask(#[case] lower: usize, #[case] higher: usize) {
        let frames = frames();
        let refs: Vec<&Frame> = frames.iter().collect();
        let loose = MaskSynthesizer::new(10, lower).synthesize_from_frames(&refs, W, H, &region());
        let strict =
            MaskSynthesizer::new(10, higher).synthesize_from_frames(&refs, W, H, &region());
        for y in 0..H {
            for x in 0..W {
                if strict.is_set(x, y) {
                    assert!(loose.is_set(x, y), "({x},{y}) set only at {higher} votes");
                }
            }
        }
    }
}
