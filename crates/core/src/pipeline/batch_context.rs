use std::sync::Arc;

use crate::shared::mask::Mask;
use crate::shared::region::Region;

type FrameSize = (u32, u32);

#[derive(Clone, Debug)]
struct CachedRegions {
    regions: Vec<Region>,
    frame_size: FrameSize,
}

/// Selections and the watermark mask shared by every video of a batch.
///
/// Each entry is written once, while the first eligible video is
/// processed, and only read afterwards. With `reselect_per_video` the cache
/// is dropped at the start of every video instead.
///
/// Cached values are tied to the frame size they were made for. A video
/// with different dimensions gets a proportionally rescaled copy.
#[derive(Clone, Debug, Default)]
pub struct BatchContext {
    reselect_per_video: bool,
    crop: Option<CachedRegions>,
    watermark: Option<Arc<Mask>>,
}

impl BatchContext {
    pub fn new(reselect_per_video: bool) -> Self {
        Self {
            reselect_per_video,
            crop: None,
            watermark: None,
        }
    }

    /// Called before each video.
    pub fn begin_video(&mut self) {
        if self.reselect_per_video {
            self.crop = None;
            self.watermark = None;
        }
    }

    pub fn crop_regions(&self, frame_size: FrameSize) -> Option<Vec<Region>> {
        let cached = self.crop.as_ref()?;
        if cached.frame_size == frame_size {
            return Some(cached.regions.clone());
        }
        log::warn!(
            "Reusing crop regions chosen on {}x{} for a {}x{} video, rescaling",
            cached.frame_size.0,
            cached.frame_size.1,
            frame_size.0,
            frame_size.1
        );
        Some(
            cached
                .regions
                .iter()
                .map(|r| r.rescale(cached.frame_size, frame_size))
                .collect(),
        )
    }

    pub fn store_crop_regions(&mut self, regions: Vec<Region>, frame_size: FrameSize) {
        debug_assert!(self.crop.is_none(), "crop regions are written once per batch");
        self.crop = Some(CachedRegions {
            regions,
            frame_size,
        });
    }

    /// The batch mask for a `frame_size` video. The stored mask is shared
    /// as is when sizes match.
    pub fn watermark_mask(&self, frame_size: FrameSize) -> Option<Arc<Mask>> {
        let cached = self.watermark.as_ref()?;
        let mask_size = (cached.width(), cached.height());
        if mask_size == frame_size {
            return Some(Arc::clone(cached));
        }
        log::warn!(
            "Reusing watermark mask built on {}x{} for a {}x{} video, rescaling",
            mask_size.0,
            mask_size.1,
            frame_size.0,
            frame_size.1
        );
        Some(Arc::new(cached.resized(frame_size.0, frame_size.1)))
    }

    pub fn store_watermark(&mut self, mask: Mask) -> Arc<Mask> {
        debug_assert!(self.watermark.is_none(), "watermark mask is written once per batch");
        let mask = Arc::new(mask);
        self.watermark = Some(Arc::clone(&mask));
        mask
    }
}
