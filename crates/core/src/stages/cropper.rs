use crate::shared::error::PipelineError;
use crate::shared::region::Region;
use crate::shared::video_asset::VideoAsset;

/// Crops every frame to a fixed rectangle.
///
/// Several regions narrow the picture step by step: each one is expressed
/// in the coordinates of the previous crop's output.
pub struct Cropper;

impl Cropper {
    /// Folds `regions` into one absolute rectangle on a `width x height`
    /// frame. Regions poking past the current picture are clamped; one that
    /// leaves nothing visible is a configuration error.
    pub fn compose(regions: &[Region], width: u32, height: u32) -> Result<Region, PipelineError> {
        let mut current = Region::new(0, 0, width as i32, height as i32);
        for region in regions {
            let visible = region
                .clamp_to(current.width as u32, current.height as u32)
                .ok_or_else(|| {
                    PipelineError::configuration(format!(
                        "crop region {region} collapses to zero area on a {}x{} frame",
                        current.width, current.height
                    ))
                })?;
            if visible != *region {
                log::warn!(
                    "Crop region {region} exceeds the {}x{} frame, using {visible}",
                    current.width,
                    current.height
                );
            }
            current = visible.offset_by(current.x, current.y);
        }
        Ok(current)
    }

    pub fn apply(asset: VideoAsset, regions: &[Region]) -> Result<VideoAsset, PipelineError> {
        if regions.is_empty() {
            return Ok(asset);
        }
        let target = Self::compose(regions, asset.width(), asset.height())?;
        log::debug!(
            "Cropping {}x{} to {target}",
            asset.width(),
            asset.height()
        );

        let (metadata, frames) = asset.into_parts();
        let frames = frames.iter().map(|f| f.crop(&target)).collect();
        Ok(VideoAsset::new(metadata, frames))
    }
}
