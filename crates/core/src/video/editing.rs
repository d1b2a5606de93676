//! Frame and clip resizing.

use crate::shared::frame::Frame;
use crate::shared::video_asset::VideoAsset;

/// Resamples an RGB frame to `width x height` with a triangle filter.
pub fn resize_frame(
    frame: &Frame,
    width: u32,
    height: u32,
) -> Result<Frame, Box<dyn std::error::Error>> {
    if frame.width() == width && frame.height() == height {
        return Ok(frame.clone());
    }
    let img = image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
        .ok_or("Failed to create image from frame data")?;
    let resized = image::imageops::resize(&img, width, height, image::imageops::FilterType::Triangle);
    Ok(Frame::new(resized.into_raw(), width, height, 3, frame.index()))
}

/// Scales every frame of `asset` to `width x height`.
pub fn resize(
    asset: VideoAsset,
    width: u32,
    height: u32,
) -> Result<VideoAsset, Box<dyn std::error::Error>> {
    if width == 0 || height == 0 {
        return Err(format!("cannot resize to {width}x{height}").into());
    }
    asset.map_frames(|frame| resize_frame(&frame, width, height))
}
