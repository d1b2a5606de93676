use std::path::Path;

use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;

/// Writes a frame to an image file using the `image` crate; the format
/// follows the path's extension.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if frame.channels() != 3 {
            return Err(format!("expected an RGB frame, got {} channels", frame.channels()).into());
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let img = image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
            .ok_or("Failed to create image from frame data")?;
        img.save(path)?;
        Ok(())
    }
}
