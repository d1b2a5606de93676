use crate::shared::frame::Frame;
use crate::shared::region::Region;
use crate::video::editing::resize_frame;

/// A frame scaled to a fixed display height, remembering the factor used.
pub struct PreviewFrame {
    frame: Frame,
    scale: f64,
}

impl PreviewFrame {
    /// Scales `frame` so its height is `target_height`, keeping the aspect
    /// ratio. `scale` is `target_height / native_height`.
    pub fn from_frame(
        frame: &Frame,
        target_height: u32,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        if frame.height() == 0 || target_height == 0 {
            return Err("cannot build a preview of an empty frame".into());
        }
        let scale = target_height as f64 / frame.height() as f64;
        let width = ((frame.width() as f64 * scale).round() as u32).max(1);
        Ok(Self {
            frame: resize_frame(frame, width, target_height)?,
            scale,
        })
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Maps a rectangle drawn on the preview back to native pixels.
    pub fn to_native(&self, region: &Region) -> Region {
        region.from_preview(self.scale)
    }
}
