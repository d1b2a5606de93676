use std::fmt;

use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// What the chosen rectangles will be used for; selectors may word their
/// prompts differently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SelectionPurpose {
    Crop,
    Watermark,
}

impl fmt::Display for SelectionPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionPurpose::Crop => write!(f, "crop"),
            SelectionPurpose::Watermark => write!(f, "watermark"),
        }
    }
}

/// Capability that turns a preview frame into zero or more rectangles.
///
/// Regions are returned in the preview's own coordinates; the caller maps
/// them back to native resolution. An empty list means nothing was chosen.
pub trait RegionSelector: Send {
    fn select(
        &mut self,
        preview: &Frame,
        purpose: SelectionPurpose,
    ) -> Result<Vec<Region>, Box<dyn std::error::Error>>;
}
