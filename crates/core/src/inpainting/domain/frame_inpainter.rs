use serde::{Deserialize, Serialize};

use crate::shared::frame::Frame;
use crate::shared::mask::Mask;

/// How masked pixels are reconstructed from their surroundings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InpaintMode {
    /// Approximates Navier-Stokes-class inpainting with harmonic
    /// inpainting: a boundary fill, then Laplace relaxation of the hole.
    /// It does not transport isophotes along the vorticity equation.
    #[default]
    NavierStokes,
    /// Single marching pass from the boundary inward, distance weighted.
    Telea,
}

/// Domain interface for repairing the pixels a [`Mask`] marks.
///
/// Implementations modify the frame in-place (`&mut Frame`); the mask must
/// have the frame's dimensions.
pub trait FrameInpainter: Send {
    fn inpaint(
        &self,
        frame: &mut Frame,
        mask: &Mask,
        radius: u32,
        mode: InpaintMode,
    ) -> Result<(), Box<dyn std::error::Error>>;
}
