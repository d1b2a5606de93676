use crate::inpainting::domain::frame_inpainter::{FrameInpainter, InpaintMode};
use crate::shared::frame::Frame;
use crate::shared::mask::{Mask, MASK_ON};

/// Laplace relaxation sweeps run after the boundary fill in `NavierStokes` mode.
const DIFFUSION_ITERATIONS: usize = 30;

/// CPU inpainter working directly on packed frame bytes.
///
/// Masked pixels are filled in layers from the hole boundary inward. Each
/// pixel takes the inverse-square-distance weighted mean of the already
/// known pixels within `radius`. `NavierStokes` mode then relaxes the
/// filled area towards a harmonic surface with Gauss-Seidel sweeps of the
/// Laplace equation. That is harmonic inpainting, an approximation of
/// Navier-Stokes-class inpainting rather than a fluid-dynamics solver.
pub struct CpuInpainter {
    diffusion_iterations: usize,
}

impl CpuInpainter {
    pub fn new() -> Self {
        Self {
            diffusion_iterations: DIFFUSION_ITERATIONS,
        }
    }

    pub fn with_diffusion_iterations(mut self, iterations: usize) -> Self {
        self.diffusion_iterations = iterations;
        self
    }
}

impl Default for CpuInpainter {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameInpainter for CpuInpainter {
    fn inpaint(
        &self,
        frame: &mut Frame,
        mask: &Mask,
        radius: u32,
        mode: InpaintMode,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if mask.width() != frame.width() || mask.height() != frame.height() {
            return Err(format!(
                "mask is {}x{}, frame is {}x{}",
                mask.width(),
                mask.height(),
                frame.width(),
                frame.height()
            )
            .into());
        }

        let mut known: Vec<bool> = mask.data().iter().map(|&v| v != MASK_ON).collect();
        if known.iter().all(|&k| k) {
            return Ok(());
        }
        if !known.iter().any(|&k| k) {
            log::debug!("Mask covers frame {} entirely, nothing to sample", frame.index());
            return Ok(());
        }

        let layout = Layout {
            width: frame.width() as usize,
            height: frame.height() as usize,
            channels: frame.channels() as usize,
        };
        let data = frame.data_mut();
        march_fill(data, &layout, &mut known, radius.max(1) as isize);

        if mode == InpaintMode::NavierStokes {
            diffuse(data, &layout, mask, self.diffusion_iterations);
        }
        Ok(())
    }
}

struct Layout {
    width: usize,
    height: usize,
    channels: usize,
}

impl Layout {
    fn neighbours(&self, idx: usize, reach: isize) -> impl Iterator<Item = (usize, isize)> + '_ {
        let x = (idx % self.width) as isize;
        let y = (idx / self.width) as isize;
        let (w, h) = (self.width as isize, self.height as isize);
        (-reach..=reach).flat_map(move |dy| {
            (-reach..=reach).filter_map(move |dx| {
                let (nx, ny) = (x + dx, y + dy);
                if (dx == 0 && dy == 0) || nx < 0 || ny < 0 || nx >= w || ny >= h {
                    return None;
                }
                Some(((ny * w + nx) as usize, dx * dx + dy * dy))
            })
        })
    }
}

/// Fills unknown pixels one boundary layer at a time.
///
/// Values computed within a layer only read pixels known before the layer
/// started, so the result does not depend on scan order.
fn march_fill(data: &mut [u8], layout: &Layout, known: &mut [bool], radius: isize) {
    let c = layout.channels;
    let mut pending: Vec<usize> = (0..known.len()).filter(|&i| !known[i]).collect();

    while !pending.is_empty() {
        let front: Vec<usize> = pending
            .iter()
            .copied()
            .filter(|&i| layout.neighbours(i, 1).any(|(n, _)| known[n]))
            .collect();
        if front.is_empty() {
            break;
        }

        let mut values = Vec::with_capacity(front.len() * c);
        let mut acc = vec![0.0f64; c];
        for &idx in &front {
            acc.iter_mut().for_each(|a| *a = 0.0);
            let mut weight_sum = 0.0;
            for (n, dist2) in layout.neighbours(idx, radius) {
                if !known[n] {
                    continue;
                }
                let weight = 1.0 / dist2 as f64;
                for (ch, a) in acc.iter_mut().enumerate() {
                    *a += weight * data[n * c + ch] as f64;
                }
                weight_sum += weight;
            }
            values.extend(
                acc.iter()
                    .map(|a| (a / weight_sum).round().clamp(0.0, 255.0) as u8),
            );
        }

        for (k, &idx) in front.iter().enumerate() {
            data[idx * c..idx * c + c].copy_from_slice(&values[k * c..k * c + c]);
            known[idx] = true;
        }
        pending.retain(|&i| !known[i]);
    }
}

/// Gauss-Seidel relaxation of masked pixels towards the mean of their
/// 4-neighbours, confined to the mask's bounding box.
fn diffuse(data: &mut [u8], layout: &Layout, mask: &Mask, iterations: usize) {
    let Some((x0, y0, x1, y1)) = bounding_box(mask) else {
        return;
    };
    let (w, h, c) = (layout.width, layout.height, layout.channels);
    let mask_data = mask.data();

    let mut field: Vec<f32> = data.iter().map(|&v| v as f32).collect();
    for _ in 0..iterations {
        for y in y0..=y1 {
            for x in x0..=x1 {
                let idx = y * w + x;
                if mask_data[idx] != MASK_ON {
                    continue;
                }
                for ch in 0..c {
                    let mut sum = 0.0;
                    let mut count = 0.0;
                    if x > 0 {
                        sum += field[(idx - 1) * c + ch];
                        count += 1.0;
                    }
                    if x + 1 < w {
                        sum += field[(idx + 1) * c + ch];
                        count += 1.0;
                    }
                    if y > 0 {
                        sum += field[(idx - w) * c + ch];
                        count += 1.0;
                    }
                    if y + 1 < h {
                        sum += field[(idx + w) * c + ch];
                        count += 1.0;
                    }
                    field[idx * c + ch] = sum / count;
                }
            }
        }
    }

    for y in y0..=y1 {
        for x in x0..=x1 {
            let idx = y * w + x;
            if mask_data[idx] == MASK_ON {
                for ch in 0..c {
                    data[idx * c + ch] = field[idx * c + ch].round().clamp(0.0, 255.0) as u8;
                }
            }
        }
    }
}

fn bounding_box(mask: &Mask) -> Option<(usize, usize, usize, usize)> {
    let w = mask.width() as usize;
    let mut bounds: Option<(usize, usize, usize, usize)> = None;
    for (i, _) in mask.data().iter().enumerate().filter(|(_, v)| **v == MASK_ON) {
        let (x, y) = (i % w, i / w);
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    bounds
}
