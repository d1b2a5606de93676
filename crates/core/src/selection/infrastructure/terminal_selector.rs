use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::selection::domain::region_selector::{RegionSelector, SelectionPurpose};
use crate::shared::frame::Frame;
use crate::shared::region::Region;
use crate::video::domain::image_writer::ImageWriter;

const OUTLINE_RGB: [u8; 3] = [0, 255, 0];
const OUTLINE_THICKNESS: i32 = 2;

/// Line-oriented selector for terminals.
///
/// Saves the preview frame as an image the user can open, then reads
/// `x,y,width,height` rectangles (preview coordinates) one per line. Every
/// accepted rectangle is outlined in the saved preview. A blank line,
/// `done` or end of input finishes; `c` discards everything chosen so far
/// and finishes with no regions.
pub struct TerminalRegionSelector<R, W> {
    input: R,
    output: W,
    image_writer: Box<dyn ImageWriter>,
    preview_dir: PathBuf,
    requests: usize,
}

impl<R: BufRead + Send, W: Write + Send> TerminalRegionSelector<R, W> {
    pub fn new(input: R, output: W, image_writer: Box<dyn ImageWriter>, preview_dir: &Path) -> Self {
        Self {
            input,
            output,
            image_writer,
            preview_dir: preview_dir.to_path_buf(),
            requests: 0,
        }
    }

    fn preview_path(&self, purpose: SelectionPurpose) -> PathBuf {
        self.preview_dir
            .join(format!("{purpose}-preview-{}.png", self.requests))
    }
}

impl<R: BufRead + Send, W: Write + Send> RegionSelector for TerminalRegionSelector<R, W> {
    fn select(
        &mut self,
        preview: &Frame,
        purpose: SelectionPurpose,
    ) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        self.requests += 1;
        let path = self.preview_path(purpose);
        let mut annotated = preview.clone();
        self.image_writer.write(&path, &annotated)?;

        writeln!(
            self.output,
            "Select {purpose} region(s) on {} ({}x{}).",
            path.display(),
            preview.width(),
            preview.height()
        )?;
        writeln!(
            self.output,
            "Enter x,y,width,height per line; empty line or 'done' to finish, 'c' to cancel."
        )?;

        let mut chosen = Vec::new();
        loop {
            write!(self.output, "{purpose}> ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                break;
            }
            let line = line.trim();
            match line {
                "" | "done" => break,
                "c" | "cancel" => {
                    chosen.clear();
                    break;
                }
                _ => {}
            }

            match line.parse::<Region>() {
                Ok(region) if region.fits_within(preview.width(), preview.height()) => {
                    draw_outline(&mut annotated, &region);
                    self.image_writer.write(&path, &annotated)?;
                    chosen.push(region);
                }
                Ok(region) => writeln!(
                    self.output,
                    "{region} is empty or outside the {}x{} preview",
                    preview.width(),
                    preview.height()
                )?,
                Err(e) => writeln!(self.output, "{e}")?,
            }
        }

        log::debug!("{} {purpose} region(s) selected", chosen.len());
        Ok(chosen)
    }
}

/// Paints a rectangle border onto an RGB frame, clipped to the frame.
fn draw_outline(frame: &mut Frame, region: &Region) {
    let (fw, fh) = (frame.width() as i32, frame.height() as i32);
    let channels = frame.channels() as usize;
    if channels < 3 {
        return;
    }
    let data = frame.data_mut();
    let x_end = region.x + region.width;
    let y_end = region.y + region.height;

    for y in region.y..y_end {
        for x in region.x..x_end {
            let on_border = x < region.x + OUTLINE_THICKNESS
                || x >= x_end - OUTLINE_THICKNESS
                || y < region.y + OUTLINE_THICKNESS
                || y >= y_end - OUTLINE_THICKNESS;
            if !on_border || x < 0 || y < 0 || x >= fw || y >= fh {
                continue;
            }
            let offset = (y as usize * fw as usize + x as usize) * channels;
            data[offset..offset + 3].copy_from_slice(&OUTLINE_RGB);
        }
    }
}
