use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Exact container rate as `(numerator, denominator)`, when known.
    /// `fps` is its decimal value.
    pub frame_rate: Option<(i32, i32)>,
    pub total_frames: usize,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    /// Playback length in seconds; zero when the frame rate is unknown.
    pub fn duration(&self) -> f64 {
        if self.fps > 0.0 {
            self.total_frames as f64 / self.fps
        } else {
            0.0
        }
    }

    /// Number of whole frames covering `seconds` at this frame rate.
    pub fn frames_for(&self, seconds: f64) -> usize {
        (seconds.max(0.0) * self.fps).round() as usize
    }

    /// Frame rate as a reduced fraction for the encoder.
    ///
    /// Uses the container's exact rate when present. Otherwise `fps` is
    /// matched against the NTSC family (`n * 1000 / 1001`) before falling
    /// back to millihertz precision.
    pub fn rational_fps(&self) -> (i32, i32) {
        if let Some((num, den)) = self.frame_rate.filter(|&(n, d)| n > 0 && d > 0) {
            return reduce(num, den);
        }
        if !(self.fps > 0.0) {
            return (30, 1);
        }
        let whole = self.fps.round();
        if (self.fps - whole).abs() < 1e-6 {
            return (whole as i32, 1);
        }
        let ntsc = (self.fps * 1.001).round();
        if (ntsc * 1000.0 / 1001.0 - self.fps).abs() < 1e-3 {
            return reduce(ntsc as i32 * 1000, 1001);
        }
        reduce((self.fps * 1000.0).round() as i32, 1000)
    }
}

fn reduce(num: i32, den: i32) -> (i32, i32) {
    let (mut a, mut b) = (num, den);
    while b != 0 {
        (a, b) = (b, a % b);
    }
    (num / a, den / a)
}
