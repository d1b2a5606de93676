/// Height the region selector's preview frame is scaled to.
pub const PREVIEW_HEIGHT: u32 = 720;

/// Frames sampled for mask synthesis and for the representative preview frame.
pub const DEFAULT_SAMPLE_FRAMES: usize = 10;

/// Votes a pixel needs across sampled frames to count as watermark.
pub const DEFAULT_MIN_VOTE_COUNT: usize = 7;

/// Side of the square structuring element used to grow the mask.
pub const DILATE_KERNEL_SIZE: usize = 5;

/// Mean intensity a preview candidate must exceed to not count as dark.
pub const DARK_FRAME_THRESHOLD: f64 = 10.0;

pub const DEFAULT_INPAINT_RADIUS: u32 = 3;

pub const DEFAULT_CODEC: &str = "libx264";
pub const FALLBACK_CODEC: &str = "mpeg4";
pub const DEFAULT_OUTPUT_EXTENSION: &str = "mp4";

/// Loop remainders closer than this to zero or to a full clip are folded
/// into the loop count.
pub const LOOP_EPSILON_SECS: f64 = 1e-6;

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "webm", "flv", "m4v"];
