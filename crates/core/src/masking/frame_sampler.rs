//! Picks equally spaced frames from a clip, for previews and mask voting.

use crate::shared::frame::Frame;
use crate::shared::video_asset::VideoAsset;

/// `num_frames` indices spread evenly over `[0, total_frames)`, always
/// starting at 0. `num_frames` is clamped to the frames available.
pub fn sample_indices(total_frames: usize, num_frames: usize) -> Vec<usize> {
    if total_frames == 0 || num_frames == 0 {
        return Vec::new();
    }
    let n = num_frames.min(total_frames);
    (0..n).map(|i| i * total_frames / n).collect()
}

pub fn sample(asset: &VideoAsset, num_frames: usize) -> Vec<(usize, &Frame)> {
    sample_indices(asset.frame_count(), num_frames)
        .into_iter()
        .filter_map(|i| asset.frame(i).map(|f| (i, f)))
        .collect()
}

/// First sampled frame whose mean intensity exceeds `threshold`.
///
/// Falls back to frame 0 when every candidate is dark; `None` only for a
/// clip without frames.
pub fn first_non_dark(asset: &VideoAsset, threshold: f64, num_frames: usize) -> Option<&Frame> {
    sample(asset, num_frames)
        .into_iter()
        .map(|(_, f)| f)
        .find(|f| f.mean_intensity() > threshold)
        .or_else(|| asset.frame(0))
}
