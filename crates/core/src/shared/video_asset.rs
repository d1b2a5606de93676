use std::ops::Range;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// A decoded clip, or the kept window of one: metadata plus frames in
/// playback order.
///
/// Stages take an asset by value and hand back a new one, so frame buffers
/// always have exactly one owner while the pipeline runs.
#[derive(Clone, Debug)]
pub struct VideoAsset {
    metadata: VideoMetadata,
    frames: Vec<Frame>,
}

impl VideoAsset {
    /// Wraps decoded frames; frame count and dimensions in the metadata are
    /// taken from the frames themselves and frames are renumbered from 0.
    pub fn new(mut metadata: VideoMetadata, frames: Vec<Frame>) -> Self {
        metadata.total_frames = frames.len();
        if let Some(first) = frames.first() {
            metadata.width = first.width();
            metadata.height = first.height();
        }
        let frames = frames
            .into_iter()
            .enumerate()
            .map(|(i, f)| f.with_index(i))
            .collect();
        Self { metadata, frames }
    }

    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    pub fn fps(&self) -> f64 {
        self.metadata.fps
    }

    pub fn width(&self) -> u32 {
        self.metadata.width
    }

    pub fn height(&self) -> u32 {
        self.metadata.height
    }

    pub fn duration(&self) -> f64 {
        self.metadata.duration()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn into_parts(self) -> (VideoMetadata, Vec<Frame>) {
        (self.metadata, self.frames)
    }

    /// Keeps only the frames in `range` (clamped to the clip).
    pub fn slice(self, range: Range<usize>) -> VideoAsset {
        let len = self.frames.len();
        let start = range.start.min(len);
        let end = range.end.clamp(start, len);
        let (metadata, mut frames) = self.into_parts();
        frames.truncate(end);
        frames.drain(..start);
        VideoAsset::new(metadata, frames)
    }

    /// Applies `f` to every frame, keeping metadata in sync with the output.
    pub fn map_frames<F>(self, f: F) -> Result<VideoAsset, Box<dyn std::error::Error>>
    where
        F: FnMut(Frame) -> Result<Frame, Box<dyn std::error::Error>>,
    {
        let (metadata, frames) = self.into_parts();
        let frames = frames.into_iter().map(f).collect::<Result<Vec<_>, _>>()?;
        Ok(VideoAsset::new(metadata, frames))
    }
}
