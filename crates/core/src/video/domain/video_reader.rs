use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::frame_window::FrameWindow;
use crate::shared::video_metadata::VideoMetadata;

/// What a windowed read kept.
pub struct WindowedFrames {
    pub metadata: VideoMetadata,
    pub window: FrameWindow,
    pub frames: Vec<Frame>,
    /// Frames the stream actually held.
    pub seen: usize,
}

/// Reads frames from a video container.
///
/// Implementations own the codec and container details; the pipeline only
/// sees [`VideoMetadata`] and RGB [`Frame`]s indexed from 0.
pub trait VideoReader: Send {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>>;

    /// Frames in presentation order.
    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_>;

    fn close(&mut self);

    /// Opens `path` and decodes the whole stream, keeping only the frames
    /// inside the window `plan` picks from the metadata. The reader is
    /// closed again on every path.
    fn read_window(
        &mut self,
        path: &Path,
        plan: &dyn Fn(&VideoMetadata) -> FrameWindow,
    ) -> Result<WindowedFrames, Box<dyn std::error::Error>> {
        let metadata = self.open(path)?;
        let window = plan(&metadata);
        let mut kept = Vec::new();
        let mut seen = 0;
        let mut failure = None;
        for frame in self.frames() {
            match frame {
                Ok(frame) => {
                    if window.contains(seen) {
                        kept.push(frame);
                    }
                    seen += 1;
                }
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }
        self.close();
        match failure {
            Some(e) => Err(e),
            None => Ok(WindowedFrames {
                metadata,
                window,
                frames: kept,
                seen,
            }),
        }
    }
}
