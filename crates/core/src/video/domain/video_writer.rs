use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Encodes frames into a video container.
pub trait VideoWriter: Send {
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>>;

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;

    /// Flushes pending packets and finalizes the container.
    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>>;

    /// Writes every frame `frames` yields. The same frame may come round
    /// more than once. The writer is closed on every path; the first error
    /// wins.
    fn write_all<'f>(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
        frames: &mut dyn Iterator<Item = &'f Frame>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.open(path, metadata)?;
        if let Err(e) = Iterator::try_for_each(&mut &mut *frames, |frame| self.write(frame)) {
            let _ = self.close();
            return Err(e);
        }
        self.close()
    }
}
