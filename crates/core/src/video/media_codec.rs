use std::path::{Path, PathBuf};

use crate::shared::frame::Frame;
use crate::shared::frame_window::{FrameWindow, WindowedClip};
use crate::shared::video_asset::VideoAsset;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::{VideoReader, WindowedFrames};
use crate::video::domain::video_writer::VideoWriter;

pub type ReaderFactory = Box<dyn Fn() -> Box<dyn VideoReader> + Send>;
pub type WriterFactory = Box<dyn Fn(&str) -> Box<dyn VideoWriter> + Send>;

/// Decode/encode front door used by the orchestrator.
///
/// Holds factories rather than instances because every video in a batch
/// gets a fresh reader and writer.
pub struct MediaCodec {
    new_reader: ReaderFactory,
    new_writer: WriterFactory,
}

impl MediaCodec {
    pub fn new(new_reader: ReaderFactory, new_writer: WriterFactory) -> Self {
        Self {
            new_reader,
            new_writer,
        }
    }

    /// Decodes `path`, buffering only the frames inside the window `plan`
    /// chooses once the stream's metadata is known.
    pub fn decode_window(
        &self,
        path: &Path,
        plan: &dyn Fn(&VideoMetadata) -> FrameWindow,
    ) -> Result<WindowedClip, Box<dyn std::error::Error>> {
        let WindowedFrames {
            metadata,
            window,
            frames,
            seen,
        } = (self.new_reader)().read_window(path, plan)?;
        if metadata.fps <= 0.0 {
            return Err(format!("{} reports no usable frame rate", path.display()).into());
        }
        if seen == 0 {
            return Err(format!("{} contains no decodable frames", path.display()).into());
        }

        log::debug!(
            "Decoded {seen} frames ({}x{} @ {:.2} fps) from {}, kept {}",
            metadata.width,
            metadata.height,
            metadata.fps,
            path.display(),
            frames.len()
        );
        Ok(WindowedClip {
            asset: VideoAsset::new(metadata, frames),
            offset: window.start,
            source_frames: seen,
        })
    }

    /// Encodes the frames `frames` yields to `path` with the named codec.
    ///
    /// Frames go to a sibling `.partial` file that is renamed into place
    /// only after the container is finalized; on any failure the partial
    /// file is removed so no truncated output is left behind.
    pub fn encode<'f, I>(
        &self,
        metadata: &VideoMetadata,
        frames: I,
        path: &Path,
        codec: &str,
    ) -> Result<(), Box<dyn std::error::Error>>
    where
        I: IntoIterator<Item = &'f Frame>,
    {
        let partial = partial_path(path);
        let result = self
            .encode_to(metadata, frames.into_iter(), &partial, codec)
            .and_then(|()| {
                std::fs::rename(&partial, path)?;
                Ok(())
            });

        if result.is_err() && partial.exists() {
            if let Err(e) = std::fs::remove_file(&partial) {
                log::warn!("Could not remove partial output {}: {e}", partial.display());
            }
        }
        result
    }

    fn encode_to<'f>(
        &self,
        metadata: &VideoMetadata,
        frames: impl Iterator<Item = &'f Frame>,
        path: &Path,
        codec: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut frames = frames.peekable();
        if frames.peek().is_none() {
            return Err("refusing to encode a clip with no frames".into());
        }

        (self.new_writer)(codec).write_all(path, metadata, &mut frames)
    }
}

/// `out/name.mp4` → `out/name.partial.mp4`, keeping the extension last so
/// the muxer still recognizes the container.
pub fn partial_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}.partial.{}", ext.to_string_lossy()),
        None => format!("{stem}.partial"),
    };
    path.with_file_name(name)
}
