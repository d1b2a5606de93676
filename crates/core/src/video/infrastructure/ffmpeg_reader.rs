use std::path::Path;

use ffmpeg_next::format::context::Input;
use ffmpeg_next::util::frame::video::Video as AvFrame;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;

type FrameResult = Result<Frame, Box<dyn std::error::Error>>;

/// Decodes the best video stream of a container into packed RGB24 frames.
pub struct FfmpegReader {
    input: Option<Input>,
    stream_index: usize,
}

// Safety: FfmpegReader is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegReader {}

impl FfmpegReader {
    pub fn new() -> Self {
        Self {
            input: None,
            stream_index: 0,
        }
    }

    fn decode_iter(&mut self) -> Result<DecodeIter<'_>, Box<dyn std::error::Error>> {
        let stream_index = self.stream_index;
        let input = self.input.as_mut().ok_or("FfmpegReader: not opened")?;
        let stream = input
            .stream(stream_index)
            .ok_or("FfmpegReader: video stream disappeared")?;
        let decoder = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?
            .decoder()
            .video()?;
        let (width, height) = (decoder.width(), decoder.height());
        let to_rgb = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        Ok(DecodeIter {
            input,
            decoder,
            to_rgb,
            width,
            height,
            stream_index,
            next_index: 0,
            phase: Phase::Reading,
        })
    }
}

impl Default for FfmpegReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Average frame rate, falling back to the stream's base rate when the
/// container leaves it unset.
fn stream_rate(stream: &ffmpeg_next::format::stream::Stream) -> Option<(i32, i32)> {
    [stream.avg_frame_rate(), stream.rate()]
        .into_iter()
        .find(|r| r.numerator() > 0 && r.denominator() > 0)
        .map(|r| (r.numerator(), r.denominator()))
}

/// Frame count from the stream header, or estimated from its duration.
fn stream_frame_count(stream: &ffmpeg_next::format::stream::Stream, fps: f64) -> usize {
    if stream.frames() > 0 {
        return stream.frames() as usize;
    }
    let tb = stream.time_base();
    if stream.duration() <= 0 || tb.denominator() == 0 {
        return 0;
    }
    let seconds = stream.duration() as f64 * tb.numerator() as f64 / tb.denominator() as f64;
    (seconds * fps).round() as usize
}

impl VideoReader for FfmpegReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;
        self.input = None;

        let input = ffmpeg_next::format::input(path)?;
        let stream = input
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or_else(|| format!("{} has no video stream", path.display()))?;
        let decoder = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?
            .decoder()
            .video()?;

        let frame_rate = stream_rate(&stream);
        let fps = frame_rate.map_or(0.0, |(num, den)| num as f64 / den as f64);
        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            fps,
            frame_rate,
            total_frames: stream_frame_count(&stream, fps),
            codec: decoder
                .codec()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            source_path: Some(path.to_path_buf()),
        };
        log::debug!(
            "Opened {} ({}, ~{} frames)",
            path.display(),
            metadata.codec,
            metadata.total_frames
        );

        self.stream_index = stream.index();
        self.input = Some(input);
        Ok(metadata)
    }

    fn frames(&mut self) -> Box<dyn Iterator<Item = FrameResult> + '_> {
        match self.decode_iter() {
            Ok(iter) => Box::new(iter),
            Err(e) => Box::new(std::iter::once(Err(e))),
        }
    }

    fn close(&mut self) {
        self.input = None;
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    Reading,
    Draining,
    Finished,
}

/// Pulls packets on demand and yields frames in presentation order.
struct DecodeIter<'a> {
    input: &'a mut Input,
    decoder: ffmpeg_next::decoder::Video,
    to_rgb: ffmpeg_next::software::scaling::Context,
    width: u32,
    height: u32,
    stream_index: usize,
    next_index: usize,
    phase: Phase,
}

impl DecodeIter<'_> {
    fn receive(&mut self) -> Option<FrameResult> {
        let mut decoded = AvFrame::empty();
        self.decoder.receive_frame(&mut decoded).ok()?;

        let mut rgb = AvFrame::empty();
        if let Err(e) = self.to_rgb.run(&decoded, &mut rgb) {
            return Some(Err(Box::new(e)));
        }
        let frame = Frame::new(
            packed_rgb(&rgb, self.width, self.height),
            self.width,
            self.height,
            3,
            self.next_index,
        );
        self.next_index += 1;
        Some(Ok(frame))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = FrameResult;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.phase {
                Phase::Finished => return None,
                Phase::Draining => {
                    let frame = self.receive();
                    if frame.is_none() {
                        self.phase = Phase::Finished;
                    }
                    return frame;
                }
                Phase::Reading => {
                    if let Some(frame) = self.receive() {
                        return Some(frame);
                    }
                    match self.input.packets().next() {
                        Some((stream, packet)) if stream.index() == self.stream_index => {
                            if let Err(e) = self.decoder.send_packet(&packet) {
                                log::debug!("Dropping undecodable packet: {e}");
                            }
                        }
                        Some(_) => {}
                        None => {
                            let _ = self.decoder.send_eof();
                            self.phase = Phase::Draining;
                        }
                    }
                }
            }
        }
    }
}

/// Drops the per-row stride padding of plane 0.
fn packed_rgb(rgb: &AvFrame, width: u32, height: u32) -> Vec<u8> {
    let row_bytes = width as usize * 3;
    rgb.data(0)
        .chunks(rgb.stride(0))
        .take(height as usize)
        .flat_map(|row| &row[..row_bytes])
        .copied()
        .collect()
}
