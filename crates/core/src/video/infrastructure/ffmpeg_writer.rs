use std::path::Path;

use crate::shared::constants::{DEFAULT_CODEC, FALLBACK_CODEC};
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::VideoWriter;

/// Encodes RGB frames via ffmpeg-next into a YUV420P video stream.
///
/// The encoder is looked up by name (`libx264` by default); when the
/// linked ffmpeg lacks it, the writer falls back to MPEG-4 part 2.
pub struct FfmpegWriter {
    codec_name: String,
    octx: Option<ffmpeg_next::format::context::Output>,
    encoder: Option<ffmpeg_next::codec::encoder::video::Encoder>,
    scaler: Option<ffmpeg_next::software::scaling::Context>,
    width: u32,
    height: u32,
    out_width: u32,
    out_height: u32,
    time_base: ffmpeg_next::Rational,
    frame_count: usize,
}

// Safety: FfmpegWriter is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegWriter {}

impl FfmpegWriter {
    pub fn new() -> Self {
        Self {
            codec_name: DEFAULT_CODEC.to_string(),
            octx: None,
            encoder: None,
            scaler: None,
            width: 0,
            height: 0,
            out_width: 0,
            out_height: 0,
            time_base: ffmpeg_next::Rational(1, 30),
            frame_count: 0,
        }
    }

    pub fn with_codec(mut self, codec_name: &str) -> Self {
        self.codec_name = codec_name.to_string();
        self
    }

    fn find_codec(&self) -> Result<ffmpeg_next::Codec, Box<dyn std::error::Error>> {
        if let Some(codec) = ffmpeg_next::encoder::find_by_name(&self.codec_name) {
            return Ok(codec);
        }
        log::warn!(
            "Encoder '{}' not available, falling back to {FALLBACK_CODEC}",
            self.codec_name
        );
        ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4)
            .ok_or_else(|| format!("neither '{}' nor {FALLBACK_CODEC} encoder found", self.codec_name).into())
    }

    fn drain_packets(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let encoder = self.encoder.as_mut().ok_or("FfmpegWriter: not opened")?;
        let octx = self.octx.as_mut().ok_or("FfmpegWriter: not opened")?;
        let ost_time_base = octx
            .stream(0)
            .ok_or("FfmpegWriter: output stream missing")?
            .time_base();

        let mut encoded = ffmpeg_next::Packet::empty();
        while encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(0);
            encoded.rescale_ts(self.time_base, ost_time_base);
            encoded.write_interleaved(octx)?;
        }
        Ok(())
    }
}

impl Default for FfmpegWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// YUV 4:2:0 needs even dimensions. Odd frames drop their last row or column.
fn even_dimension(v: u32) -> u32 {
    v & !1
}

impl VideoWriter for FfmpegWriter {
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let out_w = even_dimension(metadata.width);
        let out_h = even_dimension(metadata.height);
        if out_w == 0 || out_h == 0 {
            return Err(format!(
                "frame size {}x{} is too small to encode",
                metadata.width, metadata.height
            )
            .into());
        }

        let mut octx = ffmpeg_next::format::output(path)?;
        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let codec = self.find_codec()?;
        let mut ost = octx.add_stream(Some(codec))?;

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()?;

        encoder_ctx.set_width(out_w);
        encoder_ctx.set_height(out_h);
        encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);

        let (num, den) = metadata.rational_fps();
        let time_base = ffmpeg_next::Rational(den, num);
        encoder_ctx.set_time_base(time_base);
        encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(num, den)));

        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let encoder = encoder_ctx.open_with(ffmpeg_next::Dictionary::new())?;
        ost.set_parameters(&encoder);

        octx.write_header()?;

        let scaler = ffmpeg_next::software::scaling::Context::get(
            ffmpeg_next::format::Pixel::RGB24,
            out_w,
            out_h,
            ffmpeg_next::format::Pixel::YUV420P,
            out_w,
            out_h,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        self.width = metadata.width;
        self.height = metadata.height;
        self.out_width = out_w;
        self.out_height = out_h;
        self.time_base = time_base;
        self.octx = Some(octx);
        self.encoder = Some(encoder);
        self.scaler = Some(scaler);
        self.frame_count = 0;

        log::debug!(
            "Opened {} ({}x{} @ {num}/{den} fps, codec {})",
            path.display(),
            out_w,
            out_h,
            codec.name()
        );
        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if frame.width() != self.width || frame.height() != self.height {
            return Err(format!(
                "frame {} is {}x{}, stream expects {}x{}",
                frame.index(),
                frame.width(),
                frame.height(),
                self.width,
                self.height
            )
            .into());
        }
        let scaler = self.scaler.as_mut().ok_or("FfmpegWriter: not opened")?;

        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::new(
            ffmpeg_next::format::Pixel::RGB24,
            self.out_width,
            self.out_height,
        );

        let stride = rgb_frame.stride(0);
        let src_row = self.width as usize * 3;
        let kept_row = self.out_width as usize * 3;
        for (dst, src) in rgb_frame
            .data_mut(0)
            .chunks_mut(stride)
            .zip(frame.data().chunks_exact(src_row))
        {
            dst[..kept_row].copy_from_slice(&src[..kept_row]);
        }

        let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
        scaler.run(&rgb_frame, &mut yuv_frame)?;
        yuv_frame.set_pts(Some(self.frame_count as i64));

        self.encoder
            .as_mut()
            .ok_or("FfmpegWriter: not opened")?
            .send_frame(&yuv_frame)?;
        self.drain_packets()?;

        self.frame_count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(encoder) = self.encoder.as_mut() {
            encoder.send_eof()?;
            self.drain_packets()?;
            if let Some(octx) = self.octx.as_mut() {
                octx.write_trailer()?;
            }
        }

        self.octx = None;
        self.encoder = None;
        self.scaler = None;

        Ok(())
    }
}
