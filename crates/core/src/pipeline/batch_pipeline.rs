use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::inpainting::domain::frame_inpainter::FrameInpainter;
use crate::masking::frame_sampler;
use crate::masking::mask_synthesizer::MaskSynthesizer;
use crate::pipeline::batch_context::BatchContext;
use crate::pipeline::batch_discovery::ensure_output_dir;
use crate::pipeline::batch_report::{BatchReport, VideoOutcome, VideoReport};
use crate::pipeline::config::{PipelineConfig, RegionSource};
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::pipeline_state::{PipelineState, StageTag};
use crate::selection::domain::region_selector::{RegionSelector, SelectionPurpose};
use crate::selection::preview::PreviewFrame;
use crate::shared::constants::{DARK_FRAME_THRESHOLD, PREVIEW_HEIGHT};
use crate::shared::error::{to_source, PipelineError};
use crate::shared::frame_window::FrameWindow;
use crate::shared::mask::Mask;
use crate::shared::region::Region;
use crate::shared::video_asset::VideoAsset;
use crate::shared::video_metadata::VideoMetadata;
use crate::stages::cropper::Cropper;
use crate::stages::dewatermarker::Dewatermarker;
use crate::stages::looper::Looper;
use crate::stages::speed_changer::SpeedChanger;
use crate::stages::trimmer::{TrimOutcome, Trimmer};
use crate::video::editing;
use crate::video::media_codec::MediaCodec;

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

/// Runs every video of a batch through Trim → Crop → Dewatermark → Loop.
///
/// Videos are processed one after another. Region selection and mask
/// synthesis happen at most once per batch (unless the config asks for
/// per-video reselection) and are shared through a [`BatchContext`]. A
/// failing video is recorded in the report and never stops the batch.
pub struct BatchPipeline {
    config: PipelineConfig,
    codec: MediaCodec,
    selector: Box<dyn RegionSelector>,
    synthesizer: MaskSynthesizer,
    dewatermarker: Dewatermarker,
    logger: Box<dyn PipelineLogger>,
}

impl BatchPipeline {
    pub fn new(
        config: PipelineConfig,
        codec: MediaCodec,
        selector: Box<dyn RegionSelector>,
        inpainter: Box<dyn FrameInpainter>,
        logger: Box<dyn PipelineLogger>,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        let synthesizer = MaskSynthesizer::new(config.sample_frames, config.min_vote_count);
        let dewatermarker =
            Dewatermarker::new(inpainter, config.inpaint_radius).with_mode(config.inpaint_mode);
        Ok(Self {
            config,
            codec,
            selector,
            synthesizer,
            dewatermarker,
            logger,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Processes `inputs` in order, writing results into `output_dir`.
    ///
    /// Only a failure to create `output_dir` is returned as an error;
    /// everything else ends up in the report.
    pub fn run(
        &mut self,
        inputs: &[PathBuf],
        output_dir: &Path,
    ) -> Result<BatchReport, PipelineError> {
        ensure_output_dir(output_dir)?;

        let mut ctx = BatchContext::new(self.config.reselect_per_video);
        let mut report = BatchReport::new();
        let mut written = HashSet::new();

        for (i, source) in inputs.iter().enumerate() {
            self.logger.progress(i + 1, inputs.len());
            ctx.begin_video();

            let started = Instant::now();
            let mut state = PipelineState::new(source);
            let outcome = match self.process(source, output_dir, &mut ctx, &mut state, &mut written)
            {
                Ok(outcome) => outcome,
                Err(e) => {
                    log::error!("{}: {e}", source.display());
                    VideoOutcome::Failed(e)
                }
            };
            match &outcome {
                VideoOutcome::Written(path) => {
                    self.logger.info(&format!("Wrote {}", path.display()))
                }
                VideoOutcome::Excluded => self
                    .logger
                    .info(&format!("Excluded {}: trimmed to nothing", source.display())),
                VideoOutcome::Failed(_) => {}
            }

            report.push(VideoReport {
                source: source.clone(),
                outcome,
                applied: state.applied().to_vec(),
                elapsed: started.elapsed(),
            });
        }

        self.logger.info(&report.summary_line());
        self.logger.summary();
        Ok(report)
    }

    fn process(
        &mut self,
        source: &Path,
        output_dir: &Path,
        ctx: &mut BatchContext,
        state: &mut PipelineState,
        written: &mut HashSet<PathBuf>,
    ) -> Result<VideoOutcome, PipelineError> {
        if !source.is_file() {
            return Err(PipelineError::InvalidInput {
                path: source.to_path_buf(),
                reason: "not a readable file".to_string(),
            });
        }

        let stages = self.config.stages.clone();
        let trimmer = stages
            .trim
            .as_ref()
            .map(|trim| Trimmer::new(trim.skip_start, trim.skip_end, trim.max_duration));
        let frame_cap = self
            .config
            .max_frames
            .filter(|_| stages.crop_enabled() || stages.watermark_enabled());
        let plan = |meta: &VideoMetadata| {
            let window = trimmer.as_ref().map_or(FrameWindow::ALL, |t| t.window(meta));
            match frame_cap {
                Some(cap) => window.limited_to(cap),
                None => window,
            }
        };

        let started = Instant::now();
        let clip = self
            .codec
            .decode_window(source, &plan)
            .map_err(|e| PipelineError::Decode {
                path: source.to_path_buf(),
                source: to_source(e),
            })?;
        self.logger.timing("decode", elapsed_ms(started));
        self.logger.metric("source_frames", clip.source_frames as f64);
        self.logger.metric("buffered_frames", clip.asset.frame_count() as f64);

        let asset = match &trimmer {
            Some(trimmer) => match trimmer.finish(clip) {
                TrimOutcome::Skip => {
                    state.exclude()?;
                    return Ok(VideoOutcome::Excluded);
                }
                TrimOutcome::Trimmed(trimmed) => {
                    state.pass(StageTag::Trim, true)?;
                    trimmed
                }
            },
            None => {
                state.pass(StageTag::Trim, false)?;
                clip.asset
            }
        };
        if let Some(cap) = frame_cap {
            log::debug!("Working on at most {cap} frames, have {}", asset.frame_count());
        }

        let asset = match &stages.crop {
            Some(source) => {
                let regions = self.crop_regions(source, &asset, ctx)?;
                let started = Instant::now();
                let cropped = Cropper::apply(asset, &regions)?;
                self.logger.timing("crop", elapsed_ms(started));
                state.pass(StageTag::Crop, true)?;
                cropped
            }
            None => {
                state.pass(StageTag::Crop, false)?;
                asset
            }
        };

        let asset = match &stages.watermark {
            Some(source) => {
                let mask = self.watermark_mask(source, &asset, ctx)?;
                let started = Instant::now();
                let repaired = self.dewatermarker.apply(asset, Some(&mask))?;
                self.logger.timing("dewatermark", elapsed_ms(started));
                state.pass(StageTag::Dewatermark, true)?;
                repaired
            }
            None => {
                state.pass(StageTag::Dewatermark, false)?;
                asset
            }
        };

        let finish = self.config.finish.clone();
        let asset = match finish.resize {
            Some(size) => {
                let started = Instant::now();
                let resized = editing::resize(asset, size.width, size.height).map_err(|e| {
                    PipelineError::configuration(format!("cannot resize to {size}: {e}"))
                })?;
                self.logger.timing("resize", elapsed_ms(started));
                resized
            }
            None => asset,
        };

        let target = stages.loop_duration.filter(|_| stages.loop_enabled());
        let looped = Looper::new(target).apply(&asset);
        state.pass(StageTag::Loop, target.is_some())?;

        if let Some(size) = finish.resize {
            state.finish(size.suffix())?;
        }
        let looped = match finish.speed {
            Some(factor) => {
                let changer = SpeedChanger::new(factor);
                state.finish(changer.suffix())?;
                changer.apply(looped)
            }
            None => looped,
        };

        let output = output_dir.join(state.output_name(&self.config.output_extension));
        if output == source {
            return Err(PipelineError::InvalidInput {
                path: source.to_path_buf(),
                reason: "output would overwrite the source video".to_string(),
            });
        }
        if written.contains(&output) {
            return Err(PipelineError::InvalidInput {
                path: source.to_path_buf(),
                reason: format!(
                    "{} was already written by an earlier video in this batch",
                    output.display()
                ),
            });
        }

        let started = Instant::now();
        self.codec
            .encode(looped.metadata(), looped.frames(), &output, &self.config.codec)
            .map_err(|e| PipelineError::Encode {
                path: output.clone(),
                source: to_source(e),
            })?;
        self.logger.timing("encode", elapsed_ms(started));
        self.logger.metric("output_frames", looped.frame_count() as f64);
        state.mark_written()?;
        written.insert(output.clone());

        Ok(VideoOutcome::Written(output))
    }

    fn crop_regions(
        &mut self,
        source: &RegionSource,
        asset: &VideoAsset,
        ctx: &mut BatchContext,
    ) -> Result<Vec<Region>, PipelineError> {
        let regions = match source {
            RegionSource::Fixed(regions) => regions.clone(),
            RegionSource::Select => {
                let size = (asset.width(), asset.height());
                if let Some(cached) = ctx.crop_regions(size) {
                    return Ok(cached);
                }
                let chosen = self.select(asset, SelectionPurpose::Crop)?;
                ctx.store_crop_regions(chosen.clone(), size);
                chosen
            }
        };
        Ok(regions)
    }

    fn watermark_mask(
        &mut self,
        source: &RegionSource,
        asset: &VideoAsset,
        ctx: &mut BatchContext,
    ) -> Result<Arc<Mask>, PipelineError> {
        if let Some(mask) = ctx.watermark_mask((asset.width(), asset.height())) {
            return Ok(mask);
        }

        let regions = match source {
            RegionSource::Fixed(regions) => regions.clone(),
            RegionSource::Select => self.select(asset, SelectionPurpose::Watermark)?,
        };

        let started = Instant::now();
        let mask = self.synthesizer.synthesize(asset, &regions);
        self.logger.timing("mask", elapsed_ms(started));
        self.logger.metric("mask_pixels", mask.count_set() as f64);
        if mask.is_blank() {
            log::warn!("Watermark mask is empty; frames will pass through unchanged");
        }
        Ok(ctx.store_watermark(mask))
    }

    /// Shows the selector a preview of a representative frame and maps its
    /// answer back to native coordinates.
    fn select(
        &mut self,
        asset: &VideoAsset,
        purpose: SelectionPurpose,
    ) -> Result<Vec<Region>, PipelineError> {
        let selection_error = |e: Box<dyn std::error::Error>| PipelineError::Selection(to_source(e));

        let frame = frame_sampler::first_non_dark(
            asset,
            DARK_FRAME_THRESHOLD,
            self.config.sample_frames,
        )
        .ok_or_else(|| selection_error("clip has no frames to preview".into()))?;
        let preview = PreviewFrame::from_frame(frame, PREVIEW_HEIGHT).map_err(selection_error)?;

        let picked = self
            .selector
            .select(preview.frame(), purpose)
            .map_err(selection_error)?;

        let regions: Vec<Region> = picked
            .iter()
            .map(|r| preview.to_native(r))
            .filter(|r| {
                if r.is_empty() {
                    log::warn!("Ignoring {purpose} region {r}: empty at native resolution");
                }
                !r.is_empty()
            })
            .collect();
        self.logger.info(&format!(
            "Selected {} {purpose} region(s) from frame {}",
            regions.len(),
            frame.index()
        ));
        Ok(regions)
    }
}
