use crate::shared::constants::LOOP_EPSILON_SECS;
use crate::shared::frame::Frame;
use crate::shared::video_asset::VideoAsset;
use crate::shared::video_metadata::VideoMetadata;

/// How a clip is repeated to reach a target duration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoopPlan {
    pub loop_count: usize,
    /// Seconds taken from the head of the clip after the full repetitions.
    pub remainder: f64,
}

impl LoopPlan {
    /// `None` when either duration is not positive.
    ///
    /// Remainders within [`LOOP_EPSILON_SECS`] of zero or of a full clip are
    /// folded into `loop_count`, so exact multiples never produce a sliver.
    pub fn compute(source_duration: f64, target_duration: f64) -> Option<LoopPlan> {
        if source_duration <= 0.0 || target_duration <= 0.0 {
            return None;
        }
        let mut loop_count = (target_duration / source_duration).floor() as usize;
        let mut remainder = (target_duration - loop_count as f64 * source_duration).max(0.0);

        if remainder < LOOP_EPSILON_SECS && loop_count > 0 {
            remainder = 0.0;
        } else if source_duration - remainder < LOOP_EPSILON_SECS {
            loop_count += 1;
            remainder = 0.0;
        }
        Some(LoopPlan {
            loop_count,
            remainder,
        })
    }
}

/// Repeats the clip to fill `target_duration`, ending with a partial copy
/// of its head when the target is not a whole multiple.
#[derive(Clone, Debug, PartialEq)]
pub struct Looper {
    target_duration: Option<f64>,
}

impl Looper {
    pub fn new(target_duration: Option<f64>) -> Self {
        Self { target_duration }
    }

    /// A view that plays `asset` for the target duration. No frame is
    /// copied; the writer is handed the same frames again on every pass.
    pub fn apply<'a>(&self, asset: &'a VideoAsset) -> LoopedClip<'a> {
        let count = asset.frame_count();
        let plan = self
            .target_duration
            .and_then(|target| LoopPlan::compute(asset.duration(), target));
        let Some(plan) = plan.filter(|_| count > 0) else {
            return LoopedClip::new(asset, count);
        };
        log::debug!(
            "Looping {:.2}s clip {} time(s) plus {:.2}s",
            asset.duration(),
            plan.loop_count,
            plan.remainder
        );

        let tail = if plan.remainder > 0.0 {
            asset.metadata().frames_for(plan.remainder).clamp(1, count)
        } else {
            0
        };
        LoopedClip::new(asset, plan.loop_count * count + tail)
    }
}

/// A clip played back to back until `frame_count` frames have been shown.
///
/// Output frame `k` shows source frame `floor(k * step) mod len`; `step`
/// is 1 until a speed change is applied.
#[derive(Debug)]
pub struct LoopedClip<'a> {
    asset: &'a VideoAsset,
    metadata: VideoMetadata,
    step: f64,
}

impl<'a> LoopedClip<'a> {
    fn new(asset: &'a VideoAsset, frame_count: usize) -> Self {
        let mut metadata = asset.metadata().clone();
        metadata.total_frames = frame_count;
        Self {
            asset,
            metadata,
            step: 1.0,
        }
    }

    /// Plays the stream `factor` times as fast, at the same frame rate.
    pub(crate) fn retimed(mut self, factor: f64, frame_count: usize) -> Self {
        self.step *= factor;
        self.metadata.total_frames = frame_count;
        self
    }

    /// Metadata of the looped stream.
    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    pub fn frame_count(&self) -> usize {
        self.metadata.total_frames
    }

    pub fn duration(&self) -> f64 {
        self.metadata.duration()
    }

    /// Frames in playback order, cycling through the source clip.
    pub fn frames(&self) -> impl Iterator<Item = &'a Frame> + 'a {
        let source = self.asset.frames();
        let step = self.step;
        (0..self.metadata.total_frames)
            .map(move |k| &source[(k as f64 * step).floor() as usize % source.len()])
    }
}
