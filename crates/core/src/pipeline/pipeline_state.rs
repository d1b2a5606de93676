use std::fmt;
use std::path::{Path, PathBuf};

use crate::shared::error::PipelineError;

/// One of the four stages, in pipeline order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StageTag {
    Trim,
    Crop,
    Dewatermark,
    Loop,
}

impl StageTag {
    pub const ALL: [StageTag; 4] = [
        StageTag::Trim,
        StageTag::Crop,
        StageTag::Dewatermark,
        StageTag::Loop,
    ];

    /// Token appended to the output name when the stage ran.
    pub fn suffix(self) -> &'static str {
        match self {
            StageTag::Trim => "_skip",
            StageTag::Crop => "_clip",
            StageTag::Dewatermark => "_rmwtmk",
            StageTag::Loop => "_rec",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StageTag::Trim => "trim",
            StageTag::Crop => "crop",
            StageTag::Dewatermark => "dewatermark",
            StageTag::Loop => "loop",
        }
    }

    /// State a video is in once this stage has been passed.
    fn reached(self) -> VideoState {
        match self {
            StageTag::Trim => VideoState::Trimmed,
            StageTag::Crop => VideoState::Cropped,
            StageTag::Dewatermark => VideoState::Dewatermarked,
            StageTag::Loop => VideoState::Looped,
        }
    }
}

impl fmt::Display for StageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-video progress. Disabled stages still advance the state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoState {
    Pending,
    Trimmed,
    Cropped,
    Dewatermarked,
    Looped,
    Written,
    /// Dropped by the trimmer; only reachable from `Pending`.
    Excluded,
}

impl VideoState {
    fn successor(self) -> Option<VideoState> {
        match self {
            VideoState::Pending => Some(VideoState::Trimmed),
            VideoState::Trimmed => Some(VideoState::Cropped),
            VideoState::Cropped => Some(VideoState::Dewatermarked),
            VideoState::Dewatermarked => Some(VideoState::Looped),
            VideoState::Looped => Some(VideoState::Written),
            VideoState::Written | VideoState::Excluded => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            VideoState::Pending => "pending",
            VideoState::Trimmed => "trimmed",
            VideoState::Cropped => "cropped",
            VideoState::Dewatermarked => "dewatermarked",
            VideoState::Looped => "looped",
            VideoState::Written => "written",
            VideoState::Excluded => "excluded",
        }
    }
}

/// Transient record of one video moving through the pipeline.
///
/// The output name is derived from the ordered list of stages that
/// actually changed the clip, never assembled by hand.
#[derive(Clone, Debug)]
pub struct PipelineState {
    source: PathBuf,
    stem: String,
    applied: Vec<StageTag>,
    finishing: Vec<String>,
    state: VideoState,
}

impl PipelineState {
    pub fn new(source: &Path) -> Self {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video".to_string());
        Self {
            source: source.to_path_buf(),
            stem,
            applied: Vec::new(),
            finishing: Vec::new(),
            state: VideoState::Pending,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn state(&self) -> VideoState {
        self.state
    }

    pub fn applied(&self) -> &[StageTag] {
        &self.applied
    }

    /// Moves past `stage`; `applied` records whether it changed the clip.
    pub fn pass(&mut self, stage: StageTag, applied: bool) -> Result<(), PipelineError> {
        self.advance_to(stage.reached())?;
        if applied {
            self.applied.push(stage);
        }
        Ok(())
    }

    /// Records a finishing step; only valid once every stage has passed.
    pub fn finish(&mut self, suffix: String) -> Result<(), PipelineError> {
        if self.state != VideoState::Looped {
            return Err(PipelineError::Transition {
                from: self.state.name(),
                to: "finished",
            });
        }
        self.finishing.push(suffix);
        Ok(())
    }

    pub fn exclude(&mut self) -> Result<(), PipelineError> {
        if self.state != VideoState::Pending {
            return Err(self.invalid(VideoState::Excluded));
        }
        self.state = VideoState::Excluded;
        Ok(())
    }

    pub fn mark_written(&mut self) -> Result<(), PipelineError> {
        self.advance_to(VideoState::Written)
    }

    /// `<stem><suffixes>.<extension>`, stage suffixes in pipeline order
    /// followed by the finishing suffixes.
    pub fn output_name(&self, extension: &str) -> String {
        let suffixes: String = self
            .applied
            .iter()
            .map(|t| t.suffix())
            .chain(self.finishing.iter().map(String::as_str))
            .collect();
        format!("{}{suffixes}.{extension}", self.stem)
    }

    fn advance_to(&mut self, next: VideoState) -> Result<(), PipelineError> {
        if self.state.successor() != Some(next) {
            return Err(self.invalid(next));
        }
        self.state = next;
        Ok(())
    }

    fn invalid(&self, to: VideoState) -> PipelineError {
        PipelineError::Transition {
            from: self.state.name(),
            to: to.name(),
        }
    }
}
