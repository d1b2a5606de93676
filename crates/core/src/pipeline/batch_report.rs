use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::pipeline::pipeline_state::StageTag;
use crate::shared::error::PipelineError;

/// How one video's run ended.
#[derive(Debug)]
pub enum VideoOutcome {
    Written(PathBuf),
    /// Trimming left nothing; deliberately dropped, not a failure.
    Excluded,
    Failed(PipelineError),
}

#[derive(Debug)]
pub struct VideoReport {
    pub source: PathBuf,
    pub outcome: VideoOutcome,
    pub applied: Vec<StageTag>,
    pub elapsed: Duration,
}

impl VideoReport {
    pub fn output(&self) -> Option<&Path> {
        match &self.outcome {
            VideoOutcome::Written(path) => Some(path),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&PipelineError> {
        match &self.outcome {
            VideoOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Per-video outcomes of a batch, in processing order.
#[derive(Debug, Default)]
pub struct BatchReport {
    videos: Vec<VideoReport>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, report: VideoReport) {
        self.videos.push(report);
    }

    pub fn videos(&self) -> &[VideoReport] {
        &self.videos
    }

    pub fn written(&self) -> usize {
        self.count(|o| matches!(o, VideoOutcome::Written(_)))
    }

    pub fn excluded(&self) -> usize {
        self.count(|o| matches!(o, VideoOutcome::Excluded))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, VideoOutcome::Failed(_)))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    pub fn summary_line(&self) -> String {
        format!(
            "{} video(s): {} written, {} excluded, {} failed",
            self.videos.len(),
            self.written(),
            self.excluded(),
            self.failed()
        )
    }

    fn count(&self, pred: impl Fn(&VideoOutcome) -> bool) -> usize {
        self.videos.iter().filter(|v| pred(&v.outcome)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcome: VideoOutcome) -> VideoReport {
        VideoReport {
            source: PathBuf::from("in.mp4"),
            outcome,
            applied: Vec::new(),
            elapsed: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_counts_and_summary() {
        let mut batch = BatchReport::new();
        batch.push(report(VideoOutcome::Written(PathBuf::from("out/in_skip.mp4"))));
        batch.push(report(VideoOutcome::Excluded));
        batch.push(report(VideoOutcome::Failed(PipelineError::configuration("bad"))));
        batch.push(report(VideoOutcome::Written(PathBuf::from("out/b.mp4"))));

        assert_eq!(batch.written(), 2);
        assert_eq!(batch.excluded(), 1);
        assert_eq!(batch.failed(), 1);
        assert!(batch.has_failures());
        assert_eq!(
            batch.summary_line(),
            "4 video(s): 2 written, 1 excluded, 1 failed"
        );
        assert_eq!(
            batch.videos()[0].output(),
            Some(Path::new("out/in_skip.mp4"))
        );
        assert!(batch.videos()[2].error().is_some());
    }

    #[test]
    fn test_empty_report_has_no_failures() {
        assert!(!BatchReport::new().has_failures());
    }
}
