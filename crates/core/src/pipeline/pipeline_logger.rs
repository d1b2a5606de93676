use std::collections::HashMap;
use std::time::Instant;

/// Receives progress, timing and metric events from a batch run.
pub trait PipelineLogger: Send {
    /// Report that video `current` of `total` is about to be processed.
    fn progress(&mut self, current: usize, total: usize);

    /// Record how long a named stage took for one video.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. mask coverage, frame count).
    fn metric(&mut self, name: &str, value: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-batch summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events; used by tests.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// CLI-oriented logger that tracks per-stage timing and metrics and
/// reports them when the batch completes.
pub struct StdoutPipelineLogger {
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, Vec<f64>>,
    start_time: Instant,
    total_videos: usize,
    messages: Vec<String>,
}

impl StdoutPipelineLogger {
    pub fn new() -> Self {
        Self {
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
            total_videos: 0,
            messages: Vec::new(),
        }
    }

    /// Returns the formatted summary string, or `None` if no data recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![format!(
            "Batch summary ({} videos, {:.1}s total):",
            self.total_videos,
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = mean(durations);
            let pct = if elapsed_ms > 0.0 {
                total_ms / elapsed_ms * 100.0
            } else {
                0.0
            };
            lines.push(format!(
                "  {stage:12}: avg {avg_ms:8.1}ms  total {total_ms:9.0}ms  ({pct:4.1}%)  x{}",
                durations.len()
            ));
        }

        let mut metric_names: Vec<_> = self.metrics.keys().collect();
        metric_names.sort();
        for name in metric_names {
            lines.push(format!("  {name}: avg {:.1}", mean(&self.metrics[name])));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.total_videos = total;
        if total > 0 {
            log::info!("Video {current}/{total}");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
