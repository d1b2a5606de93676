use std::path::PathBuf;

use thiserror::Error;

type Source = Box<dyn std::error::Error + Send + Sync>;

/// Per-video failure taxonomy.
///
/// None of these abort a batch: the orchestrator records the error against
/// the video and moves on to the next one.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("invalid input {path}: {reason}")]
    InvalidInput { path: PathBuf, reason: String },
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: Source,
    },
    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: Source,
    },
    #[error("region selection failed: {0}")]
    Selection(#[source] Source),
    #[error("inpainting failed on frame {frame}: {source}")]
    Inpaint {
        frame: usize,
        #[source]
        source: Source,
    },
    #[error("invalid stage transition from {from} to {to}")]
    Transition {
        from: &'static str,
        to: &'static str,
    },
}

impl PipelineError {
    pub fn configuration(message: impl Into<String>) -> Self {
        PipelineError::Configuration(message.into())
    }

    /// Short stable label for reports and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InvalidInput { .. } => "invalid-input",
            PipelineError::Configuration(_) => "configuration",
            PipelineError::Decode { .. } => "decode",
            PipelineError::Encode { .. } => "encode",
            PipelineError::Selection(_) => "selection",
            PipelineError::Inpaint { .. } => "inpaint",
            PipelineError::Transition { .. } => "transition",
        }
    }
}

/// Converts the `Box<dyn Error>` returned by infrastructure ports into a
/// thread-safe source by keeping its message.
pub fn to_source(err: Box<dyn std::error::Error>) -> Source {
    err.to_string().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_path() {
        let err = PipelineError::Encode {
            path: PathBuf::from("/out/a.mp4"),
            source: to_source("disk full".into()),
        };
        let text = err.to_string();
        assert!(text.contains("/out/a.mp4"));
        assert!(text.contains("disk full"));
        assert_eq!(err.kind(), "encode");
    }

    #[test]
    fn test_configuration_helper() {
        let err = PipelineError::configuration("crop collapses");
        assert_eq!(err.to_string(), "configuration error: crop collapses");
        assert_eq!(err.kind(), "configuration");
    }
}
