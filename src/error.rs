use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("cannot open video '{path}': {reason}")]
    MediaOpen { path: String, reason: String },

    #[error("failed to decode frame at {timestamp:.2}s: {reason}")]
    MediaRead { timestamp: f64, reason: String },

    #[error("annotation request failed: {0}")]
    AnnotationTransport(String),

    #[error("model reply contained no usable annotation: {reason}")]
    AnnotationParse { reason: String, raw: String },

    #[error("cannot write output: {0}")]
    Write(String),
}

impl PipelineError {
    /// Fatal errors abort the run; the rest only cost the current frame.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PipelineError::Config(_) | PipelineError::MediaOpen { .. } | PipelineError::Write(_)
        )
    }
}

impl From<reqwest::Error> for PipelineError {
    fn from(e: reqwest::Error) -> Self {
        PipelineError::AnnotationTransport(e.to_string())
    }
}

impl From<csv::Error> for PipelineError {
    fn from(e: csv::Error) -> Self {
        PipelineError::Write(e.to_string())
    }
}
