use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::annotator::AnnotatorConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::shared::constants;
use crate::utils::file_utils;

/// Everything one run needs, checked once by `validate` before any I/O.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub video: PathBuf,
    pub model: String,
    /// Seconds between sampled frames (default 5).
    pub interval: f64,
    /// OpenAI-compatible base URL including `/v1` (default LM Studio on localhost:1234).
    pub api_url: String,
    /// Overrides the `<video stem>.csv` next to the input.
    pub output: Option<PathBuf>,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Longest frame side sent to the model; 0 sends native resolution.
    pub max_dimension: u32,
    pub health_check: bool,
}

impl RunConfig {
    pub fn new(video: impl Into<PathBuf>, model: impl Into<String>) -> Self {
        Self {
            video: video.into(),
            model: model.into(),
            interval: constants::DEFAULT_INTERVAL_SECS,
            api_url: constants::DEFAULT_API_URL.to_string(),
            output: None,
            timeout_secs: constants::DEFAULT_TIMEOUT_SECS,
            max_tokens: constants::DEFAULT_MAX_TOKENS,
            temperature: constants::DEFAULT_TEMPERATURE,
            max_dimension: 0,
            health_check: true,
        }
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if !self.interval.is_finite() || self.interval <= 0.0 {
            return Err(PipelineError::Config(format!(
                "interval must be a positive number of seconds, got {}",
                self.interval
            )));
        }
        if self.interval < constants::MIN_INTERVAL_SECS {
            return Err(PipelineError::Config(format!(
                "interval must be at least {}s, got {}",
                constants::MIN_INTERVAL_SECS,
                self.interval
            )));
        }
        if self.model.trim().is_empty() {
            return Err(PipelineError::Config("model identifier must not be empty".to_string()));
        }
        if self.video.as_os_str().is_empty() {
            return Err(PipelineError::Config("video path must not be empty".to_string()));
        }

        let url = reqwest::Url::parse(&self.api_url)
            .map_err(|e| PipelineError::Config(format!("invalid API URL '{}': {}", self.api_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(PipelineError::Config(format!(
                "API URL must be an absolute http(s) URL, got '{}'",
                self.api_url
            )));
        }

        if self.timeout_secs == 0 {
            return Err(PipelineError::Config("timeout must be at least 1 second".to_string()));
        }
        if self.max_tokens == 0 {
            return Err(PipelineError::Config("max tokens must be at least 1".to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(PipelineError::Config(format!(
                "temperature must be within 0.0..=2.0, got {}",
                self.temperature
            )));
        }

        let output = self.output_path();
        if same_file(&output, &self.video) {
            return Err(PipelineError::Config(format!(
                "output '{}' would overwrite the input video",
                output.display()
            )));
        }
        Ok(())
    }

    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| file_utils::output_path_for(&self.video))
    }

    pub fn annotator_config(&self) -> AnnotatorConfig {
        let mut annotator = AnnotatorConfig::new(self.api_url.trim_end_matches('/'), self.model.trim());
        annotator.timeout = Duration::from_secs(self.timeout_secs);
        annotator.max_tokens = self.max_tokens;
        annotator.temperature = self.temperature;
        annotator
    }
}

/// Same file on disk when both resolve, otherwise the same spelling.
fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
