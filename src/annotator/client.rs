//! Blocking client for an OpenAI-compatible chat-completions server (LM Studio, llama.cpp,
//! Ollama's `/v1` shim, ...).

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::blocking::Client;

use super::parser::{parse_reply, ModelReply};
use super::types::{Annotation, ChatMessage, ChatRequest, ChatResponse};
use crate::decoder::EncodedImage;
use crate::error::{PipelineError, PipelineResult};
use crate::shared::constants;
use crate::utils::logger;

/// Longest slice of a response body quoted back in an error message.
const ERROR_BODY_PREVIEW: usize = 300;

/// Turns one frame into one annotation.
pub trait Annotator {
    fn annotate(&self, image: &EncodedImage) -> PipelineResult<Annotation>;
}

#[derive(Debug, Clone)]
pub struct AnnotatorConfig {
    /// Base URL including the API version segment, e.g. `http://localhost:1234/v1`.
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl AnnotatorConfig {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            timeout: Duration::from_secs(constants::DEFAULT_TIMEOUT_SECS),
            max_tokens: constants::DEFAULT_MAX_TOKENS,
            temperature: constants::DEFAULT_TEMPERATURE,
        }
    }
}

pub struct AnnotationClient {
    http: Client,
    config: AnnotatorConfig,
}

impl AnnotationClient {
    pub fn new(config: AnnotatorConfig) -> PipelineResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Lists models to prove the server is up before any frame is decoded.
    pub fn health_check(&self) -> PipelineResult<()> {
        let url = self.endpoint("models");
        logger::debug(&format!("Health check: GET {}", url));

        let response = self
            .http
            .get(&url)
            .bearer_auth(constants::PLACEHOLDER_API_KEY)
            .send()
            .map_err(|e| {
                PipelineError::AnnotationTransport(format!(
                    "cannot reach {} ({}). Is the server running?",
                    url, e
                ))
            })?;

        if !response.status().is_success() {
            return Err(PipelineError::AnnotationTransport(format!(
                "{} answered {}",
                url,
                response.status()
            )));
        }
        Ok(())
    }

    fn build_request(&self, image: &EncodedImage) -> ChatRequest<'_> {
        let encoded = STANDARD.encode(&image.jpeg);
        ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage::system(constants::SYSTEM_PROMPT),
                ChatMessage::user_with_image(constants::USER_PROMPT, &encoded),
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            stream: false,
        }
    }
}

impl Annotator for AnnotationClient {
    fn annotate(&self, image: &EncodedImage) -> PipelineResult<Annotation> {
        let url = self.endpoint("chat/completions");
        let request = self.build_request(image);

        logger::debug(&format!(
            "POST {} model={} image={}x{} ({} bytes)",
            url,
            self.config.model,
            image.width,
            image.height,
            image.jpeg.len()
        ));

        let response = self
            .http
            .post(&url)
            .bearer_auth(constants::PLACEHOLDER_API_KEY)
            .json(&request)
            .send()?;

        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(PipelineError::AnnotationTransport(format!(
                "{} returned {}: {}",
                url,
                status,
                preview(&body)
            )));
        }

        let completion: ChatResponse =
            serde_json::from_str(&body).map_err(|e| PipelineError::AnnotationParse {
                reason: format!("not a chat completion ({})", e),
                raw: body.clone(),
            })?;

        let content = completion
            .first_content()
            .ok_or_else(|| PipelineError::AnnotationParse {
                reason: "reply has no message content".to_string(),
                raw: body.clone(),
            })?;

        match parse_reply(content) {
            ModelReply::Parsed(annotation) => Ok(annotation),
            ModelReply::Unparseable(raw) => Err(PipelineError::AnnotationParse {
                reason: format!("no JSON object with keys {:?}", constants::ANNOTATION_KEYS),
                raw,
            }),
        }
    }
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(ERROR_BODY_PREVIEW) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
