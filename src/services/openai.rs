//! OpenAI-backed transcription, plan generation, and image generation.

use std::time::Duration;

use base64::Engine as _;
use reqwest::blocking::{multipart, Client, Response};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{Error, Result};

use super::{ImageGenerator, ImageRequest, PlanGenerator, Transcriber};

/// Connection and model settings for [`OpenAiClient`].
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Bearer token
    pub api_key: String,
    /// API root, without trailing slash
    pub base_url: String,
    /// Speech-to-text model
    pub transcribe_model: String,
    /// Model used for plan generation
    pub plan_model: String,
    /// Image model
    pub image_model: String,
    /// Requested image size, e.g. `1024x1024`
    pub image_size: String,
    /// Request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl OpenAiConfig {
    /// Default settings with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            transcribe_model: "gpt-4o-mini-transcribe".to_string(),
            plan_model: "gpt-4.1-mini".to_string(),
            image_model: "gpt-image-1".to_string(),
            image_size: "1024x1024".to_string(),
            timeout: None,
        }
    }

    /// Set the API root.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the plan model.
    pub fn with_plan_model(mut self, model: impl Into<String>) -> Self {
        self.plan_model = model.into();
        self
    }

    /// Set the image model.
    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    /// Set the image size.
    pub fn with_image_size(mut self, size: impl Into<String>) -> Self {
        self.image_size = size.into();
        self
    }

    /// Set the transcription model.
    pub fn with_transcribe_model(mut self, model: impl Into<String>) -> Self {
        self.transcribe_model = model.into();
        self
    }

    /// Set a request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Blocking OpenAI API client.
pub struct OpenAiClient {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiClient {
    /// Create a client.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::external("OpenAI", "API key is not set (OPENAI_API_KEY)"));
        }
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    /// The client configuration.
    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path)
    }
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Deserialize)]
struct ImagesResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    b64_json: Option<String>,
}

/// Map non-success responses to an error carrying the response body.
fn check(service: &'static str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(Error::external(service, format!("{}: {}", status, body.trim())))
}

/// Concatenate the `output_text` parts of a Responses API result.
fn output_text(body: &Value) -> Option<String> {
    if let Some(text) = body.get("output_text").and_then(Value::as_str) {
        return Some(text.to_string());
    }

    let text: String = body
        .get("output")?
        .as_array()?
        .iter()
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .filter(|part| part.get("type").and_then(Value::as_str) == Some("output_text"))
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    (!text.is_empty()).then_some(text)
}

impl Transcriber for OpenAiClient {
    fn transcribe(&self, audio: &[u8], file_name: &str) -> Result<String> {
        log::info!("Transcribing {} ({} bytes)", file_name, audio.len());

        let part = multipart::Part::bytes(audio.to_vec()).file_name(file_name.to_string());
        let form = multipart::Form::new()
            .text("model", self.config.transcribe_model.clone())
            .part("file", part);

        let response = self
            .client
            .post(self.url("audio/transcriptions"))
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()?;
        let body: TranscriptionResponse = check("transcription", response)?.json()?;
        Ok(body.text)
    }
}

impl PlanGenerator for OpenAiClient {
    fn generate_plan(&self, prompt: &str) -> Result<String> {
        log::info!("Requesting book plan from {}", self.config.plan_model);

        let request = json!({
            "model": self.config.plan_model,
            "input": prompt,
            "text": { "format": { "type": "json_object" } },
        });
        let response = self
            .client
            .post(self.url("responses"))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()?;
        let body: Value = check("plan generation", response)?.json()?;

        output_text(&body)
            .ok_or_else(|| Error::external("plan generation", "response contained no output text"))
    }
}

impl ImageGenerator for OpenAiClient {
    fn generate_image(&self, request: &ImageRequest) -> Result<Vec<u8>> {
        log::info!(
            "Generating image for page {} with {}",
            request.page,
            self.config.image_model
        );
        if request.negative_prompt.is_some() {
            log::debug!("Negative prompt is not supported by the images API; ignored");
        }

        let body = json!({
            "model": self.config.image_model,
            "prompt": request.prompt,
            "size": request.size.as_deref().unwrap_or(&self.config.image_size),
        });
        let response = self
            .client
            .post(self.url("images/generations"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()?;
        let body: ImagesResponse = check("image generation", response)?.json()?;

        let encoded = body
            .data
            .into_iter()
            .next()
            .and_then(|d| d.b64_json)
            .ok_or_else(|| Error::external("image generation", "response contained no image"))?;

        base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| Error::external("image generation", format!("invalid base64: {}", e)))
    }
}
