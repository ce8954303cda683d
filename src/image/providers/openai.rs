//! OpenAI image variation provider (dall-e-2 `/images/variations`).

use crate::error::{parse_retry_after, sanitize_error_message, EmoteError, Result};
use crate::image::provider::VariationProvider;
use crate::image::types::{GeneratedImage, ImageRef, SourceImage, VariationCount, VariationSize};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const VARIATIONS_PATH: &str = "/images/variations";

/// Only dall-e-2 serves the variations endpoint.
const VARIATION_MODEL: &str = "dall-e-2";

/// Default time allowed for one request, including upload.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Error codes OpenAI uses when an account is out of credit.
const BILLING_CODES: [&str; 2] = ["billing_hard_limit_reached", "insufficient_quota"];

/// How generated variations are returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Short-lived hosted URLs.
    #[default]
    Url,
    /// Inline base64 payloads.
    B64Json,
}

impl ResponseFormat {
    /// Returns the API identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::B64Json => "b64_json",
        }
    }
}

/// Builder for OpenAiVariationProvider.
#[derive(Debug, Clone, Default)]
pub struct OpenAiVariationProviderBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    response_format: ResponseFormat,
    timeout: Option<Duration>,
}

impl OpenAiVariationProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `OPENAI_API_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Overrides the API base URL (default `https://api.openai.com/v1`).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets whether results come back as URLs or inline base64.
    pub fn response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = format;
        self
    }

    /// Sets the per-request timeout (default 120s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the provider, resolving the API key.
    pub fn build(self) -> Result<OpenAiVariationProvider> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                EmoteError::Auth("OPENAI_API_KEY not set and no API key provided".into())
            })?;

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(OpenAiVariationProvider {
            client,
            api_key,
            base_url,
            response_format: self.response_format,
            timeout,
        })
    }
}

/// OpenAI image variation provider.
pub struct OpenAiVariationProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    response_format: ResponseFormat,
    timeout: Duration,
}

impl OpenAiVariationProvider {
    /// Creates a new `OpenAiVariationProviderBuilder`.
    pub fn builder() -> OpenAiVariationProviderBuilder {
        OpenAiVariationProviderBuilder::new()
    }

    fn variations_url(&self) -> String {
        format!("{}{}", self.base_url, VARIATIONS_PATH)
    }

    fn build_form(
        &self,
        image: &SourceImage,
        count: VariationCount,
        size: VariationSize,
    ) -> Result<reqwest::multipart::Form> {
        let format = image.format();
        let image_part = reqwest::multipart::Part::bytes(image.data().to_vec())
            .file_name(format!("{}.{}", image.stem(), format.extension()))
            .mime_str(format.mime_type())
            .map_err(|e| EmoteError::InvalidRequest(e.to_string()))?;

        Ok(reqwest::multipart::Form::new()
            .part("image", image_part)
            .text("model", VARIATION_MODEL)
            .text("n", count.to_string())
            .text("size", size.as_str())
            .text("response_format", self.response_format.as_str()))
    }

    /// Maps a transport error, turning client timeouts into `Timeout`.
    fn map_send_error(&self, err: reqwest::Error) -> EmoteError {
        if err.is_timeout() {
            EmoteError::Timeout(self.timeout)
        } else {
            EmoteError::Network(err)
        }
    }
}

/// Maps a non-success HTTP response to an error.
///
/// Only responses carrying an OpenAI error envelope count as service
/// rejections. A bare status with an empty or foreign body (a proxy page, a
/// wrong base URL) is reported as an unexpected response.
fn parse_error(status: u16, text: &str, headers: &reqwest::header::HeaderMap) -> EmoteError {
    let envelope = serde_json::from_str::<OpenAiErrorEnvelope>(text)
        .ok()
        .map(|e| e.error);
    let code = envelope
        .as_ref()
        .and_then(|e| e.code.clone().or_else(|| e.error_type.clone()));
    let service_message = envelope
        .as_ref()
        .and_then(|e| e.message.as_deref())
        .filter(|m| !m.trim().is_empty())
        .map(sanitize_error_message);
    let message = service_message
        .clone()
        .unwrap_or_else(|| sanitize_error_message(text));

    let is_billing_code = code
        .as_deref()
        .is_some_and(|c| BILLING_CODES.contains(&c));
    if status == 402 || is_billing_code {
        return EmoteError::Billing(message);
    }
    if status == 413 {
        return EmoteError::InvalidRequest(service_message.unwrap_or_else(|| {
            "Image too large. Uploads must be square PNGs under 4 MB.".into()
        }));
    }
    if status == 429 {
        // Quota exhaustion without a code still arrives as a 429
        if message.contains("exceeded your current quota") {
            return EmoteError::Billing(message);
        }
        let retry_after = parse_retry_after(headers).map(Duration::from_secs);
        return EmoteError::RateLimited {
            retry_after,
            message,
        };
    }
    if envelope.is_none() {
        let detail = if message.is_empty() {
            reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("no response body")
                .to_string()
        } else {
            message
        };
        return EmoteError::UnexpectedResponse(format!("HTTP {status}: {detail}"));
    }
    if status == 401 || status == 403 {
        return EmoteError::Auth(message);
    }
    if code.as_deref() == Some("content_policy_violation") {
        return EmoteError::ContentBlocked(message);
    }
    EmoteError::Api {
        status,
        code,
        message,
    }
}

/// Converts the response payload into exactly the references it carries.
fn collect_refs(response: OpenAiImageResponse) -> Result<Vec<ImageRef>> {
    response
        .data
        .into_iter()
        .enumerate()
        .map(|(i, item)| match (item.url, item.b64_json) {
            (Some(url), _) => Ok(ImageRef::Url(url)),
            (None, Some(b64)) => Ok(ImageRef::from_base64_png(&b64)),
            (None, None) => Err(EmoteError::UnexpectedResponse(format!(
                "variation {i} contained no image data"
            ))),
        })
        .collect()
}

#[async_trait]
impl VariationProvider for OpenAiVariationProvider {
    async fn create_variations(
        &self,
        image: &SourceImage,
        count: VariationCount,
        size: VariationSize,
    ) -> Result<Vec<ImageRef>> {
        let form = self.build_form(image, count, size)?;

        let response = self
            .client
            .post(self.variations_url())
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &text, &headers));
        }

        let body = response.text().await.map_err(|e| self.map_send_error(e))?;
        let parsed: OpenAiImageResponse = serde_json::from_str(&body).map_err(|e| {
            EmoteError::UnexpectedResponse(format!("malformed variations response: {e}"))
        })?;

        let refs = collect_refs(parsed)?;
        tracing::debug!(source = image.name(), returned = refs.len(), "OpenAI variations complete");
        Ok(refs)
    }

    async fn fetch(&self, image: &ImageRef) -> Result<GeneratedImage> {
        if let Some(decoded) = image.decode_inline() {
            return Ok(GeneratedImage::from_bytes(decoded?));
        }

        let response = self
            .client
            .get(image.as_str())
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        if !response.status().is_success() {
            return Err(EmoteError::Api {
                status: response.status().as_u16(),
                code: None,
                message: "Failed to download variation from URL".into(),
            });
        }
        let bytes = response.bytes().await.map_err(|e| self.map_send_error(e))?;
        Ok(GeneratedImage::from_bytes(bytes.to_vec()))
    }

    fn name(&self) -> &str {
        "OpenAI (dall-e-2 variations)"
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiImageResponse {
    data: Vec<OpenAiImageData>,
}

#[derive(Debug, Deserialize)]
struct OpenAiImageData {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    b64_json: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorEnvelope {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    error_type: Option<String>,
    #[serde(default)]
    code: Option<String>,
}
