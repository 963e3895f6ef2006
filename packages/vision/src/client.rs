//! Scrnpix rendering service client

use crate::config::{ConfigError, EnvConfig};
use crate::types::ScreenshotTarget;
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

/// Turns a target into PNG bytes
pub trait Renderer {
    fn capture(&self, target: &ScreenshotTarget) -> Result<Vec<u8>, CaptureError>;
}

impl<R: Renderer + ?Sized> Renderer for &R {
    fn capture(&self, target: &ScreenshotTarget) -> Result<Vec<u8>, CaptureError> {
        (**self).capture(target)
    }
}

/// A capture that failed, tagged with the target it was for
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("[{target_name}] {cause}")]
pub struct CaptureError {
    pub target_name: String,
    pub cause: CaptureCause,
}

impl CaptureError {
    pub fn new(target_name: impl Into<String>, cause: CaptureCause) -> Self {
        Self {
            target_name: target_name.into(),
            cause,
        }
    }
}

/// Why the rendering service refused or failed a capture
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureCause {
    #[error("The target URL is missing. Check your visual-regression.config.json.")]
    MissingUrl,

    #[error("The target URL must be publicly accessible. Scrnpix cannot reach localhost or private URLs.")]
    UrlNotPublic,

    #[error("API key is missing. Set SCRNPIX_API_KEY in your .env file.")]
    MissingApiKey,

    #[error("Invalid API key. Check your SCRNPIX_API_KEY in .env.")]
    InvalidApiKey,

    #[error("Invalid or missing API key. Check your SCRNPIX_API_KEY in .env.")]
    Unauthorized,

    #[error("Insufficient credits. Top up at https://scrnpix.com")]
    InsufficientCredits,

    #[error("Rate limit exceeded. Wait a moment and try again.")]
    RateLimited,

    #[error("Rendering failed. The page may be unreachable or timing out.")]
    RenderingFailed,

    #[error("Scrnpix server error. Try again later.")]
    ServerError,

    #[error("Screenshot failed (HTTP {status}): {code}")]
    Unknown { status: u16, code: String },

    #[error("Request failed: {0}")]
    Transport(String),
}

impl CaptureCause {
    /// Cause for an error code reported in the response body
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "missing_url_param" => Some(CaptureCause::MissingUrl),
            "url_not_public" => Some(CaptureCause::UrlNotPublic),
            "missing_api_key" => Some(CaptureCause::MissingApiKey),
            "invalid_api_key" => Some(CaptureCause::InvalidApiKey),
            "insufficient_credits" => Some(CaptureCause::InsufficientCredits),
            "rate_limit_exceeded" => Some(CaptureCause::RateLimited),
            "rendering_error" => Some(CaptureCause::RenderingFailed),
            _ => None,
        }
    }

    /// Generic cause for an HTTP status, used when the body has no known code
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            401 => Some(CaptureCause::Unauthorized),
            402 => Some(CaptureCause::InsufficientCredits),
            429 => Some(CaptureCause::RateLimited),
            500 => Some(CaptureCause::ServerError),
            _ => None,
        }
    }

    /// Classify a non-success response: body code, then status, then raw
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let code = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
            .unwrap_or_else(|| "unknown".to_string());

        Self::from_code(&code)
            .or_else(|| Self::from_status(status))
            .unwrap_or(CaptureCause::Unknown { status, code })
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Blocking client for the Scrnpix screenshot API
///
/// One request per capture, no retries.
pub struct ScrnpixClient {
    http: Client,
    endpoint: Url,
    api_key: String,
}

impl ScrnpixClient {
    pub fn new(env: &EnvConfig) -> Result<Self, ConfigError> {
        let endpoint = Url::parse(&env.api_url)
            .and_then(|base| base.join("/screenshot"))
            .map_err(|e| ConfigError::InvalidApiUrl {
                url: env.api_url.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            http: Client::new(),
            endpoint,
            api_key: env.api_key.clone(),
        })
    }

    /// Full request URL for a target
    pub fn request_url(&self, target: &ScreenshotTarget) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("url", &target.url);
            query.append_pair("format", "png");

            if let Some(width) = target.width.filter(|w| *w > 0) {
                query.append_pair("width", &width.to_string());
            }
            if let Some(height) = target.height.filter(|h| *h > 0) {
                query.append_pair("height", &height.to_string());
            }
            if target.full_page == Some(true) {
                query.append_pair("full_page", "true");
            }
        }
        url
    }
}

impl Renderer for ScrnpixClient {
    fn capture(&self, target: &ScreenshotTarget) -> Result<Vec<u8>, CaptureError> {
        let fail = |cause| CaptureError::new(&target.name, cause);
        let transport = |e: reqwest::Error| fail(CaptureCause::Transport(e.to_string()));

        tracing::debug!("Requesting screenshot of {} for {}", target.url, target.name);

        let response = self
            .http
            .get(self.request_url(target))
            .header("X-KEY", &self.api_key)
            .send()
            .map_err(transport)?;

        let status = response.status();
        let body = response.bytes().map_err(transport)?;

        if !status.is_success() {
            let cause = CaptureCause::from_response(status.as_u16(), &body);
            tracing::debug!("Scrnpix returned {} for {}: {}", status, target.name, cause);
            return Err(fail(cause));
        }

        Ok(body.to_vec())
    }
}
