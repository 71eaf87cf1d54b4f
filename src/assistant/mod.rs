//! Generative text helpers offered once a month is booked: an
//! invitation message and gathering ideas. Each request is one
//! blocking call with no retries and no caching.

pub mod gemini;
pub mod prompt;

pub use prompt::PromptKind;

use thiserror::Error;

use crate::booking::Booking;
use crate::core::AppConfig;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Failed to render prompt: {0}")]
    Template(#[from] handlebars::RenderError),
    #[error("Generative request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Generative endpoint responded with {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Malformed generative response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("No content found in the generative response")]
    MissingText,
}

impl AssistantError {
    pub fn user_message(&self) -> &'static str {
        "عذراً، حدث خطأ أثناء إنشاء المحتوى. الرجاء المحاولة مرة أخرى."
    }
}

#[derive(Clone, Debug)]
pub struct Assistant {
    api_hostname: String,
    api_key: String,
    model: String,
}

impl Assistant {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            api_hostname: config.gemini_api_hostname.clone(),
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
        }
    }

    pub async fn request_text(
        &self,
        kind: PromptKind,
        booking: &Booking,
    ) -> Result<String, AssistantError> {
        let prompt = prompt::render(kind, booking)?;
        tracing::debug!("Requesting {} text for {}", kind, booking.doc_id());
        gemini::generate_content(&prompt, &self.api_hostname, &self.api_key, &self.model)
            .await
            .inspect_err(|e| tracing::error!("Gemini API call failed: {}", e))
    }
}
