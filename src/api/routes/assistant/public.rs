//! Public types for the assistant API
use serde::{Deserialize, Serialize};

use crate::assistant::PromptKind;

#[derive(Deserialize)]
pub struct AssistantRequest {
    pub month: String,
    pub kind: PromptKind,
}

#[derive(Serialize)]
pub struct AssistantResponse {
    pub kind: PromptKind,
    pub text: String,
}
