use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::AssistantError;

// {
//   "candidates": [
//     {
//       "content": {
//         "parts": [{ "text": "..." }],
//         "role": "model"
//       },
//       "finishReason": "STOP"
//     }
//   ]
// }
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
            .filter(|t| !t.trim().is_empty())
    }
}

/// Send a single prompt and wait for the whole response.
pub async fn generate_content(
    prompt: &str,
    api_hostname: &str,
    api_key: &str,
    model: &str,
) -> Result<String, AssistantError> {
    let url = format!(
        "{}/v1beta/models/{}:generateContent",
        api_hostname.trim_end_matches('/'),
        model
    );
    let payload = json!({
        "contents": [{ "parts": [{ "text": prompt }] }]
    });
    let response = Client::new()
        .post(url)
        .query(&[("key", api_key)])
        .header("Content-Type", "application/json")
        .json(&payload)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AssistantError::Status { status, body });
    }

    let body = response.text().await?;
    let parsed: GenerateContentResponse = serde_json::from_str(&body)?;
    parsed.into_text().ok_or(AssistantError::MissingText)
}
