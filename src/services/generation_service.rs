use crate::error::{Error, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

/// Client for the remote text-generation service. Constructed once at
/// startup with its endpoint and key.
#[derive(Clone)]
pub struct GenerationService {
    client: Client,
    api_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    choices: Vec<GenerationChoice>,
}

#[derive(Debug, Deserialize)]
struct GenerationChoice {
    message: GenerationMessage,
}

#[derive(Debug, Deserialize)]
struct GenerationMessage {
    content: String,
}

impl GenerationService {
    pub fn new(api_url: String, api_key: String, client: Client) -> Self {
        Self {
            client,
            api_url,
            api_key,
        }
    }

    /// Prompt + parameters in, plain text out.
    pub async fn generate(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        let payload = json!({
            "messages": [
                {
                    "role": "system",
                    "content": "You draft exam questions for teachers. Reply with the question text only."
                },
                { "role": "user", "content": prompt }
            ],
            "max_tokens": max_tokens,
            "temperature": temperature,
        });

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Internal(format!(
                "Generation service returned {}: {}",
                status, body
            )));
        }

        let parsed: GenerationResponse = response.json().await?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::Internal("Generation service returned no choices".to_string()))?;

        Ok(text.trim().to_string())
    }
}
