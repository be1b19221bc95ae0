use crate::core::error::ProviderError;
use crate::providers::TEMPERATURE;
use crate::providers::base_client::HttpClient;
use crate::providers::gemini::types::*;

#[derive(Clone)]
pub struct GeminiClient {
    pub model: String,
    client: HttpClient,
}

impl GeminiClient {
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        let mut client = HttpClient::new(base_url, None);

        // Add API key to query params
        client.add_query_param("key", api_key);

        Self { client, model }
    }

    pub async fn generate_content(&self, query: &str) -> Result<String, ProviderError> {
        let payload = build_payload(query);
        let response = self
            .client
            .post(
                &format!("v1beta/models/{}:generateContent", self.model),
                &payload,
            )
            .await?;

        let response_body: String = response.text().await?;
        let parsed: GeminiResponse = serde_json::from_str(&response_body).map_err(|e| {
            ProviderError::Serialization(format!("Failed to parse Gemini response: {}", e))
        })?;

        extract_text(parsed)
    }
}

fn build_payload(query: &str) -> GeminiRequest {
    GeminiRequest {
        contents: vec![GeminiContentPart {
            role: "user".to_string(),
            parts: vec![GeminiPart {
                text: Some(query.to_string()),
            }],
        }],
        generation_config: GenerationConfig {
            temperature: TEMPERATURE,
        },
    }
}

/// Concatenates the text parts of the first candidate.
fn extract_text(response: GeminiResponse) -> Result<String, ProviderError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Api("No candidates in Gemini response".to_string()))?;

    let text: String = candidate
        .content
        .parts
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    if text.is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
        return Err(ProviderError::Api(format!(
            "Gemini returned no text (finish reason: {})",
            reason
        )));
    }

    Ok(text)
}
