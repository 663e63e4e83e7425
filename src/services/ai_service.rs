use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// The only capability the quiz flows need from a language model: send a
/// prompt, get text back.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    fn into_text(self) -> anyhow::Result<String> {
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Gemini response contained no candidates"))?;
        let finish_reason = candidate.finish_reason.unwrap_or_default();
        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            anyhow::bail!("Gemini returned an empty completion (finish reason: {})", finish_reason);
        }
        Ok(text)
    }
}

/// Google Gemini `generateContent` over plain HTTPS.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, api_base: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            model,
            api_base,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        let payload = serde_json::json!({
            "contents": [
                { "role": "user", "parts": [ { "text": prompt } ] }
            ]
        });

        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "sending prompt to Gemini");
        let res = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error {}: {}", status, text);
        }

        let body: GenerateContentResponse = res.json().await?;
        body.into_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> GenerateContentResponse {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn joins_candidate_parts() {
        let body = parse(
            r#"{"candidates": [{"content": {"parts": [{"text": "[{\"a\":"}, {"text": "1}]"}]}, "finishReason": "STOP"}]}"#,
        );
        assert_eq!(body.into_text().unwrap(), "[{\"a\":1}]");
    }

    #[test]
    fn blocked_reply_is_an_error() {
        let body = parse(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#);
        let err = body.into_text().unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn no_candidates_is_an_error() {
        assert!(parse(r#"{"promptFeedback": {}}"#).into_text().is_err());
    }

    #[test]
    fn endpoint_includes_model() {
        let client = GeminiClient::new(
            "key".into(),
            "gemini-1.5-flash".into(),
            "https://example.test/".into(),
            Client::new(),
        );
        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }
}
