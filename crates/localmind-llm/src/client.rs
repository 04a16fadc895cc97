//! HTTP client for an OpenAI-compatible provider.

use crate::error::{LlmError, LlmResult};
use crate::types::*;
use localmind_config::LlmConfig;
use localmind_core::DocumentDigest;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Client for chat completions and embeddings against an
/// OpenAI-compatible API.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    embedding_model: String,
    timeout: Duration,
    summary_input_chars: usize,
}

impl LlmClient {
    /// Create a new client from configuration.
    pub fn from_config(config: &LlmConfig) -> LlmResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or(LlmError::MissingApiKey)?;

        let timeout = Duration::from_secs(config.timeout_seconds);
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            embedding_model: config.embedding_model.clone(),
            timeout,
            summary_input_chars: config.summary_input_chars,
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_connect() {
            LlmError::Unreachable {
                host: self.base_url.clone(),
            }
        } else if e.is_timeout() {
            LlmError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else {
            LlmError::Http(e)
        }
    }

    /// Generate embeddings for an ordered batch of texts.
    ///
    /// The whole batch succeeds or fails as one call; the returned vectors
    /// are in the same order as the input.
    pub async fn embed_texts(&self, texts: &[String]) -> LlmResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let url = format!("{}/embeddings", self.base_url);
        debug!("Embedding batch of {} texts", texts.len());

        let request = EmbeddingsRequest {
            model: self.embedding_model.clone(),
            input: texts.to_vec(),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: EmbeddingsResponse = response.json().await?;
        if body.data.len() != texts.len() {
            return Err(LlmError::UnexpectedResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                body.data.len()
            )));
        }

        // The API reports an index per item; put them back in input order.
        let mut items = body.data;
        items.sort_by_key(|item| item.index);
        Ok(items.into_iter().map(|item| item.embedding).collect())
    }

    async fn chat(&self, request: ChatRequest) -> LlmResult<String> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!("Chat completion with model {}", request.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response.json().await?;
        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::UnexpectedResponse("no choices in response".to_string()))?;

        Ok(choice.message.content.trim().to_string())
    }

    /// Produce a short summary and keyword list for a document.
    ///
    /// Only a bounded prefix of the text is submitted. The model is asked
    /// for JSON; anything else degrades to "summary = raw output, no
    /// keywords" rather than failing.
    pub async fn summarize_document(&self, text: &str) -> LlmResult<DocumentDigest> {
        let cleaned = text.trim();
        if cleaned.is_empty() {
            return Ok(DocumentDigest::default());
        }

        let trimmed: String = cleaned.chars().take(self.summary_input_chars).collect();

        let system = "You summarize documents. Respond with JSON only, containing \
                      \"summary\" (2-4 sentences) and \"keywords\" (3-8 short terms). \
                      Do not add any explanation outside the JSON.";
        let user = format!("Document content:\n{}", trimmed);

        let request = ChatRequest::new(
            &self.model,
            vec![ChatMessage::system(system), ChatMessage::user(user)],
        )
        .with_temperature(0.1);

        let output = self.chat(request).await?;
        Ok(parse_digest(&output))
    }

    /// Answer a question grounded in the given context chunks.
    pub async fn answer_question(&self, question: &str, context: &str) -> LlmResult<String> {
        let system = "You are a local knowledge assistant. Answer only from the \
                      provided context. If the context does not contain the answer, \
                      reply exactly: \"I don't know\".";
        let user = format!(
            "Question: {}\n\nRelevant document content, answer based on it:\n{}",
            question, context
        );

        let request = ChatRequest::new(
            &self.model,
            vec![ChatMessage::system(system), ChatMessage::user(user)],
        )
        .with_temperature(0.2);

        self.chat(request).await
    }
}

/// Parse the summarization output into a digest, degrading gracefully
/// when the model did not return well-formed JSON.
fn parse_digest(output: &str) -> DocumentDigest {
    let value: serde_json::Value = match serde_json::from_str(output) {
        Ok(v) => v,
        Err(_) => {
            warn!("Summarizer returned non-JSON output, using it verbatim");
            return DocumentDigest {
                summary: output.to_string(),
                keywords: vec![],
            };
        }
    };

    let summary = value
        .get("summary")
        .and_then(|s| s.as_str())
        .unwrap_or_default()
        .to_string();

    let keywords = match value.get("keywords") {
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|k| k.as_str())
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect(),
        Some(serde_json::Value::String(s)) => s
            .replace('\u{ff0c}', ",")
            .split(',')
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .collect(),
        _ => vec![],
    };

    DocumentDigest { summary, keywords }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_requires_api_key() {
        let config = LlmConfig::default();
        assert!(matches!(
            LlmClient::from_config(&config),
            Err(LlmError::MissingApiKey)
        ));

        let config = LlmConfig {
            api_key: Some("sk-test".to_string()),
            ..LlmConfig::default()
        };
        assert!(LlmClient::from_config(&config).is_ok());
    }

    #[test]
    fn test_parse_digest_well_formed() {
        let digest =
            parse_digest(r#"{"summary": "About cats.", "keywords": ["cats", "pets", " fur "]}"#);
        assert_eq!(digest.summary, "About cats.");
        assert_eq!(digest.keywords, vec!["cats", "pets", "fur"]);
    }

    #[test]
    fn test_parse_digest_keywords_as_string() {
        let digest = parse_digest(r#"{"summary": "s", "keywords": "a, b,c"}"#);
        assert_eq!(digest.keywords, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_digest_degrades_on_plain_text() {
        let digest = parse_digest("Just a plain sentence about the document.");
        assert_eq!(digest.summary, "Just a plain sentence about the document.");
        assert!(digest.keywords.is_empty());
    }

    #[test]
    fn test_parse_digest_missing_fields() {
        let digest = parse_digest(r#"{"keywords": 42}"#);
        assert_eq!(digest.summary, "");
        assert!(digest.keywords.is_empty());
    }
}
