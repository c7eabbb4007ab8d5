//! Embeddings client for the OpenAI embeddings API.
//!
//! Chunk indexing and retrieval both embed through this client so query and
//! document vectors always come from the same model.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";
/// The embedding model used for all vectors in the collection.
/// Hardcoded: mixing models in one collection silently breaks similarity.
pub const EMBEDDING_MODEL: &str = "text-embedding-3-small";
/// Vector width of `EMBEDDING_MODEL`; the collection is created with it.
pub const EMBEDDING_DIM: u64 = 1536;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("expected {expected} embeddings, received {received}")]
    CountMismatch { expected: usize, received: usize },
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

/// Async embeddings client with bounded retry on rate limits and 5xx.
#[derive(Clone)]
pub struct EmbeddingClient {
    client: Client,
    api_key: String,
}

impl EmbeddingClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Embeds a batch of texts, returning vectors in input order.
    pub async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let request_body = EmbeddingRequest {
            model: EMBEDDING_MODEL,
            input: inputs,
        };

        let mut last_error: Option<EmbeddingError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Embedding attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(OPENAI_EMBEDDINGS_URL)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(EmbeddingError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Embeddings API returned {}: {}", status, body);
                last_error = Some(EmbeddingError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(EmbeddingError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let parsed: EmbeddingResponse = response.json().await?;
            let vectors = vectors_in_order(parsed, inputs.len())?;
            debug!("Embedded {} texts", vectors.len());
            return Ok(vectors);
        }

        Err(last_error.unwrap_or(EmbeddingError::CountMismatch {
            expected: inputs.len(),
            received: 0,
        }))
    }

    /// Embeds a single query text.
    pub async fn embed_one(&self, input: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vectors = self.embed_batch(&[input.to_string()]).await?;
        vectors.pop().ok_or(EmbeddingError::CountMismatch {
            expected: 1,
            received: 0,
        })
    }
}

/// The API may return entries out of order; sort by index and verify count.
fn vectors_in_order(
    response: EmbeddingResponse,
    expected: usize,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let mut data = response.data;
    if data.len() != expected {
        return Err(EmbeddingError::CountMismatch {
            expected,
            received: data.len(),
        });
    }
    data.sort_by_key(|entry| entry.index);
    Ok(data.into_iter().map(|entry| entry.embedding).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vectors_in_order_sorts_by_index() {
        let response = EmbeddingResponse {
            data: vec![
                EmbeddingData {
                    embedding: vec![2.0],
                    index: 1,
                },
                EmbeddingData {
                    embedding: vec![1.0],
                    index: 0,
                },
            ],
        };
        let vectors = vectors_in_order(response, 2).unwrap();
        assert_eq!(vectors, vec![vec![1.0], vec![2.0]]);
    }

    #[test]
    fn test_vectors_in_order_rejects_count_mismatch() {
        let response = EmbeddingResponse {
            data: vec![EmbeddingData {
                embedding: vec![1.0],
                index: 0,
            }],
        };
        let err = vectors_in_order(response, 2).unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::CountMismatch {
                expected: 2,
                received: 1
            }
        ));
    }

    #[test]
    fn test_embedding_response_deserializes() {
        let json = r#"{"data": [{"embedding": [0.1, 0.2], "index": 0}], "model": "text-embedding-3-small"}"#;
        let parsed: EmbeddingResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.data.len(), 1);
        assert_eq!(parsed.data[0].embedding.len(), 2);
    }
}
