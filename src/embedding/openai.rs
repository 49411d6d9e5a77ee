//! OpenAI-compatible remote embedding provider.
//!
//! Posts to `{base_url}/embeddings`, which covers OpenAI itself as well as LiteLLM and
//! OpenRouter style proxies. Uses the blocking `reqwest` client because the
//! [`EmbeddingProvider`] trait is synchronous and always called from `spawn_blocking`.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{l2_normalize, EmbeddingProvider};
use crate::config::EmbeddingConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct OpenAiEmbeddingProvider {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiEmbeddingProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let model = config.model_name().to_string();
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;
        let endpoint = embeddings_endpoint(&config.base_url);

        tracing::info!(endpoint = %endpoint, model = %model, "remote embedding provider ready");

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
            model,
        })
    }
}

impl EmbeddingProvider for OpenAiEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text])?
            .into_iter()
            .next()
            .context("embedding response contained no vectors")
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let mut request = self.client.post(&self.endpoint).json(&EmbeddingRequest {
            model: &self.model,
            input: texts,
        });
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request
            .send()
            .with_context(|| format!("embedding request to {} failed", self.endpoint))?;
        let status = response.status();
        anyhow::ensure!(
            status.is_success(),
            "embedding endpoint returned HTTP {status}: {}",
            response.text().unwrap_or_default()
        );

        let body: EmbeddingResponse = response
            .json()
            .context("failed to decode embedding response")?;
        order_by_index(body.data, texts.len())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn embeddings_endpoint(base_url: &str) -> String {
    format!("{}/embeddings", base_url.trim_end_matches('/'))
}

/// Put vectors back in input order (the API tags each with its input index).
fn order_by_index(mut data: Vec<EmbeddingDatum>, expected: usize) -> Result<Vec<Vec<f32>>> {
    anyhow::ensure!(
        data.len() == expected,
        "embedding response had {} vectors for {expected} inputs",
        data.len()
    );
    data.sort_by_key(|d| d.index);
    Ok(data.iter().map(|d| l2_normalize(&d.embedding)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(
            embeddings_endpoint("http://litellm:4000/v1/"),
            "http://litellm:4000/v1/embeddings"
        );
        assert_eq!(
            embeddings_endpoint("https://api.openai.com/v1"),
            "https://api.openai.com/v1/embeddings"
        );
    }

    #[test]
    fn vectors_reordered_by_index() {
        let data = vec![
            EmbeddingDatum { index: 1, embedding: vec![0.0, 2.0] },
            EmbeddingDatum { index: 0, embedding: vec![3.0, 0.0] },
        ];
        let ordered = order_by_index(data, 2).unwrap();
        assert_eq!(ordered, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn short_response_is_an_error() {
        let data = vec![EmbeddingDatum { index: 0, embedding: vec![1.0] }];
        assert!(order_by_index(data, 2).is_err());
    }

    #[test]
    fn blank_model_falls_back_to_remote_default() {
        let config = EmbeddingConfig {
            provider: "openai".into(),
            model: " ".into(),
            ..Default::default()
        };
        let provider = OpenAiEmbeddingProvider::new(&config).unwrap();
        assert_eq!(provider.model_name(), "text-embedding-3-small");
    }
}
