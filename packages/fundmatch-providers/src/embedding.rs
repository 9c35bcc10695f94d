use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

use fundmatch_config::EmbeddingProviderConfig;
use fundmatch_limiter::Pacer;

/// Embeds a single text, paced and retried through the shared limiter.
pub async fn embed(
	cfg: &EmbeddingProviderConfig,
	pacer: &Pacer,
	max_attempts: u32,
	text: &str,
) -> Result<Vec<f32>> {
	let client = build_client(cfg)?;

	request_embedding(cfg, pacer, max_attempts, &client, text).await
}

/// Embeds a batch of texts with one HTTP client, one paced call per text.
pub async fn embed_batch(
	cfg: &EmbeddingProviderConfig,
	pacer: &Pacer,
	max_attempts: u32,
	texts: &[String],
) -> Result<Vec<Vec<f32>>> {
	let client = build_client(cfg)?;
	let mut vectors = Vec::with_capacity(texts.len());

	for text in texts {
		vectors.push(request_embedding(cfg, pacer, max_attempts, &client, text).await?);
	}

	Ok(vectors)
}

fn build_client(cfg: &EmbeddingProviderConfig) -> Result<Client> {
	Ok(Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?)
}

async fn request_embedding(
	cfg: &EmbeddingProviderConfig,
	pacer: &Pacer,
	max_attempts: u32,
	client: &Client,
	text: &str,
) -> Result<Vec<f32>> {
	fundmatch_limiter::execute(pacer, max_attempts, || call_once(cfg, client, text))
		.await
		.map_err(|err| match err {
			fundmatch_limiter::Error::Operation(report) => report,
			exhausted => eyre::eyre!(exhausted.to_string()),
		})
}

async fn call_once(
	cfg: &EmbeddingProviderConfig,
	client: &Client,
	text: &str,
) -> Result<Vec<f32>> {
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"input": [text],
		"dimensions": cfg.dimensions,
	});
	let res = client
		.post(url)
		.headers(crate::request_headers(cfg)?)
		.json(&body)
		.send()
		.await?;
	let status = res.status();
	let payload = res.text().await?;

	if !status.is_success() {
		// The payload carries the provider's failure detail, including any
		// quota marker and retry-delay hint the limiter classifies on.
		return Err(eyre::eyre!("Embedding request failed with status {status}: {payload}"));
	}

	parse_single_embedding(&serde_json::from_str(&payload)?)
}

fn parse_single_embedding(json: &Value) -> Result<Vec<f32>> {
	let data = json
		.get("data")
		.and_then(Value::as_array)
		.ok_or_else(|| eyre::eyre!("Embedding response is missing the data array."))?;
	let [item] = data.as_slice() else {
		return Err(eyre::eyre!(
			"Embedding response carried {} items for a single input.",
			data.len()
		));
	};
	let values = item
		.get("embedding")
		.and_then(Value::as_array)
		.ok_or_else(|| eyre::eyre!("Embedding item is missing its embedding array."))?;

	values
		.iter()
		.map(|value| {
			value
				.as_f64()
				.map(|number| number as f32)
				.ok_or_else(|| eyre::eyre!("Embedding values must be numeric."))
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_the_single_embedding_vector() {
		let json = serde_json::json!({
			"data": [{ "index": 0, "embedding": [0.25, -0.5, 1.0] }]
		});
		let parsed = parse_single_embedding(&json).expect("Failed to parse response.");

		assert_eq!(parsed, vec![0.25, -0.5, 1.0]);
	}

	#[test]
	fn rejects_a_response_without_data() {
		let json = serde_json::json!({ "error": { "status": "INTERNAL" } });

		assert!(parse_single_embedding(&json).is_err());
	}

	#[test]
	fn rejects_a_multi_item_response_for_one_input() {
		let json = serde_json::json!({
			"data": [
				{ "index": 0, "embedding": [1.0] },
				{ "index": 1, "embedding": [2.0] }
			]
		});

		assert!(parse_single_embedding(&json).is_err());
	}

	#[test]
	fn rejects_non_numeric_embedding_values() {
		let json = serde_json::json!({
			"data": [{ "index": 0, "embedding": [1.0, "oops"] }]
		});

		assert!(parse_single_embedding(&json).is_err());
	}
}
