pub mod embedding;

use color_eyre::{Result, eyre};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};

use fundmatch_config::EmbeddingProviderConfig;

/// Request headers for the embedding endpoint: bearer auth plus any defaults
/// the configuration carries.
pub fn request_headers(cfg: &EmbeddingProviderConfig) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", cfg.api_key))?);
	for (name, value) in &cfg.default_headers {
		let raw = value
			.as_str()
			.ok_or_else(|| eyre::eyre!("Default header {name} must be a string."))?;

		headers.insert(HeaderName::from_bytes(name.as_bytes())?, HeaderValue::from_str(raw)?);
	}

	Ok(headers)
}
