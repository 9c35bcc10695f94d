mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, Ingest, Limiter, Matching, Providers, Service, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::Read { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::Parse { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

/// Quiet fixups for near-miss values, so `api_base + path` always joins with
/// exactly one slash.
pub fn normalize(cfg: &mut Config) {
	let embedding = &mut cfg.providers.embedding;

	while embedding.api_base.ends_with('/') {
		embedding.api_base.pop();
	}
	if !embedding.path.is_empty() && !embedding.path.starts_with('/') {
		embedding.path.insert(0, '/');
	}
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.embedding.api_key must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.api_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.embedding.api_base must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.path.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.embedding.path must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.limiter.calls_per_minute == 0 {
		return Err(Error::Validation {
			message: "limiter.calls_per_minute must be greater than zero.".to_string(),
		});
	}
	if cfg.limiter.max_attempts == 0 {
		return Err(Error::Validation {
			message: "limiter.max_attempts must be greater than zero.".to_string(),
		});
	}
	if cfg.matching.top_k == 0 {
		return Err(Error::Validation {
			message: "matching.top_k must be greater than zero.".to_string(),
		});
	}
	if !cfg.matching.keyword_boost_per_match.is_finite() || cfg.matching.keyword_boost_per_match < 0.0
	{
		return Err(Error::Validation {
			message: "matching.keyword_boost_per_match must be a finite number, zero or greater."
				.to_string(),
		});
	}
	if !cfg.matching.keyword_boost_cap.is_finite() || cfg.matching.keyword_boost_cap < 0.0 {
		return Err(Error::Validation {
			message: "matching.keyword_boost_cap must be a finite number, zero or greater."
				.to_string(),
		});
	}
	if cfg.ingest.batch_size == 0 {
		return Err(Error::Validation {
			message: "ingest.batch_size must be greater than zero.".to_string(),
		});
	}

	for (label, path) in [
		("ingest.funding_dir", &cfg.ingest.funding_dir),
		("ingest.ingested_dir", &cfg.ingest.ingested_dir),
		("storage.index_path", &cfg.storage.index_path),
		("storage.ledger_path", &cfg.storage.ledger_path),
	] {
		if path.as_os_str().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	Ok(())
}
