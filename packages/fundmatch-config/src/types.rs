use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub providers: Providers,
	pub limiter: Limiter,
	pub matching: Matching,
	pub ingest: Ingest,
	pub storage: Storage,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Limiter {
	/// Steady-state pacing rate for embedding calls.
	pub calls_per_minute: u32,
	/// Retry budget per logical embedding call.
	pub max_attempts: u32,
}

#[derive(Debug, Deserialize)]
pub struct Matching {
	pub top_k: u32,
	#[serde(default = "default_keyword_boost_per_match")]
	pub keyword_boost_per_match: f32,
	#[serde(default = "default_keyword_boost_cap")]
	pub keyword_boost_cap: f32,
}

#[derive(Debug, Deserialize)]
pub struct Ingest {
	pub funding_dir: PathBuf,
	pub ingested_dir: PathBuf,
	pub batch_size: u32,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub index_path: PathBuf,
	pub ledger_path: PathBuf,
}

fn default_keyword_boost_per_match() -> f32 {
	5.0
}

fn default_keyword_boost_cap() -> f32 {
	20.0
}
