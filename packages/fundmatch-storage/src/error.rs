pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read {path:?}.")]
	Read { path: std::path::PathBuf, source: std::io::Error },
	#[error("Failed to write {path:?}.")]
	Write { path: std::path::PathBuf, source: std::io::Error },
	#[error("Failed to decode {path:?}.")]
	Decode { path: std::path::PathBuf, source: serde_json::Error },
	#[error("Failed to encode the {label}.")]
	Encode { label: &'static str, source: serde_json::Error },
}
