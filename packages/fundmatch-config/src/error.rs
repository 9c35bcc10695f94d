pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read the configuration file at {path:?}.")]
	Read { path: std::path::PathBuf, source: std::io::Error },
	#[error("The configuration file at {path:?} is not valid TOML.")]
	Parse { path: std::path::PathBuf, source: toml::de::Error },
	#[error("{message}")]
	Validation { message: String },
}
