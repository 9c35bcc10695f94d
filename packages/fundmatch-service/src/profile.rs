use std::{fs, path::Path};

use color_eyre::{Result, eyre};

use fundmatch_domain::{UserProfile, profile::PersonDocument};

/// Builds a researcher profile from the person JSON plus any pre-extracted
/// document texts (plain-text files; extraction happens upstream).
pub fn build_user_profile(person_path: &Path, document_paths: &[impl AsRef<Path>]) -> Result<UserProfile> {
	let raw = fs::read_to_string(person_path)
		.map_err(|err| eyre::eyre!("Failed to read person file {person_path:?}: {err}."))?;
	let document: PersonDocument = serde_json::from_str(&raw)
		.map_err(|err| eyre::eyre!("Failed to decode person file {person_path:?}: {err}."))?;
	let mut texts = Vec::with_capacity(document_paths.len());

	for path in document_paths {
		let path = path.as_ref();
		let text = fs::read_to_string(path)
			.map_err(|err| eyre::eyre!("Failed to read document text {path:?}: {err}."))?;

		texts.push(text);
	}

	let profile = UserProfile::assemble(document, &texts);

	if profile.name.is_empty() {
		return Err(eyre::eyre!("Person file {person_path:?} carries no name."));
	}

	tracing::info!(
		profile = %profile.name,
		documents = texts.len(),
		"Assembled researcher profile."
	);

	Ok(profile)
}
