use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use fundmatch_domain::{Opportunity, score};

use crate::error::{Error, Result};

/// One stored opportunity with its embedding vector.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct IndexEntry {
	pub id: String,
	pub vector: Vec<f32>,
	pub opportunity: Opportunity,
}

/// A candidate returned from a similarity search.
#[derive(Clone, Debug)]
pub struct ScoredMatch {
	pub similarity: f32,
	pub opportunity: Opportunity,
}

/// In-process similarity index over opportunity embeddings.
///
/// The surface is intentionally narrow (insert, search, retain) so a remote
/// vector store can stand in behind the same shape.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SimilarityIndex {
	entries: Vec<IndexEntry>,
}

impl SimilarityIndex {
	/// Loads a snapshot; a missing file yields an empty index.
	pub fn load(path: &Path) -> Result<Self> {
		if !path.exists() {
			return Ok(Self::default());
		}

		let raw = fs::read_to_string(path)
			.map_err(|err| Error::Read { path: path.to_path_buf(), source: err })?;

		serde_json::from_str(&raw)
			.map_err(|err| Error::Decode { path: path.to_path_buf(), source: err })
	}

	pub fn save(&self, path: &Path) -> Result<()> {
		write_json(self, "similarity index", path)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn contains(&self, id: &str) -> bool {
		self.entries.iter().any(|entry| entry.id == id)
	}

	/// Inserts an entry, replacing any previous entry with the same id.
	pub fn insert(&mut self, entry: IndexEntry) {
		self.entries.retain(|existing| existing.id != entry.id);
		self.entries.push(entry);
	}

	/// Keeps only the entries the predicate accepts; returns how many were
	/// dropped.
	pub fn retain<F>(&mut self, mut keep: F) -> usize
	where
		F: FnMut(&IndexEntry) -> bool,
	{
		let before = self.entries.len();

		self.entries.retain(|entry| keep(entry));

		before - self.entries.len()
	}

	/// Top-k entries by cosine similarity to the query vector, best first.
	pub fn search(&self, query: &[f32], top_k: usize) -> Vec<ScoredMatch> {
		let mut scored: Vec<ScoredMatch> = self
			.entries
			.iter()
			.map(|entry| ScoredMatch {
				similarity: score::cosine_similarity(query, &entry.vector),
				opportunity: entry.opportunity.clone(),
			})
			.collect();

		scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
		scored.truncate(top_k);

		scored
	}
}

pub(crate) fn write_json<T>(value: &T, label: &'static str, path: &Path) -> Result<()>
where
	T: Serialize,
{
	if let Some(parent) = path.parent()
		&& !parent.as_os_str().is_empty()
	{
		fs::create_dir_all(parent)
			.map_err(|err| Error::Write { path: path.to_path_buf(), source: err })?;
	}

	let encoded =
		serde_json::to_string_pretty(value).map_err(|err| Error::Encode { label, source: err })?;

	fs::write(path, encoded).map_err(|err| Error::Write { path: path.to_path_buf(), source: err })
}
