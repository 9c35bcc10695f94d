use serde::{Deserialize, Serialize};

use crate::truncate_chars;

const DESCRIPTION_EMBED_CHARS: usize = 500;
const ELIGIBILITY_EMBED_CHARS: usize = 200;

/// A funding opportunity as assembled from one ingested CSV row.
///
/// Date fields stay raw strings; the deadline heuristics interpret them on
/// demand because upstream feeds disagree on formats.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Opportunity {
	pub title: String,
	pub description: String,
	pub agency: String,
	#[serde(default)]
	pub program_id: String,
	#[serde(default)]
	pub topic_number: String,
	#[serde(default)]
	pub award_type: String,
	#[serde(default)]
	pub program: String,
	#[serde(default)]
	pub phase: String,
	#[serde(default)]
	pub close_date: Option<String>,
	#[serde(default)]
	pub posted_date: Option<String>,
	#[serde(default)]
	pub open_date: Option<String>,
	#[serde(default)]
	pub url: Option<String>,
	#[serde(default)]
	pub solicitation_url: Option<String>,
	#[serde(default)]
	pub status: String,
	#[serde(default)]
	pub keywords: Vec<String>,
	#[serde(default)]
	pub topics: Vec<String>,
	#[serde(default)]
	pub eligibility: Option<String>,
	#[serde(default)]
	pub accepts_anytime: bool,
}

impl Opportunity {
	/// Stable content identity over the fields that distinguish one
	/// solicitation from another.
	pub fn content_id(&self) -> String {
		let mut hasher = blake3::Hasher::new();

		hasher.update(self.title.as_bytes());
		hasher.update(self.agency.as_bytes());
		hasher.update(self.program_id.as_bytes());
		hasher.update(self.topic_number.as_bytes());

		hasher.finalize().to_hex().to_string()
	}

	/// Text representation fed to the embedding provider.
	pub fn embedding_text(&self) -> String {
		let mut sections = Vec::new();

		if !self.title.is_empty() {
			sections.push(format!("Title: {}", self.title));
		}
		if !self.agency.is_empty() {
			sections.push(format!("Agency: {}", self.agency));
		}
		if !self.description.is_empty() {
			sections
				.push(format!("Description: {}", truncate_chars(&self.description, DESCRIPTION_EMBED_CHARS)));
		}
		if !self.topics.is_empty() {
			sections.push(format!("Topics: {}", self.topics.join(", ")));
		}
		if !self.keywords.is_empty() {
			sections.push(format!("Keywords: {}", self.keywords.join(", ")));
		}
		if let Some(eligibility) = self.eligibility.as_deref()
			&& !eligibility.is_empty()
		{
			sections.push(format!(
				"Eligibility: {}",
				truncate_chars(eligibility, ELIGIBILITY_EMBED_CHARS)
			));
		}

		sections.join(" ")
	}
}
