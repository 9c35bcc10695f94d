use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::truncate_chars;

const DOCUMENT_EMBED_CHARS: usize = 3_000;

/// Top-level shape of the researcher's person JSON document.
#[derive(Debug, Deserialize)]
pub struct PersonDocument {
	pub person: Person,
}

#[derive(Debug, Deserialize)]
pub struct Person {
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub summary: String,
	#[serde(default)]
	pub biographical_information: Biography,
	#[serde(default)]
	pub links: Vec<Link>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Biography {
	#[serde(default)]
	pub research_interests: Vec<String>,
	#[serde(default)]
	pub education: Vec<Value>,
	#[serde(default)]
	pub awards: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct Link {
	#[serde(default, rename = "type")]
	pub kind: String,
	#[serde(default)]
	pub url: String,
}

/// A researcher profile ready for embedding.
#[derive(Clone, Debug, Serialize)]
pub struct UserProfile {
	pub id: String,
	pub name: String,
	pub summary: String,
	pub research_interests: Vec<String>,
	pub education: Vec<Value>,
	pub awards: Vec<Value>,
	pub links: Vec<String>,
	pub combined_text: String,
}

impl UserProfile {
	/// Assembles a profile from the person document plus any pre-extracted
	/// document texts (extraction itself happens upstream).
	pub fn assemble(document: PersonDocument, document_texts: &[String]) -> Self {
		let person = document.person;
		let biography = person.biographical_information;
		let links: Vec<String> =
			person.links.into_iter().filter(|link| !link.url.is_empty()).map(|link| link.url).collect();
		let combined_text = combined_text(
			&person.name,
			&person.summary,
			&biography.research_interests,
			&biography.education,
			&biography.awards,
			document_texts,
		);
		let id = blake3::hash(person.name.as_bytes()).to_hex().to_string();

		Self {
			id,
			name: person.name,
			summary: person.summary,
			research_interests: biography.research_interests,
			education: biography.education,
			awards: biography.awards,
			links,
			combined_text,
		}
	}
}

fn combined_text(
	name: &str,
	summary: &str,
	research_interests: &[String],
	education: &[Value],
	awards: &[Value],
	document_texts: &[String],
) -> String {
	let mut parts = Vec::new();

	if !name.is_empty() {
		parts.push(format!("Name: {name}"));
	}
	if !summary.is_empty() {
		parts.push(format!("Summary: {summary}"));
	}
	if !research_interests.is_empty() {
		parts.push(format!("Research Interests: {}", research_interests.join(", ")));
	}
	if !education.is_empty() {
		parts.push(format!("Education: {}", encode_values(education)));
	}
	if !awards.is_empty() {
		parts.push(format!("Awards: {}", encode_values(awards)));
	}
	for text in document_texts {
		let trimmed = text.trim();

		if !trimmed.is_empty() {
			parts.push(truncate_chars(trimmed, DOCUMENT_EMBED_CHARS).to_string());
		}
	}

	parts.join("\n\n")
}

fn encode_values(values: &[Value]) -> String {
	serde_json::to_string(values).unwrap_or_default()
}
