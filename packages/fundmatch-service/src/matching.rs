use color_eyre::Result;
use serde::Serialize;
use time::{Date, OffsetDateTime};

use fundmatch_config::Config;
use fundmatch_domain::{
	UserProfile,
	deadline::{self, DeadlineStatus},
	score, truncate_chars,
};
use fundmatch_limiter::Pacer;
use fundmatch_providers::embedding;
use fundmatch_storage::{ScoredMatch, SimilarityIndex};

const SNIPPET_CHARS: usize = 200;
const KEYWORD_LIMIT: usize = 5;

/// One ranked opportunity for a researcher profile.
#[derive(Clone, Debug, Serialize)]
pub struct MatchRecord {
	pub title: String,
	pub agency: String,
	pub description: String,
	pub keywords: Vec<String>,
	pub deadline: Option<String>,
	pub deadline_status: String,
	pub url: Option<String>,
	pub confidence_score: f32,
	pub similarity_score: f32,
}

/// Embeds the profile as a query, searches the index, and ranks candidates
/// by confidence.
pub async fn match_profile(
	cfg: &Config,
	pacer: &Pacer,
	index: &SimilarityIndex,
	profile: &UserProfile,
) -> Result<Vec<MatchRecord>> {
	tracing::info!(profile = %profile.name, "Matching profile against indexed opportunities.");

	let query = embedding::embed(
		&cfg.providers.embedding,
		pacer,
		cfg.limiter.max_attempts,
		&profile.combined_text,
	)
	.await?;
	let candidates = index.search(&query, cfg.matching.top_k as usize);
	let today = OffsetDateTime::now_utc().date();

	Ok(rank_candidates(cfg, profile, candidates, today))
}

/// Pure ranking step: similarity to confidence, keyword boost, sort, trim.
pub fn rank_candidates(
	cfg: &Config,
	profile: &UserProfile,
	candidates: Vec<ScoredMatch>,
	today: Date,
) -> Vec<MatchRecord> {
	let mut records: Vec<MatchRecord> = candidates
		.into_iter()
		.map(|candidate| {
			let boost = score::keyword_boost(
				&profile.research_interests,
				&candidate.opportunity.keywords,
				cfg.matching.keyword_boost_per_match,
				cfg.matching.keyword_boost_cap,
			);
			let opportunity = candidate.opportunity;
			let status = deadline::deadline_status(opportunity.close_date.as_deref(), today);

			MatchRecord {
				deadline_status: describe_deadline(&status, opportunity.close_date.as_deref()),
				title: opportunity.title,
				agency: opportunity.agency,
				description: snippet(&opportunity.description),
				keywords: opportunity.keywords.into_iter().take(KEYWORD_LIMIT).collect(),
				deadline: opportunity.close_date,
				url: opportunity.url,
				confidence_score: score::final_confidence(candidate.similarity, boost),
				similarity_score: candidate.similarity,
			}
		})
		.collect();

	records.sort_by(|a, b| b.confidence_score.total_cmp(&a.confidence_score));

	records
}

fn snippet(description: &str) -> String {
	let cut = truncate_chars(description, SNIPPET_CHARS);

	if cut.len() < description.len() { format!("{cut}...") } else { cut.to_string() }
}

fn describe_deadline(status: &DeadlineStatus, raw: Option<&str>) -> String {
	match status {
		DeadlineStatus::Rolling => "Rolling deadline".to_string(),
		DeadlineStatus::Closed => "Closed".to_string(),
		DeadlineStatus::Due { days } => format!("Due in {days} days"),
		DeadlineStatus::Unparsed => raw.unwrap_or_default().to_string(),
	}
}

#[cfg(test)]
mod tests {
	use time::macros::date;

	use fundmatch_domain::Opportunity;
	use fundmatch_domain::profile::PersonDocument;

	use super::*;

	fn test_config() -> Config {
		let raw = r#"
[service]
log_level = "info"

[providers.embedding]
provider_id = "test"
api_base    = "http://localhost"
api_key     = "key"
path        = "/"
model       = "m"
dimensions  = 3
timeout_ms  = 1000

[limiter]
calls_per_minute = 10
max_attempts     = 3

[matching]
top_k = 20

[ingest]
funding_dir  = "funding"
ingested_dir = "funding/ingested"
batch_size   = 20

[storage]
index_path  = "data/index.json"
ledger_path = "data/ledger.json"
"#;

		toml::from_str(raw).expect("Failed to parse test config.")
	}

	fn test_profile(interests: &[&str]) -> UserProfile {
		let document: PersonDocument = serde_json::from_value(serde_json::json!({
			"person": {
				"name": "Test Researcher",
				"biographical_information": {
					"research_interests": interests,
				}
			}
		}))
		.expect("Failed to decode test person.");

		UserProfile::assemble(document, &[])
	}

	fn candidate(title: &str, similarity: f32, keywords: &[&str], close_date: Option<&str>) -> ScoredMatch {
		ScoredMatch {
			similarity,
			opportunity: Opportunity {
				title: title.to_string(),
				keywords: keywords.iter().map(|keyword| keyword.to_string()).collect(),
				close_date: close_date.map(|raw| raw.to_string()),
				..Default::default()
			},
		}
	}

	#[test]
	fn keyword_overlap_can_rerank_candidates() {
		let cfg = test_config();
		let profile = test_profile(&["autonomy"]);
		let candidates = vec![
			candidate("Pure similarity", 0.75, &[], None),
			candidate("Boosted", 0.71875, &["autonomy"], None),
		];
		let records = rank_candidates(&cfg, &profile, candidates, date!(2025 - 08 - 01));

		assert_eq!(records.len(), 2);
		assert_eq!(records[0].title, "Boosted");
		assert_eq!(records[0].confidence_score, 76.875);
		assert_eq!(records[0].similarity_score, 0.71875);
		assert_eq!(records[1].confidence_score, 75.0);
	}

	#[test]
	fn records_carry_deadline_status_and_snippets() {
		let cfg = test_config();
		let profile = test_profile(&[]);
		let long_description = "x".repeat(300);
		let mut candidates = vec![candidate("Open call", 0.9, &[], Some("2025-08-20"))];

		candidates[0].opportunity.description = long_description;

		let records = rank_candidates(&cfg, &profile, candidates, date!(2025 - 08 - 01));

		assert_eq!(records[0].deadline_status, "Due in 19 days");
		assert_eq!(records[0].description.len(), 203);
		assert!(records[0].description.ends_with("..."));
	}

	#[test]
	fn rolling_and_closed_deadlines_are_described() {
		let cfg = test_config();
		let profile = test_profile(&[]);
		let candidates = vec![
			candidate("Rolling", 0.9, &[], None),
			candidate("Closed", 0.8, &[], Some("2025-07-01")),
		];
		let records = rank_candidates(&cfg, &profile, candidates, date!(2025 - 08 - 01));

		assert_eq!(records[0].deadline_status, "Rolling deadline");
		assert_eq!(records[1].deadline_status, "Closed");
	}
}
