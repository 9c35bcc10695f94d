use std::{
	fs,
	io::Read,
	path::{Path, PathBuf},
};

use color_eyre::{Result, eyre};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use fundmatch_config::Config;
use fundmatch_domain::{Opportunity, deadline};
use fundmatch_limiter::Pacer;
use fundmatch_providers::embedding;
use fundmatch_storage::{IndexEntry, ProcessedLedger, SimilarityIndex};

/// Outcome summary of one ingestion run.
#[derive(Debug, Default, Serialize)]
pub struct IngestSummary {
	pub processed_files: Vec<String>,
	pub new_opportunities: u32,
	pub duplicate_skipped: u32,
	pub expired_skipped: u32,
	pub expired_removed: u32,
	pub errors: Vec<String>,
}

/// Which column mapping a CSV file needs, picked from its name.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CsvKind {
	Nsf,
	Sbir,
	Generic,
}

pub fn csv_kind_for(file_name: &str) -> CsvKind {
	let lowered = file_name.to_lowercase();

	if lowered.contains("nsf") {
		CsvKind::Nsf
	} else if lowered.contains("sbir") || lowered.contains("topics") {
		CsvKind::Sbir
	} else {
		CsvKind::Generic
	}
}

/// Processes every pending CSV in the funding directory: maps rows to
/// opportunities, skips duplicates and expired entries, embeds the rest
/// through the shared limiter, and moves each finished file into the
/// ingested directory. A file that fails is recorded and left in place; the
/// run continues with the next one.
pub async fn process_csv_files(
	cfg: &Config,
	pacer: &Pacer,
	index: &mut SimilarityIndex,
	ledger: &mut ProcessedLedger,
) -> Result<IngestSummary> {
	fs::create_dir_all(&cfg.ingest.funding_dir)?;
	fs::create_dir_all(&cfg.ingest.ingested_dir)?;

	let mut summary = IngestSummary::default();

	for path in discover_csv_files(&cfg.ingest.funding_dir)? {
		let name = file_name(&path);

		tracing::info!(file = %name, "Processing funding CSV.");

		match ingest_file(cfg, pacer, index, ledger, &path, &mut summary).await {
			Ok(()) => {
				fs::rename(&path, cfg.ingest.ingested_dir.join(&name))?;
				tracing::info!(file = %name, "Moved ingested CSV.");
				summary.processed_files.push(name);
			},
			Err(err) => {
				tracing::error!(error = %err, file = %name, "Failed to ingest CSV.");
				summary.errors.push(format!("{name}: {err}"));
			},
		}
	}

	let now = OffsetDateTime::now_utc();
	let removed = ledger.remove_expired(now);

	if !removed.is_empty() {
		index.retain(|entry| !removed.contains(&entry.id));
		tracing::info!(count = removed.len(), "Purged expired opportunities.");
	}

	summary.expired_removed = removed.len() as u32;

	Ok(summary)
}

pub fn discover_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		let is_csv = path
			.extension()
			.is_some_and(|extension| extension.eq_ignore_ascii_case("csv"));

		if path.is_file() && is_csv {
			files.push(path);
		}
	}

	files.sort();

	Ok(files)
}

async fn ingest_file(
	cfg: &Config,
	pacer: &Pacer,
	index: &mut SimilarityIndex,
	ledger: &mut ProcessedLedger,
	path: &Path,
	summary: &mut IngestSummary,
) -> Result<()> {
	let kind = csv_kind_for(&file_name(path));
	let file = fs::File::open(path)?;
	let opportunities = read_opportunities(file, kind)?;
	let today = OffsetDateTime::now_utc().date();
	let mut candidates = Vec::new();

	for opportunity in opportunities {
		if opportunity.title.trim().is_empty() {
			tracing::warn!(file = %file_name(path), "Skipping row without a title.");

			continue;
		}

		let id = opportunity.content_id();

		if ledger.is_processed(&id) || index.contains(&id) {
			summary.duplicate_skipped += 1;

			continue;
		}
		if !deadline::is_current(&opportunity, today) {
			tracing::info!(title = %opportunity.title, "Skipping expired opportunity.");
			summary.expired_skipped += 1;

			continue;
		}

		candidates.push((id, opportunity));
	}

	for chunk in candidates.chunks(cfg.ingest.batch_size as usize) {
		let texts: Vec<String> =
			chunk.iter().map(|(_, opportunity)| opportunity.embedding_text()).collect();
		let vectors =
			embedding::embed_batch(&cfg.providers.embedding, pacer, cfg.limiter.max_attempts, &texts)
				.await?;

		if vectors.len() != chunk.len() {
			return Err(eyre::eyre!(
				"Embedding provider returned {} vectors for {} opportunities.",
				vectors.len(),
				chunk.len()
			));
		}

		for ((id, opportunity), vector) in chunk.iter().cloned().zip(vectors) {
			let expires_at = deadline::deadline_date(&opportunity)
				.map(|date| date.midnight().assume_utc() + Duration::days(1));

			ledger.mark_processed(
				id.clone(),
				opportunity.title.clone(),
				OffsetDateTime::now_utc(),
				expires_at,
			);
			index.insert(IndexEntry { id, vector, opportunity });
			summary.new_opportunities += 1;
		}

		// Snapshot after every batch so an interrupted run never re-embeds
		// what it already paid for.
		index.save(&cfg.storage.index_path)?;
		ledger.save(&cfg.storage.ledger_path)?;
		tracing::info!(count = chunk.len(), "Embedded and indexed opportunity batch.");
	}

	Ok(())
}

fn file_name(path: &Path) -> String {
	path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default()
}

pub fn read_opportunities<R>(input: R, kind: CsvKind) -> Result<Vec<Opportunity>>
where
	R: Read,
{
	let mut reader = csv::Reader::from_reader(input);
	let mut opportunities = Vec::new();

	match kind {
		CsvKind::Nsf =>
			for row in reader.deserialize::<NsfRow>() {
				opportunities.push(row?.into_opportunity());
			},
		CsvKind::Sbir =>
			for row in reader.deserialize::<SbirRow>() {
				opportunities.push(row?.into_opportunity());
			},
		CsvKind::Generic => {
			let headers = reader.headers()?.clone();

			for record in reader.records() {
				opportunities.push(generic_opportunity(&headers, &record?));
			}
		},
	}

	Ok(opportunities)
}

#[derive(Debug, Deserialize)]
struct NsfRow {
	#[serde(default, rename = "Title")]
	title: String,
	#[serde(default, rename = "Synopsis")]
	synopsis: String,
	#[serde(default, rename = "Program ID")]
	program_id: String,
	#[serde(default, rename = "Award Type")]
	award_type: String,
	#[serde(default, rename = "Next due date (Y-m-d)")]
	next_due_date: String,
	#[serde(default, rename = "Posted date (Y-m-d)")]
	posted_date: String,
	#[serde(default, rename = "URL")]
	url: String,
	#[serde(default, rename = "Solicitation URL")]
	solicitation_url: String,
	#[serde(default, rename = "Status")]
	status: String,
	#[serde(default, rename = "Proposals accepted anytime")]
	accepts_anytime: String,
}

impl NsfRow {
	fn into_opportunity(self) -> Opportunity {
		Opportunity {
			title: self.title,
			description: self.synopsis,
			agency: "NSF".to_string(),
			program_id: self.program_id,
			award_type: self.award_type,
			close_date: non_empty(self.next_due_date),
			posted_date: non_empty(self.posted_date),
			url: non_empty(self.url),
			solicitation_url: non_empty(self.solicitation_url),
			status: self.status,
			accepts_anytime: self.accepts_anytime == "True",
			..Default::default()
		}
	}
}

#[derive(Debug, Deserialize)]
struct SbirRow {
	#[serde(default, rename = "Topic Title")]
	title: String,
	#[serde(default, rename = "Topic Description")]
	description: String,
	#[serde(default, rename = "Agency")]
	agency: String,
	#[serde(default, rename = "Program")]
	program: String,
	#[serde(default, rename = "Phase")]
	phase: String,
	#[serde(default, rename = "Topic Number")]
	topic_number: String,
	#[serde(default, rename = "Close Date")]
	close_date: String,
	#[serde(default, rename = "Open Date")]
	open_date: String,
	#[serde(default, rename = "Solicitation Agency URL")]
	url: String,
	#[serde(default, rename = "SBIRTopicLink")]
	topic_link: String,
	#[serde(default, rename = "Solicitation Status")]
	status: String,
}

impl SbirRow {
	fn into_opportunity(self) -> Opportunity {
		Opportunity {
			title: self.title,
			description: self.description,
			agency: self.agency,
			program: if self.program.is_empty() { "SBIR".to_string() } else { self.program },
			phase: self.phase,
			topic_number: self.topic_number,
			close_date: non_empty(self.close_date),
			open_date: non_empty(self.open_date),
			url: non_empty(self.url),
			solicitation_url: non_empty(self.topic_link),
			status: self.status,
			..Default::default()
		}
	}
}

fn generic_opportunity(headers: &csv::StringRecord, record: &csv::StringRecord) -> Opportunity {
	let field = |names: &[&str]| -> String {
		for name in names {
			let found = headers
				.iter()
				.position(|header| header.eq_ignore_ascii_case(name))
				.and_then(|idx| record.get(idx));

			if let Some(value) = found
				&& !value.trim().is_empty()
			{
				return value.to_string();
			}
		}

		String::new()
	};

	Opportunity {
		title: field(&["title", "name"]),
		description: field(&["description", "synopsis"]),
		agency: field(&["agency", "organization"]),
		close_date: non_empty(field(&["close date", "deadline", "next due date (y-m-d)"])),
		url: non_empty(field(&["url", "link", "website"])),
		..Default::default()
	}
}

fn non_empty(value: String) -> Option<String> {
	if value.trim().is_empty() { None } else { Some(value) }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn picks_the_mapping_from_the_file_name() {
		assert_eq!(csv_kind_for("nsf_funding_2025.csv"), CsvKind::Nsf);
		assert_eq!(csv_kind_for("DoD_SBIR_open.csv"), CsvKind::Sbir);
		assert_eq!(csv_kind_for("open_topics_fy25.csv"), CsvKind::Sbir);
		assert_eq!(csv_kind_for("misc_grants.csv"), CsvKind::Generic);
	}

	#[test]
	fn maps_nsf_columns() {
		let csv_text = "\
Title,Synopsis,Program ID,Award Type,Next due date (Y-m-d),Posted date (Y-m-d),URL,Solicitation URL,Status,Proposals accepted anytime
Quantum Sensing,Build sensors,PD-25-1,Standard Grant,2025-12-01,2025-06-01,https://nsf.gov/1,https://nsf.gov/sol/1,Open,False
";
		let rows = read_opportunities(csv_text.as_bytes(), CsvKind::Nsf)
			.expect("Failed to read NSF CSV.");

		assert_eq!(rows.len(), 1);
		assert_eq!(rows[0].title, "Quantum Sensing");
		assert_eq!(rows[0].agency, "NSF");
		assert_eq!(rows[0].program_id, "PD-25-1");
		assert_eq!(rows[0].close_date.as_deref(), Some("2025-12-01"));
		assert!(!rows[0].accepts_anytime);
	}

	#[test]
	fn maps_sbir_columns_and_defaults_the_program() {
		let csv_text = "\
Topic Title,Topic Description,Agency,Program,Phase,Topic Number,Close Date,Open Date,Solicitation Agency URL,SBIRTopicLink,Solicitation Status
Hypersonics Testbed,Wind tunnel work,DOD,,Phase I,AF251-001,08/20/2025,06/01/2025,https://dod.example,https://sbir.example/1,Open
";
		let rows = read_opportunities(csv_text.as_bytes(), CsvKind::Sbir)
			.expect("Failed to read SBIR CSV.");

		assert_eq!(rows.len(), 1);
		assert_eq!(rows[0].title, "Hypersonics Testbed");
		assert_eq!(rows[0].program, "SBIR");
		assert_eq!(rows[0].topic_number, "AF251-001");
		assert_eq!(rows[0].solicitation_url.as_deref(), Some("https://sbir.example/1"));
	}

	#[test]
	fn generic_mapping_falls_back_across_header_names() {
		let csv_text = "\
Name,Description,Organization,Deadline,Link
Climate Resilience Fund,Coastal adaptation,State Energy Office,January 15 2026,https://state.example
";
		let rows = read_opportunities(csv_text.as_bytes(), CsvKind::Generic)
			.expect("Failed to read generic CSV.");

		assert_eq!(rows.len(), 1);
		assert_eq!(rows[0].title, "Climate Resilience Fund");
		assert_eq!(rows[0].agency, "State Energy Office");
		assert_eq!(rows[0].close_date.as_deref(), Some("January 15 2026"));
		assert_eq!(rows[0].url.as_deref(), Some("https://state.example"));
	}
}
