use time::{Duration, OffsetDateTime};

use fundmatch_domain::Opportunity;
use fundmatch_storage::{IndexEntry, ProcessedLedger, SimilarityIndex};

#[test]
fn index_round_trips_through_its_snapshot() {
	let dir = tempfile::tempdir().expect("Failed to create temp dir.");
	let path = dir.path().join("nested/opportunity_index.json");
	let mut index = SimilarityIndex::default();

	index.insert(IndexEntry {
		id: "opp-1".to_string(),
		vector: vec![0.25, 0.5, 0.75],
		opportunity: Opportunity {
			title: "Photonic Interconnects".to_string(),
			agency: "DOE".to_string(),
			..Default::default()
		},
	});
	index.save(&path).expect("Failed to save index.");

	let restored = SimilarityIndex::load(&path).expect("Failed to load index.");

	assert_eq!(restored.len(), 1);
	assert!(restored.contains("opp-1"));

	let matches = restored.search(&[0.25, 0.5, 0.75], 5);

	assert_eq!(matches[0].opportunity.title, "Photonic Interconnects");
	assert!((matches[0].similarity - 1.0).abs() < 1e-6);
}

#[test]
fn missing_files_load_as_empty_state() {
	let dir = tempfile::tempdir().expect("Failed to create temp dir.");

	let index = SimilarityIndex::load(&dir.path().join("absent.json"))
		.expect("A missing index file must load as empty.");

	assert!(index.is_empty());

	let ledger = ProcessedLedger::load(&dir.path().join("absent.json"))
		.expect("A missing ledger file must load as empty.");

	assert!(ledger.opportunities.is_empty());
}

#[test]
fn ledger_round_trips_with_timestamps() {
	let dir = tempfile::tempdir().expect("Failed to create temp dir.");
	let path = dir.path().join("processed_opportunities.json");
	let now = OffsetDateTime::UNIX_EPOCH + Duration::days(20_000);
	let mut ledger = ProcessedLedger::default();

	ledger.mark_processed(
		"opp-1".to_string(),
		"Photonic Interconnects".to_string(),
		now,
		Some(now + Duration::days(45)),
	);
	ledger.save(&path).expect("Failed to save ledger.");

	let restored = ProcessedLedger::load(&path).expect("Failed to load ledger.");
	let entry = restored.opportunities.get("opp-1").expect("Missing ledger entry.");

	assert_eq!(entry.title, "Photonic Interconnects");
	assert_eq!(entry.processed_at, now);
	assert_eq!(entry.expires_at, Some(now + Duration::days(45)));
	assert!(restored.is_processed("opp-1"));
}
