use std::{collections::HashMap, fs, path::Path};

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
	error::{Error, Result},
	index::write_json,
};

const CLEANUP_INTERVAL: Duration = Duration::days(1);

/// Durable record of which opportunities have already been embedded, so
/// re-ingesting a feed never re-embeds (or re-pays for) the same row.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ProcessedLedger {
	#[serde(default)]
	pub opportunities: HashMap<String, ProcessedEntry>,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub last_cleanup: Option<OffsetDateTime>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ProcessedEntry {
	pub title: String,
	#[serde(with = "time::serde::rfc3339")]
	pub processed_at: OffsetDateTime,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub expires_at: Option<OffsetDateTime>,
}

impl ProcessedLedger {
	/// Loads the ledger; a missing file yields an empty one.
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
		write_json(self, "processed ledger", path)
	}

	pub fn is_processed(&self, id: &str) -> bool {
		self.opportunities.contains_key(id)
	}

	pub fn mark_processed(
		&mut self,
		id: String,
		title: String,
		processed_at: OffsetDateTime,
		expires_at: Option<OffsetDateTime>,
	) {
		self.opportunities.insert(id, ProcessedEntry { title, processed_at, expires_at });
	}

	/// Drops entries whose expiry has passed and returns their ids so the
	/// index can drop them too. Runs at most once per day.
	pub fn remove_expired(&mut self, now: OffsetDateTime) -> Vec<String> {
		if let Some(last) = self.last_cleanup
			&& now - last < CLEANUP_INTERVAL
		{
			return Vec::new();
		}

		let expired: Vec<String> = self
			.opportunities
			.iter()
			.filter(|(_, entry)| entry.expires_at.is_some_and(|at| at < now))
			.map(|(id, _)| id.clone())
			.collect();

		for id in &expired {
			self.opportunities.remove(id);
		}

		self.last_cleanup = Some(now);

		expired
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ledger_with(expires_at: Option<OffsetDateTime>, now: OffsetDateTime) -> ProcessedLedger {
		let mut ledger = ProcessedLedger::default();

		ledger.mark_processed("opp-1".to_string(), "Sample".to_string(), now, expires_at);

		ledger
	}

	#[test]
	fn removes_only_expired_entries() {
		let now = OffsetDateTime::UNIX_EPOCH + Duration::days(1_000);
		let mut expired = ledger_with(Some(now - Duration::days(1)), now);
		let mut open = ledger_with(Some(now + Duration::days(30)), now);
		let mut dateless = ledger_with(None, now);

		assert_eq!(expired.remove_expired(now), vec!["opp-1".to_string()]);
		assert!(open.remove_expired(now).is_empty());
		assert!(dateless.remove_expired(now).is_empty());
		assert!(!expired.is_processed("opp-1"));
		assert!(open.is_processed("opp-1"));
	}

	#[test]
	fn cleanup_runs_at_most_once_per_day() {
		let now = OffsetDateTime::UNIX_EPOCH + Duration::days(1_000);
		let mut ledger = ledger_with(None, now);

		assert!(ledger.remove_expired(now).is_empty());

		// A second entry expiring right away is left alone until a day has
		// passed since the last cleanup.
		ledger.mark_processed("opp-2".to_string(), "Late".to_string(), now, Some(now));
		assert!(ledger.remove_expired(now + Duration::hours(1)).is_empty());
		assert_eq!(
			ledger.remove_expired(now + Duration::days(1)),
			vec!["opp-2".to_string()]
		);
	}
}
