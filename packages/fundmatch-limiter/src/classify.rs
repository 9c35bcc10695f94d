use std::time::Duration;

use regex::Regex;

const QUOTA_MARKERS: [&str; 2] = ["429", "RESOURCE_EXHAUSTED"];
const RETRY_DELAY_PATTERN: &str = r"'retryDelay':\s*'(\d+)s'";

/// Classified outcome of one failed call attempt.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FailureKind {
	/// The remote service reported quota exhaustion. Waiting is expected to
	/// resolve it.
	Quota { retry_delay: Option<Duration> },
	/// Any other failure. Waiting will not fix it.
	Other,
}

/// Inspects a failure's rendered description for the quota markers the remote
/// service emits.
///
/// The marker tokens match case-sensitively. This textual scan is the only
/// signal the wrapped call exposes; everything downstream depends on the
/// returned variant, not on the raw text.
pub fn classify_failure(description: &str) -> FailureKind {
	if QUOTA_MARKERS.iter().any(|marker| description.contains(marker)) {
		FailureKind::Quota { retry_delay: parse_retry_delay(description) }
	} else {
		FailureKind::Other
	}
}

/// Extracts the `'retryDelay': '<N>s'` hint a quota error may embed.
///
/// Missing or malformed hints degrade to `None`; the exponential step covers
/// those.
fn parse_retry_delay(description: &str) -> Option<Duration> {
	let re = Regex::new(RETRY_DELAY_PATTERN).ok()?;
	let seconds = re.captures(description)?.get(1)?.as_str().parse::<u64>().ok()?;

	Some(Duration::from_secs(seconds))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn recognizes_http_429_marker() {
		let kind = classify_failure("Embedding request failed with status 429 Too Many Requests");

		assert_eq!(kind, FailureKind::Quota { retry_delay: None });
	}

	#[test]
	fn recognizes_resource_exhausted_marker() {
		let kind = classify_failure("RESOURCE_EXHAUSTED: quota exceeded for model");

		assert_eq!(kind, FailureKind::Quota { retry_delay: None });
	}

	#[test]
	fn marker_match_is_case_sensitive() {
		assert_eq!(classify_failure("resource_exhausted: quota exceeded"), FailureKind::Other);
	}

	#[test]
	fn extracts_the_embedded_retry_delay() {
		let description =
			"429 RESOURCE_EXHAUSTED: rate limit, details: {'retryDelay': '45s', 'quota': 'embed'}";
		let kind = classify_failure(description);

		assert_eq!(kind, FailureKind::Quota { retry_delay: Some(Duration::from_secs(45)) });
	}

	#[test]
	fn malformed_retry_delay_falls_back_to_none() {
		let kind = classify_failure("429 quota exceeded, 'retryDelay': 'soon'");

		assert_eq!(kind, FailureKind::Quota { retry_delay: None });
	}

	#[test]
	fn other_failures_are_not_quota() {
		assert_eq!(classify_failure("400 INVALID_ARGUMENT: empty input"), FailureKind::Other);
	}
}
