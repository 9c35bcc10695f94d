use std::{fmt, future::Future};

use crate::{
	classify::{self, FailureKind},
	error::{Error, Result},
	pacer::Pacer,
};

/// Runs `operation` through the pacer with a bounded retry budget.
///
/// Each attempt waits for a pacing slot first. A success resets the backoff
/// step and returns immediately. A quota-exhaustion failure enters backoff
/// (honoring an explicit retry delay when the failure carries one) and
/// consumes budget; every other failure propagates unchanged on first
/// occurrence, with no retry and no backoff mutation.
pub async fn execute<T, E, F, Fut>(
	pacer: &Pacer,
	max_attempts: u32,
	mut operation: F,
) -> Result<T, E>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = std::result::Result<T, E>>,
	E: fmt::Display,
{
	let mut last_quota_error = String::new();

	for attempt in 1..=max_attempts {
		pacer.acquire_slot().await;

		match operation().await {
			Ok(value) => {
				pacer.reset_backoff();

				return Ok(value);
			},
			Err(err) => {
				let description = err.to_string();

				match classify::classify_failure(&description) {
					FailureKind::Quota { retry_delay } => {
						tracing::warn!(attempt, max_attempts, "Call hit the remote quota.");
						pacer.enter_backoff(retry_delay);

						last_quota_error = description;
					},
					FailureKind::Other => return Err(Error::Operation(err)),
				}
			},
		}
	}

	Err(Error::BudgetExhausted { attempts: max_attempts, last_error: last_quota_error })
}
