use std::{
	sync::{Mutex, MutexGuard},
	time::Duration,
};

use tokio::time::{self, Instant};

const RATE_PERIOD: Duration = Duration::from_secs(60);

pub(crate) const BACKOFF_FLOOR: Duration = Duration::from_secs(1);
pub(crate) const BACKOFF_CEILING: Duration = Duration::from_secs(60);

/// Paces the start of outbound calls to a quota-limited service.
///
/// One instance is shared by every call site that targets the same quota.
/// Two throttles cooperate: a fixed minimum interval between call starts
/// covers the steady-state rate, and a backoff window sized by the remote
/// service (or by the exponential step) covers quota-exhaustion events.
/// The lock guards state reads and writes only and is never held across a
/// sleep, so a waiting task blocks nobody but itself.
#[derive(Debug)]
pub struct Pacer {
	min_interval: Duration,
	state: Mutex<PacerState>,
}

#[derive(Debug)]
struct PacerState {
	last_call_start: Option<Instant>,
	backoff_until: Option<Instant>,
	backoff_step: Duration,
}

impl Pacer {
	pub fn new(calls_per_minute: u32) -> Self {
		// Config validation enforces a positive rate; the clamp keeps the
		// interval division defined for direct constructions.
		let calls_per_minute = calls_per_minute.max(1);

		Self {
			min_interval: RATE_PERIOD / calls_per_minute,
			state: Mutex::new(PacerState {
				last_call_start: None,
				backoff_until: None,
				backoff_step: BACKOFF_FLOOR,
			}),
		}
	}

	/// Suspends the calling task until a new call may begin, then records the
	/// call start.
	///
	/// No two calls begin closer together than the minimum interval, across
	/// all tasks. No FIFO order is promised among contenders; the bound is a
	/// rate, not a queue discipline.
	pub async fn acquire_slot(&self) {
		loop {
			let wait = {
				let mut state = self.lock_state();
				let now = Instant::now();

				if let Some(until) = state.backoff_until
					&& now < until
				{
					let wait = until - now;

					tracing::debug!(
						wait_ms = wait.as_millis() as u64,
						"Backoff window active. Delaying next call."
					);

					wait
				} else if let Some(last) = state.last_call_start
					&& now.duration_since(last) < self.min_interval
				{
					self.min_interval - now.duration_since(last)
				} else {
					state.last_call_start = Some(now);

					return;
				}
			};

			time::sleep(wait).await;
		}
	}

	/// Opens a backoff window after a quota-exhaustion failure.
	///
	/// An explicit delay supplied by the remote service is used verbatim and
	/// leaves the exponential step untouched. Without one, the current step
	/// sizes the window and then doubles, capped at the ceiling.
	pub fn enter_backoff(&self, explicit_delay: Option<Duration>) {
		let mut state = self.lock_state();
		let now = Instant::now();

		match explicit_delay {
			Some(delay) => {
				state.backoff_until = Some(now + delay);

				tracing::warn!(
					delay_s = delay.as_secs(),
					"Quota exhausted. Waiting the delay the service requested."
				);
			},
			None => {
				let step = state.backoff_step;

				state.backoff_until = Some(now + step);
				state.backoff_step = (step * 2).min(BACKOFF_CEILING);

				tracing::warn!(delay_s = step.as_secs(), "Quota exhausted. Backing off.");
			},
		}
	}

	/// Restores the exponential step to its floor after a successful call.
	///
	/// An already-granted backoff deadline stays in force; only the growth of
	/// the step resets.
	pub fn reset_backoff(&self) {
		self.lock_state().backoff_step = BACKOFF_FLOOR;
	}

	fn lock_state(&self) -> MutexGuard<'_, PacerState> {
		self.state.lock().unwrap_or_else(|err| err.into_inner())
	}
}

#[cfg(test)]
impl Pacer {
	pub(crate) fn backoff_step(&self) -> Duration {
		self.lock_state().backoff_step
	}

	pub(crate) fn backoff_remaining(&self) -> Option<Duration> {
		let until = self.lock_state().backoff_until?;

		Some(until.saturating_duration_since(Instant::now()))
	}
}
