pub type Result<T, E> = std::result::Result<T, Error<E>>;

/// Terminal outcome of a paced, retried operation.
///
/// The two variants let callers tell "the remote kept refusing until the
/// budget ran out" apart from "the call failed for a reason waiting cannot
/// fix" without inspecting error text.
#[derive(Debug, thiserror::Error)]
pub enum Error<E> {
	/// Repeated quota-exhaustion failures consumed every permitted attempt.
	#[error("Retry budget of {attempts} attempts exhausted by repeated quota errors: {last_error}")]
	BudgetExhausted { attempts: u32, last_error: String },
	/// A failure that waiting cannot fix, propagated unchanged from the
	/// wrapped operation.
	#[error("{0}")]
	Operation(E),
}
