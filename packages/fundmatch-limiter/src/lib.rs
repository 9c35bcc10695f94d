mod classify;
mod error;
mod pacer;
mod retry;

pub use classify::{FailureKind, classify_failure};
pub use error::{Error, Result};
pub use pacer::Pacer;
pub use retry::execute;
