mod error;

pub mod index;
pub mod ledger;

pub use error::{Error, Result};
pub use index::{IndexEntry, ScoredMatch, SimilarityIndex};
pub use ledger::{ProcessedEntry, ProcessedLedger};
