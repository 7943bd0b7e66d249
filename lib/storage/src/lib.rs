//! Storage layer for EduAlign: the read-only college catalog and the optional
//! append-only match history.

pub mod catalog;
pub mod history;

pub use catalog::CollegeCatalog;
pub use history::{HistoryEntry, HistorySummary, InstitutionCount, MatchHistory};
