//! Year-based composite scoring.
//!
//! Every configured collection is min-max normalized across the provinces
//! that report it for a year, then each province's per-collection scores are
//! averaged into a composite and ranked.

pub mod breakdown;
pub mod collection;
pub mod composite;
pub mod normalize;
pub mod ranking;
pub mod router;
pub mod service;
pub mod session;

#[cfg(test)]
mod tests;

pub use breakdown::{CollectionBreakdown, ScoreBreakdown};
pub use collection::{CollectionScores, ProvinceValue};
pub use composite::CompositeScore;
pub use ranking::{NationalStatistics, ProvinceInfo, RankMovement};
pub use router::year_scores_router;
pub use service::{CollectionSnapshot, ScoringError, YearScoringService};
pub use session::ScoringSession;
