//! # featrank scoring
//!
//! Personalized ranking of featured items.
//!
//! This crate turns a subject's signals into an ordered, truncated list of
//! candidates. It performs no I/O and keeps no state between calls: the
//! caller fetches candidates and signals, hands them in, and gets the
//! ranking back.
//!
//! ## Strategies
//!
//! - **Featured**: `0.4 * wishlisted + 0.3 * rating / 5 + 0.2 * cosine + 0.1 * event`,
//!   where the cosine term is left out when either embedding is missing
//! - **Priority boost**: `priority / 100 + 1.0 * wishlisted`
//!
//! [`Ranker::similar_to`] and [`Ranker::recommend_for`] rank by plain cosine
//! to an item or subject vector instead.
//!
//! ## Example
//!
//! ```rust
//! use featrank_core::{Candidate, EventKind, ItemId, SignalBundle, Subject};
//! use featrank_scoring::{Ranker, ScoringConfig};
//! use chrono::{Duration, Utc};
//!
//! let now = Utc::now();
//! let candidates = vec![
//!     Candidate::new(41u64).with_window(now - Duration::days(1), None),
//!     Candidate::new(42u64).with_window(now - Duration::days(1), None),
//! ];
//! let signals = SignalBundle::new()
//!     .with_membership([42u64])
//!     .with_rating(42u64, 5.0)
//!     .with_event(42u64, EventKind::Purchase);
//!
//! let ranker = Ranker::new(ScoringConfig::default()).unwrap();
//! let ranked = ranker
//!     .rank_featured(&Subject::new(7u64), &candidates, &signals, now, 10)
//!     .unwrap();
//!
//! assert_eq!(ranked[0].candidate.id, ItemId::from(42u64));
//! assert!((ranked[0].score - 0.8).abs() < 1e-9);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Collector  │────>│   Scorer    │────>│   Ranker    │
//! │ (signals)   │     │ (strategy)  │     │ (top_n)     │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                                         ┌─────────────┐
//!                                         │  Explain    │
//!                                         │  (results)  │
//!                                         └─────────────┘
//! ```

pub mod config;
pub mod explain;
pub mod pool;
pub mod rank;
pub mod scorer;

pub use config::{FeaturedWeights, PriorityBoost, ScoringConfig};
pub use explain::{ExplainedResult, RankingResponse, RankingStats};
pub use pool::{CandidatePool, Popularity, DEFAULT_POOL_LIMIT};
pub use rank::{rank_with, Ranker, Ranking, RankingQuery, DEFAULT_RECOMMENDATION_LIMIT};
pub use scorer::{
    event_strength, FeaturedScorer, PriorityScorer, ScoreBreakdown, ScoredCandidate, Scorer,
    ScoringStrategy, SimilarityScorer,
};

use chrono::{DateTime, Utc};
use featrank_core::{Candidate, Membership, Result, SignalBundle, Subject};

/// Rank with the featured blend and default weights.
pub fn rank_featured(
    subject: &Subject,
    candidates: &[Candidate],
    signals: &SignalBundle,
    query_time: DateTime<Utc>,
    top_n: usize,
) -> Result<Vec<ScoredCandidate>> {
    Ranker::default().rank_featured(subject, candidates, signals, query_time, top_n)
}

/// Rank with the priority-boost blend and default parameters.
pub fn rank_by_priority<M>(candidates: &[Candidate], membership: &M, top_n: usize) -> Vec<ScoredCandidate>
where
    M: Membership + ?Sized,
{
    Ranker::default().rank_by_priority(candidates, membership, top_n)
}
