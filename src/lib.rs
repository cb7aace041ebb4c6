//! # featrank
//!
//! Personalized ranking of featured items for an e-commerce catalog.
//!
//! featrank blends four per-user signals into one score per candidate:
//!
//! - **Wishlist**: the user marked the item
//! - **Rating**: the user's review rating, normalized to `[0, 1]`
//! - **Embedding**: cosine similarity of user and item embeddings
//! - **Events**: strongest recent interaction (view, cart, purchase)
//!
//! A simpler priority-boost strategy ranks by the merchant's priority plus a
//! wishlist bonus. Both strategies filter candidates to their validity
//! window, sort stably, and truncate to `top_n`.
//!
//! ## Quick Start
//!
//! ### From the command line
//!
//! ```bash
//! featrank --request request.json --top-n 20 --explain
//! ```
//!
//! ### As a library
//!
//! ```rust
//! use featrank::prelude::*;
//! use chrono::{Duration, Utc};
//!
//! let now = Utc::now();
//! let candidates = vec![
//!     Candidate::new(1u64).with_priority(50).with_window(now - Duration::hours(1), None),
//!     Candidate::new(2u64).with_priority(50).with_window(now - Duration::hours(1), None),
//! ];
//! let signals = SignalBundle::new().with_membership([2u64]);
//!
//! let ranker = Ranker::default();
//! let featured = ranker
//!     .rank_featured(&Subject::new(7u64), &candidates, &signals, now, 10)
//!     .unwrap();
//! assert_eq!(featured[0].candidate.id, ItemId::from(2u64));
//!
//! let boosted = ranker.rank_by_priority(&candidates, &signals.membership, 10);
//! assert_eq!(boosted[0].score, 1.5);
//! ```
//!
//! ## Crate Structure
//!
//! - `featrank-core` - embeddings, candidates, subjects, signal bundles, collector traits
//! - `featrank-scoring` - scoring strategies, ranker, candidate pool, explain output

pub mod config;
pub mod request;

// Re-export core types
pub use featrank_core::{
    collect, update_from_feedback, ActiveAt, BlobVectorStore, Candidate, CandidateFilter,
    CandidateSource, Embedding, Error, EventKind, InMemorySignals, ItemId, Membership,
    RankingInput, Result, SignalBundle, SignalSource, Subject, ValidityWindow, VectorStore,
    DEFAULT_EMBEDDING_DIM, DEFAULT_FEEDBACK_WEIGHT,
};

// Re-export scoring
pub use featrank_scoring::{
    rank_by_priority, rank_featured, CandidatePool, FeaturedWeights, Popularity, PriorityBoost,
    Ranker, Ranking, RankingQuery, RankingResponse, ScoreBreakdown, ScoredCandidate,
    ScoringConfig, ScoringStrategy, DEFAULT_POOL_LIMIT, DEFAULT_RECOMMENDATION_LIMIT,
};

pub use config::load_scoring_config;
pub use request::{RankRequest, SignalsDocument};

use chrono::{DateTime, Utc};
use tracing::debug;

/// Per-run choices that override what the request says.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub strategy: Option<ScoringStrategy>,
    pub top_n: Option<usize>,
    pub explain: bool,
}

/// Rank a parsed request.
///
/// Ratings are validated before scoring. The query instant is the
/// request's `query_time`, or `now` when it has none.
pub fn run_request(
    ranker: &Ranker,
    request: RankRequest,
    options: &RunOptions,
    now: DateTime<Utc>,
) -> Result<RankingResponse> {
    let top_n = request.resolve_top_n(options.top_n)?;
    let strategy = options.strategy.or(request.strategy).unwrap_or_default();
    let query_time = request.query_time.unwrap_or(now);

    let signals = request.signals.into_bundle();
    signals.validate()?;

    debug!(
        strategy = %strategy,
        candidates = request.candidates.len(),
        anonymous = request.subject.is_anonymous(),
        top_n,
        "ranking request"
    );

    let query = RankingQuery {
        subject: &request.subject,
        candidates: &request.candidates,
        signals: &signals,
        query_time,
        top_n,
    };
    let ranking = ranker.rank(strategy, &query)?;

    debug!(
        eligible = ranking.eligible,
        returned = ranking.results.len(),
        "ranking complete"
    );

    Ok(RankingResponse::from_ranking(&ranking, query_time, options.explain))
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Candidate, Embedding, Error, EventKind, ItemId, Ranker, Result, ScoredCandidate,
        ScoringConfig, ScoringStrategy, SignalBundle, Subject,
    };
}
