//! Explainability for ranking results
//!
//! Serializable views of a [`Ranking`] that show how each score was built.

use crate::rank::Ranking;
use crate::scorer::{ScoreBreakdown, ScoredCandidate, ScoringStrategy};
use chrono::{DateTime, Utc};
use featrank_core::ItemId;
use serde::Serialize;

/// One ranked item with its optional per-term breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainedResult {
    pub id: ItemId,
    pub priority: i64,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explain: Option<ScoreBreakdown>,
}

impl ExplainedResult {
    pub fn from_scored(scored: &ScoredCandidate, include_breakdown: bool) -> Self {
        Self {
            id: scored.candidate.id.clone(),
            priority: scored.candidate.priority,
            score: scored.score,
            explain: include_breakdown.then_some(scored.breakdown),
        }
    }
}

/// Summary statistics for a ranking call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingStats {
    pub candidates_count: usize,
    pub eligible_count: usize,
    pub results_count: usize,
    pub avg_score: f64,
    pub best_score: f64,
    /// Term that contributed most to the best result.
    pub top_contributing_term: Option<String>,
}

impl RankingStats {
    pub fn compute(ranking: &Ranking) -> Self {
        let results = &ranking.results;
        let Some(best) = results.first() else {
            return Self {
                candidates_count: ranking.considered,
                eligible_count: ranking.eligible,
                results_count: 0,
                avg_score: 0.0,
                best_score: 0.0,
                top_contributing_term: None,
            };
        };

        let avg_score = results.iter().map(|r| r.score).sum::<f64>() / results.len() as f64;
        let top_contributing_term = best
            .breakdown
            .terms()
            .filter(|(_, value)| *value > 0.0)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(name, _)| name.to_string());

        Self {
            candidates_count: ranking.considered,
            eligible_count: ranking.eligible,
            results_count: results.len(),
            avg_score,
            best_score: best.score,
            top_contributing_term,
        }
    }
}

/// Response document for a ranking call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingResponse {
    pub strategy: ScoringStrategy,
    pub query_time: DateTime<Utc>,
    pub result: Vec<ExplainedResult>,
    pub stats: RankingStats,
}

impl RankingResponse {
    pub fn from_ranking(ranking: &Ranking, query_time: DateTime<Utc>, include_breakdown: bool) -> Self {
        Self {
            strategy: ranking.strategy,
            query_time,
            result: ranking
                .results
                .iter()
                .map(|r| ExplainedResult::from_scored(r, include_breakdown))
                .collect(),
            stats: RankingStats::compute(ranking),
        }
    }
}
