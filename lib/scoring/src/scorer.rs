//! Per-candidate scoring strategies
//!
//! All scorers share one output shape:
//!
//! - [`FeaturedScorer`]: wishlist, rating, embedding similarity and event
//!   terms, weighted by [`FeaturedWeights`]
//! - [`PriorityScorer`]: caller priority plus a wishlist boost
//! - [`SimilarityScorer`]: plain cosine to an anchor vector
//!
//! Scorers are bound to the signals of a single ranking call and hold no
//! state of their own between calls.

use crate::config::{FeaturedWeights, PriorityBoost};
use featrank_core::{
    Candidate, Embedding, EventKind, Membership, Result, SignalBundle, VectorStore, MAX_RATING,
};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Scalar strength of a behavioral event.
#[inline]
pub fn event_strength(kind: Option<EventKind>) -> f64 {
    match kind {
        Some(EventKind::View) => 0.1,
        Some(EventKind::Cart) => 0.5,
        Some(EventKind::Purchase) => 1.0,
        Some(EventKind::Other) | None => 0.0,
    }
}

/// Weighted contribution of each term to a candidate's score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub wishlist: f64,
    pub rating: f64,
    /// `None` when the embedding term was left out of the sum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<f64>,
    pub event: f64,
    pub priority: f64,
}

impl ScoreBreakdown {
    /// Sum of all present terms.
    pub fn total(&self) -> f64 {
        self.priority + self.wishlist + self.rating + self.embedding.unwrap_or(0.0) + self.event
    }

    /// `(name, contribution)` for every present term.
    pub fn terms(&self) -> impl Iterator<Item = (&'static str, f64)> {
        [
            ("priority", Some(self.priority)),
            ("wishlist", Some(self.wishlist)),
            ("rating", Some(self.rating)),
            ("embedding", self.embedding),
            ("event", Some(self.event)),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
    }
}

/// A candidate together with its score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

impl ScoredCandidate {
    pub fn new(candidate: Candidate, breakdown: ScoreBreakdown) -> Self {
        Self {
            candidate,
            score: breakdown.total(),
            breakdown,
        }
    }
}

/// Computes the score breakdown of one candidate.
///
/// An `Err` is a precondition violation and aborts the ranking call.
pub trait Scorer {
    fn score(&self, candidate: &Candidate) -> Result<ScoreBreakdown>;
}

/// The four-signal featured blend.
///
/// The embedding term is only added when both the subject vector and the
/// candidate vector are known and neither has zero length. Every embedding
/// that takes part must be exactly `dim` wide.
pub struct FeaturedScorer<'a> {
    weights: &'a FeaturedWeights,
    dim: usize,
    signals: &'a SignalBundle,
    subject_vector: Option<&'a Embedding>,
    store: Option<&'a dyn VectorStore>,
}

impl<'a> FeaturedScorer<'a> {
    /// Bind the blend to one subject's signals.
    ///
    /// Fails if the subject vector has the wrong width.
    pub fn new(
        weights: &'a FeaturedWeights,
        dim: usize,
        signals: &'a SignalBundle,
        subject_vector: Option<&'a Embedding>,
    ) -> Result<Self> {
        if let Some(vector) = subject_vector {
            vector.ensure_dim(dim)?;
        }
        Ok(Self {
            weights,
            dim,
            signals,
            subject_vector,
            store: None,
        })
    }

    /// Look up candidate embeddings missing from the candidate itself.
    /// The store is only consulted when a subject vector exists.
    #[must_use]
    pub fn with_store(mut self, store: &'a dyn VectorStore) -> Self {
        self.store = Some(store);
        self
    }

    fn candidate_vector<'c>(&self, candidate: &'c Candidate) -> Result<Option<Cow<'c, Embedding>>> {
        if let Some(vector) = candidate.embedding.as_ref() {
            return Ok(Some(Cow::Borrowed(vector)));
        }
        match (self.subject_vector, self.store) {
            (Some(_), Some(store)) => Ok(store.embedding(&candidate.id)?.map(Cow::Owned)),
            _ => Ok(None),
        }
    }

    /// Widths are only checked when both vectors take part; an item vector
    /// that can never be compared is ignored.
    fn embedding_term(&self, candidate: &Candidate) -> Result<Option<f64>> {
        let Some(subject) = self.subject_vector else {
            return Ok(None);
        };
        let Some(item) = self.candidate_vector(candidate)? else {
            return Ok(None);
        };

        item.ensure_dim(self.dim)?;
        Ok(subject
            .cosine_similarity(&item)?
            .map(|cosine| self.weights.embedding * cosine))
    }
}

impl Scorer for FeaturedScorer<'_> {
    fn score(&self, candidate: &Candidate) -> Result<ScoreBreakdown> {
        let id = &candidate.id;

        let wishlist = if self.signals.is_member(id) {
            self.weights.wishlist
        } else {
            0.0
        };
        let rating = self.weights.rating * (self.signals.rating(id).unwrap_or(0.0) / MAX_RATING);
        let embedding = self.embedding_term(candidate)?;
        let event = self.weights.event * event_strength(self.signals.event(id));

        Ok(ScoreBreakdown {
            wishlist,
            rating,
            embedding,
            event,
            priority: 0.0,
        })
    }
}

/// The priority-boost blend: `priority / divisor + boost if wishlisted`.
pub struct PriorityScorer<'a, M: ?Sized> {
    boost: &'a PriorityBoost,
    membership: &'a M,
}

impl<'a, M: Membership + ?Sized> PriorityScorer<'a, M> {
    pub fn new(boost: &'a PriorityBoost, membership: &'a M) -> Self {
        Self { boost, membership }
    }

    /// Score without the `Result` wrapper; this blend has no preconditions.
    pub fn breakdown(&self, candidate: &Candidate) -> ScoreBreakdown {
        let wishlist = if self.membership.is_member(&candidate.id) {
            self.boost.wishlist_boost
        } else {
            0.0
        };

        ScoreBreakdown {
            priority: candidate.priority as f64 / self.boost.divisor,
            wishlist,
            ..ScoreBreakdown::default()
        }
    }
}

impl<M: Membership + ?Sized> Scorer for PriorityScorer<'_, M> {
    fn score(&self, candidate: &Candidate) -> Result<ScoreBreakdown> {
        Ok(self.breakdown(candidate))
    }
}

/// Raw cosine similarity to a fixed anchor vector, unweighted.
///
/// Backs the item-to-item and user-to-item recommendation lists. The score
/// lands in the `embedding` term; a zero-length vector on either side gives
/// an undefined similarity, which scores 0 with the term left out.
pub struct SimilarityScorer<'a> {
    anchor: &'a Embedding,
    dim: usize,
}

impl<'a> SimilarityScorer<'a> {
    /// Fails if the anchor has the wrong width.
    pub fn new(anchor: &'a Embedding, dim: usize) -> Result<Self> {
        anchor.ensure_dim(dim)?;
        Ok(Self { anchor, dim })
    }
}

impl Scorer for SimilarityScorer<'_> {
    fn score(&self, candidate: &Candidate) -> Result<ScoreBreakdown> {
        let embedding = match candidate.embedding.as_ref() {
            Some(item) => {
                item.ensure_dim(self.dim)?;
                self.anchor.cosine_similarity(item)?
            }
            None => None,
        };

        Ok(ScoreBreakdown {
            embedding,
            ..ScoreBreakdown::default()
        })
    }
}

/// Named scoring strategy, chosen by the caller per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStrategy {
    /// Four-signal personalized blend.
    #[default]
    Featured,
    /// Priority plus wishlist boost.
    #[serde(alias = "priority")]
    PriorityBoost,
}

impl ScoringStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringStrategy::Featured => "featured",
            ScoringStrategy::PriorityBoost => "priority_boost",
        }
    }
}

impl fmt::Display for ScoringStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoringStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "featured" => Ok(ScoringStrategy::Featured),
            "priority" | "priority_boost" | "priority-boost" => Ok(ScoringStrategy::PriorityBoost),
            other => Err(format!(
                "unknown scoring strategy '{}' (expected 'featured' or 'priority')",
                other
            )),
        }
    }
}
