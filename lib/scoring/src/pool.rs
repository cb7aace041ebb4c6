//! Candidate pool preparation
//!
//! Mirrors how the featured slots are fetched before scoring: keep the ones
//! active now, order by descending priority then most recent start, and cap
//! the set so similarity scoring stays cheap. Personalized and generic slots
//! can be split, and a trending order by popularity is available.

use chrono::{DateTime, Utc};
use featrank_core::{ActiveAt, Candidate, CandidateFilter, CandidateSource, FastMap, ItemId, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Default cap on the number of candidates handed to the scorer.
pub const DEFAULT_POOL_LIMIT: usize = 50;

/// Interaction counts used for trending order. Purchases outrank views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Popularity {
    #[serde(default)]
    pub purchases: u64,
    #[serde(default)]
    pub views: u64,
}

impl Popularity {
    pub fn new(purchases: u64, views: u64) -> Self {
        Self { purchases, views }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidatePool {
    candidates: Vec<Candidate>,
}

impl CandidatePool {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }

    /// Fetch from `source` and prepare the default featured pool.
    pub fn featured<S>(source: &S, now: DateTime<Utc>) -> Result<Self>
    where
        S: CandidateSource + ?Sized,
    {
        Ok(Self::new(source.candidates(now)?)
            .active_at(now)
            .ordered()
            .limit(DEFAULT_POOL_LIMIT))
    }

    /// Like [`featured`](Self::featured), restricted to personalized slots
    /// or to generic ones.
    pub fn featured_for<S>(source: &S, now: DateTime<Utc>, personalized: bool) -> Result<Self>
    where
        S: CandidateSource + ?Sized,
    {
        Ok(Self::new(source.candidates(now)?)
            .active_at(now)
            .personalized(personalized)
            .ordered()
            .limit(DEFAULT_POOL_LIMIT))
    }

    #[must_use]
    pub fn retain<F: CandidateFilter + ?Sized>(mut self, filter: &F) -> Self {
        self.candidates.retain(|c| filter.matches(c));
        self
    }

    #[must_use]
    pub fn active_at(self, now: DateTime<Utc>) -> Self {
        self.retain(&ActiveAt(now))
    }

    /// Descending priority, then most recent start first. Candidates
    /// without a window come after windowed ones of equal priority.
    #[must_use]
    pub fn ordered(mut self) -> Self {
        self.candidates
            .sort_by_key(|c| (Reverse(c.priority), Reverse(c.start())));
        self
    }

    /// Keep only slots whose personalized flag equals `personalized`.
    #[must_use]
    pub fn personalized(self, personalized: bool) -> Self {
        self.retain(&|c: &Candidate| c.is_personalized == personalized)
    }

    /// Most popular first: purchases, then views. Items without counts sort
    /// last; ties keep their current order.
    #[must_use]
    pub fn trending(mut self, popularity: &FastMap<ItemId, Popularity>) -> Self {
        self.candidates.sort_by_key(|c| {
            Reverse(popularity.get(&c.id).copied().unwrap_or_default())
        });
        self
    }

    #[must_use]
    pub fn limit(mut self, n: usize) -> Self {
        self.candidates.truncate(n);
        self
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn as_slice(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn into_vec(self) -> Vec<Candidate> {
        self.candidates
    }
}

impl From<Vec<Candidate>> for CandidatePool {
    fn from(candidates: Vec<Candidate>) -> Self {
        Self::new(candidates)
    }
}

impl CandidateSource for CandidatePool {
    fn candidates(&self, _now: DateTime<Utc>) -> Result<Vec<Candidate>> {
        Ok(self.candidates.clone())
    }
}
