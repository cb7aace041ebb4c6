//! JSON request documents accepted by the `featrank` binary.

use chrono::{DateTime, Utc};
use featrank_core::{
    Candidate, Embedding, Error, EventKind, ItemId, Result, SignalBundle, Subject,
};
use featrank_scoring::ScoringStrategy;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct RatingEntry {
    pub item: ItemId,
    pub rating: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventEntry {
    pub item: ItemId,
    #[serde(alias = "event")]
    pub kind: EventKind,
}

/// Signals as they arrive from the signal store.
///
/// `events` is a history in recording order; the last event per item is
/// the one that counts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignalsDocument {
    #[serde(default)]
    pub wishlist: Vec<ItemId>,
    #[serde(default)]
    pub ratings: Vec<RatingEntry>,
    #[serde(default)]
    pub events: Vec<EventEntry>,
    #[serde(default)]
    pub subject_vector: Option<Embedding>,
}

impl SignalsDocument {
    pub fn into_bundle(self) -> SignalBundle {
        let mut bundle = SignalBundle::new().with_membership(self.wishlist);
        for entry in self.ratings {
            bundle.set_rating(entry.item, entry.rating);
        }
        for entry in self.events {
            bundle.record_event(entry.item, entry.kind);
        }
        bundle.subject_vector = self.subject_vector;
        bundle
    }
}

/// A complete ranking request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RankRequest {
    #[serde(default)]
    pub subject: Subject,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub signals: SignalsDocument,
    /// Defaults to the time the request is run.
    #[serde(default)]
    pub query_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub top_n: Option<i64>,
    #[serde(default)]
    pub strategy: Option<ScoringStrategy>,
}

impl RankRequest {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// `top_n` to rank with: the override if given, else the request's.
    pub fn resolve_top_n(&self, override_top_n: Option<usize>) -> Result<usize> {
        if let Some(n) = override_top_n {
            return Ok(n);
        }
        match self.top_n {
            Some(n) if n < 0 => Err(Error::InvalidTopN(n)),
            Some(n) => usize::try_from(n).map_err(|_| Error::InvalidTopN(n)),
            None => Err(Error::InvalidConfig(
                "top_n must be given in the request or on the command line".to_string(),
            )),
        }
    }
}
