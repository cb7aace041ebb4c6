//! Per-subject signals consumed by the scorers.
//!
//! Every signal may be absent. Absence is an ordinary state: an item with no
//! rating, no event and no wishlist entry simply contributes nothing.

use crate::embedding::Embedding;
use crate::item::ItemId;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::hash::BuildHasher;
use std::str::FromStr;

pub type FastMap<K, V> = HashMap<K, V, ahash::RandomState>;
pub type FastSet<K> = HashSet<K, ahash::RandomState>;

/// Highest rating a review can carry.
pub const MAX_RATING: f64 = 5.0;

/// Behavioral event recorded against an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    View,
    Cart,
    Purchase,
    /// Any label outside the three above. Carries no weight.
    #[serde(other)]
    Other,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::View => "view",
            EventKind::Cart => "cart",
            EventKind::Purchase => "purchase",
            EventKind::Other => "other",
        }
    }
}

impl FromStr for EventKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "view" => EventKind::View,
            "cart" => EventKind::Cart,
            "purchase" => EventKind::Purchase,
            _ => EventKind::Other,
        })
    }
}

/// Anything that can answer "has the subject marked this item".
pub trait Membership {
    fn is_member(&self, item: &ItemId) -> bool;
}

impl<S: BuildHasher> Membership for HashSet<ItemId, S> {
    #[inline]
    fn is_member(&self, item: &ItemId) -> bool {
        self.contains(item)
    }
}

impl Membership for SignalBundle {
    #[inline]
    fn is_member(&self, item: &ItemId) -> bool {
        SignalBundle::is_member(self, item)
    }
}

/// Signals collected for one subject, shared by all candidates in a call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalBundle {
    /// Wishlisted items.
    pub membership: FastSet<ItemId>,
    /// Review ratings in `[0, MAX_RATING]`.
    pub ratings: FastMap<ItemId, f64>,
    /// Latest event per item.
    pub events: FastMap<ItemId, EventKind>,
    pub subject_vector: Option<Embedding>,
}

impl SignalBundle {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_membership<I>(mut self, items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ItemId>,
    {
        self.membership.extend(items.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_rating(mut self, item: impl Into<ItemId>, rating: f64) -> Self {
        self.set_rating(item, rating);
        self
    }

    #[must_use]
    pub fn with_event(mut self, item: impl Into<ItemId>, kind: EventKind) -> Self {
        self.record_event(item, kind);
        self
    }

    #[must_use]
    pub fn with_subject_vector(mut self, embedding: Embedding) -> Self {
        self.subject_vector = Some(embedding);
        self
    }

    pub fn add_member(&mut self, item: impl Into<ItemId>) {
        self.membership.insert(item.into());
    }

    pub fn set_rating(&mut self, item: impl Into<ItemId>, rating: f64) {
        self.ratings.insert(item.into(), rating);
    }

    /// Record an event from a history. Later events replace earlier ones
    /// for the same item.
    pub fn record_event(&mut self, item: impl Into<ItemId>, kind: EventKind) {
        self.events.insert(item.into(), kind);
    }

    #[inline]
    pub fn is_member(&self, item: &ItemId) -> bool {
        self.membership.contains(item)
    }

    #[inline]
    pub fn rating(&self, item: &ItemId) -> Option<f64> {
        self.ratings.get(item).copied()
    }

    #[inline]
    pub fn event(&self, item: &ItemId) -> Option<EventKind> {
        self.events.get(item).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.membership.is_empty()
            && self.ratings.is_empty()
            && self.events.is_empty()
            && self.subject_vector.is_none()
    }

    /// Check every rating lies in `[0, MAX_RATING]`.
    ///
    /// Scoring itself trusts its input; callers that take ratings from an
    /// untrusted source run this first.
    pub fn validate(&self) -> Result<()> {
        for (item, &rating) in &self.ratings {
            if !(0.0..=MAX_RATING).contains(&rating) {
                return Err(Error::InvalidRating {
                    item: item.clone(),
                    rating,
                });
            }
        }
        Ok(())
    }
}
