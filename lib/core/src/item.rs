use crate::embedding::Embedding;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a rankable item (or of a subject).
///
/// Serialized as the bare JSON value: `42`, `"sku-17"` or a uuid string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Integer(u64),
    Uuid(Uuid),
    String(String),
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemId::Integer(i) => write!(f, "{}", i),
            ItemId::Uuid(u) => write!(f, "{}", u),
            ItemId::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<u64> for ItemId {
    fn from(i: u64) -> Self {
        ItemId::Integer(i)
    }
}

impl From<Uuid> for ItemId {
    fn from(u: Uuid) -> Self {
        ItemId::Uuid(u)
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        ItemId::String(s)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId::String(s.to_string())
    }
}

/// The `[start, end]` interval in which a candidate may be ranked.
/// A missing `end` leaves the window open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityWindow {
    pub start: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

impl ValidityWindow {
    #[must_use]
    pub fn new(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn open(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }

    /// Both bounds are inclusive.
    #[inline]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && self.end.map_or(true, |end| end >= at)
    }
}

/// An item offered for ranking, e.g. a featured product slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: ItemId,
    #[serde(default)]
    pub priority: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<ValidityWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Embedding>,
    /// Slot reserved for personalized placement. Generic and personalized
    /// featured lists draw from disjoint slot sets.
    #[serde(default)]
    pub is_personalized: bool,
}

impl Candidate {
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<ItemId>) -> Self {
        Self {
            id: id.into(),
            priority: 0,
            window: None,
            embedding: None,
            is_personalized: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_window(mut self, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Self {
        self.window = Some(ValidityWindow::new(start, end));
        self
    }

    #[inline]
    #[must_use]
    pub fn with_embedding(mut self, embedding: Embedding) -> Self {
        self.embedding = Some(embedding);
        self
    }

    #[inline]
    #[must_use]
    pub fn personalized(mut self, is_personalized: bool) -> Self {
        self.is_personalized = is_personalized;
        self
    }

    /// A candidate without a window is always eligible.
    #[inline]
    pub fn is_eligible_at(&self, at: DateTime<Utc>) -> bool {
        self.window.map_or(true, |w| w.contains(at))
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.window.map(|w| w.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let w = ValidityWindow::new(t0(), Some(t0() + Duration::hours(1)));
        assert!(w.contains(t0()));
        assert!(w.contains(t0() + Duration::hours(1)));
        assert!(!w.contains(t0() - Duration::seconds(1)));
        assert!(!w.contains(t0() + Duration::hours(1) + Duration::seconds(1)));
    }

    #[test]
    fn test_open_window() {
        let w = ValidityWindow::open(t0());
        assert!(w.contains(t0() + Duration::days(3650)));
        assert!(!w.contains(t0() - Duration::seconds(1)));
    }

    #[test]
    fn test_candidate_without_window_is_eligible() {
        assert!(Candidate::new(1u64).is_eligible_at(t0()));
    }

    #[test]
    fn test_item_id_untagged_serde() {
        let ids: Vec<ItemId> = serde_json::from_str(
            r#"[42, "sku-17", "67e55044-10b1-426f-9247-bb680e5fe0c8"]"#,
        )
        .unwrap();
        assert_eq!(ids[0], ItemId::Integer(42));
        assert_eq!(ids[1], ItemId::from("sku-17"));
        assert!(matches!(ids[2], ItemId::Uuid(_)));
        assert_eq!(serde_json::to_string(&ids[0]).unwrap(), "42");
    }

    #[test]
    fn test_candidate_defaults_from_json() {
        let c: Candidate = serde_json::from_str(r#"{"id": 7}"#).unwrap();
        assert_eq!(c.priority, 0);
        assert!(c.window.is_none());
        assert!(c.embedding.is_none());
        assert!(!c.is_personalized);

        let c: Candidate = serde_json::from_str(r#"{"id": 7, "is_personalized": true}"#).unwrap();
        assert!(c.is_personalized);
    }
}
