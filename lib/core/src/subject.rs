use crate::embedding::Embedding;
use crate::item::ItemId;
use serde::{Deserialize, Serialize};

/// Identifier of the subject being ranked for. Shares the item id shape.
pub type SubjectId = ItemId;

/// The user (or anonymous visitor) a ranking is personalized for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    #[serde(default)]
    pub id: Option<SubjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Embedding>,
}

impl Subject {
    #[must_use]
    pub fn new(id: impl Into<SubjectId>) -> Self {
        Self {
            id: Some(id.into()),
            embedding: None,
        }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_embedding(mut self, embedding: Embedding) -> Self {
        self.embedding = Some(embedding);
        self
    }

    #[inline]
    pub fn is_anonymous(&self) -> bool {
        self.id.is_none()
    }
}
