//! Scoring configuration
//!
//! Weights are plain values handed to the [`Ranker`](crate::Ranker) when it
//! is built. The defaults reproduce the production featured-product blend;
//! alternate sets exist for experiments and tests.

use featrank_core::{Error, Result, DEFAULT_EMBEDDING_DIM};
use serde::{Deserialize, Serialize};

/// Weights of the four-signal featured blend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturedWeights {
    pub wishlist: f64,
    pub rating: f64,
    pub embedding: f64,
    pub event: f64,
}

impl Default for FeaturedWeights {
    fn default() -> Self {
        Self {
            wishlist: 0.4,
            rating: 0.3,
            embedding: 0.2,
            event: 0.1,
        }
    }
}

impl FeaturedWeights {
    /// Highest attainable score. The embedding weight only counts when
    /// embeddings take part.
    pub fn max_score(&self, with_embeddings: bool) -> f64 {
        let base = self.wishlist + self.rating + self.event;
        if with_embeddings {
            base + self.embedding
        } else {
            base
        }
    }

    fn validate(&self) -> Result<()> {
        for (name, weight) in [
            ("wishlist", self.wishlist),
            ("rating", self.rating),
            ("embedding", self.embedding),
            ("event", self.event),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "featured weight '{}' must be a non-negative number, got {}",
                    name, weight
                )));
            }
        }
        Ok(())
    }
}

/// Parameters of the priority-boost blend: `priority / divisor`, plus
/// `wishlist_boost` for wishlisted items.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityBoost {
    pub divisor: f64,
    pub wishlist_boost: f64,
}

impl Default for PriorityBoost {
    fn default() -> Self {
        Self {
            divisor: 100.0,
            wishlist_boost: 1.0,
        }
    }
}

impl PriorityBoost {
    fn validate(&self) -> Result<()> {
        if !self.divisor.is_finite() || self.divisor <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "priority divisor must be positive, got {}",
                self.divisor
            )));
        }
        if !self.wishlist_boost.is_finite() || self.wishlist_boost < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "wishlist boost must be a non-negative number, got {}",
                self.wishlist_boost
            )));
        }
        Ok(())
    }
}

/// Complete scoring configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub featured: FeaturedWeights,
    pub priority: PriorityBoost,
    /// Width every subject and item embedding must have.
    pub embedding_dim: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            featured: FeaturedWeights::default(),
            priority: PriorityBoost::default(),
            embedding_dim: DEFAULT_EMBEDDING_DIM,
        }
    }
}

impl ScoringConfig {
    /// Parse a JSON document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ScoringConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_embedding_dim(mut self, dim: usize) -> Self {
        self.embedding_dim = dim;
        self
    }

    #[must_use]
    pub fn with_featured_weights(mut self, weights: FeaturedWeights) -> Self {
        self.featured = weights;
        self
    }

    #[must_use]
    pub fn with_priority_boost(mut self, priority: PriorityBoost) -> Self {
        self.priority = priority;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.embedding_dim == 0 {
            return Err(Error::InvalidConfig(
                "embedding_dim must be at least 1".to_string(),
            ));
        }
        self.featured.validate()?;
        self.priority.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let w = FeaturedWeights::default();
        assert!((w.max_score(true) - 1.0).abs() < 1e-12);
        assert!((w.max_score(false) - 0.8).abs() < 1e-12);
        assert!(ScoringConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ScoringConfig::from_json(
            r#"{"featured": {"wishlist": 0.5}, "embedding_dim": 3}"#,
        )
        .unwrap();
        assert_eq!(config.featured.wishlist, 0.5);
        assert_eq!(config.featured.rating, 0.3);
        assert_eq!(config.priority, PriorityBoost::default());
        assert_eq!(config.embedding_dim, 3);
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(ScoringConfig::from_json("{}").unwrap(), ScoringConfig::default());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let err = ScoringConfig::from_json(r#"{"featured": {"event": -0.1}}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(msg) if msg.contains("event")));
    }

    #[test]
    fn test_zero_divisor_rejected() {
        let config = ScoringConfig::default().with_priority_boost(PriorityBoost {
            divisor: 0.0,
            wishlist_boost: 1.0,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(ScoringConfig::default().with_embedding_dim(0).validate().is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            ScoringConfig::from_json("{not json"),
            Err(Error::Serialization(_))
        ));
    }
}
