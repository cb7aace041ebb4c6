use anyhow::{Context, Result};
use featrank_scoring::ScoringConfig;
use std::path::Path;

/// Load the scoring configuration.
///
/// Starts from the JSON file at `path` when given (defaults otherwise);
/// `embedding_dim` overrides the file.
pub fn load_scoring_config(path: Option<&Path>, embedding_dim: Option<usize>) -> Result<ScoringConfig> {
    let mut config = match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            ScoringConfig::from_json(&json)
                .with_context(|| format!("invalid config file {}", path.display()))?
        }
        None => ScoringConfig::default(),
    };

    if let Some(dim) = embedding_dim {
        config = config.with_embedding_dim(dim);
    }
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let config = load_scoring_config(None, None).unwrap();
        assert_eq!(config, ScoringConfig::default());
    }

    #[test]
    fn test_file_with_dimension_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"featured": {{"wishlist": 0.6}}, "embedding_dim": 64}}"#).unwrap();

        let config = load_scoring_config(Some(file.path()), None).unwrap();
        assert_eq!(config.featured.wishlist, 0.6);
        assert_eq!(config.embedding_dim, 64);

        let config = load_scoring_config(Some(file.path()), Some(3)).unwrap();
        assert_eq!(config.embedding_dim, 3);
    }

    #[test]
    fn test_missing_file() {
        let err = load_scoring_config(Some(Path::new("/nonexistent/featrank.json")), None)
            .unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn test_zero_dimension_override_rejected() {
        assert!(load_scoring_config(None, Some(0)).is_err());
    }
}
