use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{Result, BilingualError};

/// A known-good source/target pair for one direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceExample {
    pub source: String,
    pub target: String,
}

/// Reference examples loaded for a pipeline
#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
    examples: Vec<ReferenceExample>,
}

impl ReferenceSet {
    pub fn new(examples: Vec<ReferenceExample>) -> Self {
        Self { examples }
    }

    /// Load examples from a JSON array file. A missing file yields an empty set.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !tokio::fs::try_exists(path).await? {
            info!("No reference data at {}, continuing without examples", path.display());
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let examples: Vec<ReferenceExample> = serde_json::from_str(&content)
            .map_err(|e| BilingualError::Data(format!(
                "Failed to parse reference data {}: {}", path.display(), e
            )))?;

        let examples: Vec<ReferenceExample> = examples
            .into_iter()
            .filter(|e| !e.source.trim().is_empty() && !e.target.trim().is_empty())
            .collect();

        debug!("Loaded {} reference examples from {}", examples.len(), path.display());
        Ok(Self { examples })
    }

    /// First `limit` examples, in file order
    pub fn select(&self, limit: usize) -> &[ReferenceExample] {
        &self.examples[..limit.min(self.examples.len())]
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[tokio::test]
    async fn test_missing_file_is_empty_set() {
        let temp = assert_fs::TempDir::new().unwrap();
        let set = ReferenceSet::load(temp.child("reference.json").path()).await.unwrap();
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn test_loads_and_skips_blank_pairs() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("reference.json");
        file.write_str(r#"[
            {"source": "صباح الخير", "target": "Good morning"},
            {"source": "  ", "target": "ignored"},
            {"source": "شكرا", "target": "Thank you"}
        ]"#).unwrap();

        let set = ReferenceSet::load(file.path()).await.unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.select(1)[0].target, "Good morning");
        assert_eq!(set.select(10).len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_file_is_data_error() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("reference.json");
        file.write_str("{not json").unwrap();

        let err = ReferenceSet::load(file.path()).await.unwrap_err();
        assert!(matches!(err, BilingualError::Data(_)));
    }
}
