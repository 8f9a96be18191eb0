//! An immutable, fully loaded set of collaborators.

use crate::codec::{checksum, decode};
use crate::source::BlobSource;
use chrono::{DateTime, Utc};
use hybridrec_core::{
    EmbeddingRecord, EmbeddingTable, Error, FactorModel, Interaction, InteractionStore, ItemId,
    Predictor, Recommender, Result, UserId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Blob names of the three artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNames {
    pub interactions: String,
    pub embeddings: String,
    pub model: String,
}

impl Default for ArtifactNames {
    fn default() -> Self {
        Self {
            interactions: "clicks.json".to_string(),
            embeddings: "embeddings.json".to_string(),
            model: "model.json".to_string(),
        }
    }
}

/// Snapshot description for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotInfo {
    pub loaded_at: DateTime<Utc>,
    pub interactions: usize,
    pub users: usize,
    pub items: usize,
    pub embeddings: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_dim: Option<usize>,
    /// Blob name to hex SHA-256 of its raw bytes
    pub checksums: BTreeMap<String, String>,
}

/// Interaction store, embedding table and model that were loaded together
pub struct Snapshot {
    interactions: InteractionStore,
    embeddings: EmbeddingTable,
    model: Arc<dyn Predictor>,
    info: SnapshotInfo,
}

impl Snapshot {
    /// Assemble a snapshot from tables already in memory
    pub fn new(
        interactions: InteractionStore,
        embeddings: EmbeddingTable,
        model: Arc<dyn Predictor>,
    ) -> Self {
        let info = SnapshotInfo {
            loaded_at: Utc::now(),
            interactions: interactions.len(),
            users: interactions.user_count(),
            items: interactions.item_count(),
            embeddings: embeddings.len(),
            embedding_dim: embeddings.dim(),
            checksums: BTreeMap::new(),
        };
        Self {
            interactions,
            embeddings,
            model,
            info,
        }
    }

    /// Fetch, decode and validate all three artifacts.
    /// Any failure aborts the whole load.
    pub async fn load(source: &BlobSource, names: &ArtifactNames) -> Result<Self> {
        let mut checksums = BTreeMap::new();

        let interactions: Vec<Interaction> =
            fetch_artifact(source, &names.interactions, &mut checksums).await?;
        let interactions = InteractionStore::new(interactions);
        info!(
            "Loaded {} interactions ({} users, {} items)",
            interactions.len(),
            interactions.user_count(),
            interactions.item_count()
        );

        let records: Vec<EmbeddingRecord> =
            fetch_artifact(source, &names.embeddings, &mut checksums).await?;
        let embeddings = EmbeddingTable::from_records(records)
            .map_err(|e| Error::load_failure(&names.embeddings, e))?;
        info!(
            "Loaded {} embeddings (dim {:?})",
            embeddings.len(),
            embeddings.dim()
        );

        let model: FactorModel = fetch_artifact(source, &names.model, &mut checksums).await?;
        model
            .validate()
            .map_err(|e| Error::load_failure(&names.model, e))?;
        info!("Loaded factor model with {} factors", model.n_factors());

        let mut snapshot = Self::new(interactions, embeddings, Arc::new(model));
        snapshot.info.checksums = checksums;
        Ok(snapshot)
    }

    pub fn interactions(&self) -> &InteractionStore {
        &self.interactions
    }

    pub fn embeddings(&self) -> &EmbeddingTable {
        &self.embeddings
    }

    pub fn model(&self) -> &dyn Predictor {
        self.model.as_ref()
    }

    pub fn info(&self) -> &SnapshotInfo {
        &self.info
    }

    pub fn recommender(&self) -> Recommender<'_> {
        Recommender::new(&self.interactions, &self.embeddings, self.model.as_ref())
    }

    pub fn recommend(&self, user_id: UserId, n: usize) -> Vec<ItemId> {
        self.recommender().recommend(user_id, n)
    }
}

async fn fetch_artifact<T: serde::de::DeserializeOwned>(
    source: &BlobSource,
    name: &str,
    checksums: &mut BTreeMap<String, String>,
) -> Result<T> {
    let data = source
        .fetch(name)
        .await
        .map_err(|e| Error::load_failure(name, format!("{:#}", e)))?;
    checksums.insert(name.to_string(), checksum(&data));
    decode(name, &data).map_err(|e| Error::load_failure(name, format!("{:#}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_json(dir: &std::path::Path, name: &str, value: serde_json::Value) {
        std::fs::write(dir.join(name), serde_json::to_vec(&value).unwrap()).unwrap();
    }

    fn write_fixture(dir: &std::path::Path) {
        write_json(
            dir,
            "clicks.json",
            json!([
                {"user_id": 1, "item_id": 10},
                {"user_id": 1, "item_id": 11},
                {"user_id": 2, "item_id": 12},
                {"user_id": 2, "item_id": 13}
            ]),
        );
        write_json(
            dir,
            "embeddings.json",
            json!([
                {"item_id": 10, "vector": [1.0, 0.0]},
                {"item_id": 11, "vector": [1.0, 0.0]},
                {"item_id": 12, "vector": [0.0, 1.0]},
                {"item_id": 13, "vector": [0.9, 0.1]}
            ]),
        );
        write_json(
            dir,
            "model.json",
            json!({
                "global_mean": 0.8,
                "rating_scale": {"min": 0.0, "max": 1.0},
                "user_factors": {},
                "item_factors": {}
            }),
        );
    }

    #[tokio::test]
    async fn test_load_from_local_source() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());
        let source = BlobSource::Local {
            root: dir.path().to_path_buf(),
        };

        let snapshot = Snapshot::load(&source, &ArtifactNames::default())
            .await
            .unwrap();
        let info = snapshot.info();
        assert_eq!(info.interactions, 4);
        assert_eq!(info.users, 2);
        assert_eq!(info.embeddings, 4);
        assert_eq!(info.embedding_dim, Some(2));
        assert_eq!(info.checksums.len(), 3);

        assert_eq!(snapshot.recommend(1, 5), vec![13, 12]);
    }

    #[tokio::test]
    async fn test_missing_artifact_is_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());
        std::fs::remove_file(dir.path().join("model.json")).unwrap();
        let source = BlobSource::Local {
            root: dir.path().to_path_buf(),
        };

        let err = Snapshot::load(&source, &ArtifactNames::default())
            .await
            .err()
            .unwrap();
        match err {
            Error::LoadFailure { artifact, .. } => assert_eq!(artifact, "model.json"),
            other => panic!("expected load failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ragged_embeddings_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());
        write_json(
            dir.path(),
            "embeddings.json",
            json!([
                {"item_id": 10, "vector": [1.0, 0.0]},
                {"item_id": 11, "vector": [1.0]}
            ]),
        );
        let source = BlobSource::Local {
            root: dir.path().to_path_buf(),
        };

        let err = Snapshot::load(&source, &ArtifactNames::default())
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("embeddings.json"));
    }
}
