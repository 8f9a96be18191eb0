//! Item content embeddings.

use crate::{Error, ItemId, Result, Vector};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Wire form of one embedding row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingRecord {
    pub item_id: ItemId,
    pub vector: Vector,
}

/// An embedding with its norm precomputed
#[derive(Debug, Clone)]
pub struct Embedding {
    vector: Vector,
    norm: f32,
}

impl Embedding {
    pub fn new(vector: Vector) -> Self {
        let norm = vector.norm();
        Self { vector, norm }
    }

    #[inline]
    pub fn vector(&self) -> &Vector {
        &self.vector
    }

    #[inline]
    pub fn norm(&self) -> f32 {
        self.norm
    }

    /// Cosine similarity reusing both cached norms
    #[inline]
    pub fn similarity(&self, other: &Embedding) -> f32 {
        if self.norm == 0.0 || other.norm == 0.0 {
            return 0.0;
        }
        self.vector.dot(&other.vector) / (self.norm * other.norm)
    }
}

/// Item id to embedding mapping. All vectors share one dimension.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingTable {
    dim: Option<usize>,
    entries: AHashMap<ItemId, Embedding>,
}

impl EmbeddingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table, rejecting mixed dimensions, duplicates and non-finite values
    pub fn from_records<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = EmbeddingRecord>,
    {
        let mut table = Self::new();
        for record in records {
            table.insert(record.item_id, record.vector)?;
        }
        Ok(table)
    }

    pub fn insert(&mut self, item_id: ItemId, vector: Vector) -> Result<()> {
        if vector.is_empty() {
            return Err(Error::load_failure(
                "embeddings",
                format!("empty embedding for item {}", item_id),
            ));
        }
        let expected = self.dim.unwrap_or(vector.dim());
        if vector.dim() != expected {
            return Err(Error::InvalidDimension {
                item_id,
                expected,
                actual: vector.dim(),
            });
        }
        if !vector.is_finite() {
            return Err(Error::load_failure(
                "embeddings",
                format!("non-finite value in embedding for item {}", item_id),
            ));
        }
        if self.entries.contains_key(&item_id) {
            return Err(Error::DuplicateEmbedding(item_id));
        }
        self.dim = Some(expected);
        self.entries.insert(item_id, Embedding::new(vector));
        Ok(())
    }

    #[inline]
    pub fn get(&self, item_id: ItemId) -> Option<&Embedding> {
        self.entries.get(&item_id)
    }

    #[inline]
    pub fn contains(&self, item_id: ItemId) -> bool {
        self.entries.contains_key(&item_id)
    }

    /// Shared vector dimension, `None` while empty
    pub fn dim(&self) -> Option<usize> {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
