//! # hybridrec
//!
//! Recommends unseen content items by combining a pretrained
//! collaborative-filtering estimate with content-embedding similarity.
//!
//! For every item the user has not clicked yet, the model estimate is
//! multiplied by the item's best cosine similarity to anything in the user's
//! click history, and the top N items are returned. Users without a usable
//! history are ranked by the model estimate alone.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! hybridrec --source ./data --http-port 7071
//! curl 'http://localhost:7071/api/recommend?user_id=42&n=5'
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use hybridrec::prelude::*;
//!
//! let interactions = InteractionStore::from_pairs([(1, 10), (2, 11), (2, 12)]);
//! let embeddings = EmbeddingTable::from_records([
//!     EmbeddingRecord { item_id: 10, vector: Vector::new(vec![1.0, 0.0]) },
//!     EmbeddingRecord { item_id: 11, vector: Vector::new(vec![0.0, 1.0]) },
//!     EmbeddingRecord { item_id: 12, vector: Vector::new(vec![1.0, 0.1]) },
//! ])
//! .unwrap();
//! let model = |_user: UserId, _item: ItemId| -> f32 { 4.0 };
//!
//! let items = Recommender::new(&interactions, &embeddings, &model).recommend(1, 5);
//! assert_eq!(items, vec![12, 11]);
//! ```
//!
//! ## Crate Structure
//!
//! - `hybridrec-core` - tables, predictor contract and the ranking routine
//! - `hybridrec-storage` - artifact fetching, decoding and snapshot swaps
//! - `hybridrec-api` - actix-web REST endpoints

// Re-export core types
pub use hybridrec_core::{
    recommend, Candidate, Embedding, EmbeddingRecord, EmbeddingTable, Error, FactorModel,
    Interaction, InteractionStore, ItemId, Predictor, RatingScale, Recommender, Result, UserId,
    Vector, DEFAULT_TOP_N,
};

// Re-export storage
pub use hybridrec_storage::{ArtifactNames, BlobSource, Snapshot, SnapshotInfo, SnapshotManager};

// Re-export API
pub use hybridrec_api::{ApiConfig, ApiError, RestApi};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        recommend, ApiConfig, ArtifactNames, BlobSource, EmbeddingRecord, EmbeddingTable, Error,
        FactorModel, Interaction, InteractionStore, ItemId, Predictor, RatingScale, Recommender,
        Result, RestApi, Snapshot, SnapshotManager, UserId, Vector,
    };
}

/// SIMD-optimized vector operations
pub mod simd {
    pub use hybridrec_core::simd::{dot_product_simd, norm_simd};
}
