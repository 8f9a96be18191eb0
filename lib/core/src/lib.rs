//! # hybridrec Core
//!
//! Core library for the hybridrec recommender.
//!
//! This crate provides the in-memory tables and the ranking routine:
//!
//! - [`InteractionStore`] - click history with per-user seen sets
//! - [`EmbeddingTable`] - item id to content vector mapping
//! - [`Predictor`] / [`FactorModel`] - collaborative-filtering estimates
//! - [`Recommender`] - fuses the estimate with content similarity and ranks
//!
//! ## Example
//!
//! ```rust
//! use hybridrec_core::{
//!     recommend, EmbeddingRecord, EmbeddingTable, InteractionStore, ItemId, UserId, Vector,
//! };
//!
//! let interactions = InteractionStore::from_pairs([(1, 10), (1, 11)]);
//! let embeddings = EmbeddingTable::from_records([
//!     EmbeddingRecord { item_id: 10, vector: Vector::new(vec![1.0, 0.0]) },
//!     EmbeddingRecord { item_id: 11, vector: Vector::new(vec![1.0, 0.0]) },
//!     EmbeddingRecord { item_id: 12, vector: Vector::new(vec![0.0, 1.0]) },
//!     EmbeddingRecord { item_id: 13, vector: Vector::new(vec![0.9, 0.1]) },
//! ])
//! .unwrap();
//! let model = |_user: UserId, _item: ItemId| -> f32 { 0.8 };
//!
//! let items = recommend(1, &interactions, &embeddings, &model, 5);
//! assert_eq!(items, vec![13, 12]);
//! ```

pub mod embeddings;
pub mod error;
pub mod interactions;
pub mod model;
pub mod recommender;
pub mod vector;

/// SIMD-accelerated dot product and norm
///
/// - AVX2/FMA on x86_64
/// - NEON on ARM64/Apple Silicon
pub mod simd;

/// User identifier as it appears in the click log
pub type UserId = u64;

/// Content item identifier
pub type ItemId = u64;

pub use embeddings::{Embedding, EmbeddingRecord, EmbeddingTable};
pub use error::{Error, Result};
pub use interactions::{Interaction, InteractionStore};
pub use model::{FactorModel, Predictor, RatingScale};
pub use recommender::{recommend, Candidate, Recommender, DEFAULT_TOP_N};
pub use vector::Vector;
