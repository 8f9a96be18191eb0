//! # hybridrec Storage
//!
//! Loads the recommender's artifacts (click log, item embeddings, factor
//! model) from a blob source and serves them as one immutable [`Snapshot`].

pub mod codec;
pub mod manager;
pub mod snapshot;
pub mod source;

pub use codec::{checksum, decode, ArtifactEncoding, ArtifactFormat};
pub use manager::{SnapshotManager, SnapshotStatus};
pub use snapshot::{ArtifactNames, Snapshot, SnapshotInfo};
pub use source::BlobSource;
