//! Persisted value types: artwork descriptors, placement anchors and
//! environment snapshots.

pub mod anchor;
pub mod artwork;
pub mod snapshot;

pub use anchor::{AnchorId, PlacementAnchor};
pub use artwork::{ArtworkDescriptor, ContentSize, ContentType};
pub use snapshot::EnvironmentSnapshot;
