//! The wall artwork session: configuration, node geometry, collaborator
//! traits and the controller that ties them together.

pub mod collaborators;
pub mod config;
pub mod content;
pub mod controller;
pub mod events;
pub mod node;

pub use collaborators::{
    ArSurface, ArtworkContent, CapturedImage, ContentFetcher, FileFetcher, PlaneId, SceneRenderer, TrackingConfig,
    TrackingSession, WorldHit,
};
pub use config::{ImageHandle, RaycastTarget, Rgba, SessionConfig, SlotContent, StorageConfig, SubnodeSlot};
pub use controller::WallArtworkControl;
pub use events::SessionEvent;
pub use node::{ArtworkLayout, ArtworkNode, NodeId, VisualState};
