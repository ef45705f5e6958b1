//! Core of the AR wall artwork feature.
//!
//! Artworks are placed on detected vertical walls, committed as anchors in
//! the tracking session and persisted together with the scanned environment.
//! The platform tracking and rendering engines stay behind the traits in
//! [`session::collaborators`]; everything here is plain state and math.

pub mod device;
pub mod error;
pub mod map;
pub mod model;
pub mod projection;
pub mod session;

pub use error::{BindError, BindRejected, ConfigError, DeviceError, FetchError, MapError, SessionError};
pub use map::MapSource;
pub use model::{AnchorId, ArtworkDescriptor, ContentSize, ContentType, EnvironmentSnapshot, PlacementAnchor};
pub use projection::CameraFrame;
pub use session::{SessionConfig, SessionEvent, WallArtworkControl};
