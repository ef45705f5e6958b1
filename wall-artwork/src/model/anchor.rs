use bevy::math::{Mat4, Quat, Vec3};
use constants::placement::DEFAULT_ZOOM;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::artwork::ArtworkDescriptor;

/// Handle the tracking session assigns to an anchor when it is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnchorId(pub u64);

impl fmt::Display for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "anchor#{}", self.0)
    }
}

/// One physically placed artwork, owned by the tracking session's anchor set.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementAnchor {
    /// `None` until the tracking session has accepted the anchor.
    pub id: Option<AnchorId>,
    pub transform: Mat4,
    pub descriptor: ArtworkDescriptor,
    pub zoom: f32,
}

impl PlacementAnchor {
    pub fn new(transform: Mat4, descriptor: ArtworkDescriptor) -> Self {
        Self {
            id: None,
            transform,
            descriptor,
            zoom: DEFAULT_ZOOM,
        }
    }

    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }

    /// Rotation and translation of the rigid transform. Scale is ignored.
    pub fn pose(&self) -> (Quat, Vec3) {
        let (_, rotation, translation) = self.transform.to_scale_rotation_translation();
        (rotation, translation)
    }
}
