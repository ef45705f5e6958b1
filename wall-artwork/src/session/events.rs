use bevy::math::Vec2;
use std::collections::BTreeMap;

use super::config::SubnodeSlot;
use crate::model::ArtworkDescriptor;

/// Notifications for the host UI, drained with
/// [`WallArtworkControl::drain_events`](super::WallArtworkControl::drain_events).
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    CoachingVisibilityChanged(bool),
    ArtworkSelected {
        descriptor: ArtworkDescriptor,
        /// `true` for the uncommitted placing node.
        placing: bool,
        zoom: f32,
    },
    ArtworkDeselected,
    /// Viewport positions of the configured overlay subnodes of the
    /// selected node. Subnodes behind the camera are left out.
    OverlayPointsUpdated {
        descriptor: ArtworkDescriptor,
        points: BTreeMap<SubnodeSlot, Vec2>,
    },
}
