use bevy::math::{Mat4, Quat, Rect, Vec2, Vec3};
use constants::artwork_layout::{BACKDROP_DEPTH_OFFSET, BACKDROP_SCALE, CONTENT_SCALE, ICON_SIZE};
use constants::placement::DEFAULT_ZOOM;
use constants::render_settings::BACKDROP_COLOUR;
use std::collections::BTreeMap;
use std::fmt;

use super::collaborators::ArtworkContent;
use super::config::{Rgba, SlotContent, SubnodeSlot};
use crate::model::{AnchorId, ArtworkDescriptor, ContentSize, PlacementAnchor};
use crate::projection::{self, CameraFrame};

/// Controller-assigned handle for a live artwork node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisualState {
    #[default]
    None,
    Placing,
    Selected,
}

/// Local-space sizes and subnode positions for one artwork.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArtworkLayout {
    pub backdrop_size: Vec2,
    pub content_size: Vec2,
    pub backdrop_offset: Vec3,
    pub arrow: Vec3,
    pub link: Vec3,
    pub reorder: Vec3,
    pub zoom: Vec3,
}

impl ArtworkLayout {
    pub fn for_content(size: ContentSize) -> Self {
        let backdrop_size = size.unit() * BACKDROP_SCALE;
        let content_size = backdrop_size * CONTENT_SCALE;
        let half_icon = ICON_SIZE * 0.5;

        let above = backdrop_size.y * 0.5 + half_icon;
        let icon_inset = content_size.x * 0.5 - half_icon;

        Self {
            backdrop_size,
            content_size,
            backdrop_offset: Vec3::new(0.0, 0.0, BACKDROP_DEPTH_OFFSET),
            arrow: Vec3::new(0.0, -above, 0.0),
            link: Vec3::new(-icon_inset, above, 0.0),
            reorder: Vec3::new(icon_inset, above, 0.0),
            zoom: Vec3::new(backdrop_size.x * 0.5 + ICON_SIZE, 0.0, 0.0),
        }
    }

    /// Position of a subnode in the artwork's local space.
    pub fn position(&self, slot: SubnodeSlot) -> Vec3 {
        match slot {
            SubnodeSlot::ArtworkPlaceholder => Vec3::ZERO,
            SubnodeSlot::Arrow => self.arrow,
            SubnodeSlot::Link => self.link,
            SubnodeSlot::Reorder => self.reorder,
            SubnodeSlot::Zoom => self.zoom,
        }
    }
}

/// A live artwork in the scene: either the placing node or one synthesised
/// from a committed anchor.
#[derive(Debug, Clone)]
pub struct ArtworkNode {
    id: NodeId,
    descriptor: ArtworkDescriptor,
    layout: ArtworkLayout,
    slot_content: BTreeMap<SubnodeSlot, SlotContent>,
    content: Option<ArtworkContent>,
    pub translation: Vec3,
    pub rotation: Quat,
    zoom: f32,
    state: VisualState,
    anchor: Option<AnchorId>,
    pub(crate) in_scene: bool,
}

impl ArtworkNode {
    pub fn new(id: NodeId, descriptor: ArtworkDescriptor, slot_content: BTreeMap<SubnodeSlot, SlotContent>) -> Self {
        let layout = ArtworkLayout::for_content(descriptor.content_size);
        Self {
            id,
            descriptor,
            layout,
            slot_content,
            content: None,
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            zoom: DEFAULT_ZOOM,
            state: VisualState::None,
            anchor: None,
            in_scene: false,
        }
    }

    /// Node backed by a committed anchor, posed at the anchor's transform.
    pub fn from_anchor(
        id: NodeId,
        anchor: &PlacementAnchor,
        slot_content: BTreeMap<SubnodeSlot, SlotContent>,
    ) -> Self {
        let mut node = Self::new(id, anchor.descriptor.clone(), slot_content);
        (node.rotation, node.translation) = anchor.pose();
        node.zoom = anchor.zoom;
        node.anchor = anchor.id;
        node
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn descriptor(&self) -> &ArtworkDescriptor {
        &self.descriptor
    }

    pub fn layout(&self) -> &ArtworkLayout {
        &self.layout
    }

    pub fn slot_content(&self, slot: SubnodeSlot) -> &SlotContent {
        self.slot_content.get(&slot).unwrap_or(&SlotContent::None)
    }

    /// Fetched artwork content, once it has arrived.
    pub fn content(&self) -> Option<&ArtworkContent> {
        self.content.as_ref()
    }

    pub(crate) fn set_content(&mut self, content: ArtworkContent) {
        self.content = Some(content);
    }

    pub fn anchor(&self) -> Option<AnchorId> {
        self.anchor
    }

    pub fn is_in_scene(&self) -> bool {
        self.in_scene
    }

    pub fn state(&self) -> VisualState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: VisualState) {
        self.state = state;
    }

    /// Uniform scale of the content plane only. Backdrop and icons keep their size.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub(crate) fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom;
    }

    pub fn world_transform(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.translation)
    }

    pub fn set_transform(&mut self, transform: Mat4) {
        let (_, rotation, translation) = transform.to_scale_rotation_translation();
        self.rotation = rotation;
        self.translation = translation;
    }

    pub fn backdrop_visible(&self) -> bool {
        self.state == VisualState::Placing
    }

    /// Translucent grey shown behind the artwork while placing.
    pub fn backdrop_colour(&self) -> Rgba {
        if self.backdrop_visible() {
            Rgba::from_array(BACKDROP_COLOUR)
        } else {
            Rgba::CLEAR
        }
    }

    pub fn subnode_visible(&self, slot: SubnodeSlot) -> bool {
        match slot {
            SubnodeSlot::ArtworkPlaceholder => true,
            SubnodeSlot::Arrow => self.state != VisualState::None,
            SubnodeSlot::Link | SubnodeSlot::Reorder => self.state == VisualState::Selected,
            SubnodeSlot::Zoom => true,
        }
    }

    pub fn subnode_world_position(&self, slot: SubnodeSlot) -> Vec3 {
        self.world_transform().transform_point3(self.layout.position(slot))
    }

    pub fn world_center(&self) -> Vec3 {
        self.translation
    }

    /// Viewport rect covered by the backdrop, projected corner by corner.
    pub fn screen_rect(&self, frame: &CameraFrame) -> Option<Rect> {
        projection::screen_rect(
            frame,
            self.world_transform(),
            self.layout.position(SubnodeSlot::ArtworkPlaceholder),
            self.layout.backdrop_size * 0.5,
        )
    }

    pub fn is_hit(&self, frame: &CameraFrame, point: Vec2) -> bool {
        self.screen_rect(frame).is_some_and(|rect| rect.contains(point))
    }
}
