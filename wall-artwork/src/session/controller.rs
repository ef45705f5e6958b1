use bevy::log::{debug, info, warn};
use bevy::math::{Mat4, Quat, Vec2};
use constants::placement::{WALL_FLIP_ANGLE, WALL_OFFSET};
use constants::render_settings::SNAPSHOT_CROP_MARGIN;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use super::collaborators::{
    ArSurface, CapturedImage, ContentFetcher, PlaneId, SceneRenderer, TrackingConfig, TrackingSession,
};
use super::config::SessionConfig;
use super::content::ContentLoader;
use super::events::SessionEvent;
use super::node::{ArtworkNode, NodeId, VisualState};
use crate::device;
use crate::error::{BindError, BindRejected, MapError};
use crate::map;
use crate::model::{AnchorId, ArtworkDescriptor, PlacementAnchor};
use crate::projection::{self, CameraFrame};

/// Coordinates wall artwork placement on a bound AR surface.
///
/// All methods run on the controlling context. The surface delivers its
/// callbacks (`on_frame`, `on_tap`, anchor and coaching notifications) on
/// that same context, so placement state never has concurrent writers.
pub struct WallArtworkControl {
    surface: Option<Box<dyn ArSurface>>,
    config: SessionConfig,
    content: ContentLoader,
    fetcher: Arc<dyn ContentFetcher>,
    nodes: BTreeMap<NodeId, ArtworkNode>,
    next_node: u64,
    placing: Option<NodeId>,
    selected: Option<NodeId>,
    camera: Option<CameraFrame>,
    zooming: bool,
    events: Vec<SessionEvent>,
}

impl WallArtworkControl {
    pub fn new(fetcher: Arc<dyn ContentFetcher>) -> Self {
        Self {
            surface: None,
            config: SessionConfig::default(),
            content: ContentLoader::new(Arc::clone(&fetcher)),
            fetcher,
            nodes: BTreeMap::new(),
            next_node: 1,
            placing: None,
            selected: None,
            camera: None,
            zooming: false,
            events: Vec::new(),
        }
    }

    pub fn is_bound(&self) -> bool {
        self.surface.is_some()
    }

    /// Starts vertical wall tracking on `surface`.
    ///
    /// Fails without touching the surface when already bound or when the
    /// hardware cannot detect planes. The surface comes back in the error.
    pub fn bind(&mut self, mut surface: Box<dyn ArSurface>, config: SessionConfig) -> Result<(), BindRejected> {
        let refused = if self.surface.is_some() {
            Some(BindError::AlreadyBound)
        } else {
            device::check(&surface.device_identifier()).err().map(BindError::from)
        };
        if let Some(error) = refused {
            warn!("Refusing bind: {}", error);
            return Err(BindRejected { error, surface });
        }

        let restored = config.initial_snapshot.as_ref().map_or(0, |s| s.anchor_count());
        surface.run(TrackingConfig {
            vertical_plane_detection: true,
            scene_reconstruction: false,
            initial_snapshot: config.initial_snapshot.clone(),
        });
        surface.install_coaching(config.auto_coaching);

        self.config = config;
        self.surface = Some(surface);
        info!("Bound to AR surface, restoring {} anchors", restored);
        Ok(())
    }

    /// Detaches from the surface and hands it back. The placing node is
    /// discarded without being committed.
    pub fn unbind(&mut self) -> Option<Box<dyn ArSurface>> {
        let mut surface = self.surface.take()?;

        for node in self.nodes.values().filter(|n| n.in_scene) {
            surface.detach_node(node.id());
        }
        surface.detach();

        self.nodes.clear();
        self.placing = None;
        self.selected = None;
        self.camera = None;
        self.zooming = false;
        info!("Unbound from AR surface");
        Some(surface)
    }

    /// Reads the snapshot named in `config.storage.load_from`, if any, into
    /// `config.initial_snapshot` so the next [`bind`](Self::bind) restores it.
    pub async fn load_configured_snapshot(&self, config: SessionConfig) -> Result<SessionConfig, MapError> {
        let Some(source) = config.storage.load_from.clone() else {
            return Ok(config);
        };
        let snapshot = map::load(&source, self.fetcher.as_ref()).await?;
        Ok(config.with_initial_snapshot(snapshot))
    }

    pub fn placing_node(&self) -> Option<&ArtworkNode> {
        self.placing.and_then(|id| self.nodes.get(&id))
    }

    pub fn selected_node(&self) -> Option<&ArtworkNode> {
        self.selected.and_then(|id| self.nodes.get(&id))
    }

    pub fn node(&self, id: NodeId) -> Option<&ArtworkNode> {
        self.nodes.get(&id)
    }

    /// Every live node, the placing node included.
    pub fn nodes(&self) -> impl Iterator<Item = &ArtworkNode> {
        self.nodes.values()
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Marks a zoom gesture as in progress. Frame updates leave the placing
    /// node and the overlay alone meanwhile.
    pub fn set_zooming(&mut self, zooming: bool) {
        self.zooming = zooming;
    }

    /// Starts placing `descriptor` at the viewport centre. Replaces any
    /// uncommitted placing node.
    pub fn place_new_artwork(&mut self, descriptor: ArtworkDescriptor) {
        if self.surface.is_none() {
            warn!("Ignoring placement of {}, not bound", descriptor.content_link);
            return;
        }
        self.start_placing(descriptor, None);
    }

    /// Commits the placing node as an anchor at its current transform.
    pub fn add_active_node(&mut self) {
        let Some(id) = self.placing else {
            return;
        };
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let anchor = PlacementAnchor::new(node.world_transform(), node.descriptor().clone()).with_zoom(node.zoom());

        if let Some(surface) = self.surface.as_deref_mut() {
            let anchor_id = surface.add_anchor(anchor);
            info!("Committed {} as {}", id, anchor_id);
        }

        self.select(None);
        self.placing = None;
        self.remove_node(id);
    }

    /// Drops the placing node without creating an anchor.
    pub fn remove_active_node(&mut self) {
        if self.placing.is_none() {
            return;
        }
        self.select(None);
        self.discard_placing();
    }

    /// Picks up the live artwork matching `descriptor` for placement.
    ///
    /// An anchored artwork loses its anchor and a new placing node starts at
    /// the anchor's transform and zoom. Returns `false` when no live node
    /// shows `descriptor`.
    pub fn reorder_artwork(&mut self, descriptor: &ArtworkDescriptor) -> bool {
        let Some(found) = self.nodes.values().find(|n| n.descriptor() == descriptor) else {
            return false;
        };
        let (id, anchor) = (found.id(), found.anchor());

        self.select(None);

        let Some(anchor_id) = anchor else {
            if self.placing != Some(id) {
                self.discard_placing();
                self.placing = Some(id);
            }
            self.select(Some(id));
            return true;
        };

        let node = self.remove_node(id);
        // Not atomic: the anchor is gone before the new placing node exists.
        let removed = self
            .surface
            .as_deref_mut()
            .and_then(|s| s.remove_anchor(anchor_id));
        let pose = match (removed, node) {
            (Some(anchor), _) => (anchor.transform, anchor.zoom),
            (None, Some(node)) => (node.world_transform(), node.zoom()),
            (None, None) => return true,
        };

        self.start_placing(descriptor.clone(), Some(pose));
        info!("Reordering {}, removed {}", descriptor.content_link, anchor_id);
        true
    }

    pub fn reorder_selected_artwork(&mut self) -> bool {
        let Some(descriptor) = self.selected_node().map(|n| n.descriptor().clone()) else {
            return false;
        };
        self.reorder_artwork(&descriptor)
    }

    /// External link of the selected artwork, for the UI to open.
    pub fn selected_external_link(&self) -> Option<&str> {
        self.selected_node()
            .map(|n| n.descriptor().external_link.as_str())
            .filter(|link| !link.is_empty())
    }

    /// Scales the selected artwork's content. Anchored artworks keep the new
    /// zoom in their anchor so it is saved with the scene.
    pub fn zoom_selected_artwork(&mut self, percent: f32) -> bool {
        let Some(id) = self.selected else {
            return false;
        };
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        node.set_zoom(percent);

        if let (Some(anchor), Some(surface)) = (node.anchor(), self.surface.as_deref_mut()) {
            if !surface.set_anchor_zoom(anchor, percent) {
                warn!("{} has no live anchor {}, zoom not persisted", id, anchor);
            }
        }
        self.refresh(id);
        true
    }

    /// Captures the rendered view.
    ///
    /// With a selection, or a single artwork on screen, the capture is
    /// cropped around that artwork and its descriptor is returned with it.
    /// An artwork that lies outside the viewport gets the full view.
    pub fn snapshot(&mut self) -> Option<(CapturedImage, Option<ArtworkDescriptor>)> {
        self.surface.as_ref()?;

        let target = self.selected.and_then(|id| self.nodes.get(&id)).or_else(|| {
            let mut rendered = self.nodes.values().filter(|n| n.in_scene);
            match (rendered.next(), rendered.next()) {
                (Some(only), None) => Some(only),
                _ => None,
            }
        });

        let Some(node) = target else {
            let surface = self.surface.as_deref_mut()?;
            return Some((surface.capture(None), None));
        };

        let crop = self.camera.and_then(|frame| {
            node.screen_rect(&frame)
                .and_then(|rect| projection::inflate_within(rect, SNAPSHOT_CROP_MARGIN, frame.viewport))
        });
        let descriptor = node.descriptor().clone();
        let surface = self.surface.as_deref_mut()?;
        Some((surface.capture(crop), Some(descriptor)))
    }

    /// Saves the live environment to `destination`.
    pub async fn save_scene(&self, destination: &Path) -> Result<(), MapError> {
        let Some(surface) = self.surface.as_deref() else {
            return Err(MapError::SessionUnavailable);
        };
        map::save(surface, destination).await
    }

    /// Saves to `config.storage.save_to`. `Ok(false)` when saving is disabled.
    pub async fn save_configured_scene(&self) -> Result<bool, MapError> {
        let Some(destination) = self.config.storage.save_to.as_deref() else {
            return Ok(false);
        };
        self.save_scene(destination).await?;
        Ok(true)
    }

    /// Per-frame update from the tracking session.
    pub fn on_frame(&mut self, frame: CameraFrame) {
        self.camera = Some(frame);
        self.pump_content();

        if self.zooming {
            return;
        }

        self.track_placing_node(&frame);
        self.update_overlay(&frame);
    }

    /// Selects the artwork under `point`, or clears the selection.
    /// Ignored while placing.
    pub fn on_tap(&mut self, point: Vec2) {
        if self.placing.is_some() {
            return;
        }
        let Some(frame) = self.camera else {
            self.select(None);
            return;
        };

        // Overlapping artworks resolve to the one nearest the camera.
        let hit = self
            .nodes
            .values()
            .filter(|n| n.in_scene && n.is_hit(&frame, point))
            .filter_map(|n| frame.depth(n.world_center()).map(|depth| (depth, n.id())))
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
            .map(|(_, id)| id);

        self.select(hit);
    }

    /// The session added an anchor, either committed here or restored from
    /// a snapshot. Synthesises the node that shows it.
    pub fn on_anchor_added(&mut self, anchor: &PlacementAnchor) {
        self.hide_coaching_on_detection();

        let Some(anchor_id) = anchor.id else {
            warn!("Ignoring anchor without an id for {}", anchor.descriptor.content_link);
            return;
        };
        if self.node_for_anchor(anchor_id).is_some() {
            return;
        }

        let id = self.allocate_node();
        let node = ArtworkNode::from_anchor(id, anchor, self.config.resolve_subnode_content());
        self.insert_node(node);
        self.attach(id);
        debug!("{} shows {}", id, anchor_id);
    }

    pub fn on_anchor_updated(&mut self, anchor: &PlacementAnchor) {
        let Some(id) = anchor.id.and_then(|a| self.node_for_anchor(a)) else {
            return;
        };
        if let Some(node) = self.nodes.get_mut(&id) {
            (node.rotation, node.translation) = anchor.pose();
            node.set_zoom(anchor.zoom);
        }
        self.refresh(id);
    }

    pub fn on_anchor_removed(&mut self, anchor: AnchorId) {
        let Some(id) = self.node_for_anchor(anchor) else {
            return;
        };
        if self.selected == Some(id) {
            self.select(None);
        }
        self.remove_node(id);
    }

    pub fn on_plane_detected(&mut self, plane: PlaneId) {
        self.hide_coaching_on_detection();

        if let (Some(colour), Some(surface)) = (self.config.plane_visualization, self.surface.as_deref_mut()) {
            surface.visualize_plane(plane, colour);
        }
    }

    /// Coaching is about to show. The placing node leaves the scene until it ends.
    pub fn on_coaching_activated(&mut self) {
        self.events.push(SessionEvent::CoachingVisibilityChanged(true));
        if let Some(id) = self.placing {
            self.detach(id);
        }
    }

    pub fn on_coaching_deactivated(&mut self) {
        self.events.push(SessionEvent::CoachingVisibilityChanged(false));
        if let Some(id) = self.placing {
            self.attach(id);
        }
    }

    /// Applies content fetched since the last call. Content for nodes that
    /// were discarded meanwhile is dropped.
    pub fn pump_content(&mut self) {
        for delivery in self.content.drain() {
            let live = self
                .nodes
                .get_mut(&delivery.node)
                .filter(|n| n.descriptor().content_link == delivery.content_link);
            let Some(node) = live else {
                warn!("Dropping content for discarded {}", delivery.node);
                continue;
            };
            node.set_content(delivery.content.clone());
            if let (true, Some(surface)) = (node.in_scene, self.surface.as_deref_mut()) {
                surface.apply_content(delivery.node, &delivery.content);
            }
        }
    }

    fn track_placing_node(&mut self, frame: &CameraFrame) {
        let Some(id) = self.placing else {
            return;
        };
        let Some(surface) = self.surface.as_deref() else {
            return;
        };
        let Some(hit) = surface
            .raycast(frame.viewport_center(), self.config.allowed_raycast_target)
            .last()
            .copied()
        else {
            return;
        };

        if let Some(node) = self.nodes.get_mut(&id) {
            node.rotation = hit.rotation * Quat::from_rotation_x(WALL_FLIP_ANGLE);
            node.translation = hit.position + hit.normal * WALL_OFFSET;
        }
        self.refresh(id);
    }

    fn update_overlay(&mut self, frame: &CameraFrame) {
        if self.config.overlay_subnodes.is_empty() {
            return;
        }
        let Some(node) = self.placing.or(self.selected).and_then(|id| self.nodes.get(&id)) else {
            return;
        };

        let points = self
            .config
            .overlay_subnodes
            .iter()
            .filter_map(|slot| frame.project(node.subnode_world_position(*slot)).map(|p| (*slot, p)))
            .collect();

        self.events.push(SessionEvent::OverlayPointsUpdated {
            descriptor: node.descriptor().clone(),
            points,
        });
    }

    fn start_placing(&mut self, descriptor: ArtworkDescriptor, pose: Option<(Mat4, f32)>) {
        self.discard_placing();

        let id = self.allocate_node();
        let mut node = ArtworkNode::new(id, descriptor, self.config.resolve_subnode_content());
        if let Some((transform, zoom)) = pose {
            node.set_transform(transform);
            node.set_zoom(zoom);
        }
        self.insert_node(node);
        self.placing = Some(id);
        self.select(Some(id));

        // Held out of the scene while coaching shows.
        let coaching = self.surface.as_deref().is_some_and(|s| s.is_coaching_active());
        if !coaching {
            self.attach(id);
        }
    }

    fn select(&mut self, id: Option<NodeId>) {
        if self.selected == id {
            return;
        }
        let placing = self.placing == id;

        if let Some(previous) = self.selected {
            if let Some(node) = self.nodes.get_mut(&previous) {
                node.set_state(VisualState::None);
            }
            self.refresh(previous);
        }
        self.selected = id;

        let Some(node) = id.and_then(|id| self.nodes.get_mut(&id)) else {
            self.events.push(SessionEvent::ArtworkDeselected);
            return;
        };
        node.set_state(if placing { VisualState::Placing } else { VisualState::Selected });
        self.events.push(SessionEvent::ArtworkSelected {
            descriptor: node.descriptor().clone(),
            placing,
            zoom: node.zoom(),
        });
        let id = node.id();
        self.refresh(id);
    }

    fn hide_coaching_on_detection(&mut self) {
        if self.config.auto_coaching {
            return;
        }
        if let Some(surface) = self.surface.as_deref_mut() {
            if surface.is_coaching_active() {
                surface.hide_coaching();
            }
        }
    }

    fn discard_placing(&mut self) {
        if let Some(id) = self.placing.take() {
            self.remove_node(id);
        }
    }

    fn allocate_node(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        id
    }

    /// Registers a node and starts loading its content.
    fn insert_node(&mut self, mut node: ArtworkNode) {
        if let Some(content) = self.content.request(node.id(), node.descriptor()) {
            node.set_content(content);
        }
        self.nodes.insert(node.id(), node);
    }

    fn remove_node(&mut self, id: NodeId) -> Option<ArtworkNode> {
        let node = self.nodes.remove(&id)?;
        if let (true, Some(surface)) = (node.in_scene, self.surface.as_deref_mut()) {
            surface.detach_node(id);
        }
        Some(node)
    }

    fn node_for_anchor(&self, anchor: AnchorId) -> Option<NodeId> {
        self.nodes
            .values()
            .find(|n| n.anchor() == Some(anchor))
            .map(|n| n.id())
    }

    fn attach(&mut self, id: NodeId) {
        let (Some(node), Some(surface)) = (self.nodes.get_mut(&id), self.surface.as_deref_mut()) else {
            return;
        };
        if !node.in_scene {
            node.in_scene = true;
            surface.attach_node(node);
        }
    }

    fn detach(&mut self, id: NodeId) {
        let (Some(node), Some(surface)) = (self.nodes.get_mut(&id), self.surface.as_deref_mut()) else {
            return;
        };
        if node.in_scene {
            node.in_scene = false;
            surface.detach_node(id);
        }
    }

    fn refresh(&mut self, id: NodeId) {
        if let (Some(node), Some(surface)) = (self.nodes.get(&id), self.surface.as_deref_mut()) {
            if node.in_scene {
                surface.update_node(node);
            }
        }
    }
}
