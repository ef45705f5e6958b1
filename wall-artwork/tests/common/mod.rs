#![allow(dead_code)]

use async_trait::async_trait;
use bevy::math::{Quat, Rect, Vec2, Vec3};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::f32::consts::{FRAC_PI_2, PI};
use std::rc::Rc;
use std::sync::Arc;

use wall_artwork::error::{FetchError, SessionError};
use wall_artwork::session::{
    ArtworkContent, ArtworkNode, CapturedImage, ContentFetcher, NodeId, PlaneId, RaycastTarget, Rgba, SceneRenderer,
    TrackingConfig, TrackingSession, WorldHit,
};
use wall_artwork::{
    AnchorId, ArtworkDescriptor, CameraFrame, ContentSize, ContentType, EnvironmentSnapshot, PlacementAnchor,
    WallArtworkControl,
};

/// Everything the fake surface records, shared with the test body.
#[derive(Debug)]
pub struct FakeState {
    pub device: String,
    pub runs: Vec<TrackingConfig>,
    pub detached: bool,
    pub hits: Vec<WorldHit>,
    pub anchors: BTreeMap<AnchorId, PlacementAnchor>,
    pub next_anchor: u64,
    /// Added anchors not yet reported back to the controller.
    pub pending_added: Vec<AnchorId>,
    /// `None` means the session has nothing mapped yet.
    pub features: Option<Vec<u8>>,
    pub coaching_on_install: bool,
    pub coaching_installed: Option<bool>,
    pub coaching_active: bool,
    pub coaching_hides: usize,
    pub attached: BTreeSet<NodeId>,
    pub updates: usize,
    pub applied: Vec<(NodeId, ArtworkContent)>,
    pub planes: Vec<(PlaneId, Rgba)>,
    pub captures: Vec<Option<Rect>>,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            device: "iPhone12,1".into(),
            runs: Vec::new(),
            detached: false,
            hits: Vec::new(),
            anchors: BTreeMap::new(),
            next_anchor: 1,
            pending_added: Vec::new(),
            features: Some(vec![7; 64]),
            coaching_on_install: false,
            coaching_installed: None,
            coaching_active: false,
            coaching_hides: 0,
            attached: BTreeSet::new(),
            updates: 0,
            applied: Vec::new(),
            planes: Vec::new(),
            captures: Vec::new(),
        }
    }
}

pub struct FakeSurface {
    pub state: Rc<RefCell<FakeState>>,
}

impl FakeSurface {
    pub fn new() -> (Box<Self>, Rc<RefCell<FakeState>>) {
        Self::with_state(FakeState::default())
    }

    pub fn with_state(state: FakeState) -> (Box<Self>, Rc<RefCell<FakeState>>) {
        let state = Rc::new(RefCell::new(state));
        (Box::new(Self { state: Rc::clone(&state) }), state)
    }
}

#[async_trait(?Send)]
impl TrackingSession for FakeSurface {
    fn device_identifier(&self) -> String {
        self.state.borrow().device.clone()
    }

    fn run(&mut self, config: TrackingConfig) {
        self.state.borrow_mut().runs.push(config);
    }

    fn detach(&mut self) {
        self.state.borrow_mut().detached = true;
    }

    fn raycast(&self, _point: Vec2, _target: RaycastTarget) -> Vec<WorldHit> {
        self.state.borrow().hits.clone()
    }

    fn add_anchor(&mut self, mut anchor: PlacementAnchor) -> AnchorId {
        let mut state = self.state.borrow_mut();
        let id = AnchorId(state.next_anchor);
        state.next_anchor += 1;
        anchor.id = Some(id);
        state.anchors.insert(id, anchor);
        state.pending_added.push(id);
        id
    }

    fn remove_anchor(&mut self, id: AnchorId) -> Option<PlacementAnchor> {
        self.state.borrow_mut().anchors.remove(&id)
    }

    fn set_anchor_zoom(&mut self, id: AnchorId, zoom: f32) -> bool {
        match self.state.borrow_mut().anchors.get_mut(&id) {
            Some(anchor) => {
                anchor.zoom = zoom;
                true
            }
            None => false,
        }
    }

    async fn current_snapshot(&self) -> Result<Option<EnvironmentSnapshot>, SessionError> {
        let state = self.state.borrow();
        Ok(state
            .features
            .clone()
            .map(|features| EnvironmentSnapshot::new(features, state.anchors.values().cloned().collect())))
    }

    fn install_coaching(&mut self, auto_activate: bool) {
        let mut state = self.state.borrow_mut();
        state.coaching_installed = Some(auto_activate);
        state.coaching_active = state.coaching_on_install;
    }

    fn hide_coaching(&mut self) {
        let mut state = self.state.borrow_mut();
        state.coaching_active = false;
        state.coaching_hides += 1;
    }

    fn is_coaching_active(&self) -> bool {
        self.state.borrow().coaching_active
    }
}

impl SceneRenderer for FakeSurface {
    fn attach_node(&mut self, node: &ArtworkNode) {
        self.state.borrow_mut().attached.insert(node.id());
    }

    fn update_node(&mut self, _node: &ArtworkNode) {
        self.state.borrow_mut().updates += 1;
    }

    fn detach_node(&mut self, id: NodeId) {
        self.state.borrow_mut().attached.remove(&id);
    }

    fn apply_content(&mut self, id: NodeId, content: &ArtworkContent) {
        self.state.borrow_mut().applied.push((id, content.clone()));
    }

    fn visualize_plane(&mut self, plane: PlaneId, colour: Rgba) {
        self.state.borrow_mut().planes.push((plane, colour));
    }

    fn capture(&mut self, region: Option<Rect>) -> CapturedImage {
        self.state.borrow_mut().captures.push(region);
        CapturedImage {
            region,
            rgba: vec![0; 16],
        }
    }
}

/// Serves content from memory, unknown links are `NotFound`.
#[derive(Default)]
pub struct MemoryFetcher {
    pub content: HashMap<String, Vec<u8>>,
}

impl MemoryFetcher {
    pub fn with(link: &str, bytes: Vec<u8>) -> Self {
        let mut content = HashMap::new();
        content.insert(link.to_string(), bytes);
        Self { content }
    }
}

#[async_trait]
impl ContentFetcher for MemoryFetcher {
    async fn fetch(&self, link: &str) -> Result<Vec<u8>, FetchError> {
        self.content
            .get(link)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(link.to_string()))
    }
}

pub fn control() -> WallArtworkControl {
    WallArtworkControl::new(Arc::new(MemoryFetcher::default()))
}

pub fn descriptor(link: &str) -> ArtworkDescriptor {
    ArtworkDescriptor::new(link, ContentType::Image, ContentSize::new(600.0, 600.0))
}

pub fn viewport() -> Rect {
    Rect::new(0.0, 0.0, 400.0, 800.0)
}

/// Camera at the origin looking down -Z.
pub fn frame() -> CameraFrame {
    CameraFrame::looking_at(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), FRAC_PI_2, viewport())
}

/// Hit on a wall facing the camera `distance` units away. The tracker's
/// surface frame is upside down relative to the artwork plane.
pub fn wall_hit(x: f32, y: f32, distance: f32) -> WorldHit {
    WorldHit::new(Vec3::new(x, y, -distance), Quat::from_rotation_x(PI), Vec3::Z)
}

/// Reports anchors the controller committed back to it, as the session would.
pub fn deliver_added(control: &mut WallArtworkControl, state: &Rc<RefCell<FakeState>>) {
    let added: Vec<PlacementAnchor> = {
        let mut state = state.borrow_mut();
        let ids = std::mem::take(&mut state.pending_added);
        let anchors = ids.iter().filter_map(|id| state.anchors.get(id).cloned()).collect();
        anchors
    };
    for anchor in &added {
        control.on_anchor_added(anchor);
    }
}
