//! Seams to the platform: the tracking session, the scene renderer and the
//! content fetcher. The controller only ever talks to these traits.

use async_trait::async_trait;
use bevy::math::{Quat, Rect, Vec2, Vec3};
use std::path::PathBuf;
use std::sync::Arc;

use super::config::{RaycastTarget, Rgba};
use super::node::{ArtworkNode, NodeId};
use crate::error::{FetchError, SessionError};
use crate::model::{AnchorId, EnvironmentSnapshot, PlacementAnchor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaneId(pub u64);

/// One raycast result against detected geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldHit {
    pub position: Vec3,
    /// Surface frame as the tracker reports it. The artwork plane is this
    /// frame flipped half a turn about local X.
    pub rotation: Quat,
    /// Unit normal pointing out of the surface.
    pub normal: Vec3,
}

impl WorldHit {
    pub fn new(position: Vec3, rotation: Quat, normal: Vec3) -> Self {
        Self {
            position,
            rotation,
            normal: normal.normalize_or_zero(),
        }
    }
}

/// What the tracking session is started with at bind time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackingConfig {
    pub vertical_plane_detection: bool,
    pub scene_reconstruction: bool,
    pub initial_snapshot: Option<EnvironmentSnapshot>,
}

/// World tracking: plane detection, raycasts, anchors and snapshots.
#[async_trait(?Send)]
pub trait TrackingSession {
    /// Hardware identifier such as `iPhone12,1`.
    fn device_identifier(&self) -> String;

    fn run(&mut self, config: TrackingConfig);

    /// Stops delivering frame and anchor callbacks to the controller.
    fn detach(&mut self);

    /// Hits ordered nearest first. Placement snaps to the last one, the
    /// farthest surface along the ray.
    fn raycast(&self, point: Vec2, target: RaycastTarget) -> Vec<WorldHit>;

    /// Registers an anchor and assigns its id. The session reports it back
    /// through `on_anchor_added`.
    fn add_anchor(&mut self, anchor: PlacementAnchor) -> AnchorId;

    fn remove_anchor(&mut self, id: AnchorId) -> Option<PlacementAnchor>;

    /// Updates the zoom stored on a live anchor, `false` if it is unknown.
    fn set_anchor_zoom(&mut self, id: AnchorId, zoom: f32) -> bool;

    /// Captures the current environment. May take several frames, `None`
    /// when nothing has been mapped yet.
    async fn current_snapshot(&self) -> Result<Option<EnvironmentSnapshot>, SessionError>;

    /// Installs the coaching overlay. `auto_activate` lets it show and hide itself.
    fn install_coaching(&mut self, auto_activate: bool);

    fn hide_coaching(&mut self);

    fn is_coaching_active(&self) -> bool;
}

/// Fetched or streamed artwork media handed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtworkContent {
    Image(Arc<[u8]>),
    AnimatedImage(Arc<[u8]>),
    VideoStream(String),
}

/// Pixels captured from the rendered view.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedImage {
    /// Viewport region the pixels cover, `None` for the full view.
    pub region: Option<Rect>,
    pub rgba: Vec<u8>,
}

/// Draws nodes on top of the camera feed.
pub trait SceneRenderer {
    fn attach_node(&mut self, node: &ArtworkNode);

    /// Pose, zoom or visual state changed.
    fn update_node(&mut self, node: &ArtworkNode);

    fn detach_node(&mut self, id: NodeId);

    fn apply_content(&mut self, id: NodeId, content: &ArtworkContent);

    fn visualize_plane(&mut self, plane: PlaneId, colour: Rgba);

    fn capture(&mut self, region: Option<Rect>) -> CapturedImage;
}

/// A platform view that both tracks and renders.
pub trait ArSurface: TrackingSession + SceneRenderer {}

impl<T: TrackingSession + SceneRenderer + ?Sized> ArSurface for T {}

/// Fetches artwork content and remote snapshots by link.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, link: &str) -> Result<Vec<u8>, FetchError>;
}

/// Reads `file://` links and bare paths from the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct FileFetcher;

#[async_trait]
impl ContentFetcher for FileFetcher {
    async fn fetch(&self, link: &str) -> Result<Vec<u8>, FetchError> {
        let path = PathBuf::from(link.strip_prefix("file://").unwrap_or(link));
        let owned = link.to_string();
        tokio::task::spawn_blocking(move || std::fs::read(&path))
            .await
            .map_err(|e| FetchError::Other(e.to_string()))?
            .map_err(|source| {
                if source.kind() == std::io::ErrorKind::NotFound {
                    FetchError::NotFound(owned)
                } else {
                    FetchError::Io { link: owned, source }
                }
            })
    }
}
