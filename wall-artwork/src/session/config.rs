use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::map::MapSource;
use crate::model::EnvironmentSnapshot;

/// Linear RGBA colour, components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const CLEAR: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_array(c: [f32; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

/// Renderer-side image reference (asset path or bundle key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageHandle(pub String);

/// Configurable subnodes of an artwork node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubnodeSlot {
    /// Content plane, shows the placeholder until the real content arrives.
    ArtworkPlaceholder,
    /// Selection marker centred under the artwork.
    Arrow,
    /// External link icon, above the top-left corner.
    Link,
    /// Reorder icon, above the top-right corner.
    Reorder,
    /// Zoom handle, right of the backdrop.
    Zoom,
}

impl SubnodeSlot {
    pub const ALL: [SubnodeSlot; 5] = [
        SubnodeSlot::ArtworkPlaceholder,
        SubnodeSlot::Arrow,
        SubnodeSlot::Link,
        SubnodeSlot::Reorder,
        SubnodeSlot::Zoom,
    ];
}

/// What a subnode shows in 3D. Unconfigured slots are `None` (transparent).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SlotContent {
    Color(Rgba),
    Image(ImageHandle),
    #[default]
    None,
}

/// Which detected geometry the placement raycast may hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaycastTarget {
    /// Only the extent of planes already detected, keeps artworks on real walls.
    #[default]
    ExistingPlaneGeometry,
    /// Detected planes extended infinitely.
    ExistingPlaneInfinite,
    /// Planes the tracker estimates but has not confirmed.
    EstimatedPlane,
}

/// Snapshot load/save locations used by the host screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Restored into the session at bind time when set.
    pub load_from: Option<MapSource>,
    /// Saving is disabled when unset. Existing files are overwritten.
    pub save_to: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub allowed_raycast_target: RaycastTarget,
    /// Tint for detected planes, `None` leaves them invisible.
    pub plane_visualization: Option<Rgba>,
    /// Subnodes whose viewport positions are reported every frame.
    pub overlay_subnodes: BTreeSet<SubnodeSlot>,
    pub subnode_content: BTreeMap<SubnodeSlot, SlotContent>,
    /// `true` lets the coaching overlay dismiss itself, `false` hides it as
    /// soon as anything is detected.
    pub auto_coaching: bool,
    pub storage: StorageConfig,
    #[serde(skip)]
    pub initial_snapshot: Option<EnvironmentSnapshot>,
}

impl SessionConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn with_initial_snapshot(mut self, snapshot: EnvironmentSnapshot) -> Self {
        self.initial_snapshot = Some(snapshot);
        self
    }

    /// Resolved content for every slot, unconfigured slots included.
    pub fn resolve_subnode_content(&self) -> BTreeMap<SubnodeSlot, SlotContent> {
        SubnodeSlot::ALL
            .iter()
            .map(|slot| (*slot, self.subnode_content.get(slot).cloned().unwrap_or_default()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        let config = SessionConfig::from_json_str("{}").unwrap();
        assert_eq!(config.allowed_raycast_target, RaycastTarget::ExistingPlaneGeometry);
        assert!(!config.auto_coaching);
        assert!(config.overlay_subnodes.is_empty());
        assert!(config.plane_visualization.is_none());
        assert!(config.storage.save_to.is_none());
    }

    #[test]
    fn parses_slots_content_and_storage() {
        let config = SessionConfig::from_json_str(
            r#"{
                "allowed_raycast_target": "estimated_plane",
                "plane_visualization": { "r": 0.0, "g": 0.5, "b": 1.0, "a": 0.3 },
                "overlay_subnodes": ["link", "zoom"],
                "subnode_content": {
                    "arrow": { "kind": "image", "value": "icons/arrow.png" },
                    "link": { "kind": "color", "value": { "r": 1.0, "g": 1.0, "b": 1.0, "a": 1.0 } }
                },
                "auto_coaching": true,
                "storage": { "load_from": { "remote": "https://maps.example/room" }, "save_to": "room.awmp" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.allowed_raycast_target, RaycastTarget::EstimatedPlane);
        assert!(config.overlay_subnodes.contains(&SubnodeSlot::Zoom));
        assert_eq!(
            config.subnode_content[&SubnodeSlot::Arrow],
            SlotContent::Image(ImageHandle("icons/arrow.png".into()))
        );
        assert_eq!(
            config.storage.load_from,
            Some(MapSource::Remote("https://maps.example/room".into()))
        );
        assert!(config.auto_coaching);
    }

    #[test]
    fn resolve_fills_unconfigured_slots_with_none() {
        let mut config = SessionConfig::default();
        config
            .subnode_content
            .insert(SubnodeSlot::Zoom, SlotContent::Color(Rgba::new(1.0, 0.0, 0.0, 1.0)));

        let resolved = config.resolve_subnode_content();
        assert_eq!(resolved.len(), SubnodeSlot::ALL.len());
        assert_eq!(resolved[&SubnodeSlot::Arrow], SlotContent::None);
        assert!(matches!(resolved[&SubnodeSlot::Zoom], SlotContent::Color(_)));
    }

    #[test]
    fn unknown_slot_is_a_parse_error() {
        let err = SessionConfig::from_json_str(r#"{ "overlay_subnodes": ["halo"] }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn from_path_reads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{ "auto_coaching": true, "overlay_subnodes": ["arrow"] }"#).unwrap();

        let config = SessionConfig::from_path(&path).unwrap();
        assert!(config.auto_coaching);
        assert_eq!(config.overlay_subnodes, BTreeSet::from([SubnodeSlot::Arrow]));
    }

    #[test]
    fn from_path_reports_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        assert!(matches!(SessionConfig::from_path(&missing), Err(ConfigError::Io(_))));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(SessionConfig::from_path(&broken), Err(ConfigError::Parse(_))));
    }
}
