//! Binary archive layout for saved environments.
//!
//! ```text
//! [magic "AWMP"][u16 LE version][MessagePack ArchivedObject]
//! ```
//!
//! The body is a closed set of classes. Anything the decoder does not know
//! is rejected instead of being skipped.

use bevy::math::Mat4;
use constants::archive::{ARCHIVE_HEADER_LEN, ARCHIVE_MAGIC, ARCHIVE_VERSION};
use serde::{Deserialize, Serialize};

use crate::error::MapError;
use crate::model::{AnchorId, ArtworkDescriptor, EnvironmentSnapshot, PlacementAnchor};

/// Allow-list of classes that may appear in an archive.
#[derive(Debug, Serialize, Deserialize)]
enum ArchivedObject {
    EnvironmentSnapshot {
        features: Vec<u8>,
        anchors: Vec<ArchivedObject>,
    },
    PlacementAnchor {
        identifier: Option<u64>,
        transform: [f32; 16],
        #[serde(rename = "artworkDescriptorData")]
        artwork_descriptor_data: Vec<u8>,
        #[serde(rename = "nodeZoom")]
        node_zoom: f32,
    },
}

impl ArchivedObject {
    fn class_name(&self) -> &'static str {
        match self {
            Self::EnvironmentSnapshot { .. } => "EnvironmentSnapshot",
            Self::PlacementAnchor { .. } => "PlacementAnchor",
        }
    }
}

fn archive_anchor(anchor: &PlacementAnchor) -> Result<ArchivedObject, MapError> {
    Ok(ArchivedObject::PlacementAnchor {
        identifier: anchor.id.map(|id| id.0),
        transform: anchor.transform.to_cols_array(),
        artwork_descriptor_data: anchor.descriptor.to_keyed_bytes()?,
        node_zoom: anchor.zoom,
    })
}

fn restore_anchor(object: ArchivedObject) -> Result<PlacementAnchor, MapError> {
    match object {
        ArchivedObject::PlacementAnchor {
            identifier,
            transform,
            artwork_descriptor_data,
            node_zoom,
        } => Ok(PlacementAnchor {
            id: identifier.map(AnchorId),
            transform: Mat4::from_cols_array(&transform),
            descriptor: ArtworkDescriptor::from_keyed_bytes(&artwork_descriptor_data)?,
            zoom: node_zoom,
        }),
        other => Err(MapError::InvalidSnapshot(format!(
            "unexpected {} inside anchor list",
            other.class_name()
        ))),
    }
}

/// Encodes a snapshot with its anchors into archive bytes.
pub fn encode(snapshot: &EnvironmentSnapshot) -> Result<Vec<u8>, MapError> {
    let anchors = snapshot
        .anchors
        .iter()
        .map(archive_anchor)
        .collect::<Result<Vec<_>, _>>()?;

    let root = ArchivedObject::EnvironmentSnapshot {
        features: snapshot.features.clone(),
        anchors,
    };

    let mut bytes = Vec::with_capacity(ARCHIVE_HEADER_LEN + snapshot.features.len());
    bytes.extend_from_slice(&ARCHIVE_MAGIC);
    bytes.extend_from_slice(&ARCHIVE_VERSION.to_le_bytes());
    bytes.extend(rmp_serde::to_vec_named(&root)?);
    Ok(bytes)
}

/// Decodes archive bytes, rejecting unknown classes and malformed roots.
pub fn decode(bytes: &[u8]) -> Result<EnvironmentSnapshot, MapError> {
    if bytes.len() < ARCHIVE_HEADER_LEN {
        return Err(MapError::InvalidSnapshot("truncated header".into()));
    }
    if bytes[..4] != ARCHIVE_MAGIC {
        return Err(MapError::InvalidSnapshot("not an environment archive".into()));
    }
    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version > ARCHIVE_VERSION {
        return Err(MapError::InvalidSnapshot(format!(
            "archive version {version} is newer than supported {ARCHIVE_VERSION}"
        )));
    }

    let body = &bytes[ARCHIVE_HEADER_LEN..];
    if body.is_empty() {
        return Err(MapError::InvalidSnapshot("archive has no root object".into()));
    }

    match rmp_serde::from_slice::<ArchivedObject>(body)? {
        ArchivedObject::EnvironmentSnapshot { features, anchors } => {
            let anchors = anchors
                .into_iter()
                .map(restore_anchor)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(EnvironmentSnapshot { features, anchors })
        }
        other => Err(MapError::InvalidSnapshot(format!(
            "root object is {}, expected EnvironmentSnapshot",
            other.class_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentSize, ContentType};
    use bevy::math::{Quat, Vec3};

    fn anchor(link: &str, zoom: f32) -> PlacementAnchor {
        let d = ArtworkDescriptor::new(link, ContentType::AnimatedImage, ContentSize::new(640.0, 480.0))
            .with_names("Dawn", "A. Painter", "collector");
        let transform = Mat4::from_rotation_translation(Quat::from_rotation_y(1.2), Vec3::new(0.5, 1.4, -2.0));
        let mut a = PlacementAnchor::new(transform, d).with_zoom(zoom);
        a.id = Some(AnchorId(7));
        a
    }

    #[test]
    fn anchor_survives_encode_decode() {
        let original = anchor("https://cdn.example/dawn.gif", 0.42);
        let snapshot = EnvironmentSnapshot::new(vec![1, 2, 3, 250], vec![original.clone()]);

        let decoded = decode(&encode(&snapshot).unwrap()).unwrap();
        assert_eq!(decoded.features, vec![1, 2, 3, 250]);

        let restored = &decoded.anchors[0];
        assert_eq!(restored.descriptor, original.descriptor);
        assert_eq!(restored.descriptor.artist_name, "A. Painter");
        assert!((restored.zoom - 0.42).abs() < f32::EPSILON);
        assert!(restored.transform.abs_diff_eq(original.transform, 1e-6));
        assert_eq!(restored.id, Some(AnchorId(7)));
    }

    #[test]
    fn empty_scan_is_a_valid_snapshot() {
        let snapshot = EnvironmentSnapshot::default();
        let decoded = decode(&encode(&snapshot).unwrap()).unwrap();
        assert_eq!(decoded.anchor_count(), 0);
    }

    #[test]
    fn rejects_wrong_magic_and_truncation() {
        assert!(matches!(decode(b"AW"), Err(MapError::InvalidSnapshot(_))));
        assert!(matches!(decode(b"NOPE\x01\x00rest"), Err(MapError::InvalidSnapshot(_))));
        assert!(matches!(decode(b"AWMP\x01\x00"), Err(MapError::InvalidSnapshot(_))));
    }

    #[test]
    fn rejects_future_version() {
        let mut bytes = encode(&EnvironmentSnapshot::default()).unwrap();
        bytes[4] = 0xFF;
        assert!(matches!(decode(&bytes), Err(MapError::InvalidSnapshot(_))));
    }

    fn framed(root: &ArchivedObject) -> Vec<u8> {
        let mut bytes = ARCHIVE_MAGIC.to_vec();
        bytes.extend_from_slice(&ARCHIVE_VERSION.to_le_bytes());
        bytes.extend(rmp_serde::to_vec_named(root).unwrap());
        bytes
    }

    #[test]
    fn rejects_anchor_as_root() {
        let root = archive_anchor(&anchor("a", 1.0)).unwrap();
        assert!(matches!(decode(&framed(&root)), Err(MapError::InvalidSnapshot(_))));
    }

    #[test]
    fn rejects_snapshot_nested_in_anchor_list() {
        let root = ArchivedObject::EnvironmentSnapshot {
            features: vec![1, 2],
            anchors: vec![
                archive_anchor(&anchor("a", 1.0)).unwrap(),
                ArchivedObject::EnvironmentSnapshot {
                    features: vec![],
                    anchors: vec![],
                },
            ],
        };
        assert!(matches!(decode(&framed(&root)), Err(MapError::InvalidSnapshot(_))));
    }

    #[test]
    fn corrupt_descriptor_data_is_a_descriptor_error() {
        let root = ArchivedObject::EnvironmentSnapshot {
            features: vec![],
            anchors: vec![ArchivedObject::PlacementAnchor {
                identifier: Some(3),
                transform: Mat4::IDENTITY.to_cols_array(),
                artwork_descriptor_data: b"{\"contentLink\": 12".to_vec(),
                node_zoom: 1.0,
            }],
        };
        assert!(matches!(decode(&framed(&root)), Err(MapError::Descriptor(_))));
    }

    #[test]
    fn rejects_unknown_class() {
        #[derive(Serialize)]
        enum Foreign {
            ScriptedPayload { code: String },
        }
        let mut bytes = ARCHIVE_MAGIC.to_vec();
        bytes.extend_from_slice(&ARCHIVE_VERSION.to_le_bytes());
        bytes.extend(
            rmp_serde::to_vec_named(&Foreign::ScriptedPayload { code: "rm -rf".into() }).unwrap(),
        );
        assert!(matches!(decode(&bytes), Err(MapError::Decode(_))));
    }
}
