use super::anchor::PlacementAnchor;

/// Serializable capture of the tracking session's spatial understanding.
///
/// `features` is the collaborator's opaque feature/point-cloud payload and is
/// never interpreted here. `anchors` are the placements active at capture time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvironmentSnapshot {
    pub features: Vec<u8>,
    pub anchors: Vec<PlacementAnchor>,
}

impl EnvironmentSnapshot {
    pub fn new(features: Vec<u8>, anchors: Vec<PlacementAnchor>) -> Self {
        Self { features, anchors }
    }

    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }
}
