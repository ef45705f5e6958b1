/// Distance a placing artwork is pushed off the wall along the hit normal,
/// keeps it from z-fighting with the detected plane visualisation.
pub const WALL_OFFSET: f32 = 0.01;

/// Rotation about the node's local X axis applied after snapping to a wall hit.
/// Artworks hang flat against the wall rather than along the hit's up vector.
pub const WALL_FLIP_ANGLE: f32 = std::f32::consts::PI;

/// Zoom factor given to freshly created nodes and anchors.
pub const DEFAULT_ZOOM: f32 = 1.0;
