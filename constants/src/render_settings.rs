/// Margin (in viewport points) added around an artwork's screen rect when
/// cropping a snapshot, wide enough to keep the halo icons in frame.
pub const SNAPSHOT_CROP_MARGIN: f32 = 100.0;

/// Backdrop tint while placing, RGBA.
pub const BACKDROP_COLOUR: [f32; 4] = [196.0 / 255.0, 196.0 / 255.0, 196.0 / 255.0, 0.33];

/// Clip-space `w` below which a point is treated as behind the camera.
pub const PROJECTION_EPSILON: f32 = 1e-6;
