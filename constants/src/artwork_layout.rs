//! Local-space layout of an artwork node and its subnodes.
//!
//! Content sizes are normalised so the longest side is 1.0 before any of
//! these factors apply.

/// Backdrop plane size relative to the normalised content size.
pub const BACKDROP_SCALE: f32 = 0.75;

/// Content plane size relative to the backdrop.
pub const CONTENT_SCALE: f32 = 0.75;

/// Backdrop sits slightly in front of the content plane on local Z.
pub const BACKDROP_DEPTH_OFFSET: f32 = 0.001;

/// Edge length of the square icon planes (arrow, link, reorder, zoom).
pub const ICON_SIZE: f32 = 0.05;
