//! World → viewport projection and screen-space hit testing.
//!
//! Viewport coordinates have their origin at the top-left of the viewport
//! rect with Y growing downwards, matching tap locations from the UI layer.

use bevy::math::{Mat4, Rect, Vec2, Vec3};
use constants::render_settings::PROJECTION_EPSILON;

/// Camera state delivered with every tracking frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    /// Projection × view, world space to clip space.
    pub view_projection: Mat4,
    pub viewport: Rect,
}

impl CameraFrame {
    pub fn new(view_projection: Mat4, viewport: Rect) -> Self {
        Self { view_projection, viewport }
    }

    /// Right-handed perspective camera at `eye` looking at `target` with +Y up.
    pub fn looking_at(eye: Vec3, target: Vec3, fov_y: f32, viewport: Rect) -> Self {
        let size = viewport.size();
        let aspect = if size.y > 0.0 { size.x / size.y } else { 1.0 };
        let projection = Mat4::perspective_rh(fov_y, aspect, 0.01, 100.0);
        let view = Mat4::look_at_rh(eye, target, Vec3::Y);
        Self::new(projection * view, viewport)
    }

    pub fn viewport_center(&self) -> Vec2 {
        self.viewport.center()
    }

    /// Projects a world point to viewport coordinates.
    /// Returns `None` for points on or behind the camera plane.
    pub fn project(&self, world: Vec3) -> Option<Vec2> {
        let ndc = self.to_ndc(world)?;
        let size = self.viewport.size();
        Some(Vec2::new(
            self.viewport.min.x + (ndc.x + 1.0) * 0.5 * size.x,
            self.viewport.min.y + (1.0 - ndc.y) * 0.5 * size.y,
        ))
    }

    /// Normalised device depth of a world point, smaller is nearer.
    pub fn depth(&self, world: Vec3) -> Option<f32> {
        self.to_ndc(world).map(|ndc| ndc.z)
    }

    fn to_ndc(&self, world: Vec3) -> Option<Vec3> {
        let clip = self.view_projection * world.extend(1.0);
        if clip.w <= PROJECTION_EPSILON {
            return None;
        }
        Some(clip.truncate() / clip.w)
    }
}

/// Projects a point given in a node's local space.
pub fn project_local(frame: &CameraFrame, local_to_world: Mat4, local: Vec3) -> Option<Vec2> {
    frame.project(local_to_world.transform_point3(local))
}

/// Screen-space bounds of a local-space rectangle centred on `center`.
///
/// The two opposite corners are projected independently, so the rect follows
/// perspective foreshortening instead of being a 2D box around the projected
/// centre.
pub fn screen_rect(frame: &CameraFrame, local_to_world: Mat4, center: Vec3, half_extents: Vec2) -> Option<Rect> {
    let lower = Vec3::new(center.x - half_extents.x, center.y - half_extents.y, center.z);
    let upper = Vec3::new(center.x + half_extents.x, center.y + half_extents.y, center.z);
    let a = project_local(frame, local_to_world, lower)?;
    let b = project_local(frame, local_to_world, upper)?;
    Some(Rect::from_corners(a, b))
}

/// Grows `rect` by `margin` on every side and clips it to `bounds`.
/// `None` when nothing of the grown rect lies inside `bounds`.
pub fn inflate_within(rect: Rect, margin: f32, bounds: Rect) -> Option<Rect> {
    let clipped = rect.inflate(margin).intersect(bounds);
    (!clipped.is_empty()).then_some(clipped)
}
