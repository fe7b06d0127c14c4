//! Perspective frusta for jittered accumulation passes and picking.
//!
//! The camera sits at the origin looking down negative Z. A pass shifts the
//! frustum window by a sub-pixel amount (anti-aliasing) and moves the eye in
//! the plane of the window while keeping the focal plane fixed (depth of
//! field). Picking narrows the window to a few pixels around the cursor.

use glam::{Mat4, Vec3, Vec4};

use crate::jitter::JitterPoint;
use crate::picking::PickRegion;

pub const NEAR_PLANE: f32 = 1.0;
pub const FAR_PLANE: f32 = 100.0;

/// Window-space rectangle the scene is drawn into, origin at the bottom left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width.max(1) as f32,
            height: height.max(1) as f32,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }
}

/// Off-axis view volume in eye space, as passed to `glFrustum`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl Frustum {
    /// Symmetric frustum for a vertical field of view in degrees.
    pub fn perspective(fovy_deg: f32, aspect: f32, near: f32, far: f32) -> Self {
        let half = fovy_deg.to_radians() / 2.0;
        let top = near * half.tan();
        let right = top * aspect;
        Self {
            left: -right,
            right,
            bottom: -top,
            top,
            near,
            far,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    /// Shifts the window by `pixel` (in pixels) and the eye by `eye` (in
    /// world units) so that geometry at distance `focus` stays put.
    pub fn jittered(
        &self,
        pixel: JitterPoint,
        eye: JitterPoint,
        focus: f32,
        viewport: &Viewport,
    ) -> PassView {
        let dx = -(pixel.x * self.width() / viewport.width + eye.x * self.near / focus);
        let dy = -(pixel.y * self.height() / viewport.height + eye.y * self.near / focus);
        PassView {
            frustum: Frustum {
                left: self.left + dx,
                right: self.right + dx,
                bottom: self.bottom + dy,
                top: self.top + dy,
                near: self.near,
                far: self.far,
            },
            eye_offset: eye,
        }
    }

    /// Restricts the window to `region`, matching `gluPickMatrix`.
    pub fn pick(&self, region: &PickRegion, viewport: &Viewport) -> Self {
        let u0 = (region.center_x - region.width / 2.0 - viewport.x) / viewport.width;
        let u1 = (region.center_x + region.width / 2.0 - viewport.x) / viewport.width;
        let v0 = (region.center_y - region.height / 2.0 - viewport.y) / viewport.height;
        let v1 = (region.center_y + region.height / 2.0 - viewport.y) / viewport.height;
        Self {
            left: self.left + u0 * self.width(),
            right: self.left + u1 * self.width(),
            bottom: self.bottom + v0 * self.height(),
            top: self.bottom + v1 * self.height(),
            near: self.near,
            far: self.far,
        }
    }

    /// OpenGL clip matrix for this frustum.
    pub fn matrix(&self) -> Mat4 {
        let (l, r, b, t, n, f) = (
            self.left,
            self.right,
            self.bottom,
            self.top,
            self.near,
            self.far,
        );
        Mat4::from_cols(
            Vec4::new(2.0 * n / (r - l), 0.0, 0.0, 0.0),
            Vec4::new(0.0, 2.0 * n / (t - b), 0.0, 0.0),
            Vec4::new(
                (r + l) / (r - l),
                (t + b) / (t - b),
                -(f + n) / (f - n),
                -1.0,
            ),
            Vec4::new(0.0, 0.0, -2.0 * f * n / (f - n), 0.0),
        )
    }
}

/// Projection and eye position for one accumulation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassView {
    pub frustum: Frustum,
    /// Eye displacement in world units; the scene is translated by its negation.
    pub eye_offset: JitterPoint,
}

impl PassView {
    pub fn centered(frustum: Frustum) -> Self {
        Self {
            frustum,
            eye_offset: JitterPoint::ZERO,
        }
    }

    pub fn eye(&self) -> Vec3 {
        Vec3::new(self.eye_offset.x, self.eye_offset.y, 0.0)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_translation(-self.eye())
    }

    pub fn view_projection(&self) -> Mat4 {
        self.frustum.matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn symmetric_frustum_matches_glam_perspective() {
        let frustum = Frustum::perspective(50.0, 4.0 / 3.0, NEAR_PLANE, FAR_PLANE);
        let expected = Mat4::perspective_rh_gl(50f32.to_radians(), 4.0 / 3.0, NEAR_PLANE, FAR_PLANE);
        assert!(frustum.matrix().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn pixel_jitter_shifts_window_by_fraction_of_a_pixel() {
        let viewport = Viewport::new(400, 200);
        let frustum = Frustum::perspective(60.0, viewport.aspect(), NEAR_PLANE, FAR_PLANE);
        let view = frustum.jittered(JitterPoint::new(0.5, -0.25), JitterPoint::ZERO, 1.0, &viewport);
        let pixel_w = frustum.width() / viewport.width;
        let pixel_h = frustum.height() / viewport.height;
        assert!(close(view.frustum.left, frustum.left - 0.5 * pixel_w));
        assert!(close(view.frustum.top, frustum.top + 0.25 * pixel_h));
        assert!(close(view.frustum.width(), frustum.width()));
        assert_eq!(view.eye_offset, JitterPoint::ZERO);
    }

    #[test]
    fn eye_jitter_keeps_focal_plane_fixed() {
        let viewport = Viewport::new(300, 300);
        let frustum = Frustum::perspective(50.0, 1.0, NEAR_PLANE, FAR_PLANE);
        let focus = 10.0;
        let view = frustum.jittered(JitterPoint::ZERO, JitterPoint::new(0.1, -0.2), focus, &viewport);

        let on_focal_plane = Vec3::new(1.0, 0.5, -focus);
        let base = Mat4::perspective_rh_gl(50f32.to_radians(), 1.0, NEAR_PLANE, FAR_PLANE)
            .project_point3(on_focal_plane);
        let shifted = view.view_projection().project_point3(on_focal_plane);
        assert!(close(base.x, shifted.x));
        assert!(close(base.y, shifted.y));

        let off_plane = Vec3::new(1.0, 0.5, -40.0);
        let base = frustum.matrix().project_point3(off_plane);
        let shifted = view.view_projection().project_point3(off_plane);
        assert!(!close(base.x, shifted.x));
    }

    #[test]
    fn pick_narrows_to_the_region() {
        let viewport = Viewport::new(100, 100);
        let frustum = Frustum::perspective(90.0, 1.0, NEAR_PLANE, FAR_PLANE);
        let region = PickRegion {
            center_x: 50.0,
            center_y: 50.0,
            width: 10.0,
            height: 10.0,
        };
        let narrowed = frustum.pick(&region, &viewport);
        assert!(close(narrowed.left, -0.1));
        assert!(close(narrowed.right, 0.1));
        assert!(close(narrowed.bottom, -0.1));
        assert!(close(narrowed.top, 0.1));
        assert_eq!(narrowed.near, frustum.near);
    }
}
