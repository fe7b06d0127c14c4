//! World placement shared by the GPU scene pass and CPU hit testing.

use compositor::Body;
use glam::Vec3;

/// Height of every body's centre; radius 1 bodies rest on the floor.
pub const BODY_CENTER_Y: f32 = -1.0;

pub const FLOOR_Y: f32 = -2.0;
pub const FLOOR_HALF_WIDTH: f32 = 5.0;
pub const FLOOR_NEAR_Z: f32 = 1.0;
pub const FLOOR_FAR_Z: f32 = -50.0;

pub const LIGHT_POSITION: Vec3 = Vec3::new(0.0, 20.0, 0.0);
pub const AMBIENT: f32 = 0.2;
pub const SHININESS: f32 = 50.0;

pub fn body_center(body: &Body) -> Vec3 {
    Vec3::new(body.x_offset(), BODY_CENTER_Y, body.position_z())
}
