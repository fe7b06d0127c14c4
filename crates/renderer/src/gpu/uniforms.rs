use bytemuck::{Pod, Zeroable};
use compositor::{Body, PassParams, Viewport};

use crate::geometry::{body_center, AMBIENT, LIGHT_POSITION, SHININESS};

/// Bodies the scene shader can draw in one pass.
pub(crate) const MAX_BODIES: usize = 8;

/// One body as seen by the scene shader. Must match `Body` in `SCENE_FRAGMENT_GLSL`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub(crate) struct BodyUniform {
    /// xyz centre, w radius.
    pub center_radius: [f32; 4],
    pub color: [f32; 4],
    /// x rotation about the X axis in radians.
    pub spin: [f32; 4],
}

/// Per-pass uniform block. All members are vec4 so the std140 layout matches
/// `repr(C)` without manual padding.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct PassUniforms {
    /// left, right, bottom, top of the pass frustum.
    pub frustum: [f32; 4],
    /// eye x, eye y, near, far.
    pub eye: [f32; 4],
    /// width, height, body count, unused.
    pub viewport: [f32; 4],
    /// light xyz, ambient level.
    pub light: [f32; 4],
    /// x specular shininess.
    pub material: [f32; 4],
    pub bodies: [BodyUniform; MAX_BODIES],
}

impl PassUniforms {
    pub(crate) fn new(pass: &PassParams, bodies: &[Body], viewport: &Viewport) -> Self {
        let frustum = pass.view.frustum;
        let mut uniforms = Self {
            frustum: [frustum.left, frustum.right, frustum.bottom, frustum.top],
            eye: [
                pass.view.eye_offset.x,
                pass.view.eye_offset.y,
                frustum.near,
                frustum.far,
            ],
            viewport: [viewport.width, viewport.height, 0.0, 0.0],
            light: [LIGHT_POSITION.x, LIGHT_POSITION.y, LIGHT_POSITION.z, AMBIENT],
            material: [SHININESS, 0.0, 0.0, 0.0],
            bodies: [BodyUniform::default(); MAX_BODIES],
        };

        let count = bodies.len().min(MAX_BODIES);
        for (slot, body) in uniforms.bodies.iter_mut().zip(bodies) {
            let center = body_center(body);
            *slot = BodyUniform {
                center_radius: [center.x, center.y, center.z, body.radius()],
                color: body.display_color(),
                spin: [body.rotation_deg().to_radians(), 0.0, 0.0, 0.0],
            };
        }
        uniforms.viewport[2] = count as f32;
        uniforms
    }

    pub(crate) fn body_count(&self) -> usize {
        self.viewport[2] as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compositor::{BodyId, Frustum, JitterPoint, SELECTED_COLOR};
    use sceneconfig::BodyLayout;
    use std::time::Instant;

    fn pass(viewport: &Viewport) -> PassParams {
        let frustum = Frustum::perspective(50.0, viewport.aspect(), 1.0, 100.0);
        let eye = JitterPoint::new(0.05, -0.02);
        PassParams {
            index: 0,
            weight: 1.0,
            pixel_jitter: JitterPoint::ZERO,
            eye_jitter: eye,
            focus: 10.0,
            view: frustum.jittered(JitterPoint::ZERO, eye, 10.0, viewport),
        }
    }

    fn bodies(count: u32) -> Vec<Body> {
        (1..=count)
            .map(|id| {
                Body::new(
                    BodyId(id),
                    BodyLayout {
                        x_offset: id as f32,
                        radius: 1.0,
                    },
                    id as usize,
                    0.5,
                )
            })
            .collect()
    }

    #[test]
    fn layout_is_std140_sized() {
        assert_eq!(std::mem::size_of::<BodyUniform>(), 48);
        assert_eq!(std::mem::size_of::<PassUniforms>(), 5 * 16 + MAX_BODIES * 48);
    }

    #[test]
    fn packs_pass_view_and_bodies() {
        let viewport = Viewport::new(640, 480);
        let pass = pass(&viewport);
        let mut bodies = bodies(2);
        bodies[1].select(Instant::now(), false);

        let uniforms = PassUniforms::new(&pass, &bodies, &viewport);
        assert_eq!(uniforms.body_count(), 2);
        assert_eq!(uniforms.eye[0], 0.05);
        assert_eq!(uniforms.eye[2], 1.0);
        assert_eq!(uniforms.frustum[0], pass.view.frustum.left);
        assert_eq!(uniforms.bodies[0].center_radius, [1.0, -1.0, 0.0, 1.0]);
        assert_eq!(uniforms.bodies[1].color, SELECTED_COLOR);
        assert_eq!(uniforms.bodies[2], BodyUniform::default());
    }

    #[test]
    fn extra_bodies_are_dropped() {
        let viewport = Viewport::new(64, 64);
        let uniforms = PassUniforms::new(&pass(&viewport), &bodies(12), &viewport);
        assert_eq!(uniforms.body_count(), MAX_BODIES);
    }
}
