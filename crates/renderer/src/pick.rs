use compositor::{Body, BodyId, Frustum, HitTester, PickRegion};
use glam::Vec3;
use tracing::trace;

use crate::geometry::body_center;

/// Geometric replacement for GL selection mode: a body is hit when its
/// bounding sphere touches the pick frustum. Hits come back in draw order.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrustumHitTester;

impl HitTester for FrustumHitTester {
    fn hit_test(&mut self, region: &PickRegion, frustum: &Frustum, bodies: &[Body]) -> Vec<BodyId> {
        let planes = Planes::from_frustum(frustum);
        let hits: Vec<BodyId> = bodies
            .iter()
            .filter(|body| planes.touches_sphere(body_center(body), body.radius()))
            .map(Body::id)
            .collect();
        trace!(
            x = region.center_x,
            y = region.center_y,
            hits = hits.len(),
            "pick frustum tested"
        );
        hits
    }
}

/// Inward-facing planes `dot(normal, p) + offset >= 0` in eye space.
struct Planes([(Vec3, f32); 6]);

impl Planes {
    fn from_frustum(frustum: &Frustum) -> Self {
        let Frustum {
            left,
            right,
            bottom,
            top,
            near,
            far,
        } = *frustum;
        let side = |normal: Vec3| (normal.normalize_or_zero(), 0.0);
        Self([
            side(Vec3::new(near, 0.0, left)),
            side(Vec3::new(-near, 0.0, -right)),
            side(Vec3::new(0.0, near, bottom)),
            side(Vec3::new(0.0, -near, -top)),
            (Vec3::NEG_Z, -near),
            (Vec3::Z, far),
        ])
    }

    fn touches_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.0
            .iter()
            .all(|(normal, offset)| normal.dot(center) + offset >= -radius)
    }
}
