use crate::body::{Body, BodyId};
use crate::projection::{Frustum, Viewport};

/// Side of the square pick window, in pixels.
pub const PICK_REGION_PIXELS: f32 = 5.0;

/// Pixel rectangle around a click, in window coordinates with a bottom-left
/// origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickRegion {
    pub center_x: f32,
    pub center_y: f32,
    pub width: f32,
    pub height: f32,
}

impl PickRegion {
    /// Builds the region around a pointer position reported with a top-left
    /// origin.
    pub fn around(x: f32, y: f32, viewport: &Viewport) -> Self {
        Self {
            center_x: x,
            center_y: viewport.height - y,
            width: PICK_REGION_PIXELS,
            height: PICK_REGION_PIXELS,
        }
    }
}

/// Reports which bodies intersect a pick frustum, in draw order.
pub trait HitTester {
    fn hit_test(&mut self, region: &PickRegion, frustum: &Frustum, bodies: &[Body]) -> Vec<BodyId>;
}

impl<F> HitTester for F
where
    F: FnMut(&PickRegion, &Frustum, &[Body]) -> Vec<BodyId>,
{
    fn hit_test(&mut self, region: &PickRegion, frustum: &Frustum, bodies: &[Body]) -> Vec<BodyId> {
        self(region, frustum, bodies)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Pressed,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub button: PointerButton,
    pub state: ButtonState,
    pub x: f32,
    pub y: f32,
}

impl PointerEvent {
    pub fn is_primary_press(&self) -> bool {
        self.button == PointerButton::Primary && self.state == ButtonState::Pressed
    }
}

/// Chooses the picked body: the first hit record if it names a body, otherwise
/// the second. Records beyond the second are ignored.
pub fn resolve_hit(hits: &[BodyId], bodies: &[Body]) -> Option<BodyId> {
    hits.iter()
        .take(2)
        .copied()
        .find(|id| bodies.iter().any(|body| body.id() == *id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sceneconfig::BodyLayout;

    fn bodies() -> Vec<Body> {
        (1..=2)
            .map(|id| {
                Body::new(
                    BodyId(id),
                    BodyLayout {
                        x_offset: 0.0,
                        radius: 1.0,
                    },
                    id as usize,
                    0.5,
                )
            })
            .collect()
    }

    #[test]
    fn region_flips_to_bottom_left_origin() {
        let viewport = Viewport::new(640, 480);
        let region = PickRegion::around(100.0, 30.0, &viewport);
        assert_eq!(region.center_x, 100.0);
        assert_eq!(region.center_y, 450.0);
        assert_eq!(region.width, PICK_REGION_PIXELS);
    }

    #[test]
    fn first_record_wins() {
        let bodies = bodies();
        assert_eq!(resolve_hit(&[BodyId(2), BodyId(1)], &bodies), Some(BodyId(2)));
    }

    #[test]
    fn falls_back_to_second_record() {
        let bodies = bodies();
        assert_eq!(resolve_hit(&[BodyId(9), BodyId(1)], &bodies), Some(BodyId(1)));
        assert_eq!(resolve_hit(&[BodyId(9), BodyId(8), BodyId(1)], &bodies), None);
    }

    #[test]
    fn empty_hits_select_nothing() {
        assert_eq!(resolve_hit(&[], &bodies()), None);
    }

    #[test]
    fn closures_are_hit_testers() {
        let mut tester = |_: &PickRegion, _: &Frustum, bodies: &[Body]| vec![bodies[0].id()];
        let viewport = Viewport::new(10, 10);
        let frustum = Frustum::perspective(50.0, 1.0, 1.0, 100.0);
        let hits = tester.hit_test(&PickRegion::around(5.0, 5.0, &viewport), &frustum, &bodies());
        assert_eq!(hits, vec![BodyId(1)]);
    }
}
