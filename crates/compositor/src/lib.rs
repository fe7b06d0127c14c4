//! Frame scheduling core for the rolling spheres scene.
//!
//! [`Scene`] owns the bodies and settings and is driven by the host through
//! three entry points: the fixed-rate simulation tick, the per-frame
//! composition, and pointer picks. Drawing and hit testing are delegated to
//! the [`RenderHost`] and [`HitTester`] traits so the scheduling logic can be
//! tested without a GPU.

pub mod body;
pub mod clock;
pub mod compositor;
pub mod host;
pub mod jitter;
pub mod picking;
pub mod projection;
pub mod scene;
pub mod stats;

pub use body::{Body, BodyId, Motion, PALETTE, SELECTED_COLOR};
pub use clock::{Clock, ManualClock, SceneClock, SystemClock};
pub use compositor::{composite, BlurStep, FrameError, FramePlan, FrameReport, PassParams};
pub use host::RenderHost;
pub use jitter::JitterPoint;
pub use picking::{ButtonState, HitTester, PickRegion, PointerButton, PointerEvent};
pub use projection::{Frustum, PassView, Viewport, FAR_PLANE, NEAR_PLANE};
pub use scene::Scene;
pub use stats::FrameStats;
