//! Window and GPU host for the rolling spheres scene.
//!
//! The crate owns everything that touches the display. The flow is:
//!
//! ```text
//!   spheres binary
//!          │ Scene + RendererConfig
//!          ▼
//!   window::run ──▶ winit event loop ──▶ Scene::on_render_frame(GpuState)
//!          │                 │                      │
//!          │                 │                      └─▶ scene pass ─▶ accumulate ─▶ present
//!          │                 └─▶ TickSchedule ─▶ Scene::on_simulation_tick
//!          └─▶ pointer clicks ─▶ FrustumHitTester
//! ```
//!
//! `GpuState` implements [`compositor::RenderHost`], so the compositor decides
//! how many passes a frame takes and with which jitter while this crate only
//! draws them. The scene itself is ray cast in a full-screen fragment shader.

pub mod geometry;
mod gpu;
pub mod pick;
mod ticker;
mod window;

pub use pick::FrustumHitTester;
pub use window::{run, KeyOutcome, KeyPress, RendererConfig};
