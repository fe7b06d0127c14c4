use anyhow::Result;

use crate::body::Body;
use crate::compositor::PassParams;

/// Drawing surface driven by the compositor.
///
/// A frame is `begin_frame`, then one `render_pass` per sub-frame. When the
/// frame accumulates, every pass is followed by `accumulate` with its weight
/// and the frame ends with `resolve_accumulation`. Presenting the result is
/// left to the host.
pub trait RenderHost {
    /// Clears the scene target, and the accumulation target when `accumulate`.
    fn begin_frame(&mut self, accumulate: bool) -> Result<()>;

    fn render_pass(&mut self, pass: &PassParams, bodies: &[Body]) -> Result<()>;

    /// Adds the last rendered pass into the accumulation target scaled by `weight`.
    fn accumulate(&mut self, weight: f32) -> Result<()>;

    /// Copies the accumulated image back into the scene target.
    fn resolve_accumulation(&mut self) -> Result<()>;
}
