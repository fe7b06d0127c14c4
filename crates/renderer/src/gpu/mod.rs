mod context;
mod pipeline;
mod shaders;
mod state;
mod uniforms;

pub(crate) use state::GpuState;
pub(crate) use uniforms::MAX_BODIES;
