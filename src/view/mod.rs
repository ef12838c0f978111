// VIEW: Shaders, GPU setup and rendering
pub mod gpu_init;
pub mod render;
pub mod shader;
pub mod subroutine;

pub use gpu_init::GpuContext;
pub use render::{RenderState, ShadingPipelines, VariantHandle};
pub use shader::{ShaderProgram, StageSource};
pub use subroutine::{DriverLimits, SubroutineRegistry, SubroutineTable};
