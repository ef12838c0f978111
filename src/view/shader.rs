//! Vertex + fragment shader program.
//!
//! "Compiling" parses each WGSL file with naga and validates it; "linking"
//! hands both sources to the device inside a validation error scope so that a
//! rejected module is reported as a startup error instead of a panic.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ShaderError;

/// WGSL text of one shader stage and where it came from.
#[derive(Debug, Clone)]
pub struct StageSource {
    pub path: PathBuf,
    pub code: String,
}

impl StageSource {
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ShaderError> {
        let path = path.as_ref().to_path_buf();
        let code = fs::read_to_string(&path).map_err(|source| ShaderError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(Self { path, code })
    }

    pub fn label(&self) -> String {
        self.path.display().to_string()
    }

    /// Parse and validate, returning the module IR for introspection.
    pub fn compile(&self) -> Result<naga::Module, ShaderError> {
        let label = self.label();
        let module = naga::front::wgsl::parse_str(&self.code).map_err(|e| ShaderError::Parse {
            label: label.clone(),
            message: e.emit_to_string(&self.code),
        })?;

        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .map_err(|e| ShaderError::Validation {
            label,
            message: e.emit_to_string(&self.code),
        })?;

        Ok(module)
    }
}

pub struct ShaderProgram {
    pub vertex: wgpu::ShaderModule,
    pub fragment: wgpu::ShaderModule,
    /// Parsed fragment stage, kept for subroutine discovery.
    pub fragment_ir: naga::Module,
}

impl ShaderProgram {
    /// Load, compile and link a program from two files.
    pub fn load(
        device: &wgpu::Device,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self, ShaderError> {
        let vertex = StageSource::read(vertex_path)?;
        let fragment = StageSource::read(fragment_path)?;
        Self::link(device, &vertex, &fragment)
    }

    pub fn link(
        device: &wgpu::Device,
        vertex: &StageSource,
        fragment: &StageSource,
    ) -> Result<Self, ShaderError> {
        vertex.compile()?;
        let fragment_ir = fragment.compile()?;

        let vertex_module = create_module(device, vertex)?;
        let fragment_module = create_module(device, fragment)?;

        tracing::info!(
            "Linked shader program: {} + {}",
            vertex.path.display(),
            fragment.path.display()
        );

        Ok(Self {
            vertex: vertex_module,
            fragment: fragment_module,
            fragment_ir,
        })
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        tracing::debug!("Releasing shader program");
    }
}

fn create_module(device: &wgpu::Device, stage: &StageSource) -> Result<wgpu::ShaderModule, ShaderError> {
    let label = stage.label();
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label.as_str()),
        source: wgpu::ShaderSource::Wgsl(stage.code.as_str().into()),
    });
    match pollster::block_on(device.pop_error_scope()) {
        Some(err) => Err(ShaderError::Device {
            label,
            message: err.to_string(),
        }),
        None => Ok(module),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shipped(name: &str) -> StageSource {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/shaders").join(name);
        StageSource::read(path).expect("shipped shader is readable")
    }

    #[test]
    fn shipped_stages_compile() {
        shipped("illumination_models.vert.wgsl").compile().unwrap();
        let fragment = shipped("illumination_models.frag.wgsl").compile().unwrap();
        assert_eq!(fragment.entry_points.len(), 4);
    }

    #[test]
    fn syntax_errors_are_parse_failures() {
        let broken = StageSource {
            path: PathBuf::from("broken.wgsl"),
            code: "@fragment fn Lambert( -> vec4<f32> {}".to_string(),
        };
        let err = broken.compile().unwrap_err();
        assert!(matches!(err, ShaderError::Parse { ref label, .. } if label == "broken.wgsl"));
    }

    #[test]
    fn type_errors_are_reported() {
        let broken = StageSource {
            path: PathBuf::from("typed.wgsl"),
            code: "@fragment fn Lambert() -> @location(0) vec4<f32> { return 1.0; }".to_string(),
        };
        let err = broken.compile().unwrap_err();
        assert!(matches!(err, ShaderError::Parse { .. } | ShaderError::Validation { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = StageSource::read("no/such/shader.wgsl").unwrap_err();
        assert!(matches!(err, ShaderError::Io { .. }));
    }
}
