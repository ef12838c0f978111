use std::path::PathBuf;

/// Shader loading, compilation and linking failures.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("Failed to read shader {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to compile {label}:\n{message}")]
    Parse { label: String, message: String },

    #[error("Failed to validate {label}:\n{message}")]
    Validation { label: String, message: String },

    #[error("Device rejected {label}: {message}")]
    Device { label: String, message: String },

    #[error("Shader program has no `{0}` fragment entry point")]
    MissingVariant(String),
}

/// Mesh loading failures.
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("Failed to load mesh {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("Mesh {0} contains no triangles")]
    Empty(PathBuf),
}

/// Everything that can abort startup. Once the render loop runs, nothing is
/// reported through this type.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("Failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("No suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("Failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error(transparent)]
    Mesh(#[from] MeshError),
}
