//! Rendering error types.

use thiserror::Error;

/// Errors that can occur while setting up or driving the GPU.
#[derive(Error, Debug)]
pub enum RenderError {
    /// No adapter compatible with the window surface.
    #[error("failed to create graphics adapter")]
    AdapterCreationFailed,

    /// Failed to create wgpu device.
    #[error("failed to create graphics device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create surface.
    #[error("failed to create surface: {0}")]
    SurfaceCreationFailed(#[from] wgpu::CreateSurfaceError),

    /// The surface reports no usable texture format.
    #[error("surface has no supported format")]
    SurfaceConfigurationFailed,

    /// Surface lost.
    #[error("surface lost")]
    SurfaceLost,

    /// Surface outdated.
    #[error("surface outdated")]
    SurfaceOutdated,

    /// Out of memory.
    #[error("out of memory")]
    OutOfMemory,

    /// Timeout waiting for GPU.
    #[error("timeout waiting for GPU")]
    Timeout,
}

impl From<wgpu::SurfaceError> for RenderError {
    fn from(error: wgpu::SurfaceError) -> Self {
        match error {
            wgpu::SurfaceError::Lost => Self::SurfaceLost,
            wgpu::SurfaceError::OutOfMemory => Self::OutOfMemory,
            wgpu::SurfaceError::Timeout => Self::Timeout,
            // Outdated and anything newer both mean: reconfigure and retry.
            _ => Self::SurfaceOutdated,
        }
    }
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
