//! Error types for curlfield.
//!
//! Initialization is the only place errors can surface: the simulator has no
//! degraded-mode rendering path, so a missing capability or a failed shader
//! build is fatal for the component that needed it. Steady-state frames do
//! not produce errors from this crate.

use std::fmt;

/// Errors raised while acquiring the GPU at startup.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
    /// The adapter cannot render to float position textures.
    FloatTargetUnsupported,
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
            GpuError::FloatTargetUnsupported => write!(f, "Adapter cannot use Rgba32Float textures as render targets; particle state cannot live on this GPU."),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors raised while building a pipeline stage.
///
/// Shader modules and pipelines are validated inside a device error scope at
/// construction; a validation failure lands here with the stage's label.
#[derive(Debug)]
pub enum StageError {
    /// Shader or pipeline validation failed for the named stage.
    PipelineValidation { stage: &'static str, message: String },
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageError::PipelineValidation { stage, message } => {
                write!(f, "Failed to build {} pipeline: {}", stage, message)
            }
        }
    }
}

impl std::error::Error for StageError {}

/// Errors that can occur while loading a point sprite.
#[derive(Debug)]
pub enum SpriteError {
    /// Failed to decode image file.
    ImageLoad(image::ImageError),
    /// Failed to read file from disk.
    Io(std::io::Error),
}

impl fmt::Display for SpriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpriteError::ImageLoad(e) => write!(f, "Failed to load sprite image: {}", e),
            SpriteError::Io(e) => write!(f, "Failed to read sprite file: {}", e),
        }
    }
}

impl std::error::Error for SpriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SpriteError::ImageLoad(e) => Some(e),
            SpriteError::Io(e) => Some(e),
        }
    }
}

impl From<image::ImageError> for SpriteError {
    fn from(e: image::ImageError) -> Self {
        SpriteError::ImageLoad(e)
    }
}

impl From<std::io::Error> for SpriteError {
    fn from(e: std::io::Error) -> Self {
        SpriteError::Io(e)
    }
}

/// Top-level errors for running the simulator.
#[derive(Debug)]
pub enum SimulatorError {
    /// Failed to create event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// A pipeline stage failed to build.
    Stage(StageError),
    /// Point sprite could not be loaded.
    Sprite(SpriteError),
}

impl fmt::Display for SimulatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulatorError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            SimulatorError::Window(e) => write!(f, "Failed to create window: {}", e),
            SimulatorError::Gpu(e) => write!(f, "GPU error: {}", e),
            SimulatorError::Stage(e) => write!(f, "Stage error: {}", e),
            SimulatorError::Sprite(e) => write!(f, "Sprite error: {}", e),
        }
    }
}

impl std::error::Error for SimulatorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulatorError::EventLoop(e) => Some(e),
            SimulatorError::Window(e) => Some(e),
            SimulatorError::Gpu(e) => Some(e),
            SimulatorError::Stage(e) => Some(e),
            SimulatorError::Sprite(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for SimulatorError {
    fn from(e: winit::error::EventLoopError) -> Self {
        SimulatorError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for SimulatorError {
    fn from(e: winit::error::OsError) -> Self {
        SimulatorError::Window(e)
    }
}

impl From<GpuError> for SimulatorError {
    fn from(e: GpuError) -> Self {
        SimulatorError::Gpu(e)
    }
}

impl From<StageError> for SimulatorError {
    fn from(e: StageError) -> Self {
        SimulatorError::Stage(e)
    }
}

impl From<SpriteError> for SimulatorError {
    fn from(e: SpriteError) -> Self {
        SimulatorError::Sprite(e)
    }
}
