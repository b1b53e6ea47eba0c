use crate::device::BufferId;

/// Failures reported by a graphics device.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("vertex buffer allocation failed ({vertices} vertices)")]
    BufferAllocation { vertices: usize },
    #[error("unknown vertex buffer {0:?}")]
    UnknownBuffer(BufferId),
}

/// Errors from the map renderer.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("invalid world dimensions {width}x{height}x{length}")]
    InvalidDimensions { width: u32, height: u32, length: u32 },
    #[error(transparent)]
    Device(#[from] DeviceError),
}
