use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::DeviceError;

/// Handle to a texture owned by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureId(pub u32);

/// Handle to a vertex buffer owned by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BufferId(pub u32);

/// Depth comparison function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareFunc {
    Always,
    Never,
    Less,
    LessEqual,
    Equal,
    GreaterEqual,
    Greater,
    NotEqual,
}

/// Per-channel color write enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorMask {
    pub r: bool,
    pub g: bool,
    pub b: bool,
    pub a: bool,
}

impl ColorMask {
    pub const ALL: Self = Self {
        r: true,
        g: true,
        b: true,
        a: true,
    };
    pub const NONE: Self = Self {
        r: false,
        g: false,
        b: false,
        a: false,
    };
}

/// Position, atlas texture coordinate and baked colour of one vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub colour: [u8; 4],
}

/// Stateful graphics device the renderer drives.
///
/// The renderer only flips the toggles below and issues draws; buffer lifetime
/// is managed by the mesh builder through `create_vertex_buffer` and
/// `delete_vertex_buffer`.
pub trait GraphicsDevice {
    fn set_texturing(&mut self, enabled: bool);
    fn set_alpha_test(&mut self, enabled: bool);
    fn set_alpha_blending(&mut self, enabled: bool);
    fn set_face_culling(&mut self, enabled: bool);
    fn set_depth_test_func(&mut self, func: CompareFunc);
    fn set_color_write(&mut self, mask: ColorMask);
    fn bind_texture(&mut self, texture: TextureId);

    fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> Result<BufferId, DeviceError>;
    fn delete_vertex_buffer(&mut self, buffer: BufferId);

    /// Draw `vertex_count` vertices of `buffer` as quads.
    fn draw_quads(&mut self, buffer: BufferId, vertex_count: u32) -> Result<(), DeviceError>;
}

/// One call received by a [`RecordingDevice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCommand {
    Texturing(bool),
    AlphaTest(bool),
    AlphaBlending(bool),
    FaceCulling(bool),
    DepthFunc(CompareFunc),
    ColorWrite(ColorMask),
    BindTexture(TextureId),
    CreateBuffer { buffer: BufferId, vertices: usize },
    DeleteBuffer(BufferId),
    Draw { buffer: BufferId, vertices: u32 },
}

/// Current value of every toggle a [`RecordingDevice`] tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceState {
    pub texturing: bool,
    pub alpha_test: bool,
    pub alpha_blending: bool,
    pub face_culling: bool,
    pub depth_func: CompareFunc,
    pub color_write: ColorMask,
    pub bound_texture: Option<TextureId>,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            texturing: false,
            alpha_test: false,
            alpha_blending: false,
            face_culling: false,
            depth_func: CompareFunc::Less,
            color_write: ColorMask::ALL,
            bound_texture: None,
        }
    }
}

/// Headless device that records every call instead of talking to a GPU.
///
/// Used by the CLI and tests. Tracks live buffers so leaks and double frees
/// are observable, and can be told to fail allocations.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    commands: Vec<DeviceCommand>,
    buffers: HashMap<BufferId, usize>,
    next_buffer: u32,
    state: DeviceState,
    allocations_left: Option<usize>,
    recording: bool,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self {
            recording: true,
            ..Self::default()
        }
    }

    /// A device that only tracks state and buffers, without a command log.
    pub fn without_log() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DeviceCommand] {
        &self.commands
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Number of buffers created and not yet deleted.
    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_live(&self, buffer: BufferId) -> bool {
        self.buffers.contains_key(&buffer)
    }

    /// Make every allocation after the next `count` ones fail.
    pub fn fail_allocations_after(&mut self, count: usize) {
        self.allocations_left = Some(count);
    }

    fn record(&mut self, command: DeviceCommand) {
        if self.recording {
            self.commands.push(command);
        }
    }
}

impl GraphicsDevice for RecordingDevice {
    fn set_texturing(&mut self, enabled: bool) {
        self.state.texturing = enabled;
        self.record(DeviceCommand::Texturing(enabled));
    }

    fn set_alpha_test(&mut self, enabled: bool) {
        self.state.alpha_test = enabled;
        self.record(DeviceCommand::AlphaTest(enabled));
    }

    fn set_alpha_blending(&mut self, enabled: bool) {
        self.state.alpha_blending = enabled;
        self.record(DeviceCommand::AlphaBlending(enabled));
    }

    fn set_face_culling(&mut self, enabled: bool) {
        self.state.face_culling = enabled;
        self.record(DeviceCommand::FaceCulling(enabled));
    }

    fn set_depth_test_func(&mut self, func: CompareFunc) {
        self.state.depth_func = func;
        self.record(DeviceCommand::DepthFunc(func));
    }

    fn set_color_write(&mut self, mask: ColorMask) {
        self.state.color_write = mask;
        self.record(DeviceCommand::ColorWrite(mask));
    }

    fn bind_texture(&mut self, texture: TextureId) {
        self.state.bound_texture = Some(texture);
        self.record(DeviceCommand::BindTexture(texture));
    }

    fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> Result<BufferId, DeviceError> {
        if let Some(left) = self.allocations_left.as_mut() {
            if *left == 0 {
                return Err(DeviceError::BufferAllocation {
                    vertices: vertices.len(),
                });
            }
            *left -= 1;
        }
        let buffer = BufferId(self.next_buffer);
        self.next_buffer += 1;
        self.buffers.insert(buffer, vertices.len());
        self.record(DeviceCommand::CreateBuffer {
            buffer,
            vertices: vertices.len(),
        });
        Ok(buffer)
    }

    fn delete_vertex_buffer(&mut self, buffer: BufferId) {
        if self.buffers.remove(&buffer).is_none() {
            tracing::warn!(?buffer, "delete of unknown vertex buffer");
        }
        self.record(DeviceCommand::DeleteBuffer(buffer));
    }

    fn draw_quads(&mut self, buffer: BufferId, vertex_count: u32) -> Result<(), DeviceError> {
        if !self.buffers.contains_key(&buffer) {
            return Err(DeviceError::UnknownBuffer(buffer));
        }
        self.record(DeviceCommand::Draw {
            buffer,
            vertices: vertex_count,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Vec<Vertex> {
        vec![
            Vertex {
                position: [0.0; 3],
                uv: [0.0; 2],
                colour: [255; 4],
            };
            4
        ]
    }

    #[test]
    fn buffers_are_tracked() {
        let mut device = RecordingDevice::new();
        let a = device.create_vertex_buffer(&quad()).unwrap();
        let b = device.create_vertex_buffer(&quad()).unwrap();
        assert_ne!(a, b);
        assert_eq!(device.live_buffers(), 2);

        device.delete_vertex_buffer(a);
        assert_eq!(device.live_buffers(), 1);
        assert!(!device.is_live(a));
        assert!(device.is_live(b));
    }

    #[test]
    fn draw_unknown_buffer_fails() {
        let mut device = RecordingDevice::new();
        assert!(matches!(
            device.draw_quads(BufferId(7), 4),
            Err(DeviceError::UnknownBuffer(BufferId(7)))
        ));
    }

    #[test]
    fn allocation_failure_injection() {
        let mut device = RecordingDevice::new();
        device.fail_allocations_after(1);
        assert!(device.create_vertex_buffer(&quad()).is_ok());
        assert!(matches!(
            device.create_vertex_buffer(&quad()),
            Err(DeviceError::BufferAllocation { vertices: 4 })
        ));
        assert_eq!(device.live_buffers(), 1);
    }

    #[test]
    fn state_follows_toggles() {
        let mut device = RecordingDevice::new();
        device.set_alpha_blending(true);
        device.set_depth_test_func(CompareFunc::LessEqual);
        device.set_color_write(ColorMask::NONE);
        device.bind_texture(TextureId(3));

        let state = device.state();
        assert!(state.alpha_blending);
        assert_eq!(state.depth_func, CompareFunc::LessEqual);
        assert_eq!(state.color_write, ColorMask::NONE);
        assert_eq!(state.bound_texture, Some(TextureId(3)));
        assert_eq!(device.commands().len(), 4);
    }

    #[test]
    fn without_log_records_nothing() {
        let mut device = RecordingDevice::without_log();
        device.set_texturing(true);
        device.create_vertex_buffer(&quad()).unwrap();
        assert!(device.commands().is_empty());
        assert_eq!(device.live_buffers(), 1);
        assert!(device.state().texturing);
    }
}
