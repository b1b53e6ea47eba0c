use serde::{Deserialize, Serialize};

/// Renderer tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Maximum number of chunk meshes (re)built per frame.
    pub chunk_updates_per_frame: usize,
    /// Default view distance in blocks handed to each frame.
    pub view_distance: f32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            chunk_updates_per_frame: 4,
            view_distance: 128.0,
        }
    }
}
