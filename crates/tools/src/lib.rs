//! Developer Tooling: FPS counter, frame timer, renderer inspector.
//!
//! # Invariants
//! - Tools only read renderer state, apart from resetting the chunk-update
//!   counter once per reporting interval.

mod fps;
mod inspector;
mod timer;

pub use fps::{FpsCounter, FpsReport};
pub use inspector::{RendererInspector, RendererSummary};
pub use timer::FrameTimer;

pub fn crate_info() -> &'static str {
    "chunkview-tools v0.1.0"
}
