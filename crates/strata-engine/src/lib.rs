//! Strata engine crate.
//!
//! Batches tessellated 2D paths into frame arenas and replays them through a
//! stencil-based fill and stroke protocol on wgpu.

pub mod config;
pub mod coords;
pub mod error;
pub mod frame;
pub mod gpu;
pub mod logging;
pub mod paint;
pub mod render;
pub mod renderer;
pub mod texture;

pub use config::{RendererConfig, StrokePolicy};
pub use error::{ArenaKind, RenderError};
pub use frame::{DrawStyle, FrameStats, SubPath, Vertex};
pub use renderer::Renderer;
