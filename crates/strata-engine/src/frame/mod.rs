//! Per-frame staging.
//!
//! Submissions are copied into four arenas (vertices, path table, uniform blocks,
//! calls) in submission order. Everything here lives for one frame: the arenas are
//! replayed once by the dispatcher and then cleared, keeping their storage.

mod arena;
mod batch;
mod call;
mod uniforms;
mod vertex;

pub use arena::Arena;
pub use batch::{DrawStyle, FrameBatch, FrameStats, SubPath};
pub use call::{Call, CallKind, PathEntry};
pub use uniforms::{FragUniforms, ShaderType, TexType, UniformArena, frag_stride};
pub use vertex::Vertex;
