//! Frame replay.
//!
//! The dispatcher walks a staged [`FrameBatch`](crate::frame::FrameBatch) and
//! emits the stencil/blend protocol of every call as a flat list of
//! [`GpuCommand`]s. Executors (the wgpu backend, or a software rasteriser in
//! tests) replay that list against a device.
//!
//! Convention:
//! - Draw ranges index the frame's single vertex buffer.
//! - Fans are triangles `(first, first + i, first + i + 1)`.
//! - Front faces wind counter-clockwise as seen on screen.

mod command;
mod dispatch;
mod state;

pub use command::{
    CompareFunction, GpuCommand, STENCIL_ALL, StencilFaceOps, StencilFunc, StencilOp, Topology,
};
pub use dispatch::{CommandExecutor, Dispatcher, FramePacket};
pub use state::{DeviceState, StateCache};
