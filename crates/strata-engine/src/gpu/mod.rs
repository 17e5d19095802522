//! wgpu implementation of the texture backend and the command executor.
//!
//! The dispatcher never names wgpu; device work lives here.
//! [`WgpuTextures`] owns texture storage, [`WgpuBackend`] owns buffers, pipelines
//! and the stencil attachment, and [`WgpuPass`] replays one frame into a
//! [`RenderTarget`].

mod backend;
mod device;
mod error_scope;
mod pipeline;
mod target;
mod textures;

pub use backend::{WgpuBackend, WgpuPass};
pub use device::{Gpu, GpuInit};
pub use target::RenderTarget;
pub use textures::{GpuTexture, WgpuTextures};
