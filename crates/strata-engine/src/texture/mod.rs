//! Persistent texture registry.
//!
//! Textures outlive frames: they are created on demand, looked up by id while
//! frames are staged and replayed, and destroyed explicitly (or when the registry
//! drops) unless they wrap an externally owned GPU resource.
//!
//! GPU storage is delegated to a [`TextureBackend`]; the wgpu one lives in
//! `crate::gpu`, and [`MemoryTextures`] keeps pixels in RAM for headless use.

mod backend;
mod id;
mod memory;
mod mipmap;
mod region;
mod registry;

pub use backend::TextureBackend;
pub use id::TextureId;
pub use memory::{MemoryTexture, MemoryTextures};
pub use mipmap::{MipLevel, mip_chain, mip_level_count};
pub use region::{TextureRegion, UploadLayout};
pub use registry::{Texture, TextureRegistry};

pub(crate) use id::allocate_id;

/// Pixel format of a texture.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TextureKind {
    /// 8-bit RGBA.
    Rgba,
    /// 8-bit single channel, sampled as coverage/alpha.
    Alpha,
}

impl TextureKind {
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            TextureKind::Rgba => 4,
            TextureKind::Alpha => 1,
        }
    }
}

bitflags::bitflags! {
    /// Sampling, upload and ownership flags of a texture.
    #[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
    pub struct TextureFlags: u32 {
        /// Build a full mip chain on upload.
        const GENERATE_MIPMAPS = 1 << 0;
        /// Repeat horizontally instead of clamping to edge.
        const REPEAT_X = 1 << 1;
        /// Repeat vertically instead of clamping to edge.
        const REPEAT_Y = 1 << 2;
        /// Image rows are stored bottom-up; paints flip them back.
        const FLIP_Y = 1 << 3;
        /// RGBA data is already premultiplied.
        const PREMULTIPLIED = 1 << 4;
        /// Nearest-neighbour filtering instead of linear.
        const NEAREST = 1 << 5;
        /// GPU resource is owned elsewhere; never destroyed by the registry.
        const EXTERNAL = 1 << 16;
    }
}

/// Size and format of a texture, as needed to create or update it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub kind: TextureKind,
    pub flags: TextureFlags,
}

impl TextureDesc {
    #[inline]
    pub const fn new(width: u32, height: u32, kind: TextureKind, flags: TextureFlags) -> Self {
        Self { width, height, kind, flags }
    }

    /// Byte length of a tightly packed full image.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * self.kind.bytes_per_pixel()
    }
}

/// Read-only texture metadata lookup, used by the paint converter and dispatcher.
pub trait TextureLookup {
    fn texture_desc(&self, id: TextureId) -> Option<TextureDesc>;

    #[inline]
    fn contains(&self, id: TextureId) -> bool {
        self.texture_desc(id).is_some()
    }
}
