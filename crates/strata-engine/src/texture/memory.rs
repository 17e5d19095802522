use crate::error::RenderError;

use super::{MipLevel, TextureBackend, TextureDesc, TextureFlags, TextureRegion, mip_chain};

/// RAM-resident texture: the full base image plus its mip chain.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryTexture {
    pub pixels: Vec<u8>,
    pub mips: Vec<MipLevel>,
}

impl MemoryTexture {
    /// Zero-filled texture of `desc`.
    pub fn new(desc: &TextureDesc) -> Self {
        let mut tex = Self {
            pixels: vec![0; desc.byte_len()],
            mips: Vec::new(),
        };
        tex.rebuild_mips(desc);
        tex
    }

    fn rebuild_mips(&mut self, desc: &TextureDesc) {
        if desc.flags.contains(TextureFlags::GENERATE_MIPMAPS) {
            self.mips = mip_chain(&self.pixels, desc.width, desc.height, desc.kind.bytes_per_pixel());
        }
    }
}

/// Texture backend that keeps pixels in memory.
///
/// Used for headless rendering paths and by tests; also counts resource traffic so
/// ownership rules can be checked.
#[derive(Debug, Default)]
pub struct MemoryTextures {
    created: usize,
    updated: usize,
    destroyed: usize,
}

impl MemoryTextures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Textures created so far (external ones are not created here).
    pub fn created(&self) -> usize {
        self.created
    }

    pub fn updated(&self) -> usize {
        self.updated
    }

    /// Textures freed so far.
    pub fn destroyed(&self) -> usize {
        self.destroyed
    }

    /// Textures currently alive.
    pub fn live(&self) -> usize {
        self.created - self.destroyed
    }
}

impl TextureBackend for MemoryTextures {
    type Handle = MemoryTexture;

    fn create(&mut self, desc: &TextureDesc, data: Option<&[u8]>) -> Result<MemoryTexture, RenderError> {
        let mut tex = MemoryTexture {
            pixels: vec![0; desc.byte_len()],
            mips: Vec::new(),
        };
        if let Some(data) = data {
            let src = data.get(..desc.byte_len()).ok_or_else(|| short_buffer("initial data", data.len(), desc))?;
            tex.pixels.copy_from_slice(src);
        }
        tex.rebuild_mips(desc);

        self.created += 1;
        Ok(tex)
    }

    fn update(
        &mut self,
        handle: &mut MemoryTexture,
        desc: &TextureDesc,
        region: TextureRegion,
        data: &[u8],
    ) -> Result<(), RenderError> {
        let layout = region.validate(desc, data)?;
        // External handles are built by the caller and may not match their descriptor.
        if handle.pixels.len() < desc.byte_len() {
            return Err(short_buffer("texture storage", handle.pixels.len(), desc));
        }
        region.copy_into(desc, layout, data, &mut handle.pixels);
        handle.rebuild_mips(desc);

        self.updated += 1;
        Ok(())
    }

    fn destroy(&mut self, _handle: MemoryTexture) {
        self.destroyed += 1;
    }
}

fn short_buffer(what: &str, len: usize, desc: &TextureDesc) -> RenderError {
    RenderError::InvalidTexture(format!(
        "{what} holds {len} bytes, {}x{} {:?} needs {}",
        desc.width,
        desc.height,
        desc.kind,
        desc.byte_len()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::TextureKind;

    #[test]
    fn update_rebuilds_mip_chain() {
        let desc = TextureDesc::new(2, 2, TextureKind::Alpha, TextureFlags::GENERATE_MIPMAPS);
        let mut backend = MemoryTextures::new();
        let mut tex = backend.create(&desc, Some(&[0, 0, 0, 0])).unwrap();
        assert_eq!(tex.mips[0].pixels, vec![0]);

        backend
            .update(&mut tex, &desc, TextureRegion::full(&desc), &[200, 200, 200, 200])
            .unwrap();
        assert_eq!(tex.mips[0].pixels, vec![200]);
        assert_eq!(backend.updated(), 1);
    }

    #[test]
    fn counts_track_lifetime() {
        let desc = TextureDesc::new(1, 1, TextureKind::Rgba, TextureFlags::empty());
        let mut backend = MemoryTextures::new();
        let tex = backend.create(&desc, None).unwrap();
        assert_eq!(tex.pixels, vec![0; 4]);
        assert_eq!(backend.live(), 1);
        backend.destroy(tex);
        assert_eq!(backend.live(), 0);
        assert_eq!(backend.destroyed(), 1);
    }

    #[test]
    fn undersized_storage_is_rejected_on_update() {
        let small = TextureDesc::new(1, 1, TextureKind::Rgba, TextureFlags::empty());
        let desc = TextureDesc::new(4, 4, TextureKind::Rgba, TextureFlags::empty());
        let mut backend = MemoryTextures::new();
        let mut tex = MemoryTexture::new(&small);

        let data = vec![7; desc.byte_len()];
        let err = backend.update(&mut tex, &desc, TextureRegion::new(2, 2, 2, 2), &data);
        assert!(matches!(err, Err(RenderError::InvalidTexture(_))));
        assert_eq!(tex.pixels, vec![0; 4]);
        assert_eq!(backend.updated(), 0);
    }

    #[test]
    fn short_initial_data_is_rejected_on_create() {
        let desc = TextureDesc::new(2, 2, TextureKind::Alpha, TextureFlags::empty());
        let mut backend = MemoryTextures::new();
        assert!(matches!(backend.create(&desc, Some(&[1, 2])), Err(RenderError::InvalidTexture(_))));
        assert_eq!(backend.created(), 0);
    }
}
