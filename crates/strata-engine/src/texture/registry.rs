use std::collections::HashMap;

use crate::error::RenderError;

use super::{
    TextureBackend, TextureDesc, TextureFlags, TextureId, TextureKind, TextureLookup,
    TextureRegion, allocate_id,
};

/// One registered texture.
#[derive(Debug)]
pub struct Texture<H> {
    pub id: TextureId,
    pub desc: TextureDesc,
    pub handle: H,
}

impl<H> Texture<H> {
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.desc.width, self.desc.height)
    }

    #[inline]
    pub fn is_external(&self) -> bool {
        self.desc.flags.contains(TextureFlags::EXTERNAL)
    }
}

/// Cross-frame mapping from [`TextureId`] to backend textures.
///
/// A 1×1 alpha texture is registered at construction and stays resident; it is
/// what untextured draws bind. Textures flagged [`TextureFlags::EXTERNAL`] are
/// looked up like any other but their storage is never freed here.
pub struct TextureRegistry<B: TextureBackend> {
    backend: B,
    textures: HashMap<TextureId, Texture<B::Handle>>,
    dummy: TextureId,
}

impl<B: TextureBackend> TextureRegistry<B> {
    /// Creates the registry and its resident dummy texture.
    pub fn new(mut backend: B) -> Result<Self, RenderError> {
        let desc = TextureDesc::new(1, 1, TextureKind::Alpha, TextureFlags::empty());
        let handle = backend.create(&desc, Some(&[0]))?;
        let dummy = allocate_id()?;

        let mut textures = HashMap::new();
        textures.insert(dummy, Texture { id: dummy, desc, handle });

        Ok(Self { backend, textures, dummy })
    }

    /// Creates a texture and uploads `data` (a tightly packed full image) if given.
    pub fn create(
        &mut self,
        width: u32,
        height: u32,
        kind: TextureKind,
        flags: TextureFlags,
        data: Option<&[u8]>,
    ) -> Result<TextureId, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidTexture(format!("zero-sized texture {width}x{height}")));
        }
        let desc = TextureDesc::new(width, height, kind, flags - TextureFlags::EXTERNAL);
        if let Some(data) = data {
            if data.len() < desc.byte_len() {
                return Err(RenderError::InvalidTexture(format!(
                    "pixel buffer holds {} bytes, {width}x{height} {kind:?} needs {}",
                    data.len(),
                    desc.byte_len()
                )));
            }
        }

        let id = allocate_id()?;
        let handle = self.backend.create(&desc, data)?;
        self.textures.insert(id, Texture { id, desc, handle });

        log::debug!("texture {id} created: {width}x{height} {kind:?} {flags:?}");
        Ok(id)
    }

    /// Wraps a resource owned elsewhere. It is looked up like any other texture but
    /// never destroyed by the registry.
    pub fn register_external(
        &mut self,
        handle: B::Handle,
        width: u32,
        height: u32,
        kind: TextureKind,
        flags: TextureFlags,
    ) -> Result<TextureId, RenderError> {
        let id = allocate_id()?;
        let desc = TextureDesc::new(width, height, kind, flags | TextureFlags::EXTERNAL);
        self.textures.insert(id, Texture { id, desc, handle });

        log::debug!("texture {id} registered as external: {width}x{height} {kind:?}");
        Ok(id)
    }

    /// Replaces the `(x, y, w, h)` region. `data` is the full-size image; only the
    /// region is read from it.
    pub fn update(
        &mut self,
        id: TextureId,
        x: u32,
        y: u32,
        w: u32,
        h: u32,
        data: &[u8],
    ) -> Result<(), RenderError> {
        let tex = self.textures.get_mut(&id).ok_or(RenderError::UnknownTexture(id))?;
        let region = TextureRegion::new(x, y, w, h);
        region.validate(&tex.desc, data)?;
        if region.is_empty() {
            return Ok(());
        }

        self.backend.update(&mut tex.handle, &tex.desc, region, data)
    }

    /// Unregisters `id`, freeing its storage unless it is external.
    ///
    /// The dummy texture cannot be removed.
    pub fn remove(&mut self, id: TextureId) -> Result<(), RenderError> {
        if id == self.dummy {
            return Err(RenderError::InvalidTexture("the dummy texture is resident".into()));
        }
        let tex = self.textures.remove(&id).ok_or(RenderError::UnknownTexture(id))?;

        if tex.is_external() {
            log::debug!("texture {id} released (external, not destroyed)");
        } else {
            self.backend.destroy(tex.handle);
            log::debug!("texture {id} destroyed");
        }
        Ok(())
    }

    #[inline]
    pub fn lookup(&self, id: TextureId) -> Option<&Texture<B::Handle>> {
        self.textures.get(&id)
    }

    #[inline]
    pub fn size(&self, id: TextureId) -> Option<(u32, u32)> {
        self.lookup(id).map(Texture::size)
    }

    #[inline]
    pub fn handle(&self, id: TextureId) -> Option<&B::Handle> {
        self.lookup(id).map(|t| &t.handle)
    }

    /// The texture to bind for `id`: the texture itself, or the dummy for `None`.
    ///
    /// A stale id also resolves to the dummy, with a warning; callers that need to
    /// catch stale ids do so earlier, when the paint is converted.
    pub fn resolve(&self, id: Option<TextureId>) -> Option<&Texture<B::Handle>> {
        match id {
            None => self.textures.get(&self.dummy),
            Some(id) => self.textures.get(&id).or_else(|| {
                log::warn!("texture {id} missing at dispatch; binding dummy");
                self.textures.get(&self.dummy)
            }),
        }
    }

    #[inline]
    pub fn dummy_id(&self) -> TextureId {
        self.dummy
    }

    /// Registered textures, dummy included.
    #[inline]
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// True when only the dummy is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.textures.len() <= 1
    }

    pub fn ids(&self) -> impl Iterator<Item = TextureId> + '_ {
        self.textures.keys().copied()
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: TextureBackend> TextureLookup for TextureRegistry<B> {
    #[inline]
    fn texture_desc(&self, id: TextureId) -> Option<TextureDesc> {
        self.textures.get(&id).map(|t| t.desc)
    }
}

impl<B: TextureBackend> Drop for TextureRegistry<B> {
    fn drop(&mut self) {
        for (_, tex) in self.textures.drain() {
            if !tex.desc.flags.contains(TextureFlags::EXTERNAL) {
                self.backend.destroy(tex.handle);
            }
        }
    }
}
