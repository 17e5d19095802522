use crate::error::RenderError;

use super::{TextureDesc, TextureRegion};

/// Storage behind the [`TextureRegistry`](super::TextureRegistry).
///
/// The registry owns ids, metadata and the ownership rules; a backend only creates,
/// writes and frees the resources themselves.
pub trait TextureBackend {
    /// Backend resource of one texture.
    type Handle;

    /// Allocates storage for `desc` and uploads `data` (a tightly packed full image)
    /// when given. Without data the contents are unspecified.
    ///
    /// When `desc.flags` asks for mipmaps the backend builds the whole chain.
    fn create(&mut self, desc: &TextureDesc, data: Option<&[u8]>) -> Result<Self::Handle, RenderError>;

    /// Copies `region` out of `data`, a full-size image of `desc`, into the texture.
    ///
    /// The region has already been bounds-checked against `desc` and `data`.
    fn update(
        &mut self,
        handle: &mut Self::Handle,
        desc: &TextureDesc,
        region: TextureRegion,
        data: &[u8],
    ) -> Result<(), RenderError>;

    /// Frees an owned texture. Never called for externally owned ones.
    fn destroy(&mut self, handle: Self::Handle);
}
