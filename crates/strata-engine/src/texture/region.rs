use crate::error::RenderError;

use super::TextureDesc;

/// Sub-rectangle of a texture, in texels.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Where a region's texels live inside a caller-supplied pixel buffer.
///
/// Every layout is computed per upload from the texture and region alone; nothing
/// carries over from one upload to the next, so a partial copy never leaks its row
/// length or skip offsets into a later full-image upload.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UploadLayout {
    /// Byte offset of the region's first texel.
    pub offset: usize,
    /// Stride between rows, in bytes (the full texture row).
    pub bytes_per_row: u32,
    /// Number of rows copied.
    pub rows: u32,
}

impl TextureRegion {
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// The whole texture.
    #[inline]
    pub const fn full(desc: &TextureDesc) -> Self {
        Self::new(0, 0, desc.width, desc.height)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True when the region lies inside a `width × height` texture.
    pub fn fits(&self, width: u32, height: u32) -> bool {
        let right = self.x.checked_add(self.width);
        let bottom = self.y.checked_add(self.height);
        matches!((right, bottom), (Some(r), Some(b)) if r <= width && b <= height)
    }

    /// Layout of this region inside a full-size image buffer of `desc`.
    ///
    /// Rows are `desc.width` texels apart and the region starts `y` rows and `x`
    /// texels in, so callers hand over the whole image and only the region is read.
    pub fn upload_layout(&self, desc: &TextureDesc) -> UploadLayout {
        let bpp = desc.kind.bytes_per_pixel();
        let row = desc.width as usize * bpp;
        UploadLayout {
            offset: self.y as usize * row + self.x as usize * bpp,
            bytes_per_row: row as u32,
            rows: self.height,
        }
    }

    /// Checks bounds and buffer length, returning the layout to read `data` with.
    pub fn validate(&self, desc: &TextureDesc, data: &[u8]) -> Result<UploadLayout, RenderError> {
        if !self.fits(desc.width, desc.height) {
            return Err(RenderError::InvalidTexture(format!(
                "region {self:?} exceeds {}x{} texture",
                desc.width, desc.height
            )));
        }

        let layout = self.upload_layout(desc);
        if self.is_empty() {
            return Ok(layout);
        }

        let bpp = desc.kind.bytes_per_pixel();
        let needed = layout.offset
            + (self.height as usize - 1) * layout.bytes_per_row as usize
            + self.width as usize * bpp;
        if data.len() < needed {
            return Err(RenderError::InvalidTexture(format!(
                "pixel buffer holds {} bytes, region {self:?} needs {needed}",
                data.len()
            )));
        }
        Ok(layout)
    }

    /// Copies the region out of a full-size `data` image into the same place in `dst`.
    ///
    /// `dst` must be a tightly packed full image of `desc`; `layout` comes from
    /// [`TextureRegion::validate`].
    pub fn copy_into(&self, desc: &TextureDesc, layout: UploadLayout, data: &[u8], dst: &mut [u8]) {
        let bpp = desc.kind.bytes_per_pixel();
        let row_len = self.width as usize * bpp;
        let stride = layout.bytes_per_row as usize;
        for row in 0..self.height as usize {
            let at = layout.offset + row * stride;
            dst[at..at + row_len].copy_from_slice(&data[at..at + row_len]);
        }
    }
}
