use bytemuck::{Pod, Zeroable};

use crate::error::{ArenaKind, RenderError};

use super::Arena;

/// Fragment shader variant.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(i32)]
pub enum ShaderType {
    FillGradient = 0,
    FillImage = 1,
    /// Stencil-only passes; color output is irrelevant.
    Simple = 2,
    /// Raw triangle submissions (glyph quads).
    Image = 3,
}

/// How the shader interprets a sampled texel.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(i32)]
pub enum TexType {
    PremultipliedRgba = 0,
    /// Straight-alpha RGBA; premultiplied after sampling.
    Rgba = 1,
    /// Single channel, replicated to all four.
    Alpha = 2,
    None = 3,
}

/// Per-draw shader parameter block.
///
/// Eleven `vec4`s; the WGSL side reads it as `array<vec4<f32>, 11>` and unpacks
/// fields by position, so the field order here is load-bearing.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct FragUniforms {
    /// Inverse scissor transform, padded columns.
    pub scissor_mat: [[f32; 4]; 3],
    /// Inverse paint transform, padded columns.
    pub paint_mat: [[f32; 4]; 3],
    pub inner_color: [f32; 4],
    pub outer_color: [f32; 4],
    pub scissor_ext: [f32; 2],
    pub scissor_scale: [f32; 2],
    pub extent: [f32; 2],
    pub radius: f32,
    pub feather: f32,
    pub stroke_mult: f32,
    /// Coverage below this is discarded; `-1` disables the test.
    pub stroke_thr: f32,
    pub tex_type: i32,
    pub shader_type: i32,
}

impl FragUniforms {
    pub const SIZE: usize = std::mem::size_of::<FragUniforms>();

    /// Block used by stencil-only passes.
    pub fn simple() -> Self {
        Self {
            stroke_thr: -1.0,
            shader_type: ShaderType::Simple as i32,
            tex_type: TexType::None as i32,
            ..Self::zeroed()
        }
    }

    #[inline]
    pub fn set_shader_type(&mut self, ty: ShaderType) {
        self.shader_type = ty as i32;
    }

    #[inline]
    pub fn set_tex_type(&mut self, ty: TexType) {
        self.tex_type = ty as i32;
    }
}

/// Block stride: `FragUniforms::SIZE` rounded up to the device's uniform offset
/// alignment. Fixed for the life of a renderer.
#[inline]
pub fn frag_stride(alignment: u32) -> usize {
    let align = (alignment as usize).max(1);
    FragUniforms::SIZE.div_ceil(align) * align
}

/// Uniform blocks laid out at `stride`-byte intervals, ready to upload as is.
#[derive(Debug)]
pub struct UniformArena {
    bytes: Arena<u8>,
    stride: usize,
}

impl UniformArena {
    /// `floor` is in blocks.
    pub fn new(stride: usize, floor: usize) -> Self {
        debug_assert!(stride >= FragUniforms::SIZE);
        Self {
            bytes: Arena::new(ArenaKind::Uniform, floor.saturating_mul(stride)),
            stride,
        }
    }

    /// Reserves `n` zeroed blocks and returns the index of the first.
    pub fn alloc(&mut self, n: usize) -> Result<usize, RenderError> {
        let exhausted = RenderError::ResourceExhausted { arena: ArenaKind::Uniform, requested: n };
        let len = n.checked_mul(self.stride).ok_or(exhausted.clone())?;
        let offset = self.bytes.alloc(len, 0).map_err(|_| exhausted)?;
        Ok(offset / self.stride)
    }

    /// Overwrites block `index`, which must have been allocated.
    pub fn write(&mut self, index: usize, block: &FragUniforms) {
        let at = index * self.stride;
        self.bytes.as_mut_slice()[at..at + FragUniforms::SIZE].copy_from_slice(bytemuck::bytes_of(block));
    }

    /// Reads block `index` back.
    pub fn get(&self, index: usize) -> Option<FragUniforms> {
        let at = index.checked_mul(self.stride)?;
        let bytes = self.bytes.as_slice().get(at..at + FragUniforms::SIZE)?;
        Some(bytemuck::pod_read_unaligned(bytes))
    }

    /// Byte offset of block `index`, as bound with a dynamic offset.
    #[inline]
    pub fn byte_offset(&self, index: usize) -> usize {
        index * self.stride
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of blocks.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len() / self.stride
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    #[inline]
    pub fn grow_count(&self) -> usize {
        self.bytes.grow_count()
    }

    #[inline]
    pub fn mark(&self) -> usize {
        self.bytes.mark()
    }

    #[inline]
    pub fn truncate(&mut self, mark: usize) {
        self.bytes.truncate(mark);
    }

    #[inline]
    pub fn clear(&mut self) {
        self.bytes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_is_eleven_vec4s() {
        assert_eq!(FragUniforms::SIZE, 11 * 16);
    }

    #[test]
    fn stride_rounds_up_to_alignment() {
        assert_eq!(frag_stride(256), 256);
        assert_eq!(frag_stride(64), 192);
        assert_eq!(frag_stride(16), 176);
        assert_eq!(frag_stride(0), 176);
    }

    #[test]
    fn blocks_land_at_stride_offsets() {
        let mut arena = UniformArena::new(256, 4);
        let first = arena.alloc(2).unwrap();
        let third = arena.alloc(1).unwrap();
        assert_eq!((first, third), (0, 2));
        assert_eq!(arena.byte_offset(third), 512);
        assert_eq!(arena.as_bytes().len(), 768);

        let mut block = FragUniforms::simple();
        block.radius = 4.0;
        arena.write(third, &block);
        assert_eq!(arena.get(third), Some(block));
        assert_eq!(arena.get(first), Some(FragUniforms::zeroed()));
        assert_eq!(arena.get(3), None);
    }

    #[test]
    fn simple_block_disables_threshold() {
        let s = FragUniforms::simple();
        assert_eq!(s.stroke_thr, -1.0);
        assert_eq!(s.shader_type, ShaderType::Simple as i32);
    }
}
