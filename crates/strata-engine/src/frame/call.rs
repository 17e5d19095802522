use crate::paint::Blend;
use crate::texture::TextureId;

/// Stencil protocol a call is replayed with.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CallKind {
    /// Arbitrary (possibly self-overlapping) fill through the stencil buffer.
    Fill,
    /// Single convex path drawn directly.
    ConvexFill,
    /// Stroke painted once per pixel in three stencil passes; owns two blocks.
    StencilStroke,
    /// Stroke drawn directly; overlaps may blend twice.
    Stroke,
    /// Raw triangle list.
    Triangles,
}

/// Vertex ranges of one subpath.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct PathEntry {
    pub fill_offset: usize,
    pub fill_count: usize,
    pub stroke_offset: usize,
    pub stroke_count: usize,
}

/// One staged draw request.
///
/// `path_*` index the path table, `triangle_*` the vertex arena (the bounding
/// quad of a fill, or the raw vertices of a triangle submission) and
/// `uniform_block` the uniform arena.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Call {
    pub kind: CallKind,
    pub image: Option<TextureId>,
    pub path_offset: usize,
    pub path_count: usize,
    pub triangle_offset: usize,
    pub triangle_count: usize,
    pub uniform_block: usize,
    pub blend: Blend,
}

impl Call {
    #[inline]
    pub fn paths(&self) -> std::ops::Range<usize> {
        self.path_offset..self.path_offset + self.path_count
    }

    /// Uniform blocks the call owns.
    pub fn uniform_blocks(&self) -> usize {
        match self.kind {
            CallKind::Fill | CallKind::StencilStroke => 2,
            CallKind::ConvexFill | CallKind::Stroke | CallKind::Triangles => 1,
        }
    }
}
