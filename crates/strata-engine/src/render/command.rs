use crate::paint::Blend;
use crate::texture::TextureId;

/// Full 8-bit stencil mask.
pub const STENCIL_ALL: u32 = 0xff;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CompareFunction {
    Always,
    Equal,
    NotEqual,
}

impl CompareFunction {
    /// Evaluates `reference & mask` against `value & mask`.
    pub fn passes(self, reference: u32, value: u32, mask: u32) -> bool {
        match self {
            CompareFunction::Always => true,
            CompareFunction::Equal => reference & mask == value & mask,
            CompareFunction::NotEqual => reference & mask != value & mask,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum StencilOp {
    Keep,
    Zero,
    /// Increment, saturating at the maximum.
    IncrementClamp,
    IncrementWrap,
    DecrementWrap,
}

impl StencilOp {
    /// Applies the operation to an 8-bit stencil value.
    pub fn apply(self, value: u8) -> u8 {
        match self {
            StencilOp::Keep => value,
            StencilOp::Zero => 0,
            StencilOp::IncrementClamp => value.saturating_add(1),
            StencilOp::IncrementWrap => value.wrapping_add(1),
            StencilOp::DecrementWrap => value.wrapping_sub(1),
        }
    }
}

/// Stencil operations of one face: on stencil fail, depth fail and pass.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct StencilFaceOps {
    pub fail: StencilOp,
    pub depth_fail: StencilOp,
    pub pass: StencilOp,
}

impl StencilFaceOps {
    pub const KEEP: StencilFaceOps = StencilFaceOps::new(StencilOp::Keep, StencilOp::Keep, StencilOp::Keep);
    pub const ZERO: StencilFaceOps = StencilFaceOps::new(StencilOp::Zero, StencilOp::Zero, StencilOp::Zero);

    #[inline]
    pub const fn new(fail: StencilOp, depth_fail: StencilOp, pass: StencilOp) -> Self {
        Self { fail, depth_fail, pass }
    }

    /// Keep on failure, `pass` on pass.
    #[inline]
    pub const fn on_pass(pass: StencilOp) -> Self {
        Self::new(StencilOp::Keep, StencilOp::Keep, pass)
    }
}

/// Stencil test: compare `reference & read_mask` with the stored value.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct StencilFunc {
    pub compare: CompareFunction,
    pub reference: u32,
    pub read_mask: u32,
}

impl StencilFunc {
    #[inline]
    pub const fn new(compare: CompareFunction, reference: u32, read_mask: u32) -> Self {
        Self { compare, reference, read_mask }
    }

    pub const ALWAYS: StencilFunc = StencilFunc::new(CompareFunction::Always, 0, STENCIL_ALL);
    pub const EQUAL_ZERO: StencilFunc = StencilFunc::new(CompareFunction::Equal, 0, STENCIL_ALL);
    pub const NOT_EQUAL_ZERO: StencilFunc = StencilFunc::new(CompareFunction::NotEqual, 0, STENCIL_ALL);
}

/// Primitive assembly of a draw.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Topology {
    /// Vertex 0 is shared by every triangle `(0, i, i + 1)`.
    TriangleFan,
    TriangleStrip,
    TriangleList,
}

/// One step of a replayed frame.
///
/// State set by a command holds until a later command changes it. Draw ranges
/// index the frame's vertex buffer; `BindUniforms` names a block of its uniform
/// buffer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GpuCommand {
    StencilTest(bool),
    StencilWriteMask(u32),
    StencilFunc(StencilFunc),
    StencilOps { front: StencilFaceOps, back: StencilFaceOps },
    ColorWrite(bool),
    /// Back-face culling.
    Cull(bool),
    Blend(Blend),
    BindUniforms { block: usize },
    BindTexture(TextureId),
    Draw { topology: Topology, first: u32, count: u32 },
}

impl GpuCommand {
    #[inline]
    pub fn is_draw(&self) -> bool {
        matches!(self, GpuCommand::Draw { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapping_ops_wrap_and_clamp_saturates() {
        assert_eq!(StencilOp::IncrementWrap.apply(255), 0);
        assert_eq!(StencilOp::DecrementWrap.apply(0), 255);
        assert_eq!(StencilOp::IncrementClamp.apply(255), 255);
        assert_eq!(StencilOp::Zero.apply(7), 0);
        assert_eq!(StencilOp::Keep.apply(7), 7);
    }

    #[test]
    fn compare_uses_masked_values() {
        assert!(CompareFunction::Equal.passes(0, 0x100, 0xff));
        assert!(CompareFunction::NotEqual.passes(0, 3, 0xff));
        assert!(!CompareFunction::NotEqual.passes(0, 0, 0xff));
        assert!(CompareFunction::Always.passes(1, 2, 0));
    }
}
