/// GPU blend factor.
///
/// The discriminants are the bit values used in [`CompositeOperationState`], so a
/// raw state coming from the tessellator can be decoded with [`BlendFactor::from_bits`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u32)]
pub enum BlendFactor {
    Zero = 1 << 0,
    One = 1 << 1,
    SrcColor = 1 << 2,
    OneMinusSrcColor = 1 << 3,
    DstColor = 1 << 4,
    OneMinusDstColor = 1 << 5,
    SrcAlpha = 1 << 6,
    OneMinusSrcAlpha = 1 << 7,
    DstAlpha = 1 << 8,
    OneMinusDstAlpha = 1 << 9,
    SrcAlphaSaturate = 1 << 10,
}

impl BlendFactor {
    const ALL: [BlendFactor; 11] = [
        BlendFactor::Zero,
        BlendFactor::One,
        BlendFactor::SrcColor,
        BlendFactor::OneMinusSrcColor,
        BlendFactor::DstColor,
        BlendFactor::OneMinusDstColor,
        BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha,
        BlendFactor::DstAlpha,
        BlendFactor::OneMinusDstAlpha,
        BlendFactor::SrcAlphaSaturate,
    ];

    #[inline]
    pub const fn bits(self) -> u32 {
        self as u32
    }

    /// Decodes a single factor bit; anything else is `None`.
    pub fn from_bits(bits: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.bits() == bits)
    }
}

/// Standard compositing operations.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CompositeOperation {
    SourceOver,
    SourceIn,
    SourceOut,
    Atop,
    DestinationOver,
    DestinationIn,
    DestinationOut,
    DestinationAtop,
    Lighter,
    Copy,
    Xor,
}

impl CompositeOperation {
    /// Raw factor state for this operation (same factors for RGB and alpha).
    pub fn state(self) -> CompositeOperationState {
        use BlendFactor::*;

        let (src, dst) = match self {
            CompositeOperation::SourceOver => (One, OneMinusSrcAlpha),
            CompositeOperation::SourceIn => (DstAlpha, Zero),
            CompositeOperation::SourceOut => (OneMinusDstAlpha, Zero),
            CompositeOperation::Atop => (DstAlpha, OneMinusSrcAlpha),
            CompositeOperation::DestinationOver => (OneMinusDstAlpha, One),
            CompositeOperation::DestinationIn => (Zero, SrcAlpha),
            CompositeOperation::DestinationOut => (Zero, OneMinusSrcAlpha),
            CompositeOperation::DestinationAtop => (OneMinusDstAlpha, SrcAlpha),
            CompositeOperation::Lighter => (One, One),
            CompositeOperation::Copy => (One, Zero),
            CompositeOperation::Xor => (OneMinusDstAlpha, OneMinusSrcAlpha),
        };
        CompositeOperationState::separate(src, dst, src, dst)
    }
}

/// Composite state as submitted with a draw request: four raw factor bits.
///
/// Kept raw so an unrecognised combination can still be represented; it resolves to
/// premultiplied source-over in [`Blend::resolve`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct CompositeOperationState {
    pub src_rgb: u32,
    pub dst_rgb: u32,
    pub src_alpha: u32,
    pub dst_alpha: u32,
}

impl Default for CompositeOperationState {
    fn default() -> Self {
        CompositeOperation::SourceOver.state()
    }
}

impl From<CompositeOperation> for CompositeOperationState {
    fn from(op: CompositeOperation) -> Self {
        op.state()
    }
}

impl CompositeOperationState {
    pub const fn separate(
        src_rgb: BlendFactor,
        dst_rgb: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    ) -> Self {
        Self {
            src_rgb: src_rgb.bits(),
            dst_rgb: dst_rgb.bits(),
            src_alpha: src_alpha.bits(),
            dst_alpha: dst_alpha.bits(),
        }
    }
}

/// Resolved blend function: independent source/destination factors for the color
/// and alpha channels.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Blend {
    pub src_rgb: BlendFactor,
    pub dst_rgb: BlendFactor,
    pub src_alpha: BlendFactor,
    pub dst_alpha: BlendFactor,
}

impl Default for Blend {
    fn default() -> Self {
        Self::PREMULTIPLIED_SOURCE_OVER
    }
}

impl Blend {
    pub const PREMULTIPLIED_SOURCE_OVER: Blend = Blend {
        src_rgb: BlendFactor::One,
        dst_rgb: BlendFactor::OneMinusSrcAlpha,
        src_alpha: BlendFactor::One,
        dst_alpha: BlendFactor::OneMinusSrcAlpha,
    };

    /// Decodes a raw composite state. If any of the four factors is unknown the whole
    /// state falls back to premultiplied source-over.
    pub fn resolve(state: CompositeOperationState) -> Blend {
        let decoded = (
            BlendFactor::from_bits(state.src_rgb),
            BlendFactor::from_bits(state.dst_rgb),
            BlendFactor::from_bits(state.src_alpha),
            BlendFactor::from_bits(state.dst_alpha),
        );

        match decoded {
            (Some(src_rgb), Some(dst_rgb), Some(src_alpha), Some(dst_alpha)) => Blend {
                src_rgb,
                dst_rgb,
                src_alpha,
                dst_alpha,
            },
            _ => {
                log::trace!("unsupported blend factors in {state:?}; using source-over");
                Self::PREMULTIPLIED_SOURCE_OVER
            }
        }
    }
}
