use thiserror::Error;

use crate::texture::TextureId;

/// Frame arenas that can fail to grow.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ArenaKind {
    Vertex,
    Path,
    Uniform,
    Call,
}

impl std::fmt::Display for ArenaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ArenaKind::Vertex => "vertex",
            ArenaKind::Path => "path",
            ArenaKind::Uniform => "uniform",
            ArenaKind::Call => "call",
        };
        f.write_str(name)
    }
}

/// Errors raised while staging, dispatching or managing textures.
///
/// None of these is fatal to a frame: a failed submission is dropped and the rest
/// of the frame still renders.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    /// An arena could not grow to hold `requested` more units.
    #[error("{arena} arena exhausted while reserving {requested} units")]
    ResourceExhausted { arena: ArenaKind, requested: usize },

    /// The id is not (or no longer) registered.
    #[error("unknown texture {0}")]
    UnknownTexture(TextureId),

    /// Every texture id has been handed out once; ids are never reused.
    #[error("texture id space exhausted")]
    TextureIdsExhausted,

    /// Bad texture size, short pixel buffer or out-of-bounds update.
    #[error("invalid texture: {0}")]
    InvalidTexture(String),

    /// Validation error caught by a debug error scope.
    #[error("gpu error during {label}: {message}")]
    GpuState { label: &'static str, message: String },
}
