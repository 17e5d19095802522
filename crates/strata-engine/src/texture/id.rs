use std::fmt;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::RenderError;

/// Opaque handle of a registered texture.
///
/// Ids are positive and unique for the life of the process; "no texture" is
/// expressed as `Option<TextureId>::None`, never as a zero id.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TextureId(NonZeroU32);

impl TextureId {
    /// Wraps a raw id; `0` is not an id.
    #[inline]
    pub fn from_raw(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

static NEXT_TEXTURE_ID: AtomicU32 = AtomicU32::new(1);

/// Takes the next process-wide texture id.
pub(crate) fn allocate_id() -> Result<TextureId, RenderError> {
    allocate_from(&NEXT_TEXTURE_ID)
}

/// Takes the next id from `counter`. The counter never wraps: once `u32::MAX` has
/// been handed out every further call fails.
fn allocate_from(counter: &AtomicU32) -> Result<TextureId, RenderError> {
    let raw = counter
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
            if n == 0 { None } else { Some(n.wrapping_add(1)) }
        })
        .map_err(|_| RenderError::TextureIdsExhausted)?;

    TextureId::from_raw(raw).ok_or(RenderError::TextureIdsExhausted)
}
