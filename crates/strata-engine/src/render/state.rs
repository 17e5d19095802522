use crate::paint::Blend;
use crate::texture::TextureId;

use super::command::{GpuCommand, STENCIL_ALL, StencilFaceOps, StencilFunc};

/// Device state as it stands at some point of a command list.
///
/// Executors fold every non-draw command into this and read it back at each
/// draw. The default is the frame-start baseline.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DeviceState {
    pub stencil_test: bool,
    pub stencil_write_mask: u32,
    pub stencil_func: StencilFunc,
    pub stencil_front: StencilFaceOps,
    pub stencil_back: StencilFaceOps,
    pub color_write: bool,
    pub cull: bool,
    pub blend: Blend,
    pub uniform_block: usize,
    pub texture: Option<TextureId>,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            stencil_test: false,
            stencil_write_mask: STENCIL_ALL,
            stencil_func: StencilFunc::ALWAYS,
            stencil_front: StencilFaceOps::KEEP,
            stencil_back: StencilFaceOps::KEEP,
            color_write: true,
            cull: true,
            blend: Blend::default(),
            uniform_block: 0,
            texture: None,
        }
    }
}

impl DeviceState {
    /// Folds one command in. Draws leave the state unchanged.
    pub fn apply(&mut self, cmd: &GpuCommand) {
        match *cmd {
            GpuCommand::StencilTest(on) => self.stencil_test = on,
            GpuCommand::StencilWriteMask(mask) => self.stencil_write_mask = mask,
            GpuCommand::StencilFunc(func) => self.stencil_func = func,
            GpuCommand::StencilOps { front, back } => {
                self.stencil_front = front;
                self.stencil_back = back;
            }
            GpuCommand::ColorWrite(on) => self.color_write = on,
            GpuCommand::Cull(on) => self.cull = on,
            GpuCommand::Blend(blend) => self.blend = blend,
            GpuCommand::BindUniforms { block } => self.uniform_block = block,
            GpuCommand::BindTexture(id) => self.texture = Some(id),
            GpuCommand::Draw { .. } => {}
        }
    }
}

/// Last-applied values of the states worth eliding: bound texture, stencil write
/// mask, stencil function and blend factors.
///
/// `None` means unknown; the next request for that state is always issued.
#[derive(Debug, Default, Clone)]
pub struct StateCache {
    texture: Option<TextureId>,
    stencil_mask: Option<u32>,
    stencil_func: Option<StencilFunc>,
    blend: Option<Blend>,
    elided: usize,
}

impl StateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets everything, e.g. when another user of the device may have touched it.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Records the frame-start baseline: full write mask, always-pass function and
    /// nothing bound.
    pub fn baseline(&mut self) {
        self.reset();
        self.stencil_mask = Some(STENCIL_ALL);
        self.stencil_func = Some(StencilFunc::ALWAYS);
    }

    /// Returns `true` when the texture binding must be issued.
    #[inline]
    pub fn texture(&mut self, id: TextureId) -> bool {
        swap(&mut self.texture, id, &mut self.elided)
    }

    #[inline]
    pub fn stencil_mask(&mut self, mask: u32) -> bool {
        swap(&mut self.stencil_mask, mask, &mut self.elided)
    }

    #[inline]
    pub fn stencil_func(&mut self, func: StencilFunc) -> bool {
        swap(&mut self.stencil_func, func, &mut self.elided)
    }

    #[inline]
    pub fn blend(&mut self, blend: Blend) -> bool {
        swap(&mut self.blend, blend, &mut self.elided)
    }

    /// State changes skipped since the last reset.
    #[inline]
    pub fn elided(&self) -> usize {
        self.elided
    }
}

fn swap<T: PartialEq>(slot: &mut Option<T>, value: T, elided: &mut usize) -> bool {
    if slot.as_ref() == Some(&value) {
        *elided += 1;
        return false;
    }
    *slot = Some(value);
    true
}
