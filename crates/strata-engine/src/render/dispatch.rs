use crate::config::RendererConfig;
use crate::coords::Viewport;
use crate::frame::{Call, CallKind, FrameBatch, PathEntry, UniformArena, Vertex};
use crate::paint::Blend;
use crate::texture::{TextureBackend, TextureId, TextureRegistry};

use super::command::{
    GpuCommand, STENCIL_ALL, StencilFaceOps, StencilFunc, StencilOp, Topology,
};
use super::state::StateCache;

/// Everything an executor needs to replay one frame.
#[derive(Debug, Copy, Clone)]
pub struct FramePacket<'a> {
    pub viewport: Viewport,
    pub antialias: bool,
    pub vertices: &'a [Vertex],
    pub uniforms: &'a UniformArena,
    pub commands: &'a [GpuCommand],
}

/// Replays a recorded frame on some device.
///
/// Errors are the executor's to log; a frame is never aborted halfway.
pub trait CommandExecutor<B: TextureBackend> {
    fn execute(&mut self, frame: &FramePacket<'_>, textures: &TextureRegistry<B>);
}

/// Turns a staged frame into the ordered command list of its stencil/blend
/// protocols, skipping state changes the [`StateCache`] already knows about.
#[derive(Debug, Default)]
pub struct Dispatcher {
    cache: StateCache,
    commands: Vec<GpuCommand>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the whole frame and returns its commands.
    ///
    /// Texture ids are resolved against `textures` here, so untextured calls bind
    /// the dummy and stale ids degrade to it. Strokes replay in the mode they were
    /// staged with; `config` only decides the fill fringe pass.
    pub fn record<B: TextureBackend>(
        &mut self,
        batch: &FrameBatch,
        config: &RendererConfig,
        textures: &TextureRegistry<B>,
    ) -> &[GpuCommand] {
        self.commands.clear();
        self.begin();

        for call in batch.calls() {
            let mut rec = CallRecorder {
                dispatcher: self,
                paths: &batch.paths()[call.paths()],
                call,
                texture: resolve_texture(textures, call.image),
                dummy: textures.dummy_id(),
            };
            rec.blend(call.blend);
            match call.kind {
                CallKind::Fill => rec.fill(config.antialias),
                CallKind::ConvexFill => rec.convex_fill(),
                CallKind::StencilStroke => rec.stencil_stroke(),
                CallKind::Stroke => rec.stroke(),
                CallKind::Triangles => rec.triangles(),
            }
        }

        log::trace!(
            "recorded {} commands for {} calls ({} state changes elided)",
            self.commands.len(),
            batch.calls().len(),
            self.cache.elided()
        );
        &self.commands
    }

    #[inline]
    pub fn commands(&self) -> &[GpuCommand] {
        &self.commands
    }

    /// Baseline state every frame starts from.
    fn begin(&mut self) {
        self.cache.baseline();
        self.commands.extend([
            GpuCommand::Cull(true),
            GpuCommand::ColorWrite(true),
            GpuCommand::StencilTest(false),
            GpuCommand::StencilWriteMask(STENCIL_ALL),
            GpuCommand::StencilOps { front: StencilFaceOps::KEEP, back: StencilFaceOps::KEEP },
            GpuCommand::StencilFunc(StencilFunc::ALWAYS),
        ]);
    }
}

fn resolve_texture<B: TextureBackend>(
    textures: &TextureRegistry<B>,
    image: Option<TextureId>,
) -> TextureId {
    textures
        .resolve(image)
        .map_or(textures.dummy_id(), |t| t.id)
}

/// Emits the protocol of one call.
struct CallRecorder<'d, 'b> {
    dispatcher: &'d mut Dispatcher,
    call: &'b Call,
    paths: &'b [PathEntry],
    texture: TextureId,
    dummy: TextureId,
}

impl CallRecorder<'_, '_> {
    /// Non-convex fill: winding into the stencil, then fringe and cover quad
    /// tested against it.
    fn fill(&mut self, antialias: bool) {
        self.push(GpuCommand::StencilTest(true));
        self.stencil_mask(STENCIL_ALL);
        self.stencil_func(StencilFunc::ALWAYS);
        self.push(GpuCommand::ColorWrite(false));

        self.uniforms(0, self.dummy);
        self.push(GpuCommand::StencilOps {
            front: StencilFaceOps::on_pass(StencilOp::IncrementWrap),
            back: StencilFaceOps::on_pass(StencilOp::DecrementWrap),
        });
        self.push(GpuCommand::Cull(false));
        for p in self.paths {
            self.draw(Topology::TriangleFan, p.fill_offset, p.fill_count);
        }
        self.push(GpuCommand::Cull(true));

        self.push(GpuCommand::ColorWrite(true));
        self.uniforms(1, self.texture);

        if antialias {
            self.stencil_func(StencilFunc::EQUAL_ZERO);
            self.ops(StencilFaceOps::KEEP);
            for p in self.paths {
                self.draw(Topology::TriangleStrip, p.stroke_offset, p.stroke_count);
            }
        }

        self.stencil_func(StencilFunc::NOT_EQUAL_ZERO);
        self.ops(StencilFaceOps::ZERO);
        self.draw(Topology::TriangleStrip, self.call.triangle_offset, self.call.triangle_count);

        self.push(GpuCommand::StencilTest(false));
    }

    fn convex_fill(&mut self) {
        self.uniforms(0, self.texture);
        for p in self.paths {
            self.draw(Topology::TriangleFan, p.fill_offset, p.fill_count);
            self.draw(Topology::TriangleStrip, p.stroke_offset, p.stroke_count);
        }
    }

    /// Stroke painted exactly once per pixel: the full-coverage body first, then
    /// the anti-aliased rim where nothing was painted yet, then a stencil clear.
    fn stencil_stroke(&mut self) {
        self.push(GpuCommand::StencilTest(true));
        self.stencil_mask(STENCIL_ALL);

        self.stencil_func(StencilFunc::EQUAL_ZERO);
        self.ops(StencilFaceOps::on_pass(StencilOp::IncrementClamp));
        self.uniforms(1, self.texture);
        self.draw_strokes();

        self.uniforms(0, self.texture);
        self.stencil_func(StencilFunc::EQUAL_ZERO);
        self.ops(StencilFaceOps::KEEP);
        self.draw_strokes();

        self.push(GpuCommand::ColorWrite(false));
        self.stencil_func(StencilFunc::ALWAYS);
        self.ops(StencilFaceOps::ZERO);
        self.draw_strokes();
        self.push(GpuCommand::ColorWrite(true));

        self.push(GpuCommand::StencilTest(false));
    }

    fn stroke(&mut self) {
        self.uniforms(0, self.texture);
        self.draw_strokes();
    }

    fn triangles(&mut self) {
        self.uniforms(0, self.texture);
        self.draw(Topology::TriangleList, self.call.triangle_offset, self.call.triangle_count);
    }

    fn draw_strokes(&mut self) {
        for p in self.paths {
            self.draw(Topology::TriangleStrip, p.stroke_offset, p.stroke_count);
        }
    }

    /// Binds block `uniform_block + offset` together with `id`.
    fn uniforms(&mut self, offset: usize, id: TextureId) {
        debug_assert!(offset < self.call.uniform_blocks(), "{:?} owns no block {offset}", self.call.kind);
        self.push(GpuCommand::BindUniforms { block: self.call.uniform_block + offset });
        if self.dispatcher.cache.texture(id) {
            self.push(GpuCommand::BindTexture(id));
        }
    }

    fn blend(&mut self, blend: Blend) {
        if self.dispatcher.cache.blend(blend) {
            self.push(GpuCommand::Blend(blend));
        }
    }

    fn stencil_mask(&mut self, mask: u32) {
        if self.dispatcher.cache.stencil_mask(mask) {
            self.push(GpuCommand::StencilWriteMask(mask));
        }
    }

    fn stencil_func(&mut self, func: StencilFunc) {
        if self.dispatcher.cache.stencil_func(func) {
            self.push(GpuCommand::StencilFunc(func));
        }
    }

    fn ops(&mut self, ops: StencilFaceOps) {
        self.push(GpuCommand::StencilOps { front: ops, back: ops });
    }

    fn draw(&mut self, topology: Topology, first: usize, count: usize) {
        if count == 0 {
            return;
        }
        self.push(GpuCommand::Draw { topology, first: first as u32, count: count as u32 });
    }

    #[inline]
    fn push(&mut self, cmd: GpuCommand) {
        self.dispatcher.commands.push(cmd);
    }
}
