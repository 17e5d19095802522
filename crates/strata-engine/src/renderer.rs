use crate::config::RendererConfig;
use crate::coords::{Bounds, Viewport};
use crate::error::RenderError;
use crate::frame::{DrawStyle, FrameBatch, FrameStats, SubPath, Vertex, frag_stride};
use crate::render::{CommandExecutor, Dispatcher, FramePacket};
use crate::texture::{TextureBackend, TextureFlags, TextureId, TextureKind, TextureRegistry};

/// Frame front end: stages draw requests, then hands the recorded frame to an
/// executor on [`Renderer::flush`].
///
/// A frame is open from [`Renderer::begin_frame`] until `flush` or
/// [`Renderer::cancel`]. Textures outlive frames.
pub struct Renderer<B: TextureBackend> {
    config: RendererConfig,
    viewport: Viewport,
    batch: FrameBatch,
    dispatcher: Dispatcher,
    textures: TextureRegistry<B>,
}

impl<B: TextureBackend> Renderer<B> {
    /// `uniform_alignment` is the device's minimum uniform buffer offset
    /// alignment; frag blocks are laid out at that stride.
    pub fn new(config: RendererConfig, backend: B, uniform_alignment: u32) -> Result<Self, RenderError> {
        let batch = FrameBatch::new(frag_stride(uniform_alignment), &config);
        let textures = TextureRegistry::new(backend)?;

        log::debug!(
            "renderer created: antialias={} strokes={:?} frag stride {}",
            config.antialias,
            config.stroke_policy,
            batch.uniforms().stride()
        );

        Ok(Self {
            config,
            viewport: Viewport::default(),
            batch,
            dispatcher: Dispatcher::new(),
            textures,
        })
    }

    #[inline]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Opens a frame. Anything staged and not flushed is discarded.
    pub fn begin_frame(&mut self, viewport: Viewport) {
        if !self.batch.is_empty() {
            log::debug!("unflushed frame discarded ({} calls)", self.batch.calls().len());
        }
        self.batch.clear();
        self.set_viewport(viewport);
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        if !viewport.is_valid() {
            log::warn!("invalid viewport {viewport:?}; drawing will be clamped to 1x1");
        }
        self.viewport = viewport;
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Stages a fill of `paths`, whose geometry lies inside `bounds`.
    pub fn fill(&mut self, style: &DrawStyle, bounds: Bounds, paths: &[SubPath<'_>]) -> Result<(), RenderError> {
        self.batch.stage_fill(style, bounds, paths, &self.textures)
    }

    /// Stages a stroke, using the configured stroke policy.
    pub fn stroke(&mut self, style: &DrawStyle, stroke_width: f32, paths: &[SubPath<'_>]) -> Result<(), RenderError> {
        let stencil = self.config.stencil_strokes();
        self.batch.stage_stroke(style, stroke_width, paths, stencil, &self.textures)
    }

    /// Stages a raw triangle list.
    pub fn triangles(&mut self, style: &DrawStyle, vertices: &[Vertex]) -> Result<(), RenderError> {
        self.batch.stage_triangles(style, vertices, &self.textures)
    }

    /// Abandons the open frame. No GPU work happens.
    pub fn cancel(&mut self) {
        log::trace!("frame cancelled ({} calls)", self.batch.calls().len());
        self.batch.clear();
    }

    /// Counters of what is staged so far.
    #[inline]
    pub fn stats(&self) -> FrameStats {
        self.batch.stats()
    }

    /// Records the frame's commands, replays them on `executor` and resets the
    /// frame arenas.
    pub fn flush(&mut self, executor: &mut impl CommandExecutor<B>) -> FrameStats {
        let stats = self.batch.stats();
        if self.batch.is_empty() {
            self.batch.clear();
            return stats;
        }

        let commands = self.dispatcher.record(&self.batch, &self.config, &self.textures);
        let packet = FramePacket {
            viewport: self.viewport,
            antialias: self.config.antialias,
            vertices: self.batch.vertices(),
            uniforms: self.batch.uniforms(),
            commands,
        };
        executor.execute(&packet, &self.textures);

        log::debug!(
            "frame flushed: {} calls, {} paths, {} vertices, {} uniform blocks, {} commands, {} dropped, {} arena reallocations so far",
            stats.calls,
            stats.paths,
            stats.vertices,
            stats.uniform_blocks,
            commands.len(),
            stats.dropped,
            self.batch.grow_count()
        );

        self.batch.clear();
        stats
    }

    // ── textures ──────────────────────────────────────────────────────────

    pub fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        kind: TextureKind,
        flags: TextureFlags,
        data: Option<&[u8]>,
    ) -> Result<TextureId, RenderError> {
        self.textures.create(width, height, kind, flags, data)
    }

    pub fn update_texture(
        &mut self,
        id: TextureId,
        x: u32,
        y: u32,
        w: u32,
        h: u32,
        data: &[u8],
    ) -> Result<(), RenderError> {
        self.textures.update(id, x, y, w, h, data)
    }

    pub fn remove_texture(&mut self, id: TextureId) -> Result<(), RenderError> {
        self.textures.remove(id)
    }

    #[inline]
    pub fn texture_size(&self, id: TextureId) -> Option<(u32, u32)> {
        self.textures.size(id)
    }

    #[inline]
    pub fn textures(&self) -> &TextureRegistry<B> {
        &self.textures
    }

    /// Direct registry access, e.g. for [`TextureRegistry::register_external`].
    #[inline]
    pub fn textures_mut(&mut self) -> &mut TextureRegistry<B> {
        &mut self.textures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::{Color, Paint};
    use crate::render::GpuCommand;
    use crate::texture::MemoryTextures;

    /// Keeps a copy of every replayed frame.
    #[derive(Default)]
    struct Capture {
        frames: Vec<(Vec<GpuCommand>, usize)>,
    }

    impl CommandExecutor<MemoryTextures> for Capture {
        fn execute(&mut self, frame: &FramePacket<'_>, _textures: &TextureRegistry<MemoryTextures>) {
            self.frames.push((frame.commands.to_vec(), frame.vertices.len()));
        }
    }

    fn renderer() -> Renderer<MemoryTextures> {
        Renderer::new(RendererConfig::default(), MemoryTextures::new(), 256).unwrap()
    }

    fn triangle() -> Vec<Vertex> {
        vec![
            Vertex::new(0.0, 0.0, 0.5, 1.0),
            Vertex::new(10.0, 0.0, 0.5, 1.0),
            Vertex::new(0.0, 10.0, 0.5, 1.0),
        ]
    }

    #[test]
    fn flush_replays_once_and_resets_the_frame() {
        let mut r = renderer();
        let mut exec = Capture::default();
        let style = DrawStyle::new(Paint::solid(Color::white()));

        r.begin_frame(Viewport::new(100.0, 100.0));
        r.triangles(&style, &triangle()).unwrap();
        r.triangles(&style, &triangle()).unwrap();

        let stats = r.flush(&mut exec);
        assert_eq!(stats.calls, 2);
        assert_eq!(exec.frames.len(), 1);
        assert_eq!(exec.frames[0].1, 6);
        assert_eq!(exec.frames[0].0.iter().filter(|c| c.is_draw()).count(), 2);

        assert_eq!(r.stats(), FrameStats::default());
    }

    #[test]
    fn empty_frame_does_not_reach_the_executor() {
        let mut r = renderer();
        let mut exec = Capture::default();
        r.begin_frame(Viewport::new(10.0, 10.0));
        r.flush(&mut exec);
        assert!(exec.frames.is_empty());
    }

    #[test]
    fn cancel_discards_staged_calls() {
        let mut r = renderer();
        let mut exec = Capture::default();
        let style = DrawStyle::new(Paint::solid(Color::white()));

        r.begin_frame(Viewport::new(10.0, 10.0));
        r.triangles(&style, &triangle()).unwrap();
        r.cancel();
        assert_eq!(r.stats().calls, 0);

        r.flush(&mut exec);
        assert!(exec.frames.is_empty());
    }

    #[test]
    fn begin_frame_drops_unflushed_work() {
        let mut r = renderer();
        let style = DrawStyle::new(Paint::solid(Color::white()));

        r.begin_frame(Viewport::new(10.0, 10.0));
        r.triangles(&style, &triangle()).unwrap();
        r.begin_frame(Viewport::new(20.0, 20.0));

        assert_eq!(r.stats().calls, 0);
        assert_eq!(r.viewport(), Viewport::new(20.0, 20.0));
    }

    #[test]
    fn textures_survive_frames() {
        let mut r = renderer();
        let mut exec = Capture::default();
        let id = r
            .create_texture(4, 4, TextureKind::Rgba, TextureFlags::empty(), None)
            .unwrap();

        let style = DrawStyle::new(Paint::image_pattern(0.0, 0.0, 4.0, 4.0, 0.0, id, 1.0));
        r.begin_frame(Viewport::new(10.0, 10.0));
        r.triangles(&style, &triangle()).unwrap();
        r.flush(&mut exec);

        assert_eq!(r.texture_size(id), Some((4, 4)));
        assert!(exec.frames[0].0.contains(&GpuCommand::BindTexture(id)));

        r.remove_texture(id).unwrap();
        assert_eq!(r.texture_size(id), None);
        assert_eq!(r.textures().backend().live(), 1);
    }

    #[test]
    fn unknown_image_drops_only_that_request() {
        let mut r = renderer();
        let mut exec = Capture::default();
        let stale = r
            .create_texture(1, 1, TextureKind::Alpha, TextureFlags::empty(), None)
            .unwrap();
        r.remove_texture(stale).unwrap();

        let solid = DrawStyle::new(Paint::solid(Color::white()));
        let image = DrawStyle::new(Paint::image_pattern(0.0, 0.0, 1.0, 1.0, 0.0, stale, 1.0));

        r.begin_frame(Viewport::new(10.0, 10.0));
        r.triangles(&solid, &triangle()).unwrap();
        assert_eq!(r.triangles(&image, &triangle()), Err(RenderError::UnknownTexture(stale)));
        r.triangles(&solid, &triangle()).unwrap();

        let stats = r.flush(&mut exec);
        assert_eq!(stats.calls, 2);
        assert_eq!(stats.dropped, 1);
    }
}
