/// How strokes are composited.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum StrokePolicy {
    /// Three stencil passes so overlapping stroke segments blend exactly once.
    #[default]
    Stencil,
    /// One direct pass; joins and self-overlaps may blend twice.
    Direct,
}

/// Renderer configuration.
///
/// Keep this structure plain: every field has a sensible default and none is
/// consulted after the renderer is built except `antialias` and `stroke_policy`,
/// which apply per frame.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Draw the anti-aliased fringe around fills and feather stroke edges.
    pub antialias: bool,

    /// Stroke compositing tradeoff.
    pub stroke_policy: StrokePolicy,

    /// Wrap GPU replay and texture uploads in validation error scopes.
    ///
    /// Errors are logged, never returned to the caller.
    pub debug: bool,

    /// Minimum vertex arena capacity once it first grows.
    pub vertex_floor: usize,

    /// Minimum uniform arena capacity, in blocks.
    pub uniform_floor: usize,

    /// Minimum path table capacity.
    pub path_floor: usize,

    /// Minimum call list capacity.
    pub call_floor: usize,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            antialias: true,
            stroke_policy: StrokePolicy::Stencil,
            debug: cfg!(debug_assertions),
            vertex_floor: 4096,
            uniform_floor: 128,
            path_floor: 64,
            call_floor: 64,
        }
    }
}

impl RendererConfig {
    #[inline]
    pub fn with_antialias(mut self, antialias: bool) -> Self {
        self.antialias = antialias;
        self
    }

    #[inline]
    pub fn with_stroke_policy(mut self, policy: StrokePolicy) -> Self {
        self.stroke_policy = policy;
        self
    }

    #[inline]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[inline]
    pub fn stencil_strokes(&self) -> bool {
        self.stroke_policy == StrokePolicy::Stencil
    }
}
