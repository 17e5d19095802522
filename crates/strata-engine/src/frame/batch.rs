use crate::config::RendererConfig;
use crate::coords::Bounds;
use crate::error::{ArenaKind, RenderError};
use crate::paint::{Blend, CompositeOperationState, Paint, Scissor, convert_paint};
use crate::texture::TextureLookup;

use super::{Arena, Call, CallKind, FragUniforms, PathEntry, ShaderType, UniformArena, Vertex};

/// Threshold used by the painting pass of a stencil stroke: anything not fully
/// covered by the stroke body is left to the anti-aliasing pass.
const STENCIL_STROKE_THRESHOLD: f32 = 1.0 - 0.5 / 255.0;

/// Tessellated subpath as submitted for a fill or stroke.
#[derive(Debug, Copy, Clone)]
pub struct SubPath<'a> {
    /// Triangle fan of the interior.
    pub fill: &'a [Vertex],
    /// Triangle strip of the outline (or of the fringe, for fills).
    pub stroke: &'a [Vertex],
    pub convex: bool,
}

/// Paint, compositing and clipping shared by every kind of submission.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawStyle {
    pub paint: Paint,
    pub composite: CompositeOperationState,
    pub scissor: Scissor,
    /// Anti-aliasing band width in logical pixels.
    pub fringe: f32,
}

impl DrawStyle {
    pub fn new(paint: Paint) -> Self {
        Self {
            paint,
            composite: CompositeOperationState::default(),
            scissor: Scissor::none(),
            fringe: 1.0,
        }
    }

    #[inline]
    pub fn with_composite(mut self, composite: impl Into<CompositeOperationState>) -> Self {
        self.composite = composite.into();
        self
    }

    #[inline]
    pub fn with_scissor(mut self, scissor: Scissor) -> Self {
        self.scissor = scissor;
        self
    }

    #[inline]
    pub fn with_fringe(mut self, fringe: f32) -> Self {
        self.fringe = fringe;
        self
    }
}

/// Counters of one staged frame.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FrameStats {
    pub calls: usize,
    pub paths: usize,
    pub vertices: usize,
    pub uniform_blocks: usize,
    /// Submissions dropped because an arena could not grow or a texture was unknown.
    pub dropped: usize,
}

#[derive(Debug, Copy, Clone)]
struct Marks {
    vertices: usize,
    paths: usize,
    uniforms: usize,
    calls: usize,
}

/// The four frame arenas and the staging of submissions into them.
///
/// Every `stage_*` call either lands completely (one call, its paths, vertices and
/// uniform blocks) or not at all: on failure all arenas roll back to where they
/// were and the error is returned so the caller can carry on with the frame.
#[derive(Debug)]
pub struct FrameBatch {
    vertices: Arena<Vertex>,
    paths: Arena<PathEntry>,
    uniforms: UniformArena,
    calls: Arena<Call>,
    dropped: usize,
}

impl FrameBatch {
    pub fn new(frag_stride: usize, config: &RendererConfig) -> Self {
        Self {
            vertices: Arena::new(ArenaKind::Vertex, config.vertex_floor),
            paths: Arena::new(ArenaKind::Path, config.path_floor),
            uniforms: UniformArena::new(frag_stride, config.uniform_floor),
            calls: Arena::new(ArenaKind::Call, config.call_floor),
            dropped: 0,
        }
    }

    /// Stages a fill.
    ///
    /// A single convex subpath becomes a [`CallKind::ConvexFill`]; anything else is a
    /// stencil [`CallKind::Fill`] that also gets the four-vertex cover quad of `bounds`.
    pub fn stage_fill(
        &mut self,
        style: &DrawStyle,
        bounds: Bounds,
        paths: &[SubPath<'_>],
        textures: &impl TextureLookup,
    ) -> Result<(), RenderError> {
        self.transaction("fill", |batch| batch.push_fill(style, bounds, paths, textures))
    }

    /// Stages a stroke. `stencil_strokes` selects [`CallKind::StencilStroke`], which
    /// owns two uniform blocks; otherwise the call is a one-block direct
    /// [`CallKind::Stroke`]. The choice is recorded on the call.
    pub fn stage_stroke(
        &mut self,
        style: &DrawStyle,
        stroke_width: f32,
        paths: &[SubPath<'_>],
        stencil_strokes: bool,
        textures: &impl TextureLookup,
    ) -> Result<(), RenderError> {
        self.transaction("stroke", |batch| {
            batch.push_stroke(style, stroke_width, paths, stencil_strokes, textures)
        })
    }

    /// Stages a raw triangle list.
    pub fn stage_triangles(
        &mut self,
        style: &DrawStyle,
        vertices: &[Vertex],
        textures: &impl TextureLookup,
    ) -> Result<(), RenderError> {
        self.transaction("triangles", |batch| batch.push_triangles(style, vertices, textures))
    }

    fn transaction(
        &mut self,
        what: &str,
        stage: impl FnOnce(&mut Self) -> Result<(), RenderError>,
    ) -> Result<(), RenderError> {
        let marks = self.marks();
        let result = stage(self);
        if let Err(err) = &result {
            self.rollback(marks);
            self.dropped += 1;
            log::warn!("{what} dropped: {err}");
        }
        result
    }

    fn push_fill(
        &mut self,
        style: &DrawStyle,
        bounds: Bounds,
        paths: &[SubPath<'_>],
        textures: &impl TextureLookup,
    ) -> Result<(), RenderError> {
        let convex = matches!(paths, [only] if only.convex);
        let (kind, quad_len) = if convex { (CallKind::ConvexFill, 0) } else { (CallKind::Fill, 4) };

        let frag = convert_paint(&style.paint, &style.scissor, style.fringe, style.fringe, -1.0, textures)?;

        let path_offset = self.push_paths(paths, true)?;

        let mut triangle_offset = 0;
        if quad_len > 0 {
            triangle_offset = self.vertices.push_slice(&bounds.cover_quad())?;
        }

        let uniform_block = if kind == CallKind::Fill {
            let block = self.uniforms.alloc(2)?;
            self.uniforms.write(block, &FragUniforms::simple());
            self.uniforms.write(block + 1, &frag);
            block
        } else {
            let block = self.uniforms.alloc(1)?;
            self.uniforms.write(block, &frag);
            block
        };

        self.calls.push(Call {
            kind,
            image: style.paint.image,
            path_offset,
            path_count: paths.len(),
            triangle_offset,
            triangle_count: quad_len,
            uniform_block,
            blend: Blend::resolve(style.composite),
        })?;

        log::trace!("staged {kind:?}: {} paths", paths.len());
        Ok(())
    }

    fn push_stroke(
        &mut self,
        style: &DrawStyle,
        stroke_width: f32,
        paths: &[SubPath<'_>],
        stencil_strokes: bool,
        textures: &impl TextureLookup,
    ) -> Result<(), RenderError> {
        let (paint, scissor, fringe) = (&style.paint, &style.scissor, style.fringe);
        let body = convert_paint(paint, scissor, stroke_width, fringe, -1.0, textures)?;

        let path_offset = self.push_paths(paths, false)?;

        let (kind, uniform_block) = if stencil_strokes {
            let edge = convert_paint(paint, scissor, stroke_width, fringe, STENCIL_STROKE_THRESHOLD, textures)?;
            let block = self.uniforms.alloc(2)?;
            self.uniforms.write(block, &body);
            self.uniforms.write(block + 1, &edge);
            (CallKind::StencilStroke, block)
        } else {
            let block = self.uniforms.alloc(1)?;
            self.uniforms.write(block, &body);
            (CallKind::Stroke, block)
        };

        self.calls.push(Call {
            kind,
            image: paint.image,
            path_offset,
            path_count: paths.len(),
            triangle_offset: 0,
            triangle_count: 0,
            uniform_block,
            blend: Blend::resolve(style.composite),
        })?;

        log::trace!("staged {kind:?}: {} paths, width {stroke_width}", paths.len());
        Ok(())
    }

    fn push_triangles(
        &mut self,
        style: &DrawStyle,
        vertices: &[Vertex],
        textures: &impl TextureLookup,
    ) -> Result<(), RenderError> {
        let mut frag = convert_paint(&style.paint, &style.scissor, 1.0, style.fringe, -1.0, textures)?;
        frag.set_shader_type(ShaderType::Image);

        let triangle_offset = self.vertices.push_slice(vertices)?;
        let uniform_block = self.uniforms.alloc(1)?;
        self.uniforms.write(uniform_block, &frag);

        self.calls.push(Call {
            kind: CallKind::Triangles,
            image: style.paint.image,
            path_offset: 0,
            path_count: 0,
            triangle_offset,
            triangle_count: vertices.len(),
            uniform_block,
            blend: Blend::resolve(style.composite),
        })?;

        log::trace!("staged Triangles: {} vertices", vertices.len());
        Ok(())
    }

    /// Copies each subpath's vertices and records its ranges. Fill vertices are only
    /// kept when `with_fill` is set.
    fn push_paths(&mut self, paths: &[SubPath<'_>], with_fill: bool) -> Result<usize, RenderError> {
        let total: usize = paths
            .iter()
            .map(|p| if with_fill { p.fill.len() } else { 0 } + p.stroke.len())
            .sum();
        self.vertices.reserve(total)?;
        let path_offset = self.paths.alloc(paths.len(), PathEntry::default())?;

        for (i, path) in paths.iter().enumerate() {
            let mut entry = PathEntry::default();
            if with_fill && !path.fill.is_empty() {
                entry.fill_offset = self.vertices.push_slice(path.fill)?;
                entry.fill_count = path.fill.len();
            }
            if !path.stroke.is_empty() {
                entry.stroke_offset = self.vertices.push_slice(path.stroke)?;
                entry.stroke_count = path.stroke.len();
            }
            self.paths.as_mut_slice()[path_offset + i] = entry;
        }
        Ok(path_offset)
    }

    fn marks(&self) -> Marks {
        Marks {
            vertices: self.vertices.mark(),
            paths: self.paths.mark(),
            uniforms: self.uniforms.mark(),
            calls: self.calls.mark(),
        }
    }

    fn rollback(&mut self, marks: Marks) {
        self.vertices.truncate(marks.vertices);
        self.paths.truncate(marks.paths);
        self.uniforms.truncate(marks.uniforms);
        self.calls.truncate(marks.calls);
    }

    /// Empties every arena, keeping their storage.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.paths.clear();
        self.uniforms.clear();
        self.calls.clear();
        self.dropped = 0;
    }

    #[inline]
    pub fn calls(&self) -> &[Call] {
        self.calls.as_slice()
    }

    #[inline]
    pub fn paths(&self) -> &[PathEntry] {
        self.paths.as_slice()
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        self.vertices.as_slice()
    }

    #[inline]
    pub fn uniforms(&self) -> &UniformArena {
        &self.uniforms
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Reallocations across all four arenas since creation.
    pub fn grow_count(&self) -> usize {
        self.vertices.grow_count()
            + self.paths.grow_count()
            + self.uniforms.grow_count()
            + self.calls.grow_count()
    }

    pub fn stats(&self) -> FrameStats {
        FrameStats {
            calls: self.calls.len(),
            paths: self.paths.len(),
            vertices: self.vertices.len(),
            uniform_blocks: self.uniforms.len(),
            dropped: self.dropped,
        }
    }
}
