//! Replays recorded frames through a software rasteriser with an 8-bit stencil
//! buffer and counts color writes per pixel.

use strata_engine::coords::{Bounds, Viewport};
use strata_engine::logging::{LoggingConfig, init_logging};
use strata_engine::paint::{Color, Paint};
use strata_engine::render::{CommandExecutor, DeviceState, FramePacket, GpuCommand, Topology};
use strata_engine::texture::{MemoryTextures, TextureRegistry};
use strata_engine::{DrawStyle, Renderer, RendererConfig, StrokePolicy, SubPath, Vertex};

const SIZE: usize = 24;

/// Sample position inside each pixel, off the half-pixel grid so no sample lands
/// exactly on an edge of the test geometry.
const SAMPLE: (f32, f32) = (0.5 + 1.0 / 64.0, 0.5 + 1.0 / 128.0);

struct Rasterizer {
    stencil: Vec<u8>,
    writes: Vec<u32>,
}

impl Rasterizer {
    fn new() -> Self {
        Self {
            stencil: vec![0; SIZE * SIZE],
            writes: vec![0; SIZE * SIZE],
        }
    }

    fn writes_at(&self, x: usize, y: usize) -> u32 {
        self.writes[y * SIZE + x]
    }

    fn max_writes(&self) -> u32 {
        self.writes.iter().copied().max().unwrap_or(0)
    }

    fn triangle(&mut self, state: &DeviceState, a: Vertex, b: Vertex, c: Vertex) {
        let area = cross(a, b, c);
        if area == 0.0 {
            return;
        }
        // Counter-clockwise on screen is a negative cross product with y pointing down.
        let front = area < 0.0;
        if state.cull && !front {
            return;
        }
        let ops = if front { state.stencil_front } else { state.stencil_back };

        for py in 0..SIZE {
            for px in 0..SIZE {
                let p = Vertex::new(px as f32 + SAMPLE.0, py as f32 + SAMPLE.1, 0.0, 0.0);
                if !inside(a, b, c, p) {
                    continue;
                }
                let i = py * SIZE + px;

                let passed = if state.stencil_test {
                    let func = state.stencil_func;
                    let passed = func.compare.passes(func.reference, u32::from(self.stencil[i]), func.read_mask);
                    let op = if passed { ops.pass } else { ops.fail };
                    let mask = state.stencil_write_mask as u8;
                    let old = self.stencil[i];
                    self.stencil[i] = (old & !mask) | (op.apply(old) & mask);
                    passed
                } else {
                    true
                };

                if passed && state.color_write {
                    self.writes[i] += 1;
                }
            }
        }
    }

    fn draw(&mut self, state: &DeviceState, vertices: &[Vertex], topology: Topology) {
        match topology {
            Topology::TriangleFan => {
                for i in 1..vertices.len().saturating_sub(1) {
                    self.triangle(state, vertices[0], vertices[i], vertices[i + 1]);
                }
            }
            Topology::TriangleStrip => {
                for i in 0..vertices.len().saturating_sub(2) {
                    let (a, b, c) = (vertices[i], vertices[i + 1], vertices[i + 2]);
                    if i % 2 == 0 {
                        self.triangle(state, a, b, c);
                    } else {
                        self.triangle(state, b, a, c);
                    }
                }
            }
            Topology::TriangleList => {
                for t in vertices.chunks_exact(3) {
                    self.triangle(state, t[0], t[1], t[2]);
                }
            }
        }
    }
}

impl CommandExecutor<MemoryTextures> for Rasterizer {
    fn execute(&mut self, frame: &FramePacket<'_>, _textures: &TextureRegistry<MemoryTextures>) {
        // Stencil is cleared at the start of every pass.
        self.stencil.fill(0);

        let mut state = DeviceState::default();
        for cmd in frame.commands {
            match *cmd {
                GpuCommand::Draw { topology, first, count } => {
                    let range = first as usize..(first + count) as usize;
                    self.draw(&state, &frame.vertices[range], topology);
                }
                _ => state.apply(cmd),
            }
        }
    }
}

fn cross(a: Vertex, b: Vertex, c: Vertex) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn inside(a: Vertex, b: Vertex, c: Vertex, p: Vertex) -> bool {
    let d0 = cross(a, b, p);
    let d1 = cross(b, c, p);
    let d2 = cross(c, a, p);
    (d0 > 0.0 && d1 > 0.0 && d2 > 0.0) || (d0 < 0.0 && d1 < 0.0 && d2 < 0.0)
}

/// Nonzero winding number of `p` around the closed polygon.
fn winding(poly: &[Vertex], p: (f32, f32)) -> i32 {
    let mut w = 0;
    for i in 0..poly.len() {
        let a = poly[i];
        let b = poly[(i + 1) % poly.len()];
        let side = (b.x - a.x) * (p.1 - a.y) - (b.y - a.y) * (p.0 - a.x);
        if a.y <= p.1 {
            if b.y > p.1 && side > 0.0 {
                w += 1;
            }
        } else if b.y <= p.1 && side < 0.0 {
            w -= 1;
        }
    }
    w
}

fn v(x: f32, y: f32) -> Vertex {
    Vertex::new(x, y, 0.5, 1.0)
}

fn fill_path(fill: &[Vertex], convex: bool) -> SubPath<'_> {
    SubPath { fill, stroke: &[], convex }
}

fn stroke_path(stroke: &[Vertex]) -> SubPath<'_> {
    SubPath { fill: &[], stroke, convex: false }
}

fn renderer(config: RendererConfig) -> Renderer<MemoryTextures> {
    init_logging(LoggingConfig::for_tests());
    let mut r = Renderer::new(config, MemoryTextures::new(), 256).unwrap();
    r.begin_frame(Viewport::new(SIZE as f32, SIZE as f32));
    r
}

fn style() -> DrawStyle {
    DrawStyle::new(Paint::solid(Color::rgba(0.2, 0.4, 0.8, 0.5)))
}

fn pentagram() -> Vec<Vertex> {
    let (cx, cy, r) = (12.0f32, 12.0f32, 10.0f32);
    let point = |k: usize| {
        let angle = -std::f32::consts::FRAC_PI_2 + k as f32 * std::f32::consts::TAU / 5.0;
        v(cx + r * angle.cos(), cy + r * angle.sin())
    };
    [0, 2, 4, 1, 3].into_iter().map(point).collect()
}

fn bounds_of(paths: &[&[Vertex]]) -> Bounds {
    let all: Vec<Vertex> = paths.iter().flat_map(|p| p.iter().copied()).collect();
    Bounds::from_vertices(&all).unwrap()
}

fn horizontal_bar() -> Vec<Vertex> {
    vec![v(2.0, 8.0), v(2.0, 12.0), v(18.0, 8.0), v(18.0, 12.0)]
}

fn vertical_bar() -> Vec<Vertex> {
    vec![v(12.0, 2.0), v(8.0, 2.0), v(12.0, 18.0), v(8.0, 18.0)]
}

#[test]
fn overlapping_subpaths_are_painted_once() {
    let mut r = renderer(RendererConfig::default().with_antialias(false));
    let mut raster = Rasterizer::new();

    let a = vec![v(2.0, 2.0), v(2.0, 16.0), v(16.0, 16.0)];
    let b = vec![v(6.0, 4.0), v(6.0, 20.0), v(20.0, 20.0)];
    let bounds = bounds_of(&[&a, &b]);
    r.fill(&style(), bounds, &[fill_path(&a, false), fill_path(&b, false)]).unwrap();
    r.flush(&mut raster);

    assert_eq!(raster.max_writes(), 1);
    // Inside both triangles.
    assert_eq!(raster.writes_at(7, 14), 1);
    // Inside only the first.
    assert_eq!(raster.writes_at(3, 14), 1);
    // Inside the bounds but outside both.
    assert_eq!(raster.writes_at(15, 3), 0);
    assert!(raster.stencil.iter().all(|&s| s == 0));
}

#[test]
fn pentagram_follows_nonzero_winding() {
    let mut r = renderer(RendererConfig::default().with_antialias(false));
    let mut raster = Rasterizer::new();

    let star = pentagram();
    r.fill(&style(), bounds_of(&[&star]), &[fill_path(&star, false)]).unwrap();
    r.flush(&mut raster);

    for py in 0..SIZE {
        for px in 0..SIZE {
            let p = (px as f32 + SAMPLE.0, py as f32 + SAMPLE.1);
            let expected = u32::from(winding(&star, p) != 0);
            assert_eq!(raster.writes_at(px, py), expected, "pixel ({px}, {py})");
        }
    }
    assert!(raster.stencil.iter().all(|&s| s == 0));
}

/// A square walked around twice: every interior pixel has winding number 2.
fn double_square() -> Vec<Vertex> {
    let square = [v(4.0, 4.0), v(4.0, 20.0), v(20.0, 20.0), v(20.0, 4.0)];
    square.iter().chain(square.iter()).copied().collect()
}

#[test]
fn stencil_fill_resolves_double_winding_to_one_write() {
    let mut r = renderer(RendererConfig::default().with_antialias(false));
    let mut raster = Rasterizer::new();

    let path = double_square();
    r.fill(&style(), bounds_of(&[&path]), &[fill_path(&path, false)]).unwrap();
    r.flush(&mut raster);

    assert_eq!(raster.writes_at(10, 10), 1);
    assert_eq!(raster.max_writes(), 1);
}

#[test]
fn convex_fast_path_does_not_protect_against_overlap() {
    let mut r = renderer(RendererConfig::default().with_antialias(false));
    let mut raster = Rasterizer::new();

    // Claiming the path is convex skips the stencil, so it is covered twice.
    let path = double_square();
    r.fill(&style(), bounds_of(&[&path]), &[fill_path(&path, true)]).unwrap();
    r.flush(&mut raster);

    assert_eq!(raster.writes_at(10, 10), 2);
    assert_eq!(raster.writes_at(2, 2), 0);
}

/// Strip around the square of `double_square`, one pixel wide outside its edge,
/// wound so every triangle faces front.
fn fringe_ring() -> Vec<Vertex> {
    let inner = [(4.0, 4.0), (4.0, 20.0), (20.0, 20.0), (20.0, 4.0)];
    let outer = [(3.0, 3.0), (3.0, 21.0), (21.0, 21.0), (21.0, 3.0)];
    (0..=4)
        .flat_map(|k| {
            let (i, o) = (inner[k % 4], outer[k % 4]);
            [v(i.0, i.1), v(o.0, o.1)]
        })
        .collect()
}

#[test]
fn antialiased_fill_paints_fringe_and_interior_once() {
    let mut r = renderer(RendererConfig::default().with_antialias(true));
    let mut raster = Rasterizer::new();

    let fill = [v(4.0, 4.0), v(4.0, 20.0), v(20.0, 20.0), v(20.0, 4.0)];
    let ring = fringe_ring();
    let path = SubPath { fill: &fill, stroke: &ring, convex: false };
    r.fill(&style(), bounds_of(&[&ring]), &[path]).unwrap();
    r.flush(&mut raster);

    assert_eq!(raster.max_writes(), 1);
    // Fringe, outside the fill edge.
    assert_eq!(raster.writes_at(3, 10), 1);
    assert_eq!(raster.writes_at(10, 20), 1);
    // Interior.
    assert_eq!(raster.writes_at(10, 10), 1);
    // Outside the fringe.
    assert_eq!(raster.writes_at(1, 1), 0);
    assert!(raster.stencil.iter().all(|&s| s == 0));
}

#[test]
fn stencil_stroke_paints_crossings_once() {
    let mut r = renderer(RendererConfig::default().with_stroke_policy(StrokePolicy::Stencil));
    let mut raster = Rasterizer::new();

    let (h, vbar) = (horizontal_bar(), vertical_bar());
    r.stroke(&style(), 4.0, &[stroke_path(&h), stroke_path(&vbar)]).unwrap();
    r.flush(&mut raster);

    assert_eq!(raster.max_writes(), 1);
    assert_eq!(raster.writes_at(10, 10), 1);
    assert_eq!(raster.writes_at(4, 10), 1);
    assert_eq!(raster.writes_at(10, 4), 1);
    assert_eq!(raster.writes_at(4, 4), 0);
    assert!(raster.stencil.iter().all(|&s| s == 0));
}

#[test]
fn direct_stroke_blends_crossings_twice() {
    let mut r = renderer(RendererConfig::default().with_stroke_policy(StrokePolicy::Direct));
    let mut raster = Rasterizer::new();

    let (h, vbar) = (horizontal_bar(), vertical_bar());
    r.stroke(&style(), 4.0, &[stroke_path(&h), stroke_path(&vbar)]).unwrap();
    r.flush(&mut raster);

    assert_eq!(raster.writes_at(10, 10), 2);
    assert_eq!(raster.writes_at(4, 10), 1);
}

#[test]
fn consecutive_calls_start_from_a_clean_stencil() {
    let mut r = renderer(RendererConfig::default().with_antialias(false));
    let mut raster = Rasterizer::new();

    let star = pentagram();
    let bar = horizontal_bar();
    r.fill(&style(), bounds_of(&[&star]), &[fill_path(&star, false)]).unwrap();
    r.stroke(&style(), 4.0, &[stroke_path(&bar)]).unwrap();
    r.fill(&style(), bounds_of(&[&star]), &[fill_path(&star, false)]).unwrap();
    r.flush(&mut raster);

    // The star core is painted by both fills and the bar crosses it.
    assert_eq!(raster.writes_at(12, 10), 3);
    assert_eq!(raster.writes_at(12, 14), 2);
    assert!(raster.stencil.iter().all(|&s| s == 0));
}
