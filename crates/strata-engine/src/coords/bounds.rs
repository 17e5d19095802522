use crate::frame::Vertex;

/// Axis-aligned bounding box of a submitted shape, in logical pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    #[inline]
    pub const fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Smallest box containing every vertex position, or `None` for an empty slice.
    pub fn from_vertices(vertices: &[Vertex]) -> Option<Self> {
        let (first, rest) = vertices.split_first()?;
        let mut b = Bounds::new(first.x, first.y, first.x, first.y);
        for v in rest {
            b.min_x = b.min_x.min(v.x);
            b.min_y = b.min_y.min(v.y);
            b.max_x = b.max_x.max(v.x);
            b.max_y = b.max_y.max(v.y);
        }
        Some(b)
    }

    #[inline]
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// The four-vertex triangle strip covering the box.
    ///
    /// Every vertex carries the texcoord (0.5, 1.0), which puts the stroke mask
    /// at full coverage so the quad never fades at its edges.
    pub fn cover_quad(self) -> [Vertex; 4] {
        [
            Vertex::new(self.max_x, self.max_y, 0.5, 1.0),
            Vertex::new(self.max_x, self.min_y, 0.5, 1.0),
            Vertex::new(self.min_x, self.max_y, 0.5, 1.0),
            Vertex::new(self.min_x, self.min_y, 0.5, 1.0),
        ]
    }
}
