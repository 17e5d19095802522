use crate::coords::Transform;

/// Oriented clip rectangle, evaluated per pixel in the shader.
///
/// `xform` maps scissor space (centred on the rectangle) to logical pixels and
/// `extent` is the rectangle's half-size. An extent below -0.5 on either axis means
/// "no scissor".
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Scissor {
    pub xform: Transform,
    pub extent: [f32; 2],
}

impl Default for Scissor {
    fn default() -> Self {
        Self::none()
    }
}

impl Scissor {
    #[inline]
    pub const fn none() -> Self {
        Self {
            xform: Transform::IDENTITY,
            extent: [-1.0, -1.0],
        }
    }

    /// Axis-aligned scissor covering `(x, y, w, h)`.
    pub fn rect(x: f32, y: f32, w: f32, h: f32) -> Self {
        let w = w.max(0.0);
        let h = h.max(0.0);
        Self {
            xform: Transform::translate(x + w * 0.5, y + h * 0.5),
            extent: [w * 0.5, h * 0.5],
        }
    }

    /// Same scissor placed in the space described by `xform`.
    pub fn transformed(mut self, xform: Transform) -> Self {
        self.xform = self.xform.multiply(xform);
        self
    }

    #[inline]
    pub fn is_disabled(&self) -> bool {
        self.extent[0] < -0.5 || self.extent[1] < -0.5
    }
}
