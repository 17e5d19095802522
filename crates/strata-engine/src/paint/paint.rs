use crate::coords::Transform;
use crate::texture::TextureId;

use super::Color;

/// How to color the pixels of a fill, stroke or triangle submission.
///
/// Every paint is a rounded-rectangle gradient in its own space: `xform` maps paint
/// space to logical pixels, `extent` is the half-size of the rectangle, `radius` its
/// corner radius and `feather` the width of the inner→outer color transition. A solid
/// color is the degenerate case with `inner_color == outer_color`.
///
/// When `image` is set the paint samples that texture instead; `extent` is then the
/// full image size in paint space and `inner_color` tints the sample.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Paint {
    pub xform: Transform,
    pub extent: [f32; 2],
    pub radius: f32,
    pub feather: f32,
    pub inner_color: Color,
    pub outer_color: Color,
    pub image: Option<TextureId>,
}

impl Paint {
    /// Solid color.
    pub fn solid(color: Color) -> Self {
        Self {
            xform: Transform::IDENTITY,
            extent: [0.0, 0.0],
            radius: 0.0,
            feather: 1.0,
            inner_color: color,
            outer_color: color,
            image: None,
        }
    }

    /// Linear gradient from `(sx, sy)` to `(ex, ey)`.
    ///
    /// Encoded as a huge rectangle whose edge sits at the start point, with the
    /// feather spanning the gradient length.
    pub fn linear_gradient(
        sx: f32,
        sy: f32,
        ex: f32,
        ey: f32,
        inner: Color,
        outer: Color,
    ) -> Self {
        const LARGE: f32 = 1e5;

        let mut dx = ex - sx;
        let mut dy = ey - sy;
        let d = (dx * dx + dy * dy).sqrt();
        if d > 0.0001 {
            dx /= d;
            dy /= d;
        } else {
            dx = 0.0;
            dy = 1.0;
        }

        Self {
            xform: Transform::new(dy, -dx, dx, dy, sx - dx * LARGE, sy - dy * LARGE),
            extent: [LARGE, LARGE + d * 0.5],
            radius: 0.0,
            feather: d.max(1.0),
            inner_color: inner,
            outer_color: outer,
            image: None,
        }
    }

    /// Radial gradient centred on `(cx, cy)` fading between the two radii.
    pub fn radial_gradient(
        cx: f32,
        cy: f32,
        inner_radius: f32,
        outer_radius: f32,
        inner: Color,
        outer: Color,
    ) -> Self {
        let r = (inner_radius + outer_radius) * 0.5;
        let f = outer_radius - inner_radius;

        Self {
            xform: Transform::translate(cx, cy),
            extent: [r, r],
            radius: r,
            feather: f.max(1.0),
            inner_color: inner,
            outer_color: outer,
            image: None,
        }
    }

    /// Feathered rounded rectangle, typically used for drop shadows.
    #[allow(clippy::too_many_arguments)]
    pub fn box_gradient(
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        feather: f32,
        inner: Color,
        outer: Color,
    ) -> Self {
        Self {
            xform: Transform::translate(x + w * 0.5, y + h * 0.5),
            extent: [w * 0.5, h * 0.5],
            radius,
            feather: feather.max(1.0),
            inner_color: inner,
            outer_color: outer,
            image: None,
        }
    }

    /// Image pattern: the texture's `(w, h)` rectangle placed at `(ox, oy)`,
    /// rotated by `angle`, tinted white at `alpha`.
    pub fn image_pattern(
        ox: f32,
        oy: f32,
        w: f32,
        h: f32,
        angle: f32,
        image: TextureId,
        alpha: f32,
    ) -> Self {
        let mut xform = Transform::rotate(angle);
        xform.0[4] = ox;
        xform.0[5] = oy;

        let tint = Color::white().with_alpha(alpha);
        Self {
            xform,
            extent: [w, h],
            radius: 0.0,
            feather: 0.0,
            inner_color: tint,
            outer_color: tint,
            image: Some(image),
        }
    }
}
