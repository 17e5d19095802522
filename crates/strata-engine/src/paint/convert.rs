use bytemuck::Zeroable;

use crate::coords::Transform;
use crate::error::RenderError;
use crate::frame::{FragUniforms, ShaderType, TexType};
use crate::texture::{TextureFlags, TextureKind, TextureLookup};

use super::{Color, Paint, Scissor};

/// Builds the shader parameter block for one draw.
///
/// `width` is the stroke width (the fringe itself for fills), `fringe` the
/// anti-aliasing band and `stroke_thr` the coverage cutoff (`-1` for none). The
/// result depends only on the arguments and the looked-up texture descriptor.
///
/// Fails with [`RenderError::UnknownTexture`] when the paint names a texture that
/// is not registered.
pub fn convert_paint(
    paint: &Paint,
    scissor: &Scissor,
    width: f32,
    fringe: f32,
    stroke_thr: f32,
    textures: &impl TextureLookup,
) -> Result<FragUniforms, RenderError> {
    let mut frag = FragUniforms::zeroed();

    frag.inner_color = normalized(paint.inner_color).premultiplied();
    frag.outer_color = normalized(paint.outer_color).premultiplied();

    if scissor.is_disabled() {
        frag.scissor_ext = [1.0, 1.0];
        frag.scissor_scale = [1.0, 1.0];
    } else {
        frag.scissor_mat = scissor.xform.inverse_or_identity().to_mat3x4();
        frag.scissor_ext = scissor.extent;
        let (sx, sy) = scissor.xform.axis_scale();
        frag.scissor_scale = [sx / fringe, sy / fringe];
    }

    frag.extent = paint.extent;
    frag.stroke_mult = (width * 0.5 + fringe * 0.5) / fringe;
    frag.stroke_thr = stroke_thr;

    let paint_xform = match paint.image {
        Some(id) => {
            let desc = textures.texture_desc(id).ok_or(RenderError::UnknownTexture(id))?;

            frag.set_shader_type(ShaderType::FillImage);
            frag.set_tex_type(match desc.kind {
                TextureKind::Rgba if desc.flags.contains(TextureFlags::PREMULTIPLIED) => {
                    TexType::PremultipliedRgba
                }
                TextureKind::Rgba => TexType::Rgba,
                TextureKind::Alpha => TexType::Alpha,
            });

            if desc.flags.contains(TextureFlags::FLIP_Y) {
                flip_y(paint.xform, paint.extent[1])
            } else {
                paint.xform
            }
        }
        None => {
            frag.set_shader_type(ShaderType::FillGradient);
            frag.set_tex_type(TexType::None);
            frag.radius = paint.radius;
            frag.feather = paint.feather;
            paint.xform
        }
    };
    frag.paint_mat = paint_xform.inverse_or_identity().to_mat3x4();
    Ok(frag)
}

/// Paint colors outside `0..=1` (or NaN) are clamped so the premultiplied result
/// never has a channel above alpha.
fn normalized(color: Color) -> Color {
    if color.is_normalized() {
        return color;
    }
    log::warn!("paint color {color:?} out of range; clamped");
    color.clamped()
}

/// Mirrors an image of height `h` about its horizontal centre line, then applies
/// `xform`.
fn flip_y(xform: Transform, h: f32) -> Transform {
    Transform::translate(0.0, -h * 0.5)
        .multiply(Transform::scale(1.0, -1.0))
        .multiply(Transform::translate(0.0, h * 0.5))
        .multiply(xform)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::{MemoryTextures, TextureId, TextureRegistry};

    fn registry() -> TextureRegistry<MemoryTextures> {
        TextureRegistry::new(MemoryTextures::new()).unwrap()
    }

    #[test]
    fn conversion_is_deterministic() {
        let reg = registry();
        let paint = Paint::linear_gradient(0.0, 0.0, 30.0, 10.0, Color::rgba(1.0, 0.2, 0.1, 0.5), Color::white());
        let scissor = Scissor::rect(5.0, 5.0, 20.0, 20.0);

        let a = convert_paint(&paint, &scissor, 2.0, 1.0, -1.0, &reg).unwrap();
        let b = convert_paint(&paint, &scissor, 2.0, 1.0, -1.0, &reg).unwrap();
        assert_eq!(bytemuck::bytes_of(&a), bytemuck::bytes_of(&b));
    }

    #[test]
    fn colors_are_premultiplied() {
        let reg = registry();
        let paint = Paint::solid(Color::rgba(0.8, 0.6, 1.0, 0.25));
        let frag = convert_paint(&paint, &Scissor::none(), 1.0, 1.0, -1.0, &reg).unwrap();
        let [r, g, b, a] = frag.inner_color;
        assert_eq!(a, 0.25);
        assert!(r <= a && g <= a && b <= a);
        assert_eq!(r, 0.2);
    }

    #[test]
    fn invalid_colors_are_clamped_not_rejected() {
        let reg = registry();
        let paint = Paint::solid(Color::rgba(3.0, f32::NAN, 0.5, 0.5));
        let frag = convert_paint(&paint, &Scissor::none(), 1.0, 1.0, -1.0, &reg).unwrap();
        assert_eq!(frag.inner_color, [0.5, 0.0, 0.25, 0.5]);
        assert!(frag.outer_color.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn disabled_scissor_is_fixed_no_op() {
        let reg = registry();
        let paint = Paint::solid(Color::white());
        let mut odd = Scissor::none();
        odd.xform = Transform::new(3.0, 1.0, 2.0, 5.0, 7.0, 9.0);
        odd.extent = [40.0, -0.75];

        for scissor in [Scissor::none(), odd] {
            let frag = convert_paint(&paint, &scissor, 1.0, 1.0, -1.0, &reg).unwrap();
            assert_eq!(frag.scissor_mat, [[0.0; 4]; 3]);
            assert_eq!(frag.scissor_ext, [1.0, 1.0]);
            assert_eq!(frag.scissor_scale, [1.0, 1.0]);
        }
    }

    #[test]
    fn scissor_scale_is_per_fringe() {
        let reg = registry();
        let scissor = Scissor::rect(0.0, 0.0, 10.0, 10.0).transformed(Transform::scale(2.0, 3.0));
        let frag = convert_paint(&Paint::solid(Color::white()), &scissor, 1.0, 0.5, -1.0, &reg).unwrap();
        assert_eq!(frag.scissor_scale, [4.0, 6.0]);
        assert_eq!(frag.scissor_ext, [5.0, 5.0]);
        // Inverse maps the scissor centre back to the origin.
        let inv = Transform::new(
            frag.scissor_mat[0][0],
            frag.scissor_mat[0][1],
            frag.scissor_mat[1][0],
            frag.scissor_mat[1][1],
            frag.scissor_mat[2][0],
            frag.scissor_mat[2][1],
        );
        let (x, y) = inv.apply(10.0, 15.0);
        assert!(x.abs() < 1e-5 && y.abs() < 1e-5);
    }

    #[test]
    fn stroke_mult_maps_width_to_fringe_band() {
        let reg = registry();
        let frag = convert_paint(&Paint::solid(Color::white()), &Scissor::none(), 4.0, 1.0, 0.5, &reg).unwrap();
        assert_eq!(frag.stroke_mult, 2.5);
        assert_eq!(frag.stroke_thr, 0.5);
    }

    #[test]
    fn gradient_paint_copies_radius_and_feather() {
        let reg = registry();
        let paint = Paint::box_gradient(0.0, 0.0, 10.0, 10.0, 3.0, 6.0, Color::white(), Color::transparent());
        let frag = convert_paint(&paint, &Scissor::none(), 1.0, 1.0, -1.0, &reg).unwrap();
        assert_eq!(frag.shader_type, ShaderType::FillGradient as i32);
        assert_eq!(frag.tex_type, TexType::None as i32);
        assert_eq!((frag.radius, frag.feather), (3.0, 6.0));
        assert_eq!(frag.extent, [5.0, 5.0]);
    }

    #[test]
    fn tex_type_follows_kind_and_premultiplied_flag() {
        let mut reg = registry();
        let cases = [
            (TextureKind::Rgba, TextureFlags::PREMULTIPLIED, TexType::PremultipliedRgba),
            (TextureKind::Rgba, TextureFlags::empty(), TexType::Rgba),
            (TextureKind::Alpha, TextureFlags::PREMULTIPLIED, TexType::Alpha),
        ];
        for (kind, flags, expected) in cases {
            let id = reg.create(2, 2, kind, flags, None).unwrap();
            let paint = Paint::image_pattern(0.0, 0.0, 2.0, 2.0, 0.0, id, 1.0);
            let frag = convert_paint(&paint, &Scissor::none(), 1.0, 1.0, -1.0, &reg).unwrap();
            assert_eq!(frag.shader_type, ShaderType::FillImage as i32);
            assert_eq!(frag.tex_type, expected as i32);
            assert_eq!((frag.radius, frag.feather), (0.0, 0.0));
        }
    }

    #[test]
    fn flipped_image_maps_top_to_bottom() {
        let mut reg = registry();
        let id = reg.create(4, 8, TextureKind::Rgba, TextureFlags::FLIP_Y, None).unwrap();
        let paint = Paint::image_pattern(0.0, 0.0, 4.0, 8.0, 0.0, id, 1.0);
        let frag = convert_paint(&paint, &Scissor::none(), 1.0, 1.0, -1.0, &reg).unwrap();

        let m = frag.paint_mat;
        let inv = Transform::new(m[0][0], m[0][1], m[1][0], m[1][1], m[2][0], m[2][1]);
        // Pixel row y samples image row (h - y).
        let (x, y) = inv.apply(1.0, 0.0);
        assert!((x - 1.0).abs() < 1e-5 && (y - 8.0).abs() < 1e-5);
        let (_, y) = inv.apply(1.0, 8.0);
        assert!(y.abs() < 1e-5);
    }

    #[test]
    fn unknown_texture_is_an_error() {
        let reg = registry();
        let id = TextureId::from_raw(u32::MAX - 2).unwrap();
        let paint = Paint::image_pattern(0.0, 0.0, 1.0, 1.0, 0.0, id, 1.0);
        assert_eq!(
            convert_paint(&paint, &Scissor::none(), 1.0, 1.0, -1.0, &reg),
            Err(RenderError::UnknownTexture(id))
        );
    }
}
