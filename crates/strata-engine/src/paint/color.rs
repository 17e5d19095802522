/// Straight-alpha linear RGBA color, as the tessellator submits it.
///
/// The backend premultiplies before anything reaches the GPU; see [`Color::premultiplied`].
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    #[inline]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    #[inline]
    pub const fn transparent() -> Self {
        Self::rgba(0.0, 0.0, 0.0, 0.0)
    }

    #[inline]
    pub const fn white() -> Self {
        Self::rgba(1.0, 1.0, 1.0, 1.0)
    }

    /// Creates a color from straight-alpha bytes (`0`–`255`).
    #[inline]
    pub fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    /// Same color with alpha replaced.
    #[inline]
    pub const fn with_alpha(mut self, a: f32) -> Self {
        self.a = a;
        self
    }

    /// Color channels scaled by alpha, laid out as a shader `vec4`.
    ///
    /// The compositing blend equations assume premultiplied input.
    #[inline]
    pub fn premultiplied(self) -> [f32; 4] {
        [self.r * self.a, self.g * self.a, self.b * self.a, self.a]
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    /// True when every channel is finite and within `0..=1`.
    #[inline]
    pub fn is_normalized(self) -> bool {
        self.is_finite() && [self.r, self.g, self.b, self.a].iter().all(|c| (0.0..=1.0).contains(c))
    }

    /// Every channel clamped to `0..=1`, with NaN mapped to 0.
    pub fn clamped(self) -> Self {
        let unit = |c: f32| if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) };
        Self::rgba(unit(self.r), unit(self.g), unit(self.b), unit(self.a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premultiply_scales_rgb_by_alpha() {
        let c = Color::rgba(1.0, 0.5, 0.25, 0.5);
        assert_eq!(c.premultiplied(), [0.5, 0.25, 0.125, 0.5]);
    }

    #[test]
    fn opaque_color_is_unchanged_by_premultiply() {
        let c = Color::rgb(0.2, 0.4, 0.6);
        assert_eq!(c.premultiplied(), [0.2, 0.4, 0.6, 1.0]);
    }

    #[test]
    fn rgba8_maps_bytes_to_unit_range() {
        let c = Color::rgba8(255, 0, 51, 255);
        assert_eq!(c, Color::rgba(1.0, 0.0, 0.2, 1.0));
    }

    #[test]
    fn clamped_maps_nan_and_out_of_range_channels() {
        let c = Color::rgba(f32::NAN, 2.0, -1.0, f32::INFINITY);
        assert!(!c.is_finite());
        assert!(!c.is_normalized());

        let fixed = c.clamped();
        assert_eq!(fixed, Color::rgba(0.0, 1.0, 0.0, 1.0));
        assert!(fixed.is_normalized());
    }
}
