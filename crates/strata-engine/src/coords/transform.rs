/// 2D affine transform stored as `[a, b, c, d, e, f]`.
///
/// A point maps as:
///
/// ```text
/// x' = a*x + c*y + e
/// y' = b*x + d*y + f
/// ```
///
/// `multiply` composes left-to-right: `t.multiply(s)` applies `t` first, then `s`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform(pub [f32; 6]);

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    #[inline]
    pub const fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self([a, b, c, d, e, f])
    }

    #[inline]
    pub const fn translate(tx: f32, ty: f32) -> Self {
        Self([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    #[inline]
    pub const fn scale(sx: f32, sy: f32) -> Self {
        Self([sx, 0.0, 0.0, sy, 0.0, 0.0])
    }

    /// Rotation by `angle` radians (clockwise on screen, since +Y points down).
    #[inline]
    pub fn rotate(angle: f32) -> Self {
        let (sn, cs) = angle.sin_cos();
        Self([cs, sn, -sn, cs, 0.0, 0.0])
    }

    /// Returns `self` followed by `other`.
    pub fn multiply(self, other: Transform) -> Self {
        let t = self.0;
        let s = other.0;
        Self([
            t[0] * s[0] + t[1] * s[2],
            t[0] * s[1] + t[1] * s[3],
            t[2] * s[0] + t[3] * s[2],
            t[2] * s[1] + t[3] * s[3],
            t[4] * s[0] + t[5] * s[2] + s[4],
            t[4] * s[1] + t[5] * s[3] + s[5],
        ])
    }

    /// Returns `other` followed by `self`.
    #[inline]
    pub fn premultiply(self, other: Transform) -> Self {
        other.multiply(self)
    }

    /// Inverse transform, or `None` when the matrix is (numerically) singular.
    ///
    /// The determinant and cofactors are evaluated in `f64`; paint transforms for
    /// large gradients carry translations around 1e5 which lose too much in `f32`.
    pub fn inverse(self) -> Option<Self> {
        let t = self.0.map(f64::from);
        let det = t[0] * t[3] - t[2] * t[1];
        if det > -1e-6 && det < 1e-6 {
            return None;
        }
        let inv_det = 1.0 / det;
        Some(Self([
            (t[3] * inv_det) as f32,
            (-t[1] * inv_det) as f32,
            (-t[2] * inv_det) as f32,
            (t[0] * inv_det) as f32,
            ((t[2] * t[5] - t[3] * t[4]) * inv_det) as f32,
            ((t[1] * t[4] - t[0] * t[5]) * inv_det) as f32,
        ]))
    }

    /// Inverse, falling back to identity for singular matrices.
    #[inline]
    pub fn inverse_or_identity(self) -> Self {
        self.inverse().unwrap_or(Self::IDENTITY)
    }

    #[inline]
    pub fn apply(self, x: f32, y: f32) -> (f32, f32) {
        let t = self.0;
        (x * t[0] + y * t[2] + t[4], x * t[1] + y * t[3] + t[5])
    }

    /// Per-axis scale factors, `sqrt(a² + c²)` and `sqrt(b² + d²)`.
    #[inline]
    pub fn axis_scale(self) -> (f32, f32) {
        let t = self.0;
        (
            (t[0] * t[0] + t[2] * t[2]).sqrt(),
            (t[1] * t[1] + t[3] * t[3]).sqrt(),
        )
    }

    /// Expands to three 16-byte rows: the affine's columns padded to `vec4`.
    ///
    /// Row `i` is column `i` of the 3×3 homogeneous matrix, which is the layout the
    /// shader reassembles into a `mat3x3`.
    pub fn to_mat3x4(self) -> [[f32; 4]; 3] {
        let t = self.0;
        [
            [t[0], t[1], 0.0, 0.0],
            [t[2], t[3], 0.0, 0.0],
            [t[4], t[5], 1.0, 0.0],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: (f32, f32), b: (f32, f32)) -> bool {
        (a.0 - b.0).abs() < 1e-4 && (a.1 - b.1).abs() < 1e-4
    }

    #[test]
    fn multiply_applies_left_operand_first() {
        let t = Transform::translate(10.0, 0.0).multiply(Transform::scale(2.0, 2.0));
        // translate, then scale
        assert_eq!(t.apply(1.0, 1.0), (22.0, 2.0));

        let p = Transform::translate(10.0, 0.0).premultiply(Transform::scale(2.0, 2.0));
        // scale, then translate
        assert_eq!(p.apply(1.0, 1.0), (12.0, 2.0));
    }

    #[test]
    fn inverse_round_trips_points() {
        let t = Transform::rotate(0.7)
            .multiply(Transform::scale(3.0, 0.5))
            .multiply(Transform::translate(-40.0, 12.5));
        let inv = t.inverse().unwrap();
        let (x, y) = t.apply(5.0, -7.0);
        assert!(approx(inv.apply(x, y), (5.0, -7.0)));
    }

    #[test]
    fn inverse_keeps_precision_with_large_translation() {
        let t = Transform::new(0.0, -1.0, 1.0, 0.0, -1.0e5, 3.0e4);
        let inv = t.inverse().unwrap();
        let (x, y) = t.apply(123.0, 456.0);
        assert!(approx(inv.apply(x, y), (123.0, 456.0)));
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        let t = Transform::scale(0.0, 5.0);
        assert!(t.inverse().is_none());
        assert_eq!(t.inverse_or_identity(), Transform::IDENTITY);
    }

    #[test]
    fn mat3x4_pads_each_column_to_four_floats() {
        let m = Transform::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0).to_mat3x4();
        assert_eq!(m, [[1.0, 2.0, 0.0, 0.0], [3.0, 4.0, 0.0, 0.0], [5.0, 6.0, 1.0, 0.0]]);
    }

    #[test]
    fn axis_scale_measures_column_lengths() {
        let (sx, sy) = Transform::scale(3.0, 4.0).axis_scale();
        assert_eq!((sx, sy), (3.0, 4.0));
        let (rx, ry) = Transform::rotate(1.1).axis_scale();
        assert!((rx - 1.0).abs() < 1e-6 && (ry - 1.0).abs() < 1e-6);
    }
}
