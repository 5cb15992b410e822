// ABOUTME: Fixed-size 4x4 matrix math and viewport helpers.
// ABOUTME: Column-major, allocation free, OpenGL clip-space conventions.

use std::ops::Mul;

/// Column-major 4x4 matrix. `cols[c][r]` is column `c`, row `r`.
///
/// The memory layout matches what a `mat4x4<f32>` uniform expects, so the
/// matrix can be uploaded as-is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    pub cols: [[f32; 4]; 4],
}

impl Mat4 {
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub const fn from_cols(cols: [[f32; 4]; 4]) -> Self {
        Self { cols }
    }

    /// Post-multiply by a translation (`self * T(v)`).
    pub fn translate(self, v: [f32; 3]) -> Self {
        let mut out = self;
        for r in 0..4 {
            out.cols[3][r] = self.cols[0][r] * v[0]
                + self.cols[1][r] * v[1]
                + self.cols[2][r] * v[2]
                + self.cols[3][r];
        }
        out
    }

    /// Right-handed orthographic projection with a [-1, 1] depth range.
    pub fn ortho(volume: OrthoVolume) -> Self {
        let rl = 1.0 / (volume.right - volume.left);
        let tb = 1.0 / (volume.top - volume.bottom);
        let fn_ = -1.0 / (volume.far - volume.near);

        let mut m = Self::from_cols([[0.0; 4]; 4]);
        m.cols[0][0] = 2.0 * rl;
        m.cols[1][1] = 2.0 * tb;
        m.cols[2][2] = 2.0 * fn_;
        m.cols[3][0] = -(volume.right + volume.left) * rl;
        m.cols[3][1] = -(volume.top + volume.bottom) * tb;
        m.cols[3][2] = (volume.far + volume.near) * fn_;
        m.cols[3][3] = 1.0;
        m
    }

    /// Unit-height orthographic projection corrected for `aspect` (width / height).
    pub fn ortho_default(aspect: f32) -> Self {
        Self::ortho(OrthoVolume::for_aspect(aspect))
    }

    pub fn transform(&self, v: [f32; 4]) -> [f32; 4] {
        let mut out = [0.0; 4];
        for (r, value) in out.iter_mut().enumerate() {
            *value = (0..4).map(|c| self.cols[c][r] * v[c]).sum();
        }
        out
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Mat4 {
        let mut out = Mat4::from_cols([[0.0; 4]; 4]);
        for c in 0..4 {
            for r in 0..4 {
                out.cols[c][r] = (0..4).map(|k| self.cols[k][r] * rhs.cols[c][k]).sum();
            }
        }
        out
    }
}

/// Axis-aligned view volume for an orthographic projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoVolume {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl OrthoVolume {
    const DEPTH: f32 = 100.0;

    /// The shorter axis spans [-1, 1]; the longer one is stretched by the
    /// aspect ratio. Landscape: x in [-aspect, aspect], y in [-1, 1].
    /// Portrait: x in [-1, 1], y in [-1/aspect, 1/aspect].
    ///
    /// A non-positive or non-finite aspect falls back to 1.
    pub fn for_aspect(aspect: f32) -> Self {
        let aspect = if aspect.is_finite() && aspect > 0.0 {
            aspect
        } else {
            1.0
        };

        let (half_w, half_h) = if aspect >= 1.0 {
            (aspect, 1.0)
        } else {
            (1.0, 1.0 / aspect)
        };

        Self {
            left: -half_w,
            right: half_w,
            bottom: -half_h,
            top: half_h,
            near: -Self::DEPTH,
            far: Self::DEPTH,
        }
    }

    pub fn half_extents(&self) -> (f32, f32) {
        (
            (self.right - self.left) / 2.0,
            (self.top - self.bottom) / 2.0,
        )
    }
}

/// Framebuffer size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height, with both sides clamped to at least one pixel.
    pub fn aspect_ratio(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_identity_mul() {
        let m = Mat4::ortho_default(1.5);
        assert_eq!(m * Mat4::IDENTITY, m);
        assert_eq!(Mat4::IDENTITY * m, m);
    }

    #[test]
    fn test_zero_translate_is_noop() {
        assert_eq!(Mat4::IDENTITY.translate([0.0, 0.0, 0.0]), Mat4::IDENTITY);
    }

    #[test]
    fn test_translate_moves_points() {
        let m = Mat4::IDENTITY.translate([1.0, -2.0, 3.0]);
        assert_eq!(m.transform([0.0, 0.0, 0.0, 1.0]), [1.0, -2.0, 3.0, 1.0]);
    }

    #[test]
    fn test_mul_order() {
        // Scale then translate: P * T applies T first
        let scale = Mat4::from_cols([
            [2.0, 0.0, 0.0, 0.0],
            [0.0, 2.0, 0.0, 0.0],
            [0.0, 0.0, 2.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let m = scale * Mat4::IDENTITY.translate([1.0, 0.0, 0.0]);
        assert_eq!(m.transform([0.0, 0.0, 0.0, 1.0]), [2.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_landscape_volume() {
        let viewport = Viewport::new(640, 480);
        let volume = OrthoVolume::for_aspect(viewport.aspect_ratio());
        let (half_w, half_h) = volume.half_extents();
        assert!(approx(half_w, 4.0 / 3.0));
        assert!(approx(half_h, 1.0));

        let m = Mat4::ortho_default(viewport.aspect_ratio());
        assert!(approx(m.cols[0][0], 0.75));
        assert!(approx(m.cols[1][1], 1.0));
        assert!(approx(m.cols[2][2], -0.01));
        assert!(approx(m.cols[3][2], 0.0));
    }

    #[test]
    fn test_portrait_volume() {
        let volume = OrthoVolume::for_aspect(0.5);
        assert_eq!(volume.half_extents(), (1.0, 2.0));
    }

    #[test]
    fn test_volume_edges_map_to_ndc() {
        let aspect = 16.0 / 9.0;
        let m = Mat4::ortho_default(aspect);
        let right_top = m.transform([aspect, 1.0, 0.0, 1.0]);
        assert!(approx(right_top[0], 1.0));
        assert!(approx(right_top[1], 1.0));
        let left_bottom = m.transform([-aspect, -1.0, 0.0, 1.0]);
        assert!(approx(left_bottom[0], -1.0));
        assert!(approx(left_bottom[1], -1.0));
    }

    #[test]
    fn test_zero_height_viewport() {
        let viewport = Viewport::new(640, 0);
        assert!(viewport.is_empty());
        let aspect = viewport.aspect_ratio();
        assert!(aspect.is_finite());
        assert_eq!(aspect, 640.0);
    }

    #[test]
    fn test_degenerate_aspect_falls_back() {
        assert_eq!(OrthoVolume::for_aspect(0.0), OrthoVolume::for_aspect(1.0));
        assert_eq!(OrthoVolume::for_aspect(f32::NAN), OrthoVolume::for_aspect(1.0));
    }
}
