// ABOUTME: Quad geometry for a single glyph bitmap.
// ABOUTME: Six (x, y, u, v) vertices, two triangles, centered at the origin.

use bytemuck::{Pod, Zeroable};

use crate::rasterizer::Glyph;

/// One vertex as the shader sees it: a single vec4 `(x, y, u, v)`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub tex_coords: [f32; 2],
}

impl QuadVertex {
    pub const fn new(x: f32, y: f32, u: f32, v: f32) -> Self {
        Self {
            position: [x, y],
            tex_coords: [u, v],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    vertices: [QuadVertex; 6],
    width: f32,
    height: f32,
}

impl Quad {
    pub const VERTEX_COUNT: u32 = 6;

    /// Lay out a `pixel_width` x `pixel_height` bitmap scaled by `scale`,
    /// centered on the origin. `v = 0` is the top row of the bitmap.
    pub fn centered(pixel_width: u32, pixel_height: u32, scale: f32) -> Self {
        let w = pixel_width as f32 * scale;
        let h = pixel_height as f32 * scale;
        let xpos = -w / 2.0;
        let ypos = -h / 2.0;

        // Both triangles share the (xpos, ypos + h) -> (xpos + w, ypos) diagonal
        let vertices = [
            QuadVertex::new(xpos, ypos + h, 0.0, 0.0),
            QuadVertex::new(xpos, ypos, 0.0, 1.0),
            QuadVertex::new(xpos + w, ypos, 1.0, 1.0),
            QuadVertex::new(xpos, ypos + h, 0.0, 0.0),
            QuadVertex::new(xpos + w, ypos, 1.0, 1.0),
            QuadVertex::new(xpos + w, ypos + h, 1.0, 0.0),
        ];

        Self {
            vertices,
            width: w,
            height: h,
        }
    }

    pub fn for_glyph(glyph: &Glyph, scale: f32) -> Self {
        Self::centered(glyph.pixel_width, glyph.pixel_height, scale)
    }

    pub fn vertices(&self) -> &[QuadVertex; 6] {
        &self.vertices
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Bottom-left corner
    pub fn origin(&self) -> (f32, f32) {
        (-self.width / 2.0, -self.height / 2.0)
    }

    pub fn triangles(&self) -> [[QuadVertex; 3]; 2] {
        let v = &self.vertices;
        [[v[0], v[1], v[2]], [v[3], v[4], v[5]]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_is_four_floats() {
        assert_eq!(std::mem::size_of::<QuadVertex>(), 4 * std::mem::size_of::<f32>());
        let v = QuadVertex::new(1.0, 2.0, 3.0, 4.0);
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&v));
        assert_eq!(floats, &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_extents_scale_exactly() {
        for &(pw, ph, scale) in &[(11u32, 13u32, 0.1f32), (7, 20, 2.5), (1, 1, 0.333)] {
            let quad = Quad::centered(pw, ph, scale);
            assert_eq!(quad.width(), pw as f32 * scale);
            assert_eq!(quad.height(), ph as f32 * scale);
        }
    }

    #[test]
    fn test_centered_at_origin() {
        let quad = Quad::centered(12, 13, 0.1);
        let (xpos, ypos) = quad.origin();
        assert_eq!(xpos, -(12.0 * 0.1) / 2.0);
        assert_eq!(ypos, -(13.0 * 0.1) / 2.0);

        let xs: Vec<f32> = quad.vertices().iter().map(|v| v.position[0]).collect();
        let ys: Vec<f32> = quad.vertices().iter().map(|v| v.position[1]).collect();
        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        assert_eq!(min_x, xpos);
        assert_eq!(max_x, xpos + quad.width());
        assert_eq!(min_y, ypos);
        assert_eq!(max_y, ypos + quad.height());
        assert!((min_x + max_x).abs() < 1e-6);
        assert!((min_y + max_y).abs() < 1e-6);
    }

    #[test]
    fn test_triangles_share_diagonal() {
        let quad = Quad::centered(10, 20, 1.0);
        let (xpos, ypos) = quad.origin();
        let top_left = [xpos, ypos + quad.height()];
        let bottom_right = [xpos + quad.width(), ypos];

        for triangle in quad.triangles() {
            let positions: Vec<[f32; 2]> = triangle.iter().map(|v| v.position).collect();
            assert!(positions.contains(&top_left));
            assert!(positions.contains(&bottom_right));
        }
    }

    #[test]
    fn test_tex_coords_cover_unit_square_top_down() {
        let quad = Quad::centered(10, 20, 1.0);
        let (_, ypos) = quad.origin();

        let mut corners: Vec<[f32; 2]> = quad.vertices().iter().map(|v| v.tex_coords).collect();
        corners.sort_by(|a, b| a.partial_cmp(b).unwrap());
        corners.dedup();
        assert_eq!(corners, vec![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]]);

        for v in quad.vertices() {
            if v.position[1] == ypos + quad.height() {
                assert_eq!(v.tex_coords[1], 0.0);
            } else {
                assert_eq!(v.tex_coords[1], 1.0);
            }
        }
    }

    #[test]
    fn test_empty_bitmap_collapses() {
        let quad = Quad::centered(0, 0, 0.1);
        assert_eq!(quad.width(), 0.0);
        assert!(quad
            .vertices()
            .iter()
            .all(|v| v.position[0] == 0.0 && v.position[1] == 0.0));
    }
}
