//! Unit cube geometry and per-instance state.

use glam::{Mat4, Vec3};

/// Floats per vertex: position (x, y, z) followed by color (r, g, b).
pub const FLOATS_PER_VERTEX: usize = 6;

// 8 corners, each with (pos.xyz, color.rgb)
#[rustfmt::skip]
const VERTICES: [f32; 8 * FLOATS_PER_VERTEX] = [
    //  x     y     z      r    g    b
    -0.5, -0.5,  0.5,   1.0, 0.0, 0.0, // 0: front bottom left
     0.5, -0.5,  0.5,   0.0, 1.0, 0.0, // 1: front bottom right
     0.5,  0.5,  0.5,   0.0, 0.0, 1.0, // 2: front top right
    -0.5,  0.5,  0.5,   1.0, 1.0, 0.0, // 3: front top left
    -0.5, -0.5, -0.5,   1.0, 0.0, 1.0, // 4: back bottom left
     0.5, -0.5, -0.5,   0.0, 1.0, 1.0, // 5: back bottom right
     0.5,  0.5, -0.5,   1.0, 1.0, 1.0, // 6: back top right
    -0.5,  0.5, -0.5,   0.2, 0.2, 0.2, // 7: back top left
];

// 6 faces * 2 triangles * 3 indices, counter-clockwise when seen from outside
#[rustfmt::skip]
const INDICES: [u32; 36] = [
    0, 1, 2,  2, 3, 0, // +Z
    5, 4, 7,  7, 6, 5, // -Z
    4, 0, 3,  3, 7, 4, // -X
    1, 5, 6,  6, 2, 1, // +X
    3, 2, 6,  6, 7, 3, // +Y
    4, 5, 1,  1, 0, 4, // -Y
];

/// A named unit cube with its own transform and tint.
///
/// Geometry is shared by every cube; only the model matrix and color are
/// per-instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Cube {
    name: String,
    model: Mat4,
    color: Vec3,
}

impl Cube {
    /// Tint applied when none is given.
    pub const DEFAULT_COLOR: Vec3 = Vec3::new(1.0, 0.5, 0.31);

    /// Number of indices issued per cube draw call.
    pub const INDEX_COUNT: i32 = INDICES.len() as i32;

    /// Creates a cube at the origin with the default tint.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), model: Mat4::IDENTITY, color: Self::DEFAULT_COLOR }
    }

    /// Returns a copy with the given tint.
    #[must_use]
    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    /// Returns a copy with the given model transform.
    #[must_use]
    pub fn with_model(mut self, model: Mat4) -> Self {
        self.model = model;
        self
    }

    /// Interleaved vertex data shared by all cubes.
    #[must_use]
    pub fn vertices() -> &'static [f32] {
        &VERTICES
    }

    /// Triangle indices shared by all cubes.
    #[must_use]
    pub fn indices() -> &'static [u32] {
        &INDICES
    }

    /// Name used for scene lookups.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Model (object to world) transform.
    #[must_use]
    pub fn model(&self) -> Mat4 {
        self.model
    }

    /// Tint uploaded as the `color` uniform.
    #[must_use]
    pub fn color(&self) -> Vec3 {
        self.color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_is_twelve_triangles_over_eight_vertices() {
        assert_eq!(Cube::vertices().len(), 8 * FLOATS_PER_VERTEX);
        assert_eq!(Cube::indices().len(), 36);
        assert_eq!(Cube::INDEX_COUNT, 36);

        let vertex_count = (Cube::vertices().len() / FLOATS_PER_VERTEX) as u32;
        assert!(Cube::indices().iter().all(|&i| i < vertex_count));
    }

    #[test]
    fn every_corner_is_used_by_three_faces() {
        // each corner of a cube touches 3 faces; with 2 triangles per face a
        // corner appears 4 to 6 times depending on the diagonal split
        for corner in 0..8u32 {
            let uses = Cube::indices().iter().filter(|&&i| i == corner).count();
            assert!((4..=6).contains(&uses), "corner {corner} used {uses} times");
        }
    }

    #[test]
    fn new_cube_sits_at_origin() {
        let cube = Cube::new("Cube");
        assert_eq!(cube.name(), "Cube");
        assert_eq!(cube.model(), Mat4::IDENTITY);
        assert_eq!(cube.color(), Cube::DEFAULT_COLOR);

        let moved = cube.with_model(Mat4::from_translation(Vec3::X));
        assert_eq!(moved.model().w_axis.x, 1.0);
    }
}
