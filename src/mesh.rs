use glam::Vec3;
use serde::{Deserialize, Serialize};

/// GPU ready mesh buffers.
///
/// Vertices are laid out as `position.xyz` followed by `normal.xyz`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshData {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub const FLOATS_PER_VERTEX: usize = 6;

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / Self::FLOATS_PER_VERTEX
    }

    /// Appends a vertex with a zero normal and returns its index.
    pub fn push_vertex(&mut self, position: Vec3) -> u32 {
        let index = self.vertex_count() as u32;
        self.vertices
            .extend_from_slice(&[position.x, position.y, position.z, 0.0, 0.0, 0.0]);
        index
    }

    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    pub fn position(&self, index: usize) -> Vec3 {
        let base = index * Self::FLOATS_PER_VERTEX;
        Vec3::from_slice(&self.vertices[base..base + 3])
    }

    pub fn normal(&self, index: usize) -> Vec3 {
        let base = index * Self::FLOATS_PER_VERTEX + 3;
        Vec3::from_slice(&self.vertices[base..base + 3])
    }

    /// Recomputes smooth vertex normals from the triangle list.
    ///
    /// Face normals are area weighted through the unnormalized cross
    /// product, so slivers contribute little. Vertices that are not shared
    /// across surfaces keep exact flat normals.
    pub fn compute_normals(&mut self) {
        let vertex_count = self.vertex_count();
        let mut accum = vec![Vec3::ZERO; vertex_count];

        for triangle in self.indices.chunks_exact(3) {
            let i0 = triangle[0] as usize;
            let i1 = triangle[1] as usize;
            let i2 = triangle[2] as usize;
            let p0 = self.position(i0);
            let p1 = self.position(i1);
            let p2 = self.position(i2);
            let normal = (p1 - p0).cross(p2 - p0);
            if normal.length_squared() > f32::EPSILON {
                accum[i0] += normal;
                accum[i1] += normal;
                accum[i2] += normal;
            }
        }

        for (i, normal) in accum.into_iter().enumerate() {
            let normal = normal.normalize_or_zero();
            let base = i * Self::FLOATS_PER_VERTEX + 3;
            self.vertices[base] = normal.x;
            self.vertices[base + 1] = normal.y;
            self.vertices[base + 2] = normal.z;
        }
    }

    /// The unit cube acting as the visible light source.
    pub fn unit_cube() -> Self {
        Self {
            vertices: CUBE_VERTICES.to_vec(),
            indices: CUBE_INDICES.to_vec(),
        }
    }
}

const CUBE_VERTICES: &[f32] = &[
    // positions        // normals
    -0.5, -0.5, 0.5, 0.0, 0.0, 1.0, 0.5, -0.5, 0.5, 0.0, 0.0, 1.0, 0.5, 0.5, 0.5, 0.0, 0.0, 1.0,
    -0.5, 0.5, 0.5, 0.0, 0.0, 1.0, -0.5, -0.5, -0.5, 0.0, 0.0, -1.0, 0.5, -0.5, -0.5, 0.0, 0.0,
    -1.0, 0.5, 0.5, -0.5, 0.0, 0.0, -1.0, -0.5, 0.5, -0.5, 0.0, 0.0, -1.0, -0.5, -0.5, -0.5, -1.0,
    0.0, 0.0, -0.5, -0.5, 0.5, -1.0, 0.0, 0.0, -0.5, 0.5, 0.5, -1.0, 0.0, 0.0, -0.5, 0.5, -0.5,
    -1.0, 0.0, 0.0, 0.5, -0.5, -0.5, 1.0, 0.0, 0.0, 0.5, -0.5, 0.5, 1.0, 0.0, 0.0, 0.5, 0.5, 0.5,
    1.0, 0.0, 0.0, 0.5, 0.5, -0.5, 1.0, 0.0, 0.0, -0.5, -0.5, -0.5, 0.0, -1.0, 0.0, 0.5, -0.5,
    -0.5, 0.0, -1.0, 0.0, 0.5, -0.5, 0.5, 0.0, -1.0, 0.0, -0.5, -0.5, 0.5, 0.0, -1.0, 0.0, -0.5,
    0.5, -0.5, 0.0, 1.0, 0.0, 0.5, 0.5, -0.5, 0.0, 1.0, 0.0, 0.5, 0.5, 0.5, 0.0, 1.0, 0.0, -0.5,
    0.5, 0.5, 0.0, 1.0, 0.0,
];

const CUBE_INDICES: &[u32] = &[
    0, 1, 2, 0, 2, 3, // front
    4, 6, 5, 4, 7, 6, // back
    8, 9, 10, 8, 10, 11, // left
    12, 14, 13, 12, 15, 14, // right
    16, 18, 17, 16, 19, 18, // bottom
    20, 21, 22, 20, 22, 23, // top
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_cube_is_well_formed() {
        let cube = MeshData::unit_cube();
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.indices.len(), 36);
        let max_index = *cube.indices.iter().max().unwrap();
        assert!((max_index as usize) < cube.vertex_count());
    }

    #[test]
    fn computes_unit_normals_for_a_triangle() {
        let mut mesh = MeshData::default();
        let a = mesh.push_vertex(Vec3::ZERO);
        let b = mesh.push_vertex(Vec3::X);
        let c = mesh.push_vertex(Vec3::Y);
        mesh.push_triangle(a, b, c);
        mesh.compute_normals();
        for i in 0..3 {
            assert!((mesh.normal(i) - Vec3::Z).length() < 1e-5);
        }
    }

    #[test]
    fn degenerate_triangles_do_not_poison_normals() {
        let mut mesh = MeshData::default();
        let a = mesh.push_vertex(Vec3::ZERO);
        let b = mesh.push_vertex(Vec3::X);
        let c = mesh.push_vertex(Vec3::Y);
        mesh.push_triangle(a, b, c);
        // Zero-area triangle reusing the same vertices.
        mesh.push_triangle(a, a, b);
        mesh.compute_normals();
        assert!((mesh.normal(0) - Vec3::Z).length() < 1e-5);
    }
}
