//! CPU-side mesh representation used by the OBJ loader.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// Interleaved vertex with position/uv/normal. Values are in object space.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub normal: [f32; 3],
}

impl MeshVertex {
    pub fn new(position: [f32; 3], uv: [f32; 2], normal: [f32; 3]) -> Self {
        Self {
            position,
            uv,
            normal,
        }
    }
}

/// Triangle-expanded mesh: attribute pools plus three index-aligned float streams.
///
/// Corner `i` of the mesh is `vertex_stream[3i..3i+3]`, `uv_stream[2i..2i+2]`
/// and `normal_stream[3i..3i+3]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IndexedMesh {
    pub(crate) positions: Vec<Vec3>,
    pub(crate) uvs: Vec<Vec2>,
    pub(crate) normals: Vec<Vec3>,
    pub(crate) vertex_stream: Vec<f32>,
    pub(crate) uv_stream: Vec<f32>,
    pub(crate) normal_stream: Vec<f32>,
}

impl IndexedMesh {
    /// Positions in declaration order (source index `n` is `positions()[n - 1]`).
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn vertex_stream(&self) -> &[f32] {
        &self.vertex_stream
    }

    pub fn uv_stream(&self) -> &[f32] {
        &self.uv_stream
    }

    pub fn normal_stream(&self) -> &[f32] {
        &self.normal_stream
    }

    /// Number of triangle corners emitted (three per face).
    pub fn corner_count(&self) -> usize {
        self.vertex_stream.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.corner_count() / 3
    }

    /// Returns `true` if at least one face was emitted.
    pub fn is_valid(&self) -> bool {
        self.corner_count() > 0
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertex_stream)
    }

    pub fn uv_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.uv_stream)
    }

    pub fn normal_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normal_stream)
    }

    /// Zip the three streams into one vertex per corner.
    pub fn interleaved(&self) -> Vec<MeshVertex> {
        self.vertex_stream
            .chunks_exact(3)
            .zip(self.uv_stream.chunks_exact(2))
            .zip(self.normal_stream.chunks_exact(3))
            .map(|((p, t), n)| MeshVertex::new([p[0], p[1], p[2]], [t[0], t[1]], [n[0], n[1], n[2]]))
            .collect()
    }

    /// Append one resolved corner to all three streams.
    pub(crate) fn push_corner(&mut self, position: Vec3, uv: Vec2, normal: Vec3) {
        self.vertex_stream.extend_from_slice(&position.to_array());
        self.uv_stream.extend_from_slice(&uv.to_array());
        self.normal_stream.extend_from_slice(&normal.to_array());
    }
}
