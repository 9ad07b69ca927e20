//! Render Buffers
//!
//! Flat, tightly packed vertex streams handed to the rendering engine.
//! Every triangle owns three emitted vertices; nothing is shared or welded,
//! so a per-triangle normal can be repeated across its corners.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Triangle-list geometry ready for upload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderBuffers {
    /// Three floats per emitted vertex
    pub positions: Vec<f32>,
    /// Three floats per emitted vertex, parallel to `positions`
    pub normals: Vec<f32>,
    /// Three indices per triangle, strictly increasing in emission order
    pub indices: Vec<u32>,
}

impl RenderBuffers {
    /// Create empty buffers sized for `triangles` triangles
    pub fn with_triangle_capacity(triangles: usize) -> Self {
        Self {
            positions: Vec::with_capacity(triangles * 9),
            normals: Vec::with_capacity(triangles * 9),
            indices: Vec::with_capacity(triangles * 3),
        }
    }

    /// Append one flat-shaded triangle
    pub fn push_triangle(&mut self, corners: [Vec3; 3], normal: Vec3) {
        let base = self.vertex_count() as u32;
        for corner in corners {
            self.positions.extend_from_slice(&corner.to_array());
            self.normals.extend_from_slice(&normal.to_array());
        }
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }

    /// Number of emitted vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// True if no triangle has been emitted
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Normal of the given triangle
    pub fn triangle_normal(&self, triangle: usize) -> Option<Vec3> {
        let start = triangle * 9;
        self.normals
            .get(start..start + 3)
            .map(|n| Vec3::new(n[0], n[1], n[2]))
    }
}
