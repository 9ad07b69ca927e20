//! Polygonal Mesh
//!
//! Vertex/edge/face container used by scene objects:
//! - Monotonic per-mesh ids that are never reused until `clear`
//! - Edges derived on demand from face loops, undirected and deduplicated
//! - Removal cascades from a record to everything that depends on it
//! - Fan triangulation into flat-shaded [`RenderBuffers`]

use std::fmt;

use glam::DVec3;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::buffers::RenderBuffers;
use crate::math::Aabb;

macro_rules! mesh_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Wrap a raw id value
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            /// Get the raw id value
            pub const fn value(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

mesh_id!(
    /// Vertex identifier, unique within one mesh
    VertexId,
    "v"
);
mesh_id!(
    /// Edge identifier, unique within one mesh
    EdgeId,
    "e"
);
mesh_id!(
    /// Face identifier, unique within one mesh
    FaceId,
    "f"
);

/// Inline storage for face loops; quads stay on the stack
pub type Loop<T> = SmallVec<[T; 4]>;

/// Mesh vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub id: VertexId,
    pub position: DVec3,
}

/// Undirected edge between two vertices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub id: EdgeId,
    pub a: VertexId,
    pub b: VertexId,
}

impl Edge {
    /// True if this edge joins `a` and `b` in either direction
    pub fn connects(&self, a: VertexId, b: VertexId) -> bool {
        (self.a == a && self.b == b) || (self.a == b && self.b == a)
    }

    /// True if `vertex` is one of the endpoints
    pub fn touches(&self, vertex: VertexId) -> bool {
        self.a == vertex || self.b == vertex
    }
}

/// Polygon face
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face {
    pub id: FaceId,
    vertices: Loop<VertexId>,
    edges: Loop<EdgeId>,
}

impl Face {
    /// Vertex loop, counter-clockwise seen from outside
    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    /// Edge loop; entry `i` joins vertex `i` and vertex `i + 1` (wrapping)
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// Number of corners
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Faces always have at least three corners
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Structural mesh container
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    vertices: IndexMap<VertexId, Vertex>,
    edges: IndexMap<EdgeId, Edge>,
    faces: IndexMap<FaceId, Face>,
    next_vertex: u32,
    next_edge: u32,
    next_face: u32,
}

impl MeshData {
    /// Create an empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    // ---- vertices ----

    /// Append a vertex and return its id
    pub fn add_vertex(&mut self, position: DVec3) -> VertexId {
        let id = VertexId(self.next_vertex);
        self.next_vertex += 1;
        self.vertices.insert(id, Vertex { id, position });
        id
    }

    /// Remove a vertex together with every edge and face that uses it.
    ///
    /// Returns false if the vertex does not exist.
    pub fn remove_vertex(&mut self, id: VertexId) -> bool {
        if self.vertices.shift_remove(&id).is_none() {
            return false;
        }

        let (edges_before, faces_before) = (self.edges.len(), self.faces.len());
        self.edges.retain(|_, edge| !edge.touches(id));
        self.faces.retain(|_, face| !face.vertices.contains(&id));

        log::debug!(
            "Removed vertex {}: {} edges, {} faces cascaded",
            id,
            edges_before - self.edges.len(),
            faces_before - self.faces.len()
        );
        true
    }

    /// Move a vertex. Topology is untouched.
    pub fn update_vertex(&mut self, id: VertexId, position: DVec3) -> bool {
        match self.vertices.get_mut(&id) {
            Some(vertex) => {
                vertex.position = position;
                true
            }
            None => false,
        }
    }

    /// Get a vertex by id
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    /// Position of a vertex
    pub fn position(&self, id: VertexId) -> Option<DVec3> {
        self.vertices.get(&id).map(|v| v.position)
    }

    /// Vertices in creation order
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    // ---- edges ----

    /// Return the edge joining `a` and `b`, creating it if needed.
    ///
    /// Direction does not matter. Fails if either endpoint is missing.
    pub fn add_edge(&mut self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        if !self.vertices.contains_key(&a) || !self.vertices.contains_key(&b) {
            log::warn!("Cannot create edge {}-{}: unknown vertex", a, b);
            return None;
        }
        Some(self.find_or_create_edge(a, b))
    }

    /// Find the edge joining `a` and `b` in either direction
    pub fn find_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.edges
            .values()
            .find(|edge| edge.connects(a, b))
            .map(|edge| edge.id)
    }

    /// Remove an edge and every face whose loop runs along it.
    ///
    /// Returns false if the edge does not exist.
    pub fn remove_edge(&mut self, id: EdgeId) -> bool {
        if self.edges.shift_remove(&id).is_none() {
            return false;
        }

        let faces_before = self.faces.len();
        self.faces.retain(|_, face| !face.edges.contains(&id));
        log::debug!(
            "Removed edge {}: {} faces cascaded",
            id,
            faces_before - self.faces.len()
        );
        true
    }

    /// Get an edge by id
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// Edges in creation order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn find_or_create_edge(&mut self, a: VertexId, b: VertexId) -> EdgeId {
        if let Some(id) = self.find_edge(a, b) {
            return id;
        }
        let id = EdgeId(self.next_edge);
        self.next_edge += 1;
        self.edges.insert(id, Edge { id, a, b });
        id
    }

    // ---- faces ----

    /// Add a polygon face from a vertex loop.
    ///
    /// Loops shorter than three vertices, or naming a vertex that is not in
    /// the mesh, are rejected with a warning and produce no face. Missing
    /// edges along the loop, including the closing one, are created.
    pub fn add_face(&mut self, loop_vertices: &[VertexId]) -> Option<FaceId> {
        if loop_vertices.len() < 3 {
            log::warn!(
                "Cannot create face with less than 3 vertices (got {})",
                loop_vertices.len()
            );
            return None;
        }
        if let Some(missing) = loop_vertices
            .iter()
            .find(|id| !self.vertices.contains_key(*id))
        {
            log::warn!("Cannot create face: unknown vertex {}", missing);
            return None;
        }

        let edges = self.derive_edge_loop(loop_vertices);
        let id = FaceId(self.next_face);
        self.next_face += 1;
        self.faces.insert(
            id,
            Face {
                id,
                vertices: Loop::from_slice(loop_vertices),
                edges,
            },
        );
        Some(id)
    }

    /// Remove a face. Its edges stay in the mesh.
    pub fn remove_face(&mut self, id: FaceId) -> bool {
        self.faces.shift_remove(&id).is_some()
    }

    /// Get a face by id
    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.faces.get(&id)
    }

    /// Faces in creation order
    pub fn faces(&self) -> impl Iterator<Item = &Face> {
        self.faces.values()
    }

    /// Number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn derive_edge_loop(&mut self, loop_vertices: &[VertexId]) -> Loop<EdgeId> {
        let count = loop_vertices.len();
        (0..count)
            .map(|i| {
                let next = loop_vertices[(i + 1) % count];
                self.find_or_create_edge(loop_vertices[i], next)
            })
            .collect()
    }

    /// Discard all edges and derive them again from the face loops.
    ///
    /// Edge ids restart from zero and every face's edge loop is rewritten.
    /// Edges that no face runs along are gone afterwards.
    pub fn rebuild_edges(&mut self) {
        self.edges.clear();
        self.next_edge = 0;

        let face_ids: Vec<FaceId> = self.faces.keys().copied().collect();
        for face_id in face_ids {
            let loop_vertices = match self.faces.get(&face_id) {
                Some(face) => face.vertices.clone(),
                None => continue,
            };
            let edges = self.derive_edge_loop(&loop_vertices);
            if let Some(face) = self.faces.get_mut(&face_id) {
                face.edges = edges;
            }
        }
    }

    // ---- whole mesh ----

    /// Triangulate every face into flat-shaded render buffers.
    ///
    /// Faces are fanned from their first vertex; each triangle gets the
    /// normalized cross product `(v1 - v0) x (v2 - v0)` on all three of its
    /// corners (zero for degenerate triangles). Returns `None` when the mesh
    /// has no vertices or no faces.
    pub fn generate_geometry(&self) -> Option<RenderBuffers> {
        if self.faces.is_empty() || self.vertices.is_empty() {
            log::warn!("Cannot generate geometry: no faces or vertices");
            return None;
        }

        let triangles = self.faces.values().map(|f| f.len().saturating_sub(2)).sum();
        let mut buffers = RenderBuffers::with_triangle_capacity(triangles);

        for face in self.faces.values() {
            let points: Loop<DVec3> = face
                .vertices
                .iter()
                .filter_map(|id| self.position(*id))
                .collect();
            if points.len() < 3 {
                continue;
            }

            let origin = points[0];
            for pair in points[1..].windows(2) {
                let (v1, v2) = (pair[0], pair[1]);
                let normal = (v1 - origin).cross(v2 - origin).normalize_or_zero();
                buffers.push_triangle(
                    [origin.as_vec3(), v1.as_vec3(), v2.as_vec3()],
                    normal.as_vec3(),
                );
            }
        }

        Some(buffers)
    }

    /// Bounding box of all vertex positions
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.values().map(|v| v.position))
    }

    /// Drop everything and restart all id counters at zero
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.faces.clear();
        self.next_vertex = 0;
        self.next_edge = 0;
        self.next_face = 0;
    }

    /// True if the mesh has at least one vertex and one face
    pub fn is_valid(&self) -> bool {
        !self.vertices.is_empty() && !self.faces.is_empty()
    }

    /// True if the mesh holds no vertices, edges or faces
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty() && self.faces.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> (MeshData, [VertexId; 4]) {
        let mut mesh = MeshData::new();
        let ids = [
            mesh.add_vertex(DVec3::new(0.0, 0.0, 0.0)),
            mesh.add_vertex(DVec3::new(1.0, 0.0, 0.0)),
            mesh.add_vertex(DVec3::new(1.0, 1.0, 0.0)),
            mesh.add_vertex(DVec3::new(0.0, 1.0, 0.0)),
        ];
        (mesh, ids)
    }

    #[test]
    fn test_vertex_ids_monotonic() {
        let mut mesh = MeshData::new();
        let a = mesh.add_vertex(DVec3::ZERO);
        let b = mesh.add_vertex(DVec3::ONE);
        assert!(mesh.remove_vertex(b));
        let c = mesh.add_vertex(DVec3::X);

        assert_eq!(a.value(), 0);
        assert_eq!(c.value(), 2);
        assert_eq!(mesh.vertex_count(), 2);
    }

    #[test]
    fn test_edge_ids_not_reused() {
        let (mut mesh, [v0, v1, v2, _]) = quad();
        let first = mesh.add_edge(v0, v1).unwrap();
        let second = mesh.add_edge(v1, v2).unwrap();
        assert!(mesh.remove_edge(second));

        let third = mesh.add_edge(v1, v2).unwrap();
        assert_ne!(third, second);
        assert_ne!(third, first);
        assert_eq!(third.value(), 2);
        assert!(mesh.edge(second).is_none());
    }

    #[test]
    fn test_face_ids_not_reused() {
        let (mut mesh, [v0, v1, v2, v3]) = quad();
        let first = mesh.add_face(&[v0, v1, v2]).unwrap();
        let second = mesh.add_face(&[v0, v2, v3]).unwrap();
        assert!(mesh.remove_face(second));

        let third = mesh.add_face(&[v0, v2, v3]).unwrap();
        assert_ne!(third, second);
        assert_ne!(third, first);
        assert_eq!(third.value(), 2);
        assert!(mesh.face(second).is_none());
        assert_eq!(mesh.face_count(), 2);
    }

    #[test]
    fn test_update_vertex() {
        let (mut mesh, [v0, ..]) = quad();
        assert!(mesh.update_vertex(v0, DVec3::splat(5.0)));
        assert_eq!(mesh.position(v0), Some(DVec3::splat(5.0)));
        assert!(!mesh.update_vertex(VertexId::new(99), DVec3::ZERO));
    }

    #[test]
    fn test_edge_identity_is_order_independent() {
        let (mut mesh, [v0, v1, ..]) = quad();
        let forward = mesh.add_edge(v0, v1);
        let backward = mesh.add_edge(v1, v0);

        assert!(forward.is_some());
        assert_eq!(forward, backward);
        assert_eq!(mesh.edge_count(), 1);
        assert_eq!(mesh.find_edge(v1, v0), forward);
    }

    #[test]
    fn test_add_edge_unknown_vertex() {
        let (mut mesh, [v0, ..]) = quad();
        assert_eq!(mesh.add_edge(v0, VertexId::new(42)), None);
        assert_eq!(mesh.edge_count(), 0);
    }

    #[test]
    fn test_add_face_derives_edges() {
        let (mut mesh, ids) = quad();
        let face = mesh.add_face(&ids).unwrap();

        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.edge_count(), 4);

        let face = mesh.face(face).unwrap();
        assert_eq!(face.vertices(), &ids);
        assert_eq!(face.edges().len(), 4);
        // closing edge joins the last and first vertex
        let closing = mesh.edge(face.edges()[3]).unwrap();
        assert!(closing.connects(ids[0], ids[3]));
    }

    #[test]
    fn test_add_face_shares_edges() {
        let (mut mesh, [v0, v1, v2, v3]) = quad();
        mesh.add_face(&[v0, v1, v2]).unwrap();
        mesh.add_face(&[v0, v2, v3]).unwrap();
        // diagonal v0-v2 is shared
        assert_eq!(mesh.edge_count(), 5);
    }

    #[test]
    fn test_add_face_rejects_short_loop() {
        let (mut mesh, [v0, v1, ..]) = quad();
        assert_eq!(mesh.add_face(&[v0, v1]), None);
        assert_eq!(mesh.add_face(&[]), None);
        assert_eq!(mesh.face_count(), 0);
        assert_eq!(mesh.edge_count(), 0);
    }

    #[test]
    fn test_add_face_rejects_unknown_vertex() {
        let (mut mesh, [v0, v1, ..]) = quad();
        assert_eq!(mesh.add_face(&[v0, v1, VertexId::new(7)]), None);
        assert_eq!(mesh.face_count(), 0);
        assert_eq!(mesh.edge_count(), 0);
    }

    #[test]
    fn test_add_face_accepts_degenerate_loop() {
        let (mut mesh, [v0, v1, ..]) = quad();
        assert!(mesh.add_face(&[v0, v1, v1]).is_some());
    }

    #[test]
    fn test_remove_vertex_cascades() {
        let (mut mesh, [v0, v1, v2, v3]) = quad();
        mesh.add_face(&[v0, v1, v2]).unwrap();
        mesh.add_face(&[v0, v2, v3]).unwrap();
        let untouched = mesh.add_face(&[v1, v2, v3]).unwrap();

        assert!(mesh.remove_vertex(v0));

        assert_eq!(mesh.face_count(), 1);
        assert!(mesh.face(untouched).is_some());
        assert!(mesh.edges().all(|e| !e.touches(v0)));
        assert!(!mesh.remove_vertex(v0));
    }

    #[test]
    fn test_remove_edge_cascades_to_faces() {
        let (mut mesh, [v0, v1, v2, v3]) = quad();
        mesh.add_face(&[v0, v1, v2]).unwrap();
        let other = mesh.add_face(&[v0, v2, v3]).unwrap();
        let edge = mesh.find_edge(v0, v1).unwrap();

        assert!(mesh.remove_edge(edge));

        assert_eq!(mesh.face_count(), 1);
        assert!(mesh.face(other).is_some());
        assert_eq!(mesh.vertex_count(), 4);
        assert!(!mesh.remove_edge(edge));
    }

    #[test]
    fn test_remove_face_keeps_edges() {
        let (mut mesh, ids) = quad();
        let face = mesh.add_face(&ids).unwrap();
        assert!(mesh.remove_face(face));
        assert_eq!(mesh.face_count(), 0);
        assert_eq!(mesh.edge_count(), 4);
        assert!(!mesh.remove_face(face));
    }

    #[test]
    fn test_rebuild_edges() {
        let (mut mesh, [v0, v1, v2, v3]) = quad();
        mesh.add_edge(v1, v3).unwrap();
        let face = mesh.add_face(&[v0, v1, v2]).unwrap();

        mesh.rebuild_edges();

        assert_eq!(mesh.edge_count(), 3);
        let edges = mesh.face(face).unwrap().edges().to_vec();
        assert_eq!(edges, vec![EdgeId::new(0), EdgeId::new(1), EdgeId::new(2)]);
        assert!(mesh.edge(edges[2]).unwrap().connects(v2, v0));
    }

    #[test]
    fn test_generate_geometry_empty() {
        let mut mesh = MeshData::new();
        assert!(mesh.generate_geometry().is_none());
        mesh.add_vertex(DVec3::ZERO);
        assert!(mesh.generate_geometry().is_none());
    }

    #[test]
    fn test_generate_geometry_fan_counts() {
        for n in 3..9usize {
            let mut mesh = MeshData::new();
            let ids: Vec<_> = (0..n)
                .map(|i| {
                    let angle = std::f64::consts::TAU * i as f64 / n as f64;
                    mesh.add_vertex(DVec3::new(angle.cos(), angle.sin(), 0.0))
                })
                .collect();
            mesh.add_face(&ids).unwrap();

            let buffers = mesh.generate_geometry().unwrap();
            assert_eq!(buffers.triangle_count(), n - 2);
            assert_eq!(buffers.positions.len(), 9 * (n - 2));
            assert_eq!(buffers.normals.len(), 9 * (n - 2));
            assert_eq!(buffers.indices.len(), 3 * (n - 2));
            let expected: Vec<u32> = (0..(3 * (n - 2)) as u32).collect();
            assert_eq!(buffers.indices, expected);
        }
    }

    #[test]
    fn test_generate_geometry_winding_sets_normal() {
        let (mut mesh, [v0, v1, v2, v3]) = quad();
        mesh.add_face(&[v0, v1, v2, v3]).unwrap();
        let buffers = mesh.generate_geometry().unwrap();
        for tri in 0..buffers.triangle_count() {
            assert_eq!(buffers.triangle_normal(tri), Some(glam::Vec3::Z));
        }

        let (mut mesh, [v0, v1, v2, v3]) = quad();
        mesh.add_face(&[v3, v2, v1, v0]).unwrap();
        let buffers = mesh.generate_geometry().unwrap();
        assert_eq!(buffers.triangle_normal(0), Some(glam::Vec3::NEG_Z));
    }

    #[test]
    fn test_generate_geometry_fans_from_first_vertex() {
        let (mut mesh, ids) = quad();
        mesh.add_face(&ids).unwrap();
        let buffers = mesh.generate_geometry().unwrap();
        // second triangle starts again at v0
        assert_eq!(&buffers.positions[9..12], &[0.0, 0.0, 0.0]);
        assert_eq!(&buffers.positions[12..15], &[1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_generate_geometry_degenerate_normal_is_zero() {
        let mut mesh = MeshData::new();
        let a = mesh.add_vertex(DVec3::ZERO);
        let b = mesh.add_vertex(DVec3::X);
        let c = mesh.add_vertex(DVec3::X * 2.0);
        mesh.add_face(&[a, b, c]).unwrap();

        let buffers = mesh.generate_geometry().unwrap();
        assert_eq!(buffers.triangle_normal(0), Some(glam::Vec3::ZERO));
    }

    #[test]
    fn test_clear_resets_counters() {
        let (mut mesh, ids) = quad();
        mesh.add_face(&ids).unwrap();
        mesh.clear();

        assert!(mesh.is_empty());
        assert!(!mesh.is_valid());
        assert_eq!(mesh.add_vertex(DVec3::ZERO), VertexId::new(0));
    }

    #[test]
    fn test_is_valid_and_bounds() {
        let (mut mesh, ids) = quad();
        assert!(!mesh.is_valid());
        mesh.add_face(&ids).unwrap();
        assert!(mesh.is_valid());

        let bounds = mesh.bounds();
        assert_eq!(bounds.min, DVec3::ZERO);
        assert_eq!(bounds.max, DVec3::new(1.0, 1.0, 0.0));
    }
}
