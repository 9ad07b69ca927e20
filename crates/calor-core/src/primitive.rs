//! Primitive Generators
//!
//! Parametric shapes fitted inside an axis-aligned `dimensions` box centered
//! at the origin. Each generator fully rebuilds the target mesh; there is no
//! incremental update on resize.

use std::f64::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::mesh::{MeshData, VertexId};
use crate::{CoreError, CoreResult};

/// Default circumference resolution for round primitives
pub const DEFAULT_SEGMENTS: u32 = 32;
/// Default latitude resolution for spheres
pub const DEFAULT_RINGS: u32 = 16;

/// Kind of generated shape and its resolution parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PrimitiveKind {
    /// Axis-aligned box, 8 vertices and 6 quads
    Box,
    /// Cylinder along +Y with an elliptical cross-section
    Cylinder { segments: u32 },
    /// UV ellipsoid with poles on the Y axis
    Sphere { segments: u32, rings: u32 },
}

impl PrimitiveKind {
    /// Cylinder with the given number of sides (at least 3)
    pub fn cylinder(segments: u32) -> CoreResult<Self> {
        if segments < 3 {
            return Err(CoreError::InvalidResolution {
                parameter: "segments",
                value: segments,
                min: 3,
            });
        }
        Ok(Self::Cylinder { segments })
    }

    /// Sphere with the given longitude (at least 3) and latitude (at least 2) counts
    pub fn sphere(segments: u32, rings: u32) -> CoreResult<Self> {
        if segments < 3 {
            return Err(CoreError::InvalidResolution {
                parameter: "segments",
                value: segments,
                min: 3,
            });
        }
        if rings < 2 {
            return Err(CoreError::InvalidResolution {
                parameter: "rings",
                value: rings,
                min: 2,
            });
        }
        Ok(Self::Sphere { segments, rings })
    }

    /// Display name used for newly created objects
    pub fn label(&self) -> &'static str {
        match self {
            Self::Box => "Box",
            Self::Cylinder { .. } => "Cylinder",
            Self::Sphere { .. } => "Sphere",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Box => write!(f, "box"),
            Self::Cylinder { segments } => write!(f, "cylinder({segments})"),
            Self::Sphere { segments, rings } => write!(f, "sphere({segments}x{rings})"),
        }
    }
}

impl FromStr for PrimitiveKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "box" | "cube" => Ok(Self::Box),
            "cylinder" => Self::cylinder(DEFAULT_SEGMENTS),
            "sphere" => Self::sphere(DEFAULT_SEGMENTS, DEFAULT_RINGS),
            _ => Err(CoreError::UnknownPrimitive(s.to_string())),
        }
    }
}

/// Generate a fresh mesh for `kind` sized to `dimensions`
pub fn generate(kind: &PrimitiveKind, dimensions: DVec3) -> MeshData {
    let mut mesh = MeshData::new();
    build_into(kind, dimensions, &mut mesh);
    mesh
}

/// Clear `mesh` and rebuild it for `kind` sized to `dimensions`
pub fn build_into(kind: &PrimitiveKind, dimensions: DVec3, mesh: &mut MeshData) {
    mesh.clear();
    let half = dimensions * 0.5;

    match *kind {
        PrimitiveKind::Box => build_box(half, mesh),
        PrimitiveKind::Cylinder { segments } => build_cylinder(half, segments.max(3), mesh),
        PrimitiveKind::Sphere { segments, rings } => {
            build_sphere(half, segments.max(3), rings.max(2), mesh)
        }
    }

    log::debug!(
        "{} mesh generated: {} vertices, {} faces",
        kind,
        mesh.vertex_count(),
        mesh.face_count()
    );
}

fn push_face(mesh: &mut MeshData, loop_vertices: &[VertexId]) {
    if mesh.add_face(loop_vertices).is_none() {
        log::warn!("Primitive generator produced a rejected face");
    }
}

fn build_box(half: DVec3, mesh: &mut MeshData) {
    let DVec3 { x: w, y: h, z: d } = half;

    let v0 = mesh.add_vertex(DVec3::new(-w, -h, -d)); // bottom-back-left
    let v1 = mesh.add_vertex(DVec3::new(w, -h, -d)); // bottom-back-right
    let v2 = mesh.add_vertex(DVec3::new(w, -h, d)); // bottom-front-right
    let v3 = mesh.add_vertex(DVec3::new(-w, -h, d)); // bottom-front-left
    let v4 = mesh.add_vertex(DVec3::new(-w, h, -d)); // top-back-left
    let v5 = mesh.add_vertex(DVec3::new(w, h, -d)); // top-back-right
    let v6 = mesh.add_vertex(DVec3::new(w, h, d)); // top-front-right
    let v7 = mesh.add_vertex(DVec3::new(-w, h, d)); // top-front-left

    push_face(mesh, &[v0, v1, v2, v3]); // -Y
    push_face(mesh, &[v4, v7, v6, v5]); // +Y
    push_face(mesh, &[v3, v2, v6, v7]); // +Z
    push_face(mesh, &[v1, v0, v4, v5]); // -Z
    push_face(mesh, &[v0, v3, v7, v4]); // -X
    push_face(mesh, &[v2, v1, v5, v6]); // +X
}

fn build_cylinder(half: DVec3, segments: u32, mesh: &mut MeshData) {
    let ring = |mesh: &mut MeshData, y: f64| -> Vec<VertexId> {
        (0..segments)
            .map(|j| {
                let theta = TAU * j as f64 / segments as f64;
                mesh.add_vertex(DVec3::new(half.x * theta.cos(), y, half.z * theta.sin()))
            })
            .collect()
    };

    let bottom = ring(mesh, -half.y);
    let top = ring(mesh, half.y);

    // theta grows from +X toward +Z, which is clockwise seen from +Y
    let bottom_cap: Vec<VertexId> = bottom.clone();
    let top_cap: Vec<VertexId> = top.iter().rev().copied().collect();
    push_face(mesh, &bottom_cap);
    push_face(mesh, &top_cap);

    let n = segments as usize;
    for j in 0..n {
        let k = (j + 1) % n;
        push_face(mesh, &[bottom[j], top[j], top[k], bottom[k]]);
    }
}

fn build_sphere(half: DVec3, segments: u32, rings: u32, mesh: &mut MeshData) {
    let south = mesh.add_vertex(DVec3::new(0.0, -half.y, 0.0));

    // latitude rings from south to north, excluding the poles
    let latitudes: Vec<Vec<VertexId>> = (1..rings)
        .map(|i| {
            let phi = PI * i as f64 / rings as f64;
            let (y, r) = (-phi.cos(), phi.sin());
            (0..segments)
                .map(|j| {
                    let theta = TAU * j as f64 / segments as f64;
                    mesh.add_vertex(DVec3::new(
                        half.x * r * theta.cos(),
                        half.y * y,
                        half.z * r * theta.sin(),
                    ))
                })
                .collect()
        })
        .collect();

    let north = mesh.add_vertex(DVec3::new(0.0, half.y, 0.0));

    let n = segments as usize;
    if let Some(first) = latitudes.first() {
        for j in 0..n {
            let k = (j + 1) % n;
            push_face(mesh, &[south, first[j], first[k]]);
        }
    }

    for band in latitudes.windows(2) {
        let (lower, upper) = (&band[0], &band[1]);
        for j in 0..n {
            let k = (j + 1) % n;
            push_face(mesh, &[lower[j], upper[j], upper[k], lower[k]]);
        }
    }

    if let Some(last) = latitudes.last() {
        for j in 0..n {
            let k = (j + 1) % n;
            push_face(mesh, &[north, last[k], last[j]]);
        }
    }
}
