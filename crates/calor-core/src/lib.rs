//! # Calor Core
//!
//! Geometry and object model for the Calor 3D viewport.
//!
//! This crate provides the pieces that do not depend on any UI toolkit or
//! rendering engine:
//! - **Mesh**: Vertex/edge/face container with derived edges and cascading removal
//! - **Buffers**: Fan-triangulated, flat-shaded render buffers
//! - **Primitives**: Box, cylinder and sphere generators behind one tagged enum
//! - **Objects**: Scene objects binding a mesh to a transform, metadata and change events

pub mod buffers;
pub mod events;
pub mod math;
pub mod mesh;
pub mod object;
pub mod primitive;

pub use buffers::RenderBuffers;
pub use events::{ChangeFlags, Listeners, ObjectEvent, SubscriptionId};
pub use math::Aabb;
pub use mesh::{Edge, EdgeId, Face, FaceId, MeshData, Vertex, VertexId};
pub use object::{GeometryBinding, Highlight, SceneObject, Transform};
pub use primitive::PrimitiveKind;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unknown primitive: {0}")]
    UnknownPrimitive(String),

    #[error("Invalid resolution: {parameter} = {value}, expected at least {min}")]
    InvalidResolution {
        parameter: &'static str,
        value: u32,
        min: u32,
    },
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Defaults used when the scene creates or copies objects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Size of a newly created box
    pub default_dimensions: DVec3,
    /// Sides of generated cylinders
    pub cylinder_segments: u32,
    /// Longitude divisions of generated spheres
    pub sphere_segments: u32,
    /// Latitude divisions of generated spheres
    pub sphere_rings: u32,
    /// Offset from the original applied to a duplicated object
    pub duplicate_offset: DVec3,
}

impl SceneConfig {
    /// Cylinder kind at the configured resolution
    pub fn cylinder_kind(&self) -> CoreResult<PrimitiveKind> {
        PrimitiveKind::cylinder(self.cylinder_segments)
    }

    /// Sphere kind at the configured resolution
    pub fn sphere_kind(&self) -> CoreResult<PrimitiveKind> {
        PrimitiveKind::sphere(self.sphere_segments, self.sphere_rings)
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            default_dimensions: DVec3::ONE,
            cylinder_segments: primitive::DEFAULT_SEGMENTS,
            sphere_segments: primitive::DEFAULT_SEGMENTS,
            sphere_rings: primitive::DEFAULT_RINGS,
            duplicate_offset: DVec3::X,
        }
    }
}
