//! Math utilities
//!
//! Re-exports from glam and the double-precision helpers used by the mesh
//! and object model.

pub use glam::{DMat4, DQuat, DVec3};

use glam::EulerRot;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: DVec3,
    /// Maximum corner
    pub max: DVec3,
}

impl Aabb {
    /// An inverted box that any point expands into
    pub const EMPTY: Self = Self {
        min: DVec3::splat(f64::INFINITY),
        max: DVec3::splat(f64::NEG_INFINITY),
    };

    /// Create an AABB from min and max corners
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB from center and half-extents
    pub fn from_center_half_extents(center: DVec3, half_extents: DVec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Smallest box containing every point, `EMPTY` for no points
    pub fn from_points(points: impl IntoIterator<Item = DVec3>) -> Self {
        let mut aabb = Self::EMPTY;
        for point in points {
            aabb.expand_to_include(point);
        }
        aabb
    }

    /// Get the center of the AABB
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the full size of the AABB
    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    /// Check if the AABB is empty
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Check if a point is inside the AABB
    pub fn contains_point(&self, point: DVec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Expand the AABB to include a point
    pub fn expand_to_include(&mut self, point: DVec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Transform the AABB by a matrix
    pub fn transform(&self, matrix: DMat4) -> Aabb {
        if self.is_empty() {
            return *self;
        }

        let corners = [
            DVec3::new(self.min.x, self.min.y, self.min.z),
            DVec3::new(self.max.x, self.min.y, self.min.z),
            DVec3::new(self.min.x, self.max.y, self.min.z),
            DVec3::new(self.max.x, self.max.y, self.min.z),
            DVec3::new(self.min.x, self.min.y, self.max.z),
            DVec3::new(self.max.x, self.min.y, self.max.z),
            DVec3::new(self.min.x, self.max.y, self.max.z),
            DVec3::new(self.max.x, self.max.y, self.max.z),
        ];

        Self::from_points(corners.into_iter().map(|c| matrix.transform_point3(c)))
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Build a rotation from Euler angles in degrees.
///
/// The angles are applied X first, then Y, then Z, so the stored quaternion
/// is `Rz * Ry * Rx`.
pub fn quat_from_euler_degrees(degrees: DVec3) -> DQuat {
    DQuat::from_euler(
        EulerRot::ZYX,
        degrees.z.to_radians(),
        degrees.y.to_radians(),
        degrees.x.to_radians(),
    )
}

/// Decompose a rotation into Euler angles in degrees (X, Y, Z).
///
/// Inverse of [`quat_from_euler_degrees`] away from gimbal lock. At a Y
/// rotation of ±90° the X and Z angles share one degree of freedom and the
/// split returned here is not normalized.
pub fn euler_degrees_from_quat(q: DQuat) -> DVec3 {
    let (z, y, x) = q.to_euler(EulerRot::ZYX);
    DVec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_creation() {
        let aabb = Aabb::new(DVec3::ZERO, DVec3::ONE);
        assert_eq!(aabb.center(), DVec3::splat(0.5));
        assert_eq!(aabb.size(), DVec3::ONE);
    }

    #[test]
    fn test_aabb_from_points() {
        let aabb = Aabb::from_points([DVec3::new(-1.0, 2.0, 0.0), DVec3::new(3.0, -4.0, 1.0)]);
        assert_eq!(aabb.min, DVec3::new(-1.0, -4.0, 0.0));
        assert_eq!(aabb.max, DVec3::new(3.0, 2.0, 1.0));
        assert!(aabb.contains_point(DVec3::ZERO));
        assert!(!aabb.contains_point(DVec3::splat(5.0)));

        assert!(Aabb::from_points(std::iter::empty()).is_empty());
    }

    #[test]
    fn test_aabb_transform() {
        let aabb = Aabb::from_center_half_extents(DVec3::ZERO, DVec3::splat(0.5));
        let moved = aabb.transform(DMat4::from_translation(DVec3::new(10.0, 0.0, 0.0)));
        assert!((moved.center() - DVec3::new(10.0, 0.0, 0.0)).length() < 1e-9);

        assert!(Aabb::EMPTY.transform(DMat4::IDENTITY).is_empty());
    }

    #[test]
    fn test_euler_round_trip() {
        let input = DVec3::new(30.0, 20.0, 10.0);
        let output = euler_degrees_from_quat(quat_from_euler_degrees(input));
        assert!((output - input).length() < 1e-9);
    }

    #[test]
    fn test_euler_composition_order() {
        // +X rotated 90° about Z lands on +Y
        let q = quat_from_euler_degrees(DVec3::new(0.0, 0.0, 90.0));
        assert!((q * DVec3::X - DVec3::Y).length() < 1e-9);

        let q = quat_from_euler_degrees(DVec3::new(90.0, 0.0, 90.0));
        let manual =
            DQuat::from_rotation_z(90f64.to_radians()) * DQuat::from_rotation_x(90f64.to_radians());
        assert!(q.abs_diff_eq(manual, 1e-12));
    }

    #[test]
    fn test_euler_round_trip_exact_angles() {
        for input in [
            DVec3::new(15.0, -30.0, 60.0),
            DVec3::new(-120.0, 45.0, 170.0),
            DVec3::new(0.0, -89.0, -45.0),
        ] {
            let output = euler_degrees_from_quat(quat_from_euler_degrees(input));
            assert!((output - input).abs().max_element() < 1e-9, "{input} -> {output}");
        }
    }

    #[test]
    fn test_euler_gimbal_lock_pitch() {
        let output = euler_degrees_from_quat(quat_from_euler_degrees(DVec3::new(10.0, 90.0, 0.0)));
        assert!((output.y - 90.0).abs() < 1e-4);
    }
}
