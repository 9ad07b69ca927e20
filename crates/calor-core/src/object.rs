//! Scene Objects
//!
//! A scene object owns exactly one [`MeshData`] and binds it to:
//! - A world transform (location, rotation, scale)
//! - A logical size (`dimensions`) that drives primitive generation
//! - Metadata: name, UUID, visibility, lock, material and selection state
//! - A render binding that receives triangulated buffers
//!
//! All transform and dimension mutators are gated by the lock flag. Every
//! effective change is reported to subscribers and accumulated in
//! [`ChangeFlags`] for polling render loops.

use std::sync::atomic::{AtomicU32, Ordering};

use glam::{DMat4, DQuat, DVec3};
use uuid::Uuid;

use crate::buffers::RenderBuffers;
use crate::events::{ChangeFlags, Listeners, ObjectEvent, SubscriptionId};
use crate::math::{Aabb, euler_degrees_from_quat, quat_from_euler_degrees};
use crate::mesh::MeshData;
use crate::primitive::{self, PrimitiveKind};

/// Process-wide counter behind the `Object_N` default names
static OBJECT_COUNTER: AtomicU32 = AtomicU32::new(0);

/// World transform of an object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// World position
    pub location: DVec3,
    /// World rotation
    pub rotation: DQuat,
    /// Multiplicative scale on top of the generated mesh
    pub scale: DVec3,
}

impl Transform {
    /// Identity transform
    pub const IDENTITY: Self = Self {
        location: DVec3::ZERO,
        rotation: DQuat::IDENTITY,
        scale: DVec3::ONE,
    };

    /// Create a new transform with the given location
    pub fn from_location(location: DVec3) -> Self {
        Self {
            location,
            ..Self::IDENTITY
        }
    }

    /// Scale, then rotate, then translate
    pub fn matrix(&self) -> DMat4 {
        DMat4::from_scale_rotation_translation(self.scale, self.rotation, self.location)
    }

    /// Rotation as Euler angles in degrees
    pub fn euler_degrees(&self) -> DVec3 {
        euler_degrees_from_quat(self.rotation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Diffuse/ambient color pair used to draw an object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
    pub diffuse: [u8; 3],
    pub ambient: [u8; 3],
}

impl Highlight {
    /// Unselected blue
    pub const DEFAULT: Self = Self {
        diffuse: [120, 150, 220],
        ambient: [60, 75, 110],
    };

    /// Selected orange
    pub const SELECTED: Self = Self {
        diffuse: [255, 140, 0],
        ambient: [127, 70, 0],
    };
}

/// Last buffers pushed toward the rendering engine.
///
/// The revision increases on every upload so a renderer can tell whether it
/// has already consumed the current buffers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryBinding {
    buffers: Option<RenderBuffers>,
    revision: u64,
}

impl GeometryBinding {
    /// Most recently uploaded buffers
    pub fn buffers(&self) -> Option<&RenderBuffers> {
        self.buffers.as_ref()
    }

    /// Number of uploads so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn upload(&mut self, buffers: RenderBuffers) -> u64 {
        self.buffers = Some(buffers);
        self.revision += 1;
        self.revision
    }
}

/// Mesh-bearing object placed in the scene
#[derive(Debug)]
pub struct SceneObject {
    id: Uuid,
    name: String,
    kind: PrimitiveKind,
    dimensions: DVec3,
    transform: Transform,
    mesh: MeshData,
    visible: bool,
    locked: bool,
    selected: bool,
    material_id: Option<u32>,
    highlight: Highlight,
    binding: Option<GeometryBinding>,
    changes: ChangeFlags,
    listeners: Listeners<ObjectEvent>,
}

impl SceneObject {
    /// Create an object named `Object_N` with its mesh generated but no
    /// render binding attached.
    pub fn new(kind: PrimitiveKind, dimensions: DVec3) -> Self {
        let number = OBJECT_COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
        let mut object = Self {
            id: Uuid::new_v4(),
            name: format!("Object_{number}"),
            kind,
            dimensions,
            transform: Transform::IDENTITY,
            mesh: MeshData::new(),
            visible: true,
            locked: false,
            selected: false,
            material_id: None,
            highlight: Highlight::DEFAULT,
            binding: None,
            changes: ChangeFlags::empty(),
            listeners: Listeners::new(),
        };
        object.generate_mesh();
        log::debug!("SceneObject created: {} UUID: {}", object.name, object.id);
        object
    }

    /// Create a ready-to-draw primitive named after its kind
    pub fn new_primitive(kind: PrimitiveKind, dimensions: DVec3) -> Self {
        let mut object = Self::new(kind, dimensions);
        object.name = kind.label().to_string();
        object.attach_renderer();
        object
    }

    /// Create a ready-to-draw box of the given width, height and depth
    pub fn new_box(width: f64, height: f64, depth: f64) -> Self {
        Self::new_primitive(PrimitiveKind::Box, DVec3::new(width, height, depth))
    }

    // ---- identity and metadata ----

    /// Stable identifier assigned at creation
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn material_id(&self) -> Option<u32> {
        self.material_id
    }

    /// Colors the renderer should use for this object
    pub fn highlight(&self) -> Highlight {
        self.highlight
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.name != name {
            self.name = name;
            self.emit(ObjectEvent::PropertiesChanged);
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.emit(ObjectEvent::PropertiesChanged);
        }
    }

    pub fn set_locked(&mut self, locked: bool) {
        if self.locked != locked {
            self.locked = locked;
            self.emit(ObjectEvent::PropertiesChanged);
        }
    }

    pub fn set_material_id(&mut self, material_id: Option<u32>) {
        if self.material_id != material_id {
            self.material_id = material_id;
            self.emit(ObjectEvent::PropertiesChanged);
        }
    }

    /// Toggle the selection highlight.
    ///
    /// Selection is owned by the selection manager; other callers should go
    /// through it so its list stays in sync.
    pub fn set_selected(&mut self, selected: bool) {
        if self.selected != selected {
            self.selected = selected;
            self.highlight = if selected {
                Highlight::SELECTED
            } else {
                Highlight::DEFAULT
            };
            self.emit(ObjectEvent::SelectionChanged(selected));
        }
    }

    // ---- transform ----

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn location(&self) -> DVec3 {
        self.transform.location
    }

    /// Rotation as Euler angles in degrees (X, Y, Z)
    pub fn rotation(&self) -> DVec3 {
        self.transform.euler_degrees()
    }

    pub fn rotation_quat(&self) -> DQuat {
        self.transform.rotation
    }

    pub fn scale(&self) -> DVec3 {
        self.transform.scale
    }

    /// Logical size the mesh was generated for
    pub fn dimensions(&self) -> DVec3 {
        self.dimensions
    }

    /// Object-to-world matrix
    pub fn transform_matrix(&self) -> DMat4 {
        self.transform.matrix()
    }

    /// World-space bounds of the mesh
    pub fn world_bounds(&self) -> Aabb {
        self.mesh.bounds().transform(self.transform_matrix())
    }

    /// Move the object. Rejected while locked.
    pub fn set_location(&mut self, location: DVec3) -> bool {
        if !self.ensure_unlocked() {
            return false;
        }
        self.transform.location = location;
        self.emit(ObjectEvent::TransformChanged);
        true
    }

    /// Rotate the object to Euler angles in degrees, applied X, Y, then Z.
    /// Rejected while locked.
    pub fn set_rotation(&mut self, degrees: DVec3) -> bool {
        self.set_rotation_quat(quat_from_euler_degrees(degrees))
    }

    /// Rotate the object to an exact quaternion. Rejected while locked.
    pub fn set_rotation_quat(&mut self, rotation: DQuat) -> bool {
        if !self.ensure_unlocked() {
            return false;
        }
        self.transform.rotation = rotation;
        self.emit(ObjectEvent::TransformChanged);
        true
    }

    /// Rescale the object. Rejected while locked.
    pub fn set_scale(&mut self, scale: DVec3) -> bool {
        if !self.ensure_unlocked() {
            return false;
        }
        self.transform.scale = scale;
        self.emit(ObjectEvent::TransformChanged);
        true
    }

    /// Resize the object, regenerating its mesh and render buffers.
    /// Rejected while locked.
    pub fn set_dimensions(&mut self, dimensions: DVec3) -> bool {
        if !self.ensure_unlocked() {
            return false;
        }
        self.dimensions = dimensions;
        self.generate_mesh();
        self.update_geometry();
        self.emit(ObjectEvent::TransformChanged);
        true
    }

    fn ensure_unlocked(&self) -> bool {
        if self.locked {
            log::warn!("Cannot modify locked object: {}", self.name);
        }
        !self.locked
    }

    // ---- geometry ----

    pub fn mesh(&self) -> &MeshData {
        &self.mesh
    }

    /// Direct mesh access for element editing; call
    /// [`update_geometry`](Self::update_geometry) afterwards to redraw.
    pub fn mesh_mut(&mut self) -> &mut MeshData {
        &mut self.mesh
    }

    /// Rebuild the mesh from the primitive kind and current dimensions
    pub fn generate_mesh(&mut self) {
        primitive::build_into(&self.kind, self.dimensions, &mut self.mesh);
    }

    /// Push freshly triangulated buffers into the render binding.
    ///
    /// Returns false, with a warning, if no renderer is attached or the
    /// mesh produces no geometry.
    pub fn update_geometry(&mut self) -> bool {
        let Some(binding) = self.binding.as_mut() else {
            log::warn!("Cannot update geometry for {}: no renderer attached", self.name);
            return false;
        };
        let Some(buffers) = self.mesh.generate_geometry() else {
            return false;
        };

        let revision = binding.upload(buffers);
        log::debug!("Geometry updated for {} (revision {})", self.name, revision);
        self.emit(ObjectEvent::GeometryUpdated { revision });
        true
    }

    /// Attach a render binding and upload the current mesh into it
    pub fn attach_renderer(&mut self) {
        if self.binding.is_none() {
            self.binding = Some(GeometryBinding::default());
        }
        self.update_geometry();
    }

    /// Detach the render binding, returning its last state
    pub fn detach_renderer(&mut self) -> Option<GeometryBinding> {
        self.binding.take()
    }

    /// Current render binding, if attached
    pub fn geometry(&self) -> Option<&GeometryBinding> {
        self.binding.as_ref()
    }

    // ---- notifications ----

    /// Register a change callback
    pub fn subscribe(&mut self, callback: impl FnMut(&ObjectEvent) + 'static) -> SubscriptionId {
        self.listeners.subscribe(callback)
    }

    /// Remove a change callback
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Changes accumulated since the last [`take_changes`](Self::take_changes)
    pub fn pending_changes(&self) -> ChangeFlags {
        self.changes
    }

    /// Return and reset the accumulated changes
    pub fn take_changes(&mut self) -> ChangeFlags {
        std::mem::take(&mut self.changes)
    }

    fn emit(&mut self, event: ObjectEvent) {
        self.changes |= event.flag();
        self.listeners.emit(&event);
    }
}
