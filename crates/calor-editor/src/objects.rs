//! Object Manager
//!
//! Sole owner of every scene object. Objects live in a generational arena
//! so collections and the selection can hold plain keys that never dangle:
//! a removed object's key simply stops resolving.

use ahash::AHashMap;
use calor_core::{Listeners, PrimitiveKind, SceneConfig, SceneObject, SubscriptionId};
use glam::DVec3;
use slotmap::SlotMap;
use uuid::Uuid;

use crate::{EditorError, EditorResult};

slotmap::new_key_type! {
    /// Arena key of a managed scene object
    pub struct ObjectKey;
}

/// Notification raised by the object manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerEvent {
    ObjectAdded(ObjectKey),
    ObjectRemoved(ObjectKey),
}

/// Arena of scene objects in creation order
#[derive(Debug, Default)]
pub struct ObjectManager {
    objects: SlotMap<ObjectKey, SceneObject>,
    order: Vec<ObjectKey>,
    by_uuid: AHashMap<Uuid, ObjectKey>,
    config: SceneConfig,
    listeners: Listeners<ManagerEvent>,
}

impl ObjectManager {
    /// Create an empty manager with default scene settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty manager with the given scene settings
    pub fn with_config(config: SceneConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SceneConfig) {
        self.config = config;
    }

    /// Take ownership of an object.
    ///
    /// Fails if an object with the same UUID is already managed.
    pub fn add(&mut self, object: SceneObject) -> EditorResult<ObjectKey> {
        if self.by_uuid.contains_key(&object.id()) {
            log::warn!("Object already managed: {} ({})", object.name(), object.id());
            return Err(EditorError::DuplicateObject(object.id()));
        }
        Ok(self.insert(object))
    }

    fn insert(&mut self, object: SceneObject) -> ObjectKey {
        let uuid = object.id();
        log::debug!("Adding object {} ({})", object.name(), uuid);

        let key = self.objects.insert(object);
        self.order.push(key);
        self.by_uuid.insert(uuid, key);
        self.listeners.emit(&ManagerEvent::ObjectAdded(key));
        key
    }

    /// Stop managing an object and hand it back to the caller.
    ///
    /// The returned object is always deselected.
    pub fn remove(&mut self, key: ObjectKey) -> EditorResult<SceneObject> {
        let mut object = self
            .objects
            .remove(key)
            .ok_or(EditorError::ObjectNotFound(key))?;
        object.set_selected(false);

        self.order.retain(|k| *k != key);
        self.by_uuid.remove(&object.id());
        log::debug!("Removed object {} ({})", object.name(), object.id());
        self.listeners.emit(&ManagerEvent::ObjectRemoved(key));
        Ok(object)
    }

    pub fn get(&self, key: ObjectKey) -> Option<&SceneObject> {
        self.objects.get(key)
    }

    pub fn get_mut(&mut self, key: ObjectKey) -> Option<&mut SceneObject> {
        self.objects.get_mut(key)
    }

    pub fn contains(&self, key: ObjectKey) -> bool {
        self.objects.contains_key(key)
    }

    /// Resolve an object's stable identifier to its key
    pub fn find_by_uuid(&self, uuid: Uuid) -> Option<ObjectKey> {
        self.by_uuid.get(&uuid).copied()
    }

    /// First object, in creation order, with the given name
    pub fn find_by_name(&self, name: &str) -> Option<ObjectKey> {
        self.iter()
            .find(|(_, object)| object.name() == name)
            .map(|(key, _)| key)
    }

    /// Keys in creation order
    pub fn keys(&self) -> impl Iterator<Item = ObjectKey> + '_ {
        self.order.iter().copied()
    }

    /// Objects in creation order
    pub fn iter(&self) -> impl Iterator<Item = (ObjectKey, &SceneObject)> {
        self.order
            .iter()
            .filter_map(|key| self.objects.get(*key).map(|object| (*key, object)))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    // ---- factories ----

    /// Create a box of the given size
    pub fn create_box(&mut self, dimensions: DVec3) -> ObjectKey {
        self.insert(SceneObject::new_primitive(PrimitiveKind::Box, dimensions))
    }

    /// Create a box at the configured default size
    pub fn create_default_box(&mut self) -> ObjectKey {
        self.create_box(self.config.default_dimensions)
    }

    /// Create a Y-up cylinder at the configured resolution
    pub fn create_cylinder(&mut self, radius: f64, height: f64) -> EditorResult<ObjectKey> {
        let kind = self.config.cylinder_kind()?;
        let dimensions = DVec3::new(radius * 2.0, height, radius * 2.0);
        Ok(self.insert(SceneObject::new_primitive(kind, dimensions)))
    }

    /// Create a sphere at the configured resolution
    pub fn create_sphere(&mut self, radius: f64) -> EditorResult<ObjectKey> {
        let kind = self.config.sphere_kind()?;
        Ok(self.insert(SceneObject::new_primitive(kind, DVec3::splat(radius * 2.0))))
    }

    /// Copy an object's geometry, rotation and scale into a new object
    /// placed next to it.
    pub fn duplicate(&mut self, key: ObjectKey) -> EditorResult<ObjectKey> {
        let source = self.get(key).ok_or(EditorError::ObjectNotFound(key))?;

        let mut copy = SceneObject::new(source.kind(), source.dimensions());
        copy.set_name(format!("{}_copy", source.name()));
        copy.set_location(source.location() + self.config.duplicate_offset);
        copy.set_rotation_quat(source.rotation_quat());
        copy.set_scale(source.scale());
        copy.set_material_id(source.material_id());
        *copy.mesh_mut() = source.mesh().clone();
        copy.attach_renderer();
        copy.take_changes();

        Ok(self.insert(copy))
    }

    // ---- notifications ----

    pub fn subscribe(&mut self, callback: impl FnMut(&ManagerEvent) + 'static) -> SubscriptionId {
        self.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }
}
