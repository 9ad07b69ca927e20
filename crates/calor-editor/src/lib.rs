//! # Calor Editor
//!
//! Scene bookkeeping for the Calor viewport.
//!
//! ## Features
//! - Object manager (arena ownership, factories, duplication)
//! - Selection (object mode and edit-mode element lists)
//! - Collections (nested groups with cascading visibility)
//! - Interaction modes (object/edit)
//! - Viewport and scene settings loaded from JSON
//!
//! [`Editor`] wires these together so that removing an object or changing
//! the selection keeps every manager consistent.

pub mod collection;
pub mod mode;
pub mod objects;
pub mod selection;
pub mod settings;

pub use collection::{Collection, CollectionEvent, CollectionKey, CollectionTree};
pub use mode::{InteractionMode, ModeEvent, ModeManager};
pub use objects::{ManagerEvent, ObjectKey, ObjectManager};
pub use selection::{SelectionEvent, SelectionManager, SelectionMode};
pub use settings::{EditorSettings, ViewportSettings};

use calor_core::{CoreError, EdgeId, FaceId, SceneObject, VertexId};
use glam::DVec3;
use thiserror::Error;
use uuid::Uuid;

/// Editor errors
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Object not found: {0:?}")]
    ObjectNotFound(ObjectKey),

    #[error("Object already managed: {0}")]
    DuplicateObject(Uuid),

    #[error("Collection not found: {0:?}")]
    CollectionNotFound(CollectionKey),

    #[error("Collection {child:?} cannot be nested under its descendant {parent:?}")]
    CollectionCycle {
        parent: CollectionKey,
        child: CollectionKey,
    },

    #[error("Edit mode requires an active object")]
    NoActiveObject,

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for editor operations
pub type EditorResult<T> = Result<T, EditorError>;

/// Editor state
#[derive(Debug)]
pub struct Editor {
    objects: ObjectManager,
    selection: SelectionManager,
    collections: CollectionTree,
    modes: ModeManager,
    settings: EditorSettings,
}

impl Editor {
    pub fn new() -> Self {
        Self::with_settings(EditorSettings::default())
    }

    pub fn with_settings(settings: EditorSettings) -> Self {
        Self {
            objects: ObjectManager::with_config(settings.scene.clone()),
            selection: SelectionManager::new(),
            collections: CollectionTree::new(),
            modes: ModeManager::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Validate and apply new settings
    pub fn apply_settings(&mut self, settings: EditorSettings) -> EditorResult<()> {
        settings.validate()?;
        self.objects.set_config(settings.scene.clone());
        self.settings = settings;
        Ok(())
    }

    pub fn objects(&self) -> &ObjectManager {
        &self.objects
    }

    /// Direct object access for transform and property edits. Use the
    /// editor methods to add, remove or select objects.
    pub fn object_mut(&mut self, key: ObjectKey) -> Option<&mut SceneObject> {
        self.objects.get_mut(key)
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn collections(&self) -> &CollectionTree {
        &self.collections
    }

    pub fn collections_mut(&mut self) -> &mut CollectionTree {
        &mut self.collections
    }

    pub fn modes(&self) -> &ModeManager {
        &self.modes
    }

    // ---- object lifecycle ----

    /// Create a box in the root collection
    pub fn create_box(&mut self, dimensions: DVec3) -> ObjectKey {
        let key = self.objects.create_box(dimensions);
        self.place_in_root(key);
        key
    }

    /// Create a cylinder in the root collection
    pub fn create_cylinder(&mut self, radius: f64, height: f64) -> EditorResult<ObjectKey> {
        let key = self.objects.create_cylinder(radius, height)?;
        self.place_in_root(key);
        Ok(key)
    }

    /// Create a sphere in the root collection
    pub fn create_sphere(&mut self, radius: f64) -> EditorResult<ObjectKey> {
        let key = self.objects.create_sphere(radius)?;
        self.place_in_root(key);
        Ok(key)
    }

    /// Take ownership of an externally built object and put it in the root
    /// collection
    pub fn add_object(&mut self, object: SceneObject) -> EditorResult<ObjectKey> {
        let key = self.objects.add(object)?;
        self.place_in_root(key);
        Ok(key)
    }

    /// Duplicate an object into the same collections as the original
    pub fn duplicate(&mut self, key: ObjectKey) -> EditorResult<ObjectKey> {
        let copy = self.objects.duplicate(key)?;
        let owners = self.collections.collections_of(key);
        if owners.is_empty() {
            self.place_in_root(copy);
        }
        for owner in owners {
            self.collections.add_object(&mut self.objects, owner, copy)?;
        }
        Ok(copy)
    }

    fn place_in_root(&mut self, key: ObjectKey) {
        let root = self.collections.root();
        if let Err(err) = self.collections.add_object(&mut self.objects, root, key) {
            log::warn!("Failed to add object to root collection: {}", err);
        }
    }

    /// Remove an object from the scene, clearing every reference to it, and
    /// hand it back deselected
    pub fn remove_object(&mut self, key: ObjectKey) -> EditorResult<SceneObject> {
        let object = self.objects.remove(key)?;
        self.selection.forget(key);
        self.collections.forget_object(key);
        self.sync_active_object();
        Ok(object)
    }

    // ---- selection ----

    /// Select an object, replacing the selection unless `additive`
    pub fn select(&mut self, key: ObjectKey, additive: bool) -> bool {
        let changed = self.selection.select_object(&mut self.objects, key, additive);
        self.sync_active_object();
        changed
    }

    pub fn deselect(&mut self, key: ObjectKey) -> bool {
        let changed = self.selection.deselect_object(&mut self.objects, key);
        self.sync_active_object();
        changed
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear_selection(&mut self.objects);
        self.sync_active_object();
    }

    /// Resolve a viewport pick.
    ///
    /// `None` means empty space was clicked, which clears the selection
    /// unless `additive`. Hidden and unknown objects cannot be picked.
    pub fn handle_pick(&mut self, picked: Option<Uuid>, additive: bool) -> Option<ObjectKey> {
        let Some(uuid) = picked else {
            if !additive {
                self.clear_selection();
            }
            return None;
        };

        let Some(key) = self.objects.find_by_uuid(uuid) else {
            log::warn!("Pick resolved to unknown object {}", uuid);
            return None;
        };
        if !self.objects.get(key).is_some_and(SceneObject::is_visible) {
            log::debug!("Ignoring pick on hidden object {}", uuid);
            return None;
        }

        self.select(key, additive);
        Some(key)
    }

    /// Switch between object, vertex, edge and face picking
    pub fn set_selection_mode(&mut self, mode: SelectionMode) {
        self.selection.set_mode(mode);
    }

    pub fn select_vertex(&mut self, id: VertexId, additive: bool) {
        self.selection.select_vertex(id, additive);
    }

    pub fn select_edge(&mut self, id: EdgeId, additive: bool) {
        self.selection.select_edge(id, additive);
    }

    pub fn select_face(&mut self, id: FaceId, additive: bool) {
        self.selection.select_face(id, additive);
    }

    /// Drop every selected vertex, edge and face
    pub fn clear_element_selection(&mut self) {
        self.selection.clear_vertex_selection();
        self.selection.clear_edge_selection();
        self.selection.clear_face_selection();
    }

    fn sync_active_object(&mut self) {
        self.modes.set_active_object(self.selection.active_object());
    }

    // ---- modes and visibility ----

    pub fn set_mode(&mut self, mode: InteractionMode) -> EditorResult<()> {
        self.modes.set_mode(mode)
    }

    pub fn toggle_edit_mode(&mut self) -> EditorResult<InteractionMode> {
        self.modes.toggle()
    }

    /// Show or hide a collection and everything below it
    pub fn set_collection_visible(
        &mut self,
        key: CollectionKey,
        visible: bool,
    ) -> EditorResult<()> {
        self.collections.set_visible(&mut self.objects, key, visible)
    }

    /// Create a collection, under the root if `parent` is `None`
    pub fn create_collection(
        &mut self,
        name: impl Into<String>,
        parent: Option<CollectionKey>,
    ) -> EditorResult<CollectionKey> {
        self.collections.create(name, parent)
    }

    /// Move an object out of every collection and into `collection`.
    ///
    /// The object keeps its own visibility; a hidden target collection
    /// hides it.
    pub fn move_to_collection(
        &mut self,
        key: ObjectKey,
        collection: CollectionKey,
    ) -> EditorResult<()> {
        if self.collections.get(collection).is_none() {
            return Err(EditorError::CollectionNotFound(collection));
        }
        if !self.objects.contains(key) {
            return Err(EditorError::ObjectNotFound(key));
        }
        self.collections.forget_object(key);
        self.collections.add_object(&mut self.objects, collection, key)
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}
