//! Selection
//!
//! Tracks which objects are selected in object mode and which mesh
//! elements are selected in the edit-mode sub-modes. The selection holds
//! keys only; the highlight state lives on the objects and is kept in sync
//! through the [`ObjectManager`] passed to each call.

use calor_core::{EdgeId, FaceId, Listeners, SubscriptionId, VertexId};
use serde::{Deserialize, Serialize};

use crate::objects::{ObjectKey, ObjectManager};

/// What a click in the viewport selects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SelectionMode {
    #[default]
    Object,
    Vertex,
    Edge,
    Face,
}

/// Notification raised by the selection manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEvent {
    Changed,
    ModeChanged(SelectionMode),
}

/// Object and element selection state
#[derive(Debug, Default)]
pub struct SelectionManager {
    mode: SelectionMode,
    objects: Vec<ObjectKey>,
    vertices: Vec<VertexId>,
    edges: Vec<EdgeId>,
    faces: Vec<FaceId>,
    listeners: Listeners<SelectionEvent>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: SelectionMode) {
        if self.mode != mode {
            self.mode = mode;
            log::debug!("Selection mode: {:?}", mode);
            self.listeners.emit(&SelectionEvent::ModeChanged(mode));
        }
    }

    // ---- object mode ----

    /// Select an object.
    ///
    /// Without `additive` every other object is deselected first. Returns
    /// true if the selection changed.
    pub fn select_object(
        &mut self,
        objects: &mut ObjectManager,
        key: ObjectKey,
        additive: bool,
    ) -> bool {
        if !objects.contains(key) {
            log::warn!("Cannot select unknown object {:?}", key);
            return false;
        }

        let mut changed = false;
        if !additive {
            for other in self.objects.iter().filter(|k| **k != key) {
                if let Some(object) = objects.get_mut(*other) {
                    object.set_selected(false);
                }
                changed = true;
            }
            self.objects.retain(|k| *k == key);
        }

        if !self.objects.contains(&key) {
            self.objects.push(key);
            if let Some(object) = objects.get_mut(key) {
                object.set_selected(true);
            }
            changed = true;
        }

        if changed {
            self.listeners.emit(&SelectionEvent::Changed);
        }
        changed
    }

    /// Remove one object from the selection
    pub fn deselect_object(&mut self, objects: &mut ObjectManager, key: ObjectKey) -> bool {
        let Some(index) = self.objects.iter().position(|k| *k == key) else {
            return false;
        };

        self.objects.remove(index);
        if let Some(object) = objects.get_mut(key) {
            object.set_selected(false);
        }
        self.listeners.emit(&SelectionEvent::Changed);
        true
    }

    /// Deselect every object
    pub fn clear_selection(&mut self, objects: &mut ObjectManager) {
        if self.objects.is_empty() {
            return;
        }

        for key in self.objects.drain(..) {
            if let Some(object) = objects.get_mut(key) {
                object.set_selected(false);
            }
        }
        self.listeners.emit(&SelectionEvent::Changed);
    }

    /// Drop a key that is leaving the scene, without touching the object
    pub fn forget(&mut self, key: ObjectKey) -> bool {
        let before = self.objects.len();
        self.objects.retain(|k| *k != key);
        let removed = self.objects.len() != before;
        if removed {
            self.listeners.emit(&SelectionEvent::Changed);
        }
        removed
    }

    pub fn is_selected(&self, key: ObjectKey) -> bool {
        self.objects.contains(&key)
    }

    /// Selected objects in selection order
    pub fn selected_objects(&self) -> &[ObjectKey] {
        &self.objects
    }

    /// The first selected object
    pub fn active_object(&self) -> Option<ObjectKey> {
        self.objects.first().copied()
    }

    pub fn has_selection(&self) -> bool {
        !self.objects.is_empty()
    }

    // ---- edit mode ----

    pub fn select_vertex(&mut self, id: VertexId, additive: bool) {
        if select_in(&mut self.vertices, id, additive) {
            self.listeners.emit(&SelectionEvent::Changed);
        }
    }

    pub fn deselect_vertex(&mut self, id: VertexId) {
        if deselect_in(&mut self.vertices, id) {
            self.listeners.emit(&SelectionEvent::Changed);
        }
    }

    pub fn clear_vertex_selection(&mut self) {
        if !self.vertices.is_empty() {
            self.vertices.clear();
            self.listeners.emit(&SelectionEvent::Changed);
        }
    }

    pub fn selected_vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    pub fn select_edge(&mut self, id: EdgeId, additive: bool) {
        if select_in(&mut self.edges, id, additive) {
            self.listeners.emit(&SelectionEvent::Changed);
        }
    }

    pub fn deselect_edge(&mut self, id: EdgeId) {
        if deselect_in(&mut self.edges, id) {
            self.listeners.emit(&SelectionEvent::Changed);
        }
    }

    pub fn clear_edge_selection(&mut self) {
        if !self.edges.is_empty() {
            self.edges.clear();
            self.listeners.emit(&SelectionEvent::Changed);
        }
    }

    pub fn selected_edges(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn select_face(&mut self, id: FaceId, additive: bool) {
        if select_in(&mut self.faces, id, additive) {
            self.listeners.emit(&SelectionEvent::Changed);
        }
    }

    pub fn deselect_face(&mut self, id: FaceId) {
        if deselect_in(&mut self.faces, id) {
            self.listeners.emit(&SelectionEvent::Changed);
        }
    }

    pub fn clear_face_selection(&mut self) {
        if !self.faces.is_empty() {
            self.faces.clear();
            self.listeners.emit(&SelectionEvent::Changed);
        }
    }

    pub fn selected_faces(&self) -> &[FaceId] {
        &self.faces
    }

    // ---- notifications ----

    pub fn subscribe(&mut self, callback: impl FnMut(&SelectionEvent) + 'static) -> SubscriptionId {
        self.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }
}

fn select_in<T: Copy + PartialEq>(list: &mut Vec<T>, id: T, additive: bool) -> bool {
    let mut changed = false;
    if !additive && list.iter().any(|x| *x != id) {
        list.retain(|x| *x == id);
        changed = true;
    }
    if !list.contains(&id) {
        list.push(id);
        changed = true;
    }
    changed
}

fn deselect_in<T: PartialEq>(list: &mut Vec<T>, id: T) -> bool {
    let before = list.len();
    list.retain(|x| *x != id);
    list.len() != before
}
