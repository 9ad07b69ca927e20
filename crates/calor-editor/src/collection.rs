//! Collections
//!
//! Named, nestable groups of objects. Hiding a collection hides everything
//! below it: its objects and all descendant collections. Collections only
//! reference objects by key and never own them.

use calor_core::{Listeners, SubscriptionId};
use slotmap::SlotMap;
use uuid::Uuid;

use crate::objects::{ObjectKey, ObjectManager};
use crate::{EditorError, EditorResult};

/// Name of the collection every scene starts with
pub const ROOT_COLLECTION_NAME: &str = "Scene Collection";

slotmap::new_key_type! {
    /// Arena key of a collection
    pub struct CollectionKey;
}

/// A named group of objects and child collections
#[derive(Debug, Clone)]
pub struct Collection {
    name: String,
    id: Uuid,
    visible: bool,
    objects: Vec<ObjectKey>,
    children: Vec<CollectionKey>,
    parent: Option<CollectionKey>,
}

impl Collection {
    fn new(name: String) -> Self {
        Self {
            name,
            id: Uuid::new_v4(),
            visible: true,
            objects: Vec::new(),
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn objects(&self) -> &[ObjectKey] {
        &self.objects
    }

    pub fn children(&self) -> &[CollectionKey] {
        &self.children
    }

    pub fn parent(&self) -> Option<CollectionKey> {
        self.parent
    }

    pub fn contains_object(&self, key: ObjectKey) -> bool {
        self.objects.contains(&key)
    }
}

/// Notification raised by the collection tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionEvent {
    Renamed(CollectionKey),
    VisibilityChanged {
        collection: CollectionKey,
        visible: bool,
    },
    ObjectAdded {
        collection: CollectionKey,
        object: ObjectKey,
    },
    ObjectRemoved {
        collection: CollectionKey,
        object: ObjectKey,
    },
    ChildAdded {
        parent: CollectionKey,
        child: CollectionKey,
    },
    ChildRemoved {
        parent: CollectionKey,
        child: CollectionKey,
    },
}

/// Arena of collections with a fixed root
#[derive(Debug)]
pub struct CollectionTree {
    collections: SlotMap<CollectionKey, Collection>,
    root: CollectionKey,
    listeners: Listeners<CollectionEvent>,
}

impl CollectionTree {
    /// Create a tree holding only the root collection
    pub fn new() -> Self {
        let mut collections = SlotMap::with_key();
        let root = collections.insert(Collection::new(ROOT_COLLECTION_NAME.to_string()));
        Self {
            collections,
            root,
            listeners: Listeners::new(),
        }
    }

    pub fn root(&self) -> CollectionKey {
        self.root
    }

    pub fn get(&self, key: CollectionKey) -> Option<&Collection> {
        self.collections.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CollectionKey, &Collection)> {
        self.collections.iter()
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    /// Always false; the root cannot be removed
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    fn collection(&self, key: CollectionKey) -> EditorResult<&Collection> {
        self.collections
            .get(key)
            .ok_or(EditorError::CollectionNotFound(key))
    }

    fn collection_mut(&mut self, key: CollectionKey) -> EditorResult<&mut Collection> {
        self.collections
            .get_mut(key)
            .ok_or(EditorError::CollectionNotFound(key))
    }

    /// Create a collection under `parent`, or under the root if `None`.
    /// A collection created under a hidden parent starts hidden.
    pub fn create(
        &mut self,
        name: impl Into<String>,
        parent: Option<CollectionKey>,
    ) -> EditorResult<CollectionKey> {
        let parent = parent.unwrap_or(self.root);
        let parent_visible = self.collection(parent)?.visible;

        let mut collection = Collection::new(name.into());
        collection.visible = parent_visible;
        collection.parent = Some(parent);
        log::debug!("Creating collection {}", collection.name);

        let child = self.collections.insert(collection);
        self.collection_mut(parent)?.children.push(child);
        self.listeners.emit(&CollectionEvent::ChildAdded { parent, child });
        Ok(child)
    }

    pub fn rename(&mut self, key: CollectionKey, name: impl Into<String>) -> EditorResult<()> {
        let name = name.into();
        let collection = self.collection_mut(key)?;
        if collection.name != name {
            collection.name = name;
            self.listeners.emit(&CollectionEvent::Renamed(key));
        }
        Ok(())
    }

    /// Put an object in a collection. Objects added to a hidden collection
    /// are hidden.
    pub fn add_object(
        &mut self,
        objects: &mut ObjectManager,
        key: CollectionKey,
        object: ObjectKey,
    ) -> EditorResult<()> {
        let collection = self
            .collections
            .get_mut(key)
            .ok_or(EditorError::CollectionNotFound(key))?;
        let target = objects
            .get_mut(object)
            .ok_or(EditorError::ObjectNotFound(object))?;

        if collection.objects.contains(&object) {
            return Ok(());
        }
        collection.objects.push(object);
        if !collection.visible {
            target.set_visible(false);
        }

        self.listeners.emit(&CollectionEvent::ObjectAdded { collection: key, object });
        Ok(())
    }

    /// Take an object out of a collection. Returns false if it was not there.
    pub fn remove_object(&mut self, key: CollectionKey, object: ObjectKey) -> EditorResult<bool> {
        let collection = self.collection_mut(key)?;
        let before = collection.objects.len();
        collection.objects.retain(|k| *k != object);
        let removed = collection.objects.len() != before;

        if removed {
            self.listeners.emit(&CollectionEvent::ObjectRemoved { collection: key, object });
        }
        Ok(removed)
    }

    /// Drop an object from every collection
    pub fn forget_object(&mut self, object: ObjectKey) {
        let mut events = Vec::new();
        for (key, collection) in &mut self.collections {
            if let Some(index) = collection.objects.iter().position(|k| *k == object) {
                collection.objects.remove(index);
                events.push(CollectionEvent::ObjectRemoved { collection: key, object });
            }
        }
        for event in &events {
            self.listeners.emit(event);
        }
    }

    /// Collections that directly contain an object
    pub fn collections_of(&self, object: ObjectKey) -> Vec<CollectionKey> {
        self.collections
            .iter()
            .filter(|(_, c)| c.contains_object(object))
            .map(|(key, _)| key)
            .collect()
    }

    /// True if `ancestor` is `key` or lies above it
    pub fn is_ancestor(&self, ancestor: CollectionKey, key: CollectionKey) -> bool {
        let mut current = Some(key);
        while let Some(k) = current {
            if k == ancestor {
                return true;
            }
            current = self.collections.get(k).and_then(|c| c.parent);
        }
        false
    }

    /// Move `child` under `parent`, detaching it from any previous parent.
    ///
    /// A hidden parent hides the child and its contents.
    pub fn add_child(
        &mut self,
        objects: &mut ObjectManager,
        parent: CollectionKey,
        child: CollectionKey,
    ) -> EditorResult<()> {
        let parent_visible = self.collection(parent)?.visible;
        let previous = self.collection(child)?.parent;

        if previous == Some(parent) {
            return Ok(());
        }
        if self.is_ancestor(child, parent) {
            log::warn!("Cannot nest collection {:?} under its own descendant {:?}", child, parent);
            return Err(EditorError::CollectionCycle { parent, child });
        }

        if let Some(previous) = previous {
            self.remove_child(previous, child)?;
        }
        self.collection_mut(parent)?.children.push(child);
        self.collection_mut(child)?.parent = Some(parent);
        self.listeners.emit(&CollectionEvent::ChildAdded { parent, child });

        if !parent_visible {
            self.set_visible(objects, child, false)?;
        }
        Ok(())
    }

    /// Detach `child` from `parent`. The child stays in the arena without a
    /// parent. Returns false if it was not a child of `parent`.
    pub fn remove_child(
        &mut self,
        parent: CollectionKey,
        child: CollectionKey,
    ) -> EditorResult<bool> {
        let collection = self.collection_mut(parent)?;
        let before = collection.children.len();
        collection.children.retain(|k| *k != child);
        if collection.children.len() == before {
            return Ok(false);
        }

        if let Some(child_collection) = self.collections.get_mut(child) {
            child_collection.parent = None;
        }
        self.listeners.emit(&CollectionEvent::ChildRemoved { parent, child });
        Ok(true)
    }

    /// Show or hide a collection, cascading to every object and descendant
    /// collection below it. No-op if the value is unchanged.
    pub fn set_visible(
        &mut self,
        objects: &mut ObjectManager,
        key: CollectionKey,
        visible: bool,
    ) -> EditorResult<()> {
        if self.collection(key)?.visible == visible {
            return Ok(());
        }

        let mut events = Vec::new();
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            let Some(collection) = self.collections.get_mut(current) else {
                continue;
            };
            if collection.visible != visible {
                collection.visible = visible;
                events.push(CollectionEvent::VisibilityChanged {
                    collection: current,
                    visible,
                });
            }
            for object in &collection.objects {
                if let Some(object) = objects.get_mut(*object) {
                    object.set_visible(visible);
                }
            }
            stack.extend(collection.children.iter().copied());
        }

        log::debug!(
            "Collection {:?} visible: {} ({} collections changed)",
            key,
            visible,
            events.len()
        );
        for event in &events {
            self.listeners.emit(event);
        }
        Ok(())
    }

    // ---- notifications ----

    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&CollectionEvent) + 'static,
    ) -> SubscriptionId {
        self.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }
}

impl Default for CollectionTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::DVec3;

    use super::*;

    fn visible(objects: &ObjectManager, key: ObjectKey) -> bool {
        objects.get(key).unwrap().is_visible()
    }

    #[test]
    fn test_root_collection() {
        let tree = CollectionTree::new();
        let root = tree.get(tree.root()).unwrap();
        assert_eq!(root.name(), "Scene Collection");
        assert!(root.is_visible());
        assert!(root.parent().is_none());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_visibility_cascades() {
        let mut objects = ObjectManager::new();
        let mut tree = CollectionTree::new();
        let parts = tree.create("Parts", None).unwrap();
        let fasteners = tree.create("Fasteners", Some(parts)).unwrap();

        let plate = objects.create_box(DVec3::ONE);
        let bolt = objects.create_cylinder(0.1, 1.0).unwrap();
        tree.add_object(&mut objects, parts, plate).unwrap();
        tree.add_object(&mut objects, fasteners, bolt).unwrap();

        tree.set_visible(&mut objects, parts, false).unwrap();
        assert!(!tree.get(fasteners).unwrap().is_visible());
        assert!(!visible(&objects, plate));
        assert!(!visible(&objects, bolt));

        tree.set_visible(&mut objects, parts, true).unwrap();
        assert!(tree.get(fasteners).unwrap().is_visible());
        assert!(visible(&objects, plate));
        assert!(visible(&objects, bolt));
    }

    #[test]
    fn test_set_visible_unchanged_is_noop() {
        let mut objects = ObjectManager::new();
        let mut tree = CollectionTree::new();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        tree.subscribe(move |e| sink.borrow_mut().push(*e));

        tree.set_visible(&mut objects, tree.root(), true).unwrap();
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_hidden_collection_hides_new_members() {
        let mut objects = ObjectManager::new();
        let mut tree = CollectionTree::new();
        let hidden = tree.create("Hidden", None).unwrap();
        tree.set_visible(&mut objects, hidden, false).unwrap();

        let key = objects.create_box(DVec3::ONE);
        tree.add_object(&mut objects, hidden, key).unwrap();
        assert!(!visible(&objects, key));

        let nested = tree.create("Nested", Some(hidden)).unwrap();
        assert!(!tree.get(nested).unwrap().is_visible());

        let loose = tree.create("Loose", None).unwrap();
        tree.add_child(&mut objects, hidden, loose).unwrap();
        assert!(!tree.get(loose).unwrap().is_visible());
    }

    #[test]
    fn test_add_child_reparents() {
        let mut objects = ObjectManager::new();
        let mut tree = CollectionTree::new();
        let a = tree.create("A", None).unwrap();
        let b = tree.create("B", None).unwrap();

        tree.add_child(&mut objects, a, b).unwrap();
        assert_eq!(tree.get(b).unwrap().parent(), Some(a));
        assert_eq!(tree.get(a).unwrap().children(), &[b]);
        assert!(!tree.get(tree.root()).unwrap().children().contains(&b));
    }

    #[test]
    fn test_cycle_rejected() {
        let mut objects = ObjectManager::new();
        let mut tree = CollectionTree::new();
        let a = tree.create("A", None).unwrap();
        let b = tree.create("B", Some(a)).unwrap();

        assert!(matches!(
            tree.add_child(&mut objects, b, a),
            Err(EditorError::CollectionCycle { .. })
        ));
        assert!(matches!(
            tree.add_child(&mut objects, a, a),
            Err(EditorError::CollectionCycle { .. })
        ));
        assert_eq!(tree.get(b).unwrap().parent(), Some(a));
    }

    #[test]
    fn test_remove_child_detaches() {
        let mut tree = CollectionTree::new();
        let a = tree.create("A", None).unwrap();

        assert!(tree.remove_child(tree.root(), a).unwrap());
        assert!(tree.get(a).unwrap().parent().is_none());
        assert!(!tree.remove_child(tree.root(), a).unwrap());
    }

    #[test]
    fn test_object_membership() {
        let mut objects = ObjectManager::new();
        let mut tree = CollectionTree::new();
        let a = tree.create("A", None).unwrap();
        let key = objects.create_box(DVec3::ONE);

        tree.add_object(&mut objects, tree.root(), key).unwrap();
        tree.add_object(&mut objects, a, key).unwrap();
        tree.add_object(&mut objects, a, key).unwrap();
        assert_eq!(tree.get(a).unwrap().objects().len(), 1);
        assert_eq!(tree.collections_of(key).len(), 2);

        assert!(tree.remove_object(a, key).unwrap());
        assert!(!tree.remove_object(a, key).unwrap());

        tree.forget_object(key);
        assert!(tree.collections_of(key).is_empty());
    }

    #[test]
    fn test_unknown_keys() {
        let mut objects = ObjectManager::new();
        let mut tree = CollectionTree::new();
        let gone = objects.create_box(DVec3::ONE);
        objects.remove(gone).unwrap();

        assert!(matches!(
            tree.add_object(&mut objects, tree.root(), gone),
            Err(EditorError::ObjectNotFound(_))
        ));

        let mut other = CollectionTree::new();
        let foreign = other.create("Foreign", None).unwrap();
        assert!(matches!(
            tree.rename(foreign, "X"),
            Err(EditorError::CollectionNotFound(_))
        ));
    }

    #[test]
    fn test_rename_emits_once() {
        let mut tree = CollectionTree::new();
        let a = tree.create("A", None).unwrap();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        tree.subscribe(move |e| sink.borrow_mut().push(*e));

        tree.rename(a, "Heat Sinks").unwrap();
        tree.rename(a, "Heat Sinks").unwrap();
        assert_eq!(tree.get(a).unwrap().name(), "Heat Sinks");
        assert_eq!(*events.borrow(), vec![CollectionEvent::Renamed(a)]);
    }
}
