//! Interaction Modes
//!
//! Object mode manipulates whole objects; edit mode works on the mesh
//! elements of the active object and is only reachable while one exists.

use calor_core::{Listeners, SubscriptionId};
use serde::{Deserialize, Serialize};

use crate::objects::ObjectKey;
use crate::{EditorError, EditorResult};

/// Coarse interaction state of the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InteractionMode {
    #[default]
    Object,
    Edit,
}

/// Notification raised by the mode manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeEvent {
    ModeChanged(InteractionMode),
    ActiveObjectChanged(Option<ObjectKey>),
}

/// Current interaction mode and the object it applies to
#[derive(Debug, Default)]
pub struct ModeManager {
    mode: InteractionMode,
    active: Option<ObjectKey>,
    listeners: Listeners<ModeEvent>,
}

impl ModeManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn is_edit_mode(&self) -> bool {
        self.mode == InteractionMode::Edit
    }

    pub fn active_object(&self) -> Option<ObjectKey> {
        self.active
    }

    /// Switch modes. Edit mode requires an active object.
    pub fn set_mode(&mut self, mode: InteractionMode) -> EditorResult<()> {
        if mode == InteractionMode::Edit && self.active.is_none() {
            log::warn!("Cannot enter edit mode without an active object");
            return Err(EditorError::NoActiveObject);
        }
        if self.mode != mode {
            self.mode = mode;
            log::debug!("Interaction mode: {:?}", mode);
            self.listeners.emit(&ModeEvent::ModeChanged(mode));
        }
        Ok(())
    }

    /// Flip between object and edit mode, returning the new mode
    pub fn toggle(&mut self) -> EditorResult<InteractionMode> {
        let next = match self.mode {
            InteractionMode::Object => InteractionMode::Edit,
            InteractionMode::Edit => InteractionMode::Object,
        };
        self.set_mode(next)?;
        Ok(next)
    }

    /// Change the active object. Losing it while in edit mode drops back to
    /// object mode.
    pub fn set_active_object(&mut self, key: Option<ObjectKey>) {
        if self.active == key {
            return;
        }
        self.active = key;
        self.listeners.emit(&ModeEvent::ActiveObjectChanged(key));

        if key.is_none() && self.mode == InteractionMode::Edit {
            self.mode = InteractionMode::Object;
            self.listeners.emit(&ModeEvent::ModeChanged(InteractionMode::Object));
        }
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&ModeEvent) + 'static) -> SubscriptionId {
        self.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }
}
