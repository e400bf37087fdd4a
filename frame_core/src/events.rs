//! # Model Change Notifications
//!
//! Observer interface that lets a presentation layer (or any other host)
//! mirror the model without the core ever reaching into presentation state.
//! Every committed mutation emits exactly one [`ModelChange`]; failed
//! (validation-rejected) operations emit nothing.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::EntityKind;

/// What happened to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

/// A single committed model mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelChange {
    /// Which kind of entity changed
    pub entity: EntityKind,
    /// The entity's identifier
    pub id: Uuid,
    /// What happened to it
    pub change: ChangeKind,
}

impl ModelChange {
    pub fn new(entity: EntityKind, id: Uuid, change: ChangeKind) -> Self {
        ModelChange { entity, id, change }
    }
}

/// Observer callback type. The model is single-owner and synchronous, so
/// observers run inline before the mutating call returns.
pub type Observer = Box<dyn FnMut(&ModelChange)>;

/// Registry of observers notified on every committed mutation.
#[derive(Default)]
pub struct ObserverRegistry {
    observers: Vec<Observer>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer. Observers cannot currently be removed; hosts
    /// that need dynamic subscriptions should multiplex behind one callback.
    pub fn subscribe(&mut self, observer: impl FnMut(&ModelChange) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Notify all observers of a committed change.
    pub fn notify(&mut self, change: &ModelChange) {
        for observer in &mut self.observers {
            observer(change);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.observers.len())
            .finish()
    }
}
