//! Collection Store
//!
//! In-memory mirror of one remote collection resource, plus the bookkeeping
//! the optimistic mutations need (placeholder ids, in-flight markers and
//! per-entity revisions).

use std::collections::HashMap;

use leptos::prelude::*;

use crate::models::{Entity, EntityId, InsertAt};

/// Ordered entities of one collection (fetch order, then create order)
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T> {
    items: Vec<T>,
    loaded: bool,
    load_failed: bool,
    next_placeholder: i64,
    in_flight: HashMap<EntityId, u32>,
    revisions: HashMap<EntityId, u64>,
    /// Server copies fetched while an update of that entity was in flight
    bases: HashMap<EntityId, T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loaded: false,
            load_failed: false,
            next_placeholder: -1,
            in_flight: HashMap::new(),
            revisions: HashMap::new(),
            bases: HashMap::new(),
        }
    }
}

impl<T: Entity> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// False until the first successful full fetch; an unloaded collection
    /// renders as empty
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// The last full fetch failed and nothing has loaded since
    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    pub fn mark_load_failed(&mut self) {
        self.load_failed = true;
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn position(&self, id: EntityId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    /// Replace everything with a fresh server listing.
    ///
    /// Mutations still in flight survive the reload: placeholders stay listed,
    /// entities being deleted stay hidden, and entities being updated keep
    /// their local value while the server copy becomes their rollback base.
    pub fn replace_all(&mut self, items: Vec<T>) {
        let local = std::mem::take(&mut self.items);
        let mut merged: Vec<T> = items
            .into_iter()
            .filter(|item| {
                let id = item.id();
                !(self.in_flight.contains_key(&id) && !local.iter().any(|l| l.id() == id))
            })
            .collect();

        let mut placeholders = Vec::new();
        for entity in local {
            let id = entity.id();
            if id.is_placeholder() {
                placeholders.push(entity);
            } else if self.in_flight.contains_key(&id) {
                if let Some(slot) = merged.iter_mut().find(|item| item.id() == id) {
                    let server = std::mem::replace(slot, entity);
                    self.bases.insert(id, server);
                }
            }
        }
        match T::INSERT_AT {
            InsertAt::Front => {
                for entity in placeholders.into_iter().rev() {
                    merged.insert(0, entity);
                }
            }
            InsertAt::Back => merged.extend(placeholders),
        }

        self.items = merged;
        self.loaded = true;
        self.load_failed = false;
    }

    /// Mint an id that cannot collide with a server id
    pub fn next_placeholder_id(&mut self) -> EntityId {
        let id = EntityId(self.next_placeholder);
        self.next_placeholder -= 1;
        id
    }

    pub fn insert(&mut self, entity: T, at: InsertAt) {
        match at {
            InsertAt::Front => self.items.insert(0, entity),
            InsertAt::Back => self.items.push(entity),
        }
    }

    /// Put an entity back at `index` (clamped) unless one with its id exists
    pub fn restore(&mut self, index: usize, entity: T) {
        if self.position(entity.id()).is_some() {
            return;
        }
        let index = index.min(self.items.len());
        self.items.insert(index, entity);
    }

    /// Swap the entity with id `id` for `entity`, keeping its position
    pub fn replace(&mut self, id: EntityId, entity: T) -> bool {
        match self.items.iter_mut().find(|item| item.id() == id) {
            Some(slot) => {
                *slot = entity;
                true
            }
            None => false,
        }
    }

    /// Fold a created entity in place of its placeholder.
    ///
    /// A reload may have dropped the placeholder or already brought the
    /// created entity in; either way exactly one copy remains.
    pub fn settle_create(&mut self, placeholder: EntityId, created: T) {
        let created_id = created.id();
        if self.position(created_id).is_some() {
            self.remove(placeholder);
            self.replace(created_id, created);
        } else if !self.replace(placeholder, created.clone()) {
            self.insert(created, T::INSERT_AT);
        }
    }

    pub fn remove(&mut self, id: EntityId) -> Option<(usize, T)> {
        let index = self.position(id)?;
        Some((index, self.items.remove(index)))
    }

    /// Mutate one entity in place, returning its previous value
    pub fn update_with(&mut self, id: EntityId, f: impl FnOnce(&mut T)) -> Option<T> {
        let slot = self.items.iter_mut().find(|item| item.id() == id)?;
        let previous = slot.clone();
        f(slot);
        Some(previous)
    }

    /// Record a local edit; the latest revision wins on reconcile/rollback
    pub fn bump_revision(&mut self, id: EntityId) -> u64 {
        let revision = self.revisions.entry(id).or_insert(0);
        *revision += 1;
        *revision
    }

    pub fn revision(&self, id: EntityId) -> u64 {
        self.revisions.get(&id).copied().unwrap_or(0)
    }

    pub fn begin(&mut self, id: EntityId) {
        *self.in_flight.entry(id).or_insert(0) += 1;
    }

    /// Server copy a reload brought in while this entity had an edit in flight
    pub fn take_base(&mut self, id: EntityId) -> Option<T> {
        self.bases.remove(&id)
    }

    pub fn settle(&mut self, id: EntityId) {
        if let Some(count) = self.in_flight.get_mut(&id) {
            *count -= 1;
            if *count == 0 {
                self.in_flight.remove(&id);
                self.bases.remove(&id);
            }
        }
    }

    /// True while a mutation of this entity awaits the server
    pub fn is_pending(&self, id: EntityId) -> bool {
        id.is_placeholder() || self.in_flight.contains_key(&id)
    }
}

// ========================
// Store Handles
// ========================

/// Access to a collection owned elsewhere (a reactive signal in the app).
///
/// Both methods return `None` once the owner has been torn down, so late
/// network responses never touch unmounted state.
pub trait CollectionHandle<T: Entity> {
    fn modify<R>(&self, f: impl FnOnce(&mut Collection<T>) -> R) -> Option<R>;
    /// Read without notifying subscribers
    fn inspect<R>(&self, f: impl FnOnce(&Collection<T>) -> R) -> Option<R>;
}

impl<T: Entity> CollectionHandle<T> for RwSignal<Collection<T>> {
    fn modify<R>(&self, f: impl FnOnce(&mut Collection<T>) -> R) -> Option<R> {
        Update::try_update(self, f)
    }

    fn inspect<R>(&self, f: impl FnOnce(&Collection<T>) -> R) -> Option<R> {
        WithUntracked::try_with_untracked(self, f)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;

    /// Shared collection with a switch that simulates teardown
    #[derive(Clone)]
    pub struct LocalStore<T> {
        inner: Rc<RefCell<Collection<T>>>,
        alive: Rc<Cell<bool>>,
    }

    impl<T: Entity> LocalStore<T> {
        pub fn new(items: Vec<T>) -> Self {
            let mut collection = Collection::new();
            collection.replace_all(items);
            Self {
                inner: Rc::new(RefCell::new(collection)),
                alive: Rc::new(Cell::new(true)),
            }
        }

        pub fn unloaded() -> Self {
            Self {
                inner: Rc::new(RefCell::new(Collection::new())),
                alive: Rc::new(Cell::new(true)),
            }
        }

        pub fn tear_down(&self) {
            self.alive.set(false);
        }

        pub fn snapshot(&self) -> Collection<T> {
            self.inner.borrow().clone()
        }
    }

    impl<T: Entity> CollectionHandle<T> for LocalStore<T> {
        fn modify<R>(&self, f: impl FnOnce(&mut Collection<T>) -> R) -> Option<R> {
            self.alive.get().then(|| f(&mut self.inner.borrow_mut()))
        }

        fn inspect<R>(&self, f: impl FnOnce(&Collection<T>) -> R) -> Option<R> {
            self.alive.get().then(|| f(&self.inner.borrow()))
        }
    }
}
