//! Mutation Dispatcher
//!
//! Every write against a remote collection goes through [`mutate`]: the change
//! is applied to the local collection first, the request is sent, and the
//! mutation then ends in exactly one terminal state. It is either committed
//! (the server response is folded in) or rolled back (the local change is undone).

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::api::{ApiError, Resource};
use crate::models::{Entity, EntityId};
use crate::store::{Collection, CollectionHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MutationKind::Create => "create",
            MutationKind::Update => "update",
            MutationKind::Delete => "delete",
        })
    }
}

/// Lifecycle of one mutation: `Idle -> Pending -> Committed | RolledBack`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationPhase {
    Idle,
    Pending,
    Committed,
    RolledBack,
}

impl MutationPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, MutationPhase::Committed | MutationPhase::RolledBack)
    }
}

/// How a mutation that did not fail ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    Committed,
    /// The owning view went away before the response arrived; nothing was touched
    Detached,
    /// A newer local edit replaced this one before it was re-sent
    Superseded,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MutationError {
    #[error("{kind} {id}: not in the collection")]
    Missing { kind: MutationKind, id: EntityId },
    #[error("{kind} {id}: still waiting for the server to create it")]
    NotSynced { kind: MutationKind, id: EntityId },
    #[error("{kind} {id} rolled back: {source}")]
    RolledBack {
        kind: MutationKind,
        id: EntityId,
        #[source]
        source: ApiError,
    },
}

impl MutationError {
    pub fn kind(&self) -> MutationKind {
        match self {
            MutationError::Missing { kind, .. }
            | MutationError::NotSynced { kind, .. }
            | MutationError::RolledBack { kind, .. } => *kind,
        }
    }

    /// Server-side cause, if the request was actually sent
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            MutationError::RolledBack { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Everything needed to take an optimistic change back
#[derive(Debug, Clone, PartialEq)]
pub enum Undo<T> {
    /// Drop the placeholder of a create
    Discard(EntityId),
    /// Put a deleted entity back where it was
    Reinsert { index: usize, entity: T },
    /// Restore the value an update overwrote, unless a newer edit exists
    Revert { previous: T, revision: u64 },
}

impl<T: Entity> Undo<T> {
    pub fn target(&self) -> EntityId {
        match self {
            Undo::Discard(id) => *id,
            Undo::Reinsert { entity, .. } => entity.id(),
            Undo::Revert { previous, .. } => previous.id(),
        }
    }

    pub fn rollback(self, collection: &mut Collection<T>) {
        match self {
            Undo::Discard(id) => {
                collection.remove(id);
            }
            Undo::Reinsert { index, entity } => collection.restore(index, entity),
            Undo::Revert { previous, revision } => {
                let id = previous.id();
                // Last write wins: a newer local edit supersedes this rollback
                if collection.revision(id) == revision {
                    let restored = collection.take_base(id).unwrap_or(previous);
                    collection.replace(id, restored);
                }
            }
        }
    }
}

/// Run one optimistic mutation to a terminal state.
///
/// * `apply` changes the collection and returns how to undo it
/// * `request` is built after the local change is visible
/// * `reconcile` folds the server's answer into the collection
///
/// On failure the `Undo` is applied and the error returned.
pub async fn mutate<T, S, R, Fut>(
    store: &S,
    kind: MutationKind,
    id: EntityId,
    apply: impl FnOnce(&mut Collection<T>) -> Result<Undo<T>, MutationError>,
    request: impl FnOnce() -> Fut,
    reconcile: impl FnOnce(&mut Collection<T>, &Undo<T>, R),
) -> Result<Settled, MutationError>
where
    T: Entity,
    S: CollectionHandle<T>,
    Fut: Future<Output = Result<R, ApiError>>,
{
    let Some(applied) = store.modify(|c| {
        let undo = apply(c)?;
        c.begin(undo.target());
        Ok(undo)
    }) else {
        return Ok(Settled::Detached);
    };
    let undo = applied?;
    let target = undo.target();
    log::debug!("[STORE] {} {} {:?}", kind, target, MutationPhase::Pending);

    let response = request().await;

    let outcome = store.modify(move |c| {
        let result = match response {
            Ok(value) => {
                reconcile(c, &undo, value);
                Ok(MutationPhase::Committed)
            }
            Err(source) => {
                undo.rollback(c);
                Err(source)
            }
        };
        c.settle(target);
        result
    });

    match outcome {
        None => {
            log::debug!("[STORE] {} {} finished after teardown", kind, target);
            Ok(Settled::Detached)
        }
        Some(Ok(phase)) => {
            log::debug!("[STORE] {} {} {:?}", kind, target, phase);
            Ok(Settled::Committed)
        }
        Some(Err(source)) => {
            log::warn!("[STORE] {} {} {:?}: {}", kind, target, MutationPhase::RolledBack, source);
            Err(MutationError::RolledBack { kind, id, source })
        }
    }
}

/// Fetch the whole collection and replace local state.
///
/// On failure the items are left as they were and the collection is
/// flagged as failed.
pub async fn load<T, S, A>(store: &S, api: &A) -> Result<usize, ApiError>
where
    T: Entity,
    S: CollectionHandle<T>,
    A: Resource<T> + ?Sized,
{
    let items = match api.list().await {
        Ok(items) => items,
        Err(err) => {
            store.modify(|c| c.mark_load_failed());
            return Err(err);
        }
    };
    let count = items.len();
    if store.modify(|c| c.replace_all(items)).is_none() {
        log::debug!("[STORE] load finished after teardown");
    }
    Ok(count)
}

/// Optimistic create: a placeholder is visible until the server answers.
///
/// Returns the placeholder id together with the outcome.
pub async fn create<T, S, A>(store: &S, api: &A, draft: T::Draft) -> (EntityId, Result<Settled, MutationError>)
where
    T: Entity,
    S: CollectionHandle<T>,
    A: Resource<T> + ?Sized,
{
    let Some(placeholder) = store.modify(|c| c.next_placeholder_id()) else {
        return (EntityId(0), Ok(Settled::Detached));
    };

    let outcome = mutate(
        store,
        MutationKind::Create,
        placeholder,
        |c| {
            c.insert(T::placeholder(placeholder, &draft), T::INSERT_AT);
            Ok(Undo::Discard(placeholder))
        },
        || api.create(&draft),
        |c, _, created| c.settle_create(placeholder, created),
    )
    .await;
    (placeholder, outcome)
}

/// Optimistic update: only the changed fields are sent
pub async fn update<T, S, A>(store: &S, api: &A, id: EntityId, patch: T::Patch) -> Result<Settled, MutationError>
where
    T: Entity,
    S: CollectionHandle<T>,
    A: Resource<T> + ?Sized,
{
    let kind = MutationKind::Update;
    if id.is_placeholder() {
        return Err(MutationError::NotSynced { kind, id });
    }

    mutate(
        store,
        kind,
        id,
        |c| {
            let previous = c
                .update_with(id, |entity| entity.apply_patch(&patch))
                .ok_or(MutationError::Missing { kind, id })?;
            let revision = c.bump_revision(id);
            Ok(Undo::Revert { previous, revision })
        },
        || api.update(id, &patch),
        |c, undo, saved: Option<T>| {
            let Undo::Revert { revision, .. } = undo else {
                return;
            };
            if c.revision(id) != *revision {
                return;
            }
            // Without a body, a copy reloaded mid-flight plus this patch is the saved state
            let base = c.take_base(id);
            let adopted = saved.or_else(|| {
                base.map(|mut entity| {
                    entity.apply_patch(&patch);
                    entity
                })
            });
            if let Some(entity) = adopted {
                c.replace(id, entity);
            }
        },
    )
    .await
}

/// Revision of the last local edit an update produced, shared by all
/// re-sends of that update
#[derive(Debug, Default)]
pub struct EditToken(AtomicU64);

/// Update that is only re-sent while it is still the latest local edit.
///
/// The first call always runs. Later calls with the same token (a retry)
/// settle as `Superseded` without a request once another edit of the entity
/// has happened.
pub async fn update_latest<T, S, A>(
    store: &S,
    api: &A,
    id: EntityId,
    patch: T::Patch,
    token: &EditToken,
) -> Result<Settled, MutationError>
where
    T: Entity,
    S: CollectionHandle<T>,
    A: Resource<T> + ?Sized,
{
    let Some(current) = store.inspect(|c| c.revision(id)) else {
        return Ok(Settled::Detached);
    };
    let issued = token.0.load(Ordering::Relaxed);
    if issued != 0 && issued != current {
        log::info!("[STORE] {} {} superseded by a newer edit", MutationKind::Update, id);
        return Ok(Settled::Superseded);
    }
    // `update` bumps the revision before its first await
    token.0.store(current + 1, Ordering::Relaxed);
    update(store, api, id, patch).await
}

/// Optimistic delete: removed at once, put back if the server refuses
pub async fn delete<T, S, A>(store: &S, api: &A, id: EntityId) -> Result<Settled, MutationError>
where
    T: Entity,
    S: CollectionHandle<T>,
    A: Resource<T> + ?Sized,
{
    let kind = MutationKind::Delete;
    if id.is_placeholder() {
        return Err(MutationError::NotSynced { kind, id });
    }

    mutate(
        store,
        kind,
        id,
        |c| {
            let (index, entity) = c.remove(id).ok_or(MutationError::Missing { kind, id })?;
            c.bump_revision(id);
            Ok(Undo::Reinsert { index, entity })
        },
        || api.delete(id),
        |_, _, ()| {},
    )
    .await
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use async_trait::async_trait;

    use super::*;
    use crate::store::testing::LocalStore;

    /// Scripted in-memory resource.
    ///
    /// Responses are queued per operation; each call records a snapshot of the
    /// observed store so tests can check what the user saw while it was in flight.
    pub struct MockResource<T: Entity> {
        pub store: Option<LocalStore<T>>,
        pub lists: RefCell<VecDeque<Result<Vec<T>, ApiError>>>,
        pub creates: RefCell<VecDeque<Result<T, ApiError>>>,
        pub updates: RefCell<VecDeque<Result<Option<T>, ApiError>>>,
        pub deletes: RefCell<VecDeque<Result<(), ApiError>>>,
        pub seen: RefCell<Vec<Collection<T>>>,
        pub sent_drafts: RefCell<Vec<T::Draft>>,
        pub sent_patches: RefCell<Vec<(EntityId, T::Patch)>>,
        pub on_call: RefCell<Option<Box<dyn FnMut()>>>,
    }

    impl<T: Entity> MockResource<T> {
        pub fn new() -> Self {
            Self {
                store: None,
                lists: RefCell::new(VecDeque::new()),
                creates: RefCell::new(VecDeque::new()),
                updates: RefCell::new(VecDeque::new()),
                deletes: RefCell::new(VecDeque::new()),
                seen: RefCell::new(Vec::new()),
                sent_drafts: RefCell::new(Vec::new()),
                sent_patches: RefCell::new(Vec::new()),
                on_call: RefCell::new(None),
            }
        }

        pub fn observing(store: &LocalStore<T>) -> Self {
            Self {
                store: Some(store.clone()),
                ..Self::new()
            }
        }

        fn observe(&self) {
            if let Some(store) = &self.store {
                self.seen.borrow_mut().push(store.snapshot());
            }
            if let Some(hook) = self.on_call.borrow_mut().as_mut() {
                hook();
            }
        }
    }

    fn unscripted() -> ApiError {
        ApiError::Network("no scripted response".to_string())
    }

    #[async_trait(?Send)]
    impl<T: Entity> Resource<T> for MockResource<T> {
        async fn list(&self) -> Result<Vec<T>, ApiError> {
            self.observe();
            self.lists.borrow_mut().pop_front().unwrap_or_else(|| Err(unscripted()))
        }

        async fn create(&self, draft: &T::Draft) -> Result<T, ApiError> {
            self.observe();
            self.sent_drafts.borrow_mut().push(draft.clone());
            self.creates.borrow_mut().pop_front().unwrap_or_else(|| Err(unscripted()))
        }

        async fn update(&self, id: EntityId, patch: &T::Patch) -> Result<Option<T>, ApiError> {
            self.observe();
            self.sent_patches.borrow_mut().push((id, patch.clone()));
            self.updates.borrow_mut().pop_front().unwrap_or_else(|| Err(unscripted()))
        }

        async fn delete(&self, _id: EntityId) -> Result<(), ApiError> {
            self.observe();
            self.deletes.borrow_mut().pop_front().unwrap_or_else(|| Err(unscripted()))
        }
    }
}
