//! Component registry — the single owner of live component handles.
//!
//! Writers (`register`/`unregister`) take the write half of an [`RwLock`]
//! and are therefore mutually exclusive; lookups share the read half and
//! never wait on each other. Lookups hand out `Arc` clones, so a handle
//! removed while a dispatch is in flight stays alive until that dispatch
//! completes.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use switchyard_domain::component::{ComponentKind, ComponentMetadata, ComponentSummary};
use switchyard_domain::error::RegistryError;
use switchyard_domain::id::ComponentId;

use crate::ports::Component;

/// The kernel's registered representation of one component.
///
/// Pairs the metadata used for discovery and capability checks with the
/// component's handlers. The component's internal state stays behind the
/// [`Component`] trait.
pub struct ComponentHandle {
    metadata: ComponentMetadata,
    component: Arc<dyn Component>,
}

impl ComponentHandle {
    pub fn new(metadata: ComponentMetadata, component: Arc<dyn Component>) -> Self {
        Self {
            metadata,
            component,
        }
    }

    #[must_use]
    pub fn id(&self) -> &ComponentId {
        &self.metadata.id
    }

    #[must_use]
    pub fn kind(&self) -> ComponentKind {
        self.metadata.kind
    }

    #[must_use]
    pub fn metadata(&self) -> &ComponentMetadata {
        &self.metadata
    }

    /// Shared reference to the handlers, for invoking outside the registry lock.
    #[must_use]
    pub fn component(&self) -> Arc<dyn Component> {
        Arc::clone(&self.component)
    }
}

impl fmt::Debug for ComponentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentHandle")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

struct Entry {
    seq: u64,
    handle: Arc<ComponentHandle>,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<ComponentId, Entry>,
    next_seq: u64,
}

/// Concurrency-safe `ComponentId → ComponentHandle` map that remembers
/// insertion order for listings.
#[derive(Default)]
pub struct ComponentRegistry {
    inner: RwLock<Inner>,
}

impl ComponentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handle under its id.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateId`] when the id is already live;
    /// the existing handle is left untouched.
    pub fn register(&self, handle: ComponentHandle) -> Result<(), RegistryError> {
        let mut inner = self.write();
        let id = handle.id().clone();
        if inner.entries.contains_key(&id) {
            return Err(RegistryError::DuplicateId(id));
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        tracing::info!(
            component_id = %id,
            kind = %handle.kind(),
            alias = %handle.metadata().alias,
            "component registered"
        );
        inner.entries.insert(
            id,
            Entry {
                seq,
                handle: Arc::new(handle),
            },
        );
        Ok(())
    }

    /// Remove a handle, returning it.
    ///
    /// Dispatches that already resolved the handle run to completion.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when the id is not live.
    pub fn unregister(&self, id: &ComponentId) -> Result<Arc<ComponentHandle>, RegistryError> {
        let removed = self.write().entries.remove(id);
        match removed {
            Some(entry) => {
                tracing::info!(component_id = %id, "component unregistered");
                Ok(entry.handle)
            }
            None => Err(RegistryError::NotFound(id.clone())),
        }
    }

    #[must_use]
    pub fn lookup(&self, id: &ComponentId) -> Option<Arc<ComponentHandle>> {
        self.read()
            .entries
            .get(id)
            .map(|entry| Arc::clone(&entry.handle))
    }

    #[must_use]
    pub fn contains(&self, id: &ComponentId) -> bool {
        self.read().entries.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    /// Handles whose kind is in `kinds` (all handles when `None`), in
    /// insertion order.
    #[must_use]
    pub fn handles(&self, kinds: Option<&BTreeSet<ComponentKind>>) -> Vec<Arc<ComponentHandle>> {
        self.handles_where(|handle| kinds.is_none_or(|kinds| kinds.contains(&handle.kind())))
    }

    /// Handles accepted by `predicate`, in insertion order.
    pub fn handles_where(
        &self,
        predicate: impl Fn(&ComponentHandle) -> bool,
    ) -> Vec<Arc<ComponentHandle>> {
        let inner = self.read();
        let mut selected: Vec<&Entry> = inner
            .entries
            .values()
            .filter(|entry| predicate(&entry.handle))
            .collect();
        selected.sort_by_key(|entry| entry.seq);
        selected
            .into_iter()
            .map(|entry| Arc::clone(&entry.handle))
            .collect()
    }

    /// Discovery listing, in insertion order.
    #[must_use]
    pub fn list(&self, kinds: Option<&BTreeSet<ComponentKind>>) -> Vec<ComponentSummary> {
        self.handles(kinds)
            .iter()
            .map(|handle| handle.metadata().summary())
            .collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("len", &self.len())
            .finish()
    }
}
