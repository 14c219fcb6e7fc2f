//! In-memory `ResourceBackend` for testing and demos.
//!
//! Behaves like the user endpoints: offset cursors, server-assigned ids,
//! 404 for unknown ids. Call counters and forced errors support assertions
//! in tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entity::{Entity, IdentityResolver};
use crate::domain::foundation::{PageCursor, SyncError};
use crate::ports::{Page, ResourceBackend};

/// In-memory paged collection.
///
/// # Example
///
/// ```ignore
/// let backend = InMemoryResourceBackend::new()
///     .with_entities(vec![Entity::new().with("sub", "abc")]);
/// let page = backend.list_page(60, None).await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryResourceBackend {
    entities: Mutex<Vec<Entity>>,
    identity: IdentityResolver,
    /// Optional error to return for every call (for error testing)
    force_error: RwLock<Option<SyncError>>,
    latency: RwLock<Option<Duration>>,
    list_calls: AtomicUsize,
    mutation_calls: AtomicUsize,
}

impl InMemoryResourceBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the collection.
    pub fn with_entities(self, entities: Vec<Entity>) -> Self {
        *self.entities.lock().unwrap_or_else(PoisonError::into_inner) = entities;
        self
    }

    /// Forces every call to return `error`.
    pub fn with_error(self, error: SyncError) -> Self {
        self.fail_with(error);
        self
    }

    /// Delays every call, simulating network latency.
    pub fn with_latency(self, latency: Duration) -> Self {
        *self.latency.write().unwrap_or_else(PoisonError::into_inner) = Some(latency);
        self
    }

    /// Starts failing every call with `error`.
    pub fn fail_with(&self, error: SyncError) {
        *self.force_error.write().unwrap_or_else(PoisonError::into_inner) = Some(error);
    }

    /// Clears the forced error and returns to normal operation.
    pub fn clear_error(&self) {
        *self.force_error.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Snapshot of the server-side collection.
    pub fn entities(&self) -> Vec<Entity> {
        self.entities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of `list_page` calls made.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of create/update/delete/enable/disable calls made.
    pub fn mutation_calls(&self) -> usize {
        self.mutation_calls.load(Ordering::SeqCst)
    }

    async fn simulate_call(&self) -> Result<(), SyncError> {
        let latency = *self.latency.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        match self
            .force_error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn not_found(id: &str) -> SyncError {
        SyncError::server(404, format!("User not found: {}", id))
    }
}

#[async_trait]
impl ResourceBackend for InMemoryResourceBackend {
    async fn list_page(&self, limit: u32, cursor: Option<&PageCursor>) -> Result<Page, SyncError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_call().await?;

        let offset = match cursor {
            Some(cursor) => cursor
                .as_str()
                .parse::<usize>()
                .map_err(|_| SyncError::server(400, "Invalid pagination token"))?,
            None => 0,
        };
        let entities = self.entities.lock().unwrap_or_else(PoisonError::into_inner);
        let end = offset.saturating_add(limit as usize).min(entities.len());
        let items = entities.get(offset..end).map(<[Entity]>::to_vec).unwrap_or_default();
        let next = (end < entities.len()).then(|| end.to_string());

        Ok(Page::new(items, PageCursor::from_wire(next)))
    }

    async fn create(&self, data: Entity) -> Result<Entity, SyncError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_call().await?;

        let mut created = data;
        if self.identity.canonical_key(&created).is_none() {
            created.set("id", Uuid::new_v4().to_string());
        }
        self.entities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: &str, data: Entity) -> Result<Entity, SyncError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_call().await?;

        let mut entities = self.entities.lock().unwrap_or_else(PoisonError::into_inner);
        let entity = entities
            .iter_mut()
            .find(|e| self.identity.matches(e, id))
            .ok_or_else(|| Self::not_found(id))?;
        for (field, value) in data.into_fields() {
            entity.set(field, value);
        }
        Ok(entity.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), SyncError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_call().await?;

        let mut entities = self.entities.lock().unwrap_or_else(PoisonError::into_inner);
        let before = entities.len();
        entities.retain(|e| !self.identity.matches(e, id));
        if entities.len() == before {
            return Err(Self::not_found(id));
        }
        Ok(())
    }

    async fn set_enabled(&self, id: &str, enabled: bool) -> Result<(), SyncError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_call().await?;

        let mut entities = self.entities.lock().unwrap_or_else(PoisonError::into_inner);
        let entity = entities
            .iter_mut()
            .find(|e| self.identity.matches(e, id))
            .ok_or_else(|| Self::not_found(id))?;
        entity.set_enabled(enabled);
        Ok(())
    }
}
