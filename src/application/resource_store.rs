//! ResourceStore - paginated, mutable local cache of one backend collection.
//!
//! # Operation lane
//!
//! Every load and mutation first acquires a per-store FIFO lane
//! (`tokio::sync::Mutex`), so two deletes fired in quick succession apply
//! their local edits in order. The observable state sits behind a
//! synchronous lock that is never held across an `.await`.
//!
//! # Failure policy
//!
//! - Fetch failures are recovered: `last_error` is set, the cache is kept.
//! - Mutation failures set `last_error` and are returned to the caller.
//! - Mutations are applied locally only after the server confirms them.

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::Mutex;

use super::aggregate::{ScopeToken, ViewScope};
use crate::config::StoreConfig;
use crate::domain::entity::{ConsistencyWarning, Entity, IdentityResolver};
use crate::domain::foundation::{PageCursor, SyncError};
use crate::ports::ResourceBackend;

/// Largest page the list endpoint serves.
pub const MAX_PAGE_LIMIT: u32 = 60;

/// Consistent copy of a store's observable state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    /// Items in server order.
    pub items: Vec<Entity>,
    pub cursor: Option<PageCursor>,
    pub has_more: bool,
    pub loading: bool,
    pub last_error: Option<String>,
    /// Identity inconsistency seen by the most recent mutation.
    pub last_warning: Option<ConsistencyWarning>,
}

/// Handle to one collection cache. Clones share the same state.
#[derive(Clone)]
pub struct ResourceStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    backend: Arc<dyn ResourceBackend>,
    page_limit: u32,
    identity: IdentityResolver,
    lane: Mutex<()>,
    state: RwLock<StoreSnapshot>,
    scope: ViewScope,
}

impl ResourceStore {
    /// Creates an empty store. `page_limit` is clamped to `1..=60`.
    pub fn new(backend: Arc<dyn ResourceBackend>, page_limit: u32) -> Self {
        Self::with_identity(backend, page_limit, IdentityResolver::default())
    }

    pub fn from_config(backend: Arc<dyn ResourceBackend>, config: &StoreConfig) -> Self {
        Self::new(backend, config.page_limit)
    }

    pub fn with_identity(
        backend: Arc<dyn ResourceBackend>,
        page_limit: u32,
        identity: IdentityResolver,
    ) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                backend,
                page_limit: page_limit.clamp(1, MAX_PAGE_LIMIT),
                identity,
                lane: Mutex::new(()),
                state: RwLock::new(StoreSnapshot::default()),
                scope: ViewScope::new(),
            }),
        }
    }

    pub fn page_limit(&self) -> u32 {
        self.inner.page_limit
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drops the results of every operation still in flight.
    ///
    /// Called when the owning view goes away. Network calls already sent
    /// still complete; their results are not applied.
    pub fn teardown(&self) {
        self.inner.scope.teardown();
    }

    /// Fetches one page.
    ///
    /// With `append` the page is concatenated after the current items,
    /// otherwise it replaces them. A failure keeps the current items and
    /// records `last_error`.
    pub async fn load_page(&self, cursor: Option<PageCursor>, append: bool) -> StoreSnapshot {
        let token = self.inner.scope.token();
        let _lane = self.inner.lane.lock().await;
        self.load_in_lane(cursor, append, &token).await
    }

    /// Fetches the next page if the backend reported one.
    ///
    /// Without `has_more` or a held cursor this makes no call and returns
    /// the store unchanged.
    pub async fn load_more(&self) -> StoreSnapshot {
        let token = self.inner.scope.token();
        let _lane = self.inner.lane.lock().await;

        let cursor = {
            let state = self.read_state();
            match (&state.cursor, state.has_more) {
                (Some(cursor), true) => cursor.clone(),
                _ => {
                    tracing::debug!("load_more skipped: no further pages");
                    return state.clone();
                }
            }
        };
        self.load_in_lane(Some(cursor), true, &token).await
    }

    /// Reloads the first page, replacing the collection.
    pub async fn refresh(&self) -> StoreSnapshot {
        self.load_page(None, false).await
    }

    /// Creates an entity and appends the server's copy.
    pub async fn create(&self, data: Entity) -> Result<Entity, SyncError> {
        let token = self.inner.scope.token();
        let _lane = self.inner.lane.lock().await;
        self.begin(&token);

        let created = self.confirm("create", &token, self.inner.backend.create(data).await)?;
        self.apply(&token, |state| {
            state.items.push(created.clone());
        });
        Ok(created)
    }

    /// Updates an entity and replaces the first cached match with the
    /// server's copy.
    pub async fn update(&self, id: &str, data: Entity) -> Result<Entity, SyncError> {
        let token = self.inner.scope.token();
        let _lane = self.inner.lane.lock().await;
        self.begin(&token);

        let updated = self.confirm("update", &token, self.inner.backend.update(id, data).await)?;
        self.apply(&token, |state| {
            let resolution = self.inner.identity.resolve(&state.items, id, "update");
            if let Some(position) = resolution.first() {
                state.items[position] = updated.clone();
            }
            state.last_warning = resolution.warning;
        });
        Ok(updated)
    }

    /// Deletes an entity and removes every cached match.
    pub async fn delete(&self, id: &str) -> Result<(), SyncError> {
        let token = self.inner.scope.token();
        let _lane = self.inner.lane.lock().await;
        self.begin(&token);

        self.confirm("delete", &token, self.inner.backend.delete(id).await)?;
        self.apply(&token, |state| {
            let resolution = self.inner.identity.resolve(&state.items, id, "delete");
            for position in resolution.positions.iter().rev() {
                state.items.remove(*position);
            }
            state.last_warning = resolution.warning;
        });
        Ok(())
    }

    pub async fn enable(&self, id: &str) -> Result<(), SyncError> {
        self.set_enabled(id, true, "enable").await
    }

    pub async fn disable(&self, id: &str) -> Result<(), SyncError> {
        self.set_enabled(id, false, "disable").await
    }

    async fn set_enabled(
        &self,
        id: &str,
        enabled: bool,
        operation: &'static str,
    ) -> Result<(), SyncError> {
        let token = self.inner.scope.token();
        let _lane = self.inner.lane.lock().await;
        self.begin(&token);

        self.confirm(
            operation,
            &token,
            self.inner.backend.set_enabled(id, enabled).await,
        )?;
        self.apply(&token, |state| {
            let resolution = self.inner.identity.resolve(&state.items, id, operation);
            for position in &resolution.positions {
                state.items[*position].set_enabled(enabled);
            }
            state.last_warning = resolution.warning;
        });
        Ok(())
    }

    async fn load_in_lane(
        &self,
        cursor: Option<PageCursor>,
        append: bool,
        token: &ScopeToken,
    ) -> StoreSnapshot {
        self.begin(token);

        let result = self
            .inner
            .backend
            .list_page(self.inner.page_limit, cursor.as_ref())
            .await;

        match result {
            Ok(page) => {
                let has_more = page.has_more();
                let received = page.items.len();
                self.apply(token, |state| {
                    if append {
                        state.items.extend(page.items);
                    } else {
                        state.items = page.items;
                    }
                    state.cursor = page.next;
                    state.has_more = has_more;
                });
                tracing::debug!(received, append, has_more, "Page loaded");
            }
            Err(error) => {
                tracing::warn!(error = %error, append, "Page load failed; keeping cached items");
                self.fail(token, &error);
            }
        }
        self.snapshot()
    }

    /// Marks the start of an operation.
    fn begin(&self, token: &ScopeToken) {
        if token.is_active() {
            let mut state = self.write_state();
            state.loading = true;
            state.last_error = None;
            state.last_warning = None;
        }
    }

    /// Records a mutation failure and hands the result back.
    fn confirm<T>(
        &self,
        operation: &'static str,
        token: &ScopeToken,
        result: Result<T, SyncError>,
    ) -> Result<T, SyncError> {
        result.map_err(|error| {
            tracing::warn!(operation, error = %error, "Mutation rejected");
            self.fail(token, &error);
            error
        })
    }

    fn fail(&self, token: &ScopeToken, error: &SyncError) {
        if token.is_active() {
            let mut state = self.write_state();
            state.loading = false;
            state.last_error = Some(error.to_string());
        }
    }

    /// Applies a confirmed change and ends the operation.
    fn apply(&self, token: &ScopeToken, change: impl FnOnce(&mut StoreSnapshot)) {
        if !token.is_active() {
            tracing::debug!("Store torn down; confirmed result not applied");
            return;
        }
        let mut state = self.write_state();
        change(&mut state);
        state.loading = false;
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, StoreSnapshot> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, StoreSnapshot> {
        self.inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ResourceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceStore")
            .field("page_limit", &self.inner.page_limit)
            .field("state", &*self.read_state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryResourceBackend;

    fn user(id: &str) -> Entity {
        Entity::new().with("id", id)
    }

    fn store_with(entities: Vec<Entity>, limit: u32) -> (ResourceStore, Arc<InMemoryResourceBackend>) {
        let backend = Arc::new(InMemoryResourceBackend::new().with_entities(entities));
        (ResourceStore::new(backend.clone(), limit), backend)
    }

    #[test]
    fn page_limit_is_clamped() {
        let (store, _) = store_with(Vec::new(), 500);
        assert_eq!(store.page_limit(), MAX_PAGE_LIMIT);
        let (store, _) = store_with(Vec::new(), 0);
        assert_eq!(store.page_limit(), 1);
    }

    #[tokio::test]
    async fn refresh_replaces_items_and_tracks_cursor() {
        let (store, _) = store_with(vec![user("a"), user("b"), user("c")], 2);

        let state = store.refresh().await;

        assert_eq!(state.items, vec![user("a"), user("b")]);
        assert!(state.has_more);
        assert_eq!(state.cursor.as_ref().map(PageCursor::as_str), Some("2"));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn load_more_appends_next_page() {
        let (store, _) = store_with(vec![user("a"), user("b"), user("c")], 2);
        store.refresh().await;

        let state = store.load_more().await;

        assert_eq!(state.items.len(), 3);
        assert!(!state.has_more);
        assert!(state.cursor.is_none());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_cache() {
        let (store, backend) = store_with(vec![user("a")], 10);
        store.refresh().await;
        backend.fail_with(SyncError::transport("network error"));

        let state = store.refresh().await;

        assert_eq!(state.items, vec![user("a")]);
        assert_eq!(state.last_error.as_deref(), Some("network error"));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn next_operation_clears_last_error() {
        let (store, backend) = store_with(vec![user("a")], 10);
        backend.fail_with(SyncError::transport("network error"));
        store.refresh().await;
        backend.clear_error();

        let state = store.refresh().await;
        assert!(state.last_error.is_none());
    }

    #[tokio::test]
    async fn create_appends_server_entity() {
        let (store, _) = store_with(Vec::new(), 10);
        let created = store
            .create(Entity::new().with("email", "doc@clinic.test"))
            .await
            .unwrap();

        assert!(created.get_str("id").is_some());
        assert_eq!(store.snapshot().items, vec![created]);
    }

    #[tokio::test]
    async fn failed_mutation_is_returned_and_recorded() {
        let (store, backend) = store_with(vec![user("a")], 10);
        store.refresh().await;
        backend.fail_with(SyncError::server(500, "boom"));

        let err = store.delete("a").await.unwrap_err();

        assert_eq!(err, SyncError::server(500, "boom"));
        let state = store.snapshot();
        assert_eq!(state.items, vec![user("a")]);
        assert_eq!(state.last_error.as_deref(), Some("boom"));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn update_without_cached_match_records_warning() {
        let backend = Arc::new(InMemoryResourceBackend::new().with_entities(vec![user("a")]));
        // Store never loaded, so the cache is empty while the server has "a".
        let store = ResourceStore::new(backend, 10);

        store.update("a", Entity::new().with("role", "admin")).await.unwrap();

        let state = store.snapshot();
        assert!(state.items.is_empty());
        assert_eq!(
            state.last_warning,
            Some(ConsistencyWarning::NoMatch {
                operation: "update",
                id: "a".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn disable_patches_flag_in_place() {
        let (store, backend) = store_with(vec![user("a").with("enabled", true)], 10);
        store.refresh().await;
        let calls = backend.list_calls();

        store.disable("a").await.unwrap();

        assert_eq!(store.snapshot().items[0].enabled(), Some(false));
        assert_eq!(backend.list_calls(), calls);
    }

    #[tokio::test]
    async fn teardown_discards_in_flight_results() {
        let backend = Arc::new(
            InMemoryResourceBackend::new()
                .with_entities(vec![user("a")])
                .with_latency(std::time::Duration::from_millis(20)),
        );
        let store = ResourceStore::new(backend, 10);

        let pending = tokio::spawn({
            let store = store.clone();
            async move { store.refresh().await }
        });
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.teardown();
        pending.await.unwrap();

        assert!(store.snapshot().items.is_empty());
    }
}
