//! Paged, mutable resource port.
//!
//! Abstracts one backend collection (user accounts in practice) behind the
//! operations a [`ResourceStore`](crate::application::ResourceStore) needs.
//!
//! | Port method | User endpoint |
//! |-------------|---------------|
//! | `list_page` | `listUsers(limit, nextToken)` |
//! | `create` | `createUser(data)` |
//! | `update` | `updateUser(id, data)` |
//! | `delete` | `deleteUser(id)` |
//! | `set_enabled(true/false)` | `enableUser(id)` / `disableUser(id)` |

use async_trait::async_trait;

use crate::domain::entity::Entity;
use crate::domain::foundation::{PageCursor, SyncError};

/// One page of a listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Items in server order.
    pub items: Vec<Entity>,
    /// Continuation token; `None` means no more pages.
    pub next: Option<PageCursor>,
}

impl Page {
    pub fn new(items: Vec<Entity>, next: Option<PageCursor>) -> Self {
        Self { items, next }
    }

    pub fn has_more(&self) -> bool {
        self.next.is_some()
    }
}

/// Backend operations for one paginated collection.
///
/// # Contract
///
/// - `create` and `update` return the server's canonical entity
/// - `delete` and `set_enabled` return nothing on success
/// - Ids may be any recognised identifier value (`id`, `sub`, `uniqueId`)
#[async_trait]
pub trait ResourceBackend: Send + Sync {
    /// Fetch one page, starting after `cursor` (or from the start).
    async fn list_page(&self, limit: u32, cursor: Option<&PageCursor>) -> Result<Page, SyncError>;

    async fn create(&self, data: Entity) -> Result<Entity, SyncError>;

    async fn update(&self, id: &str, data: Entity) -> Result<Entity, SyncError>;

    async fn delete(&self, id: &str) -> Result<(), SyncError>;

    /// Enable or disable the account.
    async fn set_enabled(&self, id: &str, enabled: bool) -> Result<(), SyncError>;
}
