//! REST adapter for the user-account collection.

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;

use super::ApiClient;
use crate::domain::entity::Entity;
use crate::domain::foundation::{PageCursor, SyncError};
use crate::ports::{Page, ResourceBackend};

const USERS: &str = "users";

/// Wire shape of `GET /users`.
#[derive(Debug, Deserialize)]
struct ListUsersResponse {
    users: Vec<Entity>,
    #[serde(rename = "nextToken", default)]
    next_token: Option<String>,
}

/// User accounts backed by the admin REST endpoints.
#[derive(Clone)]
pub struct RestUserResource {
    client: ApiClient,
}

impl RestUserResource {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceBackend for RestUserResource {
    async fn list_page(&self, limit: u32, cursor: Option<&PageCursor>) -> Result<Page, SyncError> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(cursor) = cursor {
            query.push(("nextToken", cursor.as_str().to_string()));
        }

        let request = self
            .client
            .request(Method::GET, self.client.endpoint(&[USERS]))
            .await
            .query(&query);
        let body: ListUsersResponse = self.client.send_json(request).await?;

        tracing::debug!(count = body.users.len(), "Listed users page");
        Ok(Page::new(body.users, PageCursor::from_wire(body.next_token)))
    }

    async fn create(&self, data: Entity) -> Result<Entity, SyncError> {
        let request = self
            .client
            .request(Method::POST, self.client.endpoint(&[USERS]))
            .await
            .json(&data);
        self.client.send_json(request).await
    }

    async fn update(&self, id: &str, data: Entity) -> Result<Entity, SyncError> {
        let request = self
            .client
            .request(Method::PUT, self.client.endpoint(&[USERS, id]))
            .await
            .json(&data);
        self.client.send_json(request).await
    }

    async fn delete(&self, id: &str) -> Result<(), SyncError> {
        let request = self
            .client
            .request(Method::DELETE, self.client.endpoint(&[USERS, id]))
            .await;
        self.client.send_empty(request).await
    }

    async fn set_enabled(&self, id: &str, enabled: bool) -> Result<(), SyncError> {
        let action = if enabled { "enable" } else { "disable" };
        let request = self
            .client
            .request(Method::POST, self.client.endpoint(&[USERS, id, action]))
            .await;
        self.client.send_empty(request).await
    }
}
