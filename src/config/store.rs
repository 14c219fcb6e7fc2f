//! Resource store configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::application::resource_store::MAX_PAGE_LIMIT;

/// Paging configuration for resource stores
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Items requested per page
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
}

impl StoreConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=MAX_PAGE_LIMIT).contains(&self.page_limit) {
            return Err(ValidationError::InvalidPageLimit(self.page_limit));
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            page_limit: default_page_limit(),
        }
    }
}

fn default_page_limit() -> u32 {
    MAX_PAGE_LIMIT
}
