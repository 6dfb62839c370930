//! Entity directory - display metadata for ranked entities.
//!
//! The ranking engine never reads the directory. Callers compute ranks first and
//! then join the result against the directory by id.

mod in_memory;

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::score::EntityId;

/// Metadata for one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: EntityId,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Error type for entity directory operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// No entity with this id.
    NotFound(EntityId),
    /// Display names are unique.
    DuplicateName(String),
    /// An in-process directory's lock was poisoned.
    LockPoisoned(&'static str),
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectoryError::NotFound(id) => write!(f, "entity not found: {}", id),
            DirectoryError::DuplicateName(name) => {
                write!(f, "display name already taken: {}", name)
            }
            DirectoryError::LockPoisoned(operation) => {
                write!(f, "directory lock poisoned during {}", operation)
            }
        }
    }
}

impl std::error::Error for DirectoryError {}

impl DirectoryError {
    /// Map this error to an HTTP-style status code.
    pub fn status_code(&self) -> u16 {
        match self {
            DirectoryError::NotFound(_) => 404,
            DirectoryError::DuplicateName(_) => 409,
            DirectoryError::LockPoisoned(_) => 500,
        }
    }
}

#[async_trait]
pub trait EntityDirectory: Send + Sync {
    /// Register a new entity and assign it a fresh id.
    async fn create(&self, display_name: &str) -> Result<EntityRecord, DirectoryError>;

    /// Drop a record and release its display name. Returns the removed record.
    async fn remove(&self, id: EntityId) -> Result<Option<EntityRecord>, DirectoryError>;

    async fn get(&self, id: EntityId) -> Result<Option<EntityRecord>, DirectoryError>;

    /// Bump `updated_at`. Fails with `NotFound` for unknown ids.
    async fn touch(&self, id: EntityId) -> Result<EntityRecord, DirectoryError>;

    /// Records for `ids`; unknown ids are left out.
    async fn metadata_for(
        &self,
        ids: &[EntityId],
    ) -> Result<HashMap<EntityId, EntityRecord>, DirectoryError>;

    /// Up to `limit` records whose display name starts with `prefix`, by name.
    async fn search_prefix(
        &self,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<EntityRecord>, DirectoryError>;
}

pub use in_memory::InMemoryEntityDirectory;
