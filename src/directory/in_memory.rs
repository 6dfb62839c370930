//! InMemoryEntityDirectory - BTreeMap-backed directory for testing and development.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use super::{DirectoryError, EntityDirectory, EntityRecord};
use crate::score::EntityId;

#[derive(Default)]
struct Records {
    last_id: u64,
    by_id: HashMap<EntityId, EntityRecord>,
    by_name: BTreeMap<String, EntityId>,
}

/// In-memory entity directory. Ids are assigned sequentially from 1.
///
/// Clone-friendly via Arc.
#[derive(Clone, Default)]
pub struct InMemoryEntityDirectory {
    records: Arc<RwLock<Records>>,
}

impl InMemoryEntityDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, DirectoryError> {
        let records = self
            .records
            .read()
            .map_err(|_| DirectoryError::LockPoisoned("len"))?;
        Ok(records.by_id.len())
    }

    pub fn is_empty(&self) -> Result<bool, DirectoryError> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl EntityDirectory for InMemoryEntityDirectory {
    async fn create(&self, display_name: &str) -> Result<EntityRecord, DirectoryError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| DirectoryError::LockPoisoned("create"))?;

        if records.by_name.contains_key(display_name) {
            return Err(DirectoryError::DuplicateName(display_name.to_string()));
        }

        records.last_id += 1;
        let now = Utc::now();
        let record = EntityRecord {
            id: EntityId(records.last_id),
            display_name: display_name.to_string(),
            created_at: now,
            updated_at: now,
        };
        records
            .by_name
            .insert(record.display_name.clone(), record.id);
        records.by_id.insert(record.id, record.clone());
        Ok(record)
    }

    async fn remove(&self, id: EntityId) -> Result<Option<EntityRecord>, DirectoryError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| DirectoryError::LockPoisoned("remove"))?;
        let removed = records.by_id.remove(&id);
        if let Some(record) = &removed {
            records.by_name.remove(&record.display_name);
        }
        Ok(removed)
    }

    async fn get(&self, id: EntityId) -> Result<Option<EntityRecord>, DirectoryError> {
        let records = self
            .records
            .read()
            .map_err(|_| DirectoryError::LockPoisoned("get"))?;
        Ok(records.by_id.get(&id).cloned())
    }

    async fn touch(&self, id: EntityId) -> Result<EntityRecord, DirectoryError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| DirectoryError::LockPoisoned("touch"))?;
        let record = records
            .by_id
            .get_mut(&id)
            .ok_or(DirectoryError::NotFound(id))?;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn metadata_for(
        &self,
        ids: &[EntityId],
    ) -> Result<HashMap<EntityId, EntityRecord>, DirectoryError> {
        let records = self
            .records
            .read()
            .map_err(|_| DirectoryError::LockPoisoned("metadata_for"))?;
        Ok(ids
            .iter()
            .filter_map(|id| records.by_id.get(id).map(|r| (*id, r.clone())))
            .collect())
    }

    async fn search_prefix(
        &self,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<EntityRecord>, DirectoryError> {
        let records = self
            .records
            .read()
            .map_err(|_| DirectoryError::LockPoisoned("search_prefix"))?;
        Ok(records
            .by_name
            .range(prefix.to_string()..)
            .take_while(|(name, _)| name.starts_with(prefix))
            .take(limit)
            .filter_map(|(_, id)| records.by_id.get(id).cloned())
            .collect())
    }
}
