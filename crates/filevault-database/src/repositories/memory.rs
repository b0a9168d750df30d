//! In-process file repository.
//!
//! Holds every record in a map behind a single `RwLock`. Each operation
//! runs under one lock acquisition, so a reorder's shift and move are
//! never observed separately. Contents are lost when the process exits.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use filevault_core::result::AppResult;
use filevault_core::types::{FileId, OwnerId};
use filevault_entity::file::{CreateFileRecord, FileRecord, FileStats, MovePlan};

use super::file::{FileRepository, file_not_found};

/// File repository backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryFileRepository {
    records: RwLock<HashMap<FileId, FileRecord>>,
}

impl MemoryFileRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

fn max_position(records: &HashMap<FileId, FileRecord>, owner: OwnerId) -> i64 {
    records
        .values()
        .filter(|r| r.owner_id == owner)
        .map(|r| r.position)
        .max()
        .unwrap_or(0)
}

#[async_trait]
impl FileRepository for MemoryFileRepository {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn create(&self, data: &CreateFileRecord) -> AppResult<FileRecord> {
        let mut records = self.records.write().await;
        let now = Utc::now();
        let record = FileRecord {
            id: FileId::new(),
            owner_id: data.owner_id,
            name: data.name.clone(),
            mime_type: data.mime_type.clone(),
            size_bytes: data.size_bytes,
            storage_path: data.storage_path.clone(),
            url: data.url.clone(),
            thumbnail_url: data.thumbnail_url.clone(),
            tags: Vec::new(),
            position: max_position(&records, data.owner_id) + 1,
            stats: FileStats::default(),
            created_at: now,
            updated_at: now,
        };
        records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn list_by_owner(&self, owner: OwnerId, tag: Option<&str>) -> AppResult<Vec<FileRecord>> {
        let records = self.records.read().await;
        let mut owned: Vec<FileRecord> = records
            .values()
            .filter(|r| r.owner_id == owner)
            .filter(|r| tag.is_none_or(|t| r.has_tag(t)))
            .cloned()
            .collect();
        owned.sort_by_key(|r| r.position);
        Ok(owned)
    }

    async fn find_by_id(&self, id: FileId) -> AppResult<Option<FileRecord>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn find_owned(&self, id: FileId, owner: OwnerId) -> AppResult<Option<FileRecord>> {
        Ok(self
            .records
            .read()
            .await
            .get(&id)
            .filter(|r| r.owner_id == owner)
            .cloned())
    }

    async fn update_tags(
        &self,
        id: FileId,
        owner: OwnerId,
        tags: &[String],
    ) -> AppResult<FileRecord> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&id)
            .filter(|r| r.owner_id == owner)
            .ok_or_else(|| file_not_found(id))?;
        record.tags = tags.to_vec();
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn move_to_position(
        &self,
        id: FileId,
        owner: OwnerId,
        requested: i64,
    ) -> AppResult<FileRecord> {
        let mut records = self.records.write().await;
        let current = records
            .get(&id)
            .filter(|r| r.owner_id == owner)
            .map(|r| r.position)
            .ok_or_else(|| file_not_found(id))?;

        let plan = MovePlan::compute(current, requested, max_position(&records, owner))?;
        let now = Utc::now();

        if !plan.is_noop() {
            for record in records
                .values_mut()
                .filter(|r| r.owner_id == owner && r.id != id)
            {
                let shifted = plan.shifted(record.position);
                if shifted != record.position {
                    record.position = shifted;
                    record.updated_at = now;
                }
            }
        }

        let record = records.get_mut(&id).ok_or_else(|| file_not_found(id))?;
        record.position = plan.target;
        record.updated_at = now;
        Ok(record.clone())
    }

    async fn delete(&self, id: FileId, owner: OwnerId) -> AppResult<()> {
        let mut records = self.records.write().await;
        match records.get(&id) {
            Some(r) if r.owner_id == owner => {
                records.remove(&id);
                Ok(())
            }
            _ => Err(file_not_found(id)),
        }
    }

    async fn record_view(&self, id: FileId) -> AppResult<FileStats> {
        let mut records = self.records.write().await;
        let record = records.get_mut(&id).ok_or_else(|| file_not_found(id))?;
        record.stats.view_count += 1;
        record.stats.last_viewed_at = Some(Utc::now());
        Ok(record.stats.clone())
    }

    async fn record_download(&self, id: FileId) -> AppResult<FileStats> {
        let mut records = self.records.write().await;
        let record = records.get_mut(&id).ok_or_else(|| file_not_found(id))?;
        record.stats.download_count += 1;
        Ok(record.stats.clone())
    }

    async fn record_share(&self, id: FileId, owner: OwnerId) -> AppResult<FileStats> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&id)
            .filter(|r| r.owner_id == owner)
            .ok_or_else(|| file_not_found(id))?;
        record.stats.share_count += 1;
        Ok(record.stats.clone())
    }
}
