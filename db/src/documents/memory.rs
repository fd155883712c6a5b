use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{
    AchievementContent, AchievementDocument, AchievementDocumentStore, AchievementType, Attachment,
    DocumentStoreError,
};

/// Process-local document store. Ids are ObjectId hex strings so they look the
/// same as the ones MongoDB hands out.
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<String, AchievementDocument>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw lookup that ignores soft deletion.
    pub async fn get_raw(&self, id: &str) -> Option<AchievementDocument> {
        self.documents.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    async fn live(&self, ids: &[String]) -> Vec<AchievementDocument> {
        let docs = self.documents.read().await;
        ids.iter()
            .filter_map(|id| docs.get(id))
            .filter(|d| d.deleted_at.is_none())
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AchievementDocumentStore for MemoryDocumentStore {
    async fn insert(
        &self,
        student_id: &str,
        content: AchievementContent,
    ) -> Result<AchievementDocument, DocumentStoreError> {
        let now = Utc::now();
        let document = AchievementDocument {
            id: ObjectId::new().to_hex(),
            student_id: student_id.to_owned(),
            achievement_type: content.achievement_type,
            title: content.title,
            description: content.description,
            details: content.details,
            attachments: Vec::new(),
            tags: content.tags,
            points: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        self.documents
            .write()
            .await
            .insert(document.id.clone(), document.clone());
        Ok(document)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<AchievementDocument>, DocumentStoreError> {
        Ok(self
            .documents
            .read()
            .await
            .get(id)
            .filter(|d| d.deleted_at.is_none())
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<AchievementDocument>, DocumentStoreError> {
        Ok(self.live(ids).await)
    }

    async fn update_content(
        &self,
        id: &str,
        content: AchievementContent,
    ) -> Result<Option<AchievementDocument>, DocumentStoreError> {
        let mut docs = self.documents.write().await;
        let Some(doc) = docs.get_mut(id).filter(|d| d.deleted_at.is_none()) else {
            return Ok(None);
        };

        doc.achievement_type = content.achievement_type;
        doc.title = content.title;
        doc.description = content.description;
        doc.details = content.details;
        doc.tags = content.tags;
        doc.updated_at = Utc::now();
        Ok(Some(doc.clone()))
    }

    async fn add_attachments(
        &self,
        id: &str,
        attachments: Vec<Attachment>,
    ) -> Result<Option<AchievementDocument>, DocumentStoreError> {
        let mut docs = self.documents.write().await;
        let Some(doc) = docs.get_mut(id).filter(|d| d.deleted_at.is_none()) else {
            return Ok(None);
        };

        doc.attachments.extend(attachments);
        doc.updated_at = Utc::now();
        Ok(Some(doc.clone()))
    }

    async fn set_points(&self, id: &str, points: i32) -> Result<bool, DocumentStoreError> {
        let mut docs = self.documents.write().await;
        match docs.get_mut(id).filter(|d| d.deleted_at.is_none()) {
            Some(doc) => {
                doc.points = points;
                doc.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn soft_delete(&self, id: &str) -> Result<bool, DocumentStoreError> {
        let mut docs = self.documents.write().await;
        match docs.get_mut(id).filter(|d| d.deleted_at.is_none()) {
            Some(doc) => {
                let now = Utc::now();
                doc.deleted_at = Some(now);
                doc.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, id: &str) -> Result<bool, DocumentStoreError> {
        Ok(self.documents.write().await.remove(id).is_some())
    }

    async fn sum_points(&self, ids: &[String]) -> Result<i64, DocumentStoreError> {
        Ok(self
            .live(ids)
            .await
            .iter()
            .map(|d| i64::from(d.points))
            .sum())
    }

    async fn count_by_type(
        &self,
        ids: &[String],
    ) -> Result<HashMap<AchievementType, u64>, DocumentStoreError> {
        let mut counts = HashMap::new();
        for doc in self.live(ids).await {
            *counts.entry(doc.achievement_type).or_insert(0) += 1;
        }
        Ok(counts)
    }
}
