use async_trait::async_trait;
use bson::{Bson, Document, doc, oid::ObjectId};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{Client, Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

use super::{
    AchievementContent, AchievementDetails, AchievementDocument, AchievementDocumentStore,
    AchievementType, Attachment, DocumentStoreError,
};

pub const ACHIEVEMENT_COLLECTION: &str = "achievements";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttachmentRecord {
    file_name: String,
    file_url: String,
    file_type: String,
    uploaded_at: bson::DateTime,
}

/// Stored shape of an achievement. The type is kept as a raw label so that
/// documents written by other tools still load.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AchievementRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    student_id: String,
    #[serde(default)]
    achievement_type: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    details: AchievementDetails,
    #[serde(default)]
    attachments: Vec<AttachmentRecord>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    points: i32,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    deleted_at: Option<bson::DateTime>,
}

impl From<AttachmentRecord> for Attachment {
    fn from(r: AttachmentRecord) -> Self {
        Attachment {
            file_name: r.file_name,
            file_url: r.file_url,
            file_type: r.file_type,
            uploaded_at: r.uploaded_at.to_chrono(),
        }
    }
}

impl From<&Attachment> for AttachmentRecord {
    fn from(a: &Attachment) -> Self {
        AttachmentRecord {
            file_name: a.file_name.clone(),
            file_url: a.file_url.clone(),
            file_type: a.file_type.clone(),
            uploaded_at: bson::DateTime::from_chrono(a.uploaded_at),
        }
    }
}

impl AchievementRecord {
    fn into_document(self) -> Option<AchievementDocument> {
        Some(AchievementDocument {
            id: self.id?.to_hex(),
            student_id: self.student_id,
            achievement_type: AchievementType::from_label(&self.achievement_type),
            title: self.title,
            description: self.description,
            details: self.details,
            attachments: self.attachments.into_iter().map(Attachment::from).collect(),
            tags: self.tags,
            points: self.points,
            created_at: self.created_at.to_chrono(),
            updated_at: self.updated_at.to_chrono(),
            deleted_at: self.deleted_at.map(|d| d.to_chrono()),
        })
    }
}

/// MongoDB-backed document store.
#[derive(Clone)]
pub struct MongoDocumentStore {
    collection: Collection<AchievementRecord>,
}

impl MongoDocumentStore {
    /// Connects, pings the server and makes sure the lookup index exists.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, DocumentStoreError> {
        info!("Connecting to MongoDB database '{}'", database);
        let client = Client::with_uri_str(uri).await?;
        let db = client.database(database);
        db.run_command(doc! { "ping": 1 }).await?;

        let store = Self::new(&db);
        store
            .collection
            .create_index(IndexModel::builder().keys(doc! { "studentId": 1 }).build())
            .await?;
        Ok(store)
    }

    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(ACHIEVEMENT_COLLECTION),
        }
    }

    fn live_filter(id: ObjectId) -> Document {
        doc! { "_id": id, "deletedAt": Bson::Null }
    }

    fn live_in(ids: &[String]) -> Document {
        let oids: Vec<ObjectId> = ids
            .iter()
            .filter_map(|id| match ObjectId::parse_str(id) {
                Ok(oid) => Some(oid),
                Err(_) => {
                    warn!(document_id = %id, "Skipping malformed document id");
                    None
                }
            })
            .collect();
        doc! { "_id": { "$in": oids }, "deletedAt": Bson::Null }
    }
}

fn parse_id(id: &str) -> Result<ObjectId, DocumentStoreError> {
    ObjectId::parse_str(id).map_err(|_| DocumentStoreError::InvalidId(id.to_owned()))
}

fn as_i64(value: Option<&Bson>) -> i64 {
    match value {
        Some(Bson::Int32(v)) => i64::from(*v),
        Some(Bson::Int64(v)) => *v,
        Some(Bson::Double(v)) => *v as i64,
        _ => 0,
    }
}

#[async_trait]
impl AchievementDocumentStore for MongoDocumentStore {
    async fn insert(
        &self,
        student_id: &str,
        content: AchievementContent,
    ) -> Result<AchievementDocument, DocumentStoreError> {
        let now = bson::DateTime::from_chrono(Utc::now());
        let mut record = AchievementRecord {
            id: None,
            student_id: student_id.to_owned(),
            achievement_type: content.achievement_type.to_string(),
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

        let result = self.collection.insert_one(&record).await?;
        record.id = result.inserted_id.as_object_id();
        record
            .into_document()
            .ok_or_else(|| DocumentStoreError::Unavailable("insert returned no ObjectId".into()))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<AchievementDocument>, DocumentStoreError> {
        let oid = parse_id(id)?;
        let record = self.collection.find_one(Self::live_filter(oid)).await?;
        Ok(record.and_then(AchievementRecord::into_document))
    }

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<AchievementDocument>, DocumentStoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let records: Vec<AchievementRecord> =
            self.collection.find(Self::live_in(ids)).await?.try_collect().await?;
        Ok(records
            .into_iter()
            .filter_map(AchievementRecord::into_document)
            .collect())
    }

    async fn update_content(
        &self,
        id: &str,
        content: AchievementContent,
    ) -> Result<Option<AchievementDocument>, DocumentStoreError> {
        let oid = parse_id(id)?;
        let update = doc! {
            "$set": {
                "achievementType": content.achievement_type.to_string(),
                "title": content.title,
                "description": content.description,
                "details": bson::to_bson(&content.details)?,
                "tags": content.tags,
                "updatedAt": bson::DateTime::from_chrono(Utc::now()),
            }
        };

        let result = self.collection.update_one(Self::live_filter(oid), update).await?;
        if result.matched_count == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn add_attachments(
        &self,
        id: &str,
        attachments: Vec<Attachment>,
    ) -> Result<Option<AchievementDocument>, DocumentStoreError> {
        let oid = parse_id(id)?;
        let records: Vec<AttachmentRecord> = attachments.iter().map(AttachmentRecord::from).collect();
        let update = doc! {
            "$push": { "attachments": { "$each": bson::to_bson(&records)? } },
            "$set": { "updatedAt": bson::DateTime::from_chrono(Utc::now()) },
        };

        let result = self.collection.update_one(Self::live_filter(oid), update).await?;
        if result.matched_count == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn set_points(&self, id: &str, points: i32) -> Result<bool, DocumentStoreError> {
        let oid = parse_id(id)?;
        let update = doc! {
            "$set": {
                "points": points,
                "updatedAt": bson::DateTime::from_chrono(Utc::now()),
            }
        };
        let result = self.collection.update_one(Self::live_filter(oid), update).await?;
        Ok(result.matched_count > 0)
    }

    async fn soft_delete(&self, id: &str) -> Result<bool, DocumentStoreError> {
        let oid = parse_id(id)?;
        let now = bson::DateTime::from_chrono(Utc::now());
        let update = doc! { "$set": { "deletedAt": now, "updatedAt": now } };
        let result = self.collection.update_one(Self::live_filter(oid), update).await?;
        Ok(result.matched_count > 0)
    }

    async fn remove(&self, id: &str) -> Result<bool, DocumentStoreError> {
        let oid = parse_id(id)?;
        let result = self.collection.delete_one(doc! { "_id": oid }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn sum_points(&self, ids: &[String]) -> Result<i64, DocumentStoreError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let pipeline = vec![
            doc! { "$match": Self::live_in(ids) },
            doc! { "$group": { "_id": Bson::Null, "total": { "$sum": "$points" } } },
        ];

        let mut cursor = self.collection.aggregate(pipeline).await?;
        match cursor.try_next().await? {
            Some(row) => Ok(as_i64(row.get("total"))),
            None => Ok(0),
        }
    }

    async fn count_by_type(
        &self,
        ids: &[String],
    ) -> Result<HashMap<AchievementType, u64>, DocumentStoreError> {
        let mut counts = HashMap::new();
        if ids.is_empty() {
            return Ok(counts);
        }
        let pipeline = vec![
            doc! { "$match": Self::live_in(ids) },
            doc! { "$group": { "_id": "$achievementType", "count": { "$sum": 1 } } },
        ];

        let rows: Vec<Document> = self.collection.aggregate(pipeline).await?.try_collect().await?;
        for row in rows {
            let label = row.get_str("_id").unwrap_or_default();
            let count = as_i64(row.get("count")).max(0) as u64;
            // Several raw labels can fold into `Other`.
            *counts.entry(AchievementType::from_label(label)).or_insert(0) += count;
        }
        Ok(counts)
    }
}
