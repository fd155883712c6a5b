//! Document half of an achievement: title, type-specific details, attachments
//! and points.
//!
//! The workflow layer only talks to [`AchievementDocumentStore`]; which backend
//! sits behind it is decided once at startup.

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use strum::{Display, EnumIter, EnumString};
use thiserror::Error;

pub use memory::MemoryDocumentStore;
pub use mongo::MongoDocumentStore;

#[derive(Debug, Error)]
pub enum DocumentStoreError {
    #[error("invalid document id '{0}'")]
    InvalidId(String),
    #[error("mongodb error: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("bson serialization error: {0}")]
    Serialize(#[from] bson::ser::Error),
    #[error("bson deserialization error: {0}")]
    Deserialize(#[from] bson::de::Error),
    #[error("document store unavailable: {0}")]
    Unavailable(String),
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AchievementType {
    Competition,
    Publication,
    Organization,
    Certification,
    Event,
    #[default]
    #[serde(other)]
    Other,
}

impl AchievementType {
    /// Unknown or empty labels land in `Other`.
    pub fn from_label(label: &str) -> Self {
        label.trim().parse().unwrap_or(AchievementType::Other)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompetitionDetails {
    pub competition_name: Option<String>,
    pub competition_level: Option<String>,
    pub rank: Option<i32>,
    pub medal_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublicationDetails {
    pub publication_type: Option<String>,
    pub publication_title: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    pub publisher: Option<String>,
    pub issn: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationDetails {
    pub organization_name: Option<String>,
    pub position: Option<String>,
    pub period_start: Option<DateTime<Utc>>,
    pub period_end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CertificationDetails {
    pub certification_name: Option<String>,
    pub issued_by: Option<String>,
    pub certification_number: Option<String>,
    pub valid_until: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventDetails {
    pub event_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub organizer: Option<String>,
    pub score: Option<f64>,
}

/// Type-specific details. Each variant's block is optional and independent of
/// `achievement_type`; nothing enforces that they line up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AchievementDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competition: Option<CompetitionDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication: Option<PublicationDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<OrganizationDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certification: Option<CertificationDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<EventDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_name: String,
    pub file_url: String,
    pub file_type: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Student-editable content of an achievement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AchievementContent {
    #[serde(default)]
    pub achievement_type: AchievementType,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub details: AchievementDetails,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementDocument {
    pub id: String,
    /// Copied from the reference at creation. Not used for authorization.
    pub student_id: String,
    pub achievement_type: AchievementType,
    pub title: String,
    pub description: String,
    pub details: AchievementDetails,
    pub attachments: Vec<Attachment>,
    pub tags: Vec<String>,
    pub points: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Persistence port for achievement documents.
///
/// Reads never return soft-deleted documents. Mutations report whether a live
/// document matched; `remove` is a hard delete and is only meant for undoing a
/// create.
#[async_trait]
pub trait AchievementDocumentStore: Send + Sync {
    async fn insert(
        &self,
        student_id: &str,
        content: AchievementContent,
    ) -> Result<AchievementDocument, DocumentStoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<AchievementDocument>, DocumentStoreError>;

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<AchievementDocument>, DocumentStoreError>;

    async fn update_content(
        &self,
        id: &str,
        content: AchievementContent,
    ) -> Result<Option<AchievementDocument>, DocumentStoreError>;

    async fn add_attachments(
        &self,
        id: &str,
        attachments: Vec<Attachment>,
    ) -> Result<Option<AchievementDocument>, DocumentStoreError>;

    async fn set_points(&self, id: &str, points: i32) -> Result<bool, DocumentStoreError>;

    async fn soft_delete(&self, id: &str) -> Result<bool, DocumentStoreError>;

    async fn remove(&self, id: &str) -> Result<bool, DocumentStoreError>;

    async fn sum_points(&self, ids: &[String]) -> Result<i64, DocumentStoreError>;

    async fn count_by_type(
        &self,
        ids: &[String],
    ) -> Result<HashMap<AchievementType, u64>, DocumentStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_type_labels_become_other() {
        assert_eq!(AchievementType::from_label("Competition"), AchievementType::Competition);
        assert_eq!(AchievementType::from_label("Lainnya"), AchievementType::Other);
        assert_eq!(AchievementType::from_label(""), AchievementType::Other);

        let parsed: AchievementType = serde_json::from_str("\"hackathon\"").unwrap();
        assert_eq!(parsed, AchievementType::Other);
    }

    #[test]
    fn content_defaults_missing_fields() {
        let content: AchievementContent = serde_json::from_str(r#"{"title":"Regional chess"}"#).unwrap();
        assert_eq!(content.achievement_type, AchievementType::Other);
        assert!(content.tags.is_empty());
        assert_eq!(content.details, AchievementDetails::default());
    }
}
