//! Achievement workflow: `draft -> submitted -> verified | rejected`, and
//! `draft -> deleted`.
//!
//! An achievement is one reference row (status, owner) plus one document
//! (content). The public id is the document id. Status lives only on the
//! reference; ownership is always resolved through the reference, never through
//! the `student_id` copied onto the document.
//!
//! The two stores do not share a transaction. Writes are ordered so that the
//! side effect that is easiest to undo happens first, and a failure of the
//! second write triggers a compensating write on the first.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use db::documents::{
    AchievementContent, AchievementDetails, AchievementDocument, AchievementDocumentStore,
    AchievementType, Attachment,
};
use db::models::achievement_reference::{self, AchievementStatus};
use db::models::{achievement_status_history, lecturer, student};
use db::rbac::RoleName;
use db::repositories::AchievementReferenceRepository;
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;
use tracing::{error, info, warn};
use util::pagination::{Page, Pagination};

use crate::caller::Caller;
use crate::error::{ServiceError, ServiceResult};

/// Reference and document joined into one record.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AchievementView {
    /// Document id; this is the id used in every achievement route.
    pub id: String,
    pub reference_id: String,
    pub student_id: String,
    pub status: AchievementStatus,
    pub achievement_type: AchievementType,
    pub title: String,
    pub description: String,
    pub details: AchievementDetails,
    pub attachments: Vec<Attachment>,
    pub tags: Vec<String>,
    pub points: i32,
    pub submitted_at: Option<DateTime<Utc>>,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<String>,
    pub rejection_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AchievementView {
    pub fn new(reference: achievement_reference::Model, document: AchievementDocument) -> Self {
        Self {
            id: document.id,
            reference_id: reference.id,
            student_id: reference.student_id,
            status: reference.status,
            achievement_type: document.achievement_type,
            title: document.title,
            description: document.description,
            details: document.details,
            attachments: document.attachments,
            tags: document.tags,
            points: document.points,
            submitted_at: reference.submitted_at,
            verified_at: reference.verified_at,
            verified_by: reference.verified_by,
            rejection_note: reference.rejection_note,
            created_at: reference.created_at,
            updated_at: document.updated_at.max(reference.updated_at),
        }
    }
}

pub struct AchievementService {
    db: DatabaseConnection,
    references: AchievementReferenceRepository,
    documents: Arc<dyn AchievementDocumentStore>,
}

impl AchievementService {
    pub fn new(db: DatabaseConnection, documents: Arc<dyn AchievementDocumentStore>) -> Self {
        let references = AchievementReferenceRepository::new(db.clone());
        Self {
            db,
            references,
            documents,
        }
    }

    /// Creates the document, then the reference. If the reference insert fails
    /// the document is removed again.
    pub async fn create(&self, caller: &Caller, content: AchievementContent) -> ServiceResult<AchievementView> {
        validate_content(&content)?;

        let student = student::Model::find_by_user_id(&self.db, &caller.user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Student profile not found".into()))?;

        let document = self.documents.insert(&student.id, content).await?;

        let reference = match self.references.create(&student.id, &document.id).await {
            Ok(reference) => reference,
            Err(err) => {
                warn!(document_id = %document.id, error = %err, "Reference insert failed; removing document");
                if let Err(cleanup) = self.documents.remove(&document.id).await {
                    error!(
                        document_id = %document.id,
                        error = %cleanup,
                        "Failed to remove orphaned achievement document"
                    );
                }
                return Err(ServiceError::Internal(format!("failed to create achievement: {err}")));
            }
        };

        self.record_history(&reference.id, None, AchievementStatus::Draft, &caller.user_id, None)
            .await;
        info!(achievement_id = %document.id, student_id = %student.id, "Achievement created");
        Ok(AchievementView::new(reference, document))
    }

    pub async fn get(&self, id: &str) -> ServiceResult<AchievementView> {
        let (reference, document) = self.load(id).await?;
        Ok(AchievementView::new(reference, document))
    }

    /// Role-scoped listing: students see their own, lecturers see their
    /// advisees' submitted items, admins see everything not deleted.
    pub async fn list(&self, caller: &Caller, pagination: &Pagination) -> ServiceResult<Page<AchievementView>> {
        let references = match caller.role_name() {
            Some(RoleName::Student) => {
                let student = student::Model::find_by_user_id(&self.db, &caller.user_id)
                    .await?
                    .ok_or_else(|| ServiceError::NotFound("Student profile not found".into()))?;
                self.references.list_for_student(&student.id).await?
            }
            // A lecturer account without a profile advises nobody.
            Some(RoleName::Lecturer) => match lecturer::Model::find_by_user_id(&self.db, &caller.user_id).await? {
                Some(lecturer) => {
                    let advisee_ids: Vec<String> = student::Model::find_by_advisor(&self.db, &lecturer.id)
                        .await?
                        .into_iter()
                        .map(|s| s.id)
                        .collect();
                    self.references.list_submitted_for_students(&advisee_ids).await?
                }
                None => Vec::new(),
            },
            Some(RoleName::Admin) => self.references.list_live().await?,
            None => Vec::new(),
        };

        let views = self.join(references).await?;
        Ok(pagination.apply(views))
    }

    /// Every live achievement of one student.
    pub async fn list_for_student(&self, student_id: &str) -> ServiceResult<Vec<AchievementView>> {
        student::Entity::find_by_id(student_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Student"))?;

        let references = self.references.list_for_student(student_id).await?;
        self.join(references).await
    }

    pub async fn update(
        &self,
        caller: &Caller,
        id: &str,
        content: AchievementContent,
    ) -> ServiceResult<AchievementView> {
        validate_content(&content)?;
        let (reference, _) = self.load(id).await?;
        self.ensure_owner(caller, &reference).await?;
        ensure_status(&reference, AchievementStatus::Draft, "Only draft achievements can be updated")?;

        let document = self
            .documents
            .update_content(&reference.document_id, content)
            .await?
            .ok_or_else(|| ServiceError::not_found("Achievement"))?;

        info!(achievement_id = %id, "Achievement updated");
        Ok(AchievementView::new(reference, document))
    }

    pub async fn submit(&self, caller: &Caller, id: &str) -> ServiceResult<AchievementView> {
        let (reference, document) = self.load(id).await?;
        self.ensure_owner(caller, &reference).await?;
        ensure_status(&reference, AchievementStatus::Draft, "Only draft achievements can be submitted")?;

        if !self.references.mark_submitted(&reference.id).await? {
            return Err(concurrent_change());
        }

        self.record_history(
            &reference.id,
            Some(AchievementStatus::Draft),
            AchievementStatus::Submitted,
            &caller.user_id,
            None,
        )
        .await;
        info!(achievement_id = %id, "Achievement submitted");

        let reference = self.reload(&reference.id).await?;
        Ok(AchievementView::new(reference, document))
    }

    /// Marks the reference deleted, then soft-deletes the document. If the
    /// document write fails the reference goes back to draft.
    pub async fn delete(&self, caller: &Caller, id: &str) -> ServiceResult<()> {
        let (reference, _) = self.load(id).await?;
        self.ensure_owner(caller, &reference).await?;
        ensure_status(&reference, AchievementStatus::Draft, "Only draft achievements can be deleted")?;

        if !self.references.mark_deleted(&reference.id).await? {
            return Err(concurrent_change());
        }

        let failure = match self.documents.soft_delete(&reference.document_id).await {
            Ok(true) => None,
            Ok(false) => Some("document disappeared before it could be deleted".to_string()),
            Err(err) => Some(err.to_string()),
        };

        if let Some(reason) = failure {
            warn!(achievement_id = %id, reason = %reason, "Document soft delete failed; restoring draft");
            if let Err(err) = self.references.restore_draft(&reference.id).await {
                error!(achievement_id = %id, error = %err, "Failed to restore achievement reference to draft");
            }
            return Err(ServiceError::Internal(format!("failed to delete achievement: {reason}")));
        }

        self.record_history(
            &reference.id,
            Some(AchievementStatus::Draft),
            AchievementStatus::Deleted,
            &caller.user_id,
            None,
        )
        .await;
        info!(achievement_id = %id, "Achievement deleted");
        Ok(())
    }

    /// Marks the reference verified, then writes the points. If the points
    /// write fails the reference goes back to submitted.
    pub async fn verify(&self, caller: &Caller, id: &str, points: i32) -> ServiceResult<AchievementView> {
        if points <= 0 {
            return Err(ServiceError::Validation("points must be greater than 0".into()));
        }

        let (reference, mut document) = self.load(id).await?;
        ensure_status(
            &reference,
            AchievementStatus::Submitted,
            "Only submitted achievements can be verified",
        )?;

        if !self.references.mark_verified(&reference.id, &caller.user_id).await? {
            return Err(concurrent_change());
        }

        let failure = match self.documents.set_points(&reference.document_id, points).await {
            Ok(true) => None,
            Ok(false) => Some("document disappeared before points could be set".to_string()),
            Err(err) => Some(err.to_string()),
        };

        if let Some(reason) = failure {
            warn!(achievement_id = %id, reason = %reason, "Points write failed; reverting verification");
            if let Err(err) = self.references.revert_verification(&reference.id).await {
                error!(achievement_id = %id, error = %err, "Failed to revert achievement verification");
            }
            return Err(ServiceError::Internal(format!("failed to verify achievement: {reason}")));
        }

        self.record_history(
            &reference.id,
            Some(AchievementStatus::Submitted),
            AchievementStatus::Verified,
            &caller.user_id,
            None,
        )
        .await;
        info!(achievement_id = %id, points, verified_by = %caller.user_id, "Achievement verified");

        document.points = points;
        let reference = self.reload(&reference.id).await?;
        Ok(AchievementView::new(reference, document))
    }

    pub async fn reject(&self, caller: &Caller, id: &str, note: &str) -> ServiceResult<AchievementView> {
        let note = note.trim();
        if note.is_empty() {
            return Err(ServiceError::Validation("rejection_note is required".into()));
        }

        let (reference, document) = self.load(id).await?;
        ensure_status(
            &reference,
            AchievementStatus::Submitted,
            "Only submitted achievements can be rejected",
        )?;

        if !self.references.mark_rejected(&reference.id, note).await? {
            return Err(concurrent_change());
        }

        self.record_history(
            &reference.id,
            Some(AchievementStatus::Submitted),
            AchievementStatus::Rejected,
            &caller.user_id,
            Some(note),
        )
        .await;
        info!(achievement_id = %id, rejected_by = %caller.user_id, "Achievement rejected");

        let reference = self.reload(&reference.id).await?;
        Ok(AchievementView::new(reference, document))
    }

    /// Checks that the caller may attach files right now and returns the
    /// document id to store them under. Call before writing any file.
    pub async fn attachment_target(&self, caller: &Caller, id: &str) -> ServiceResult<String> {
        let (reference, _) = self.load(id).await?;
        self.ensure_owner(caller, &reference).await?;
        ensure_status(
            &reference,
            AchievementStatus::Draft,
            "Attachments can only be added to draft achievements",
        )?;
        Ok(reference.document_id)
    }

    pub async fn add_attachments(
        &self,
        caller: &Caller,
        id: &str,
        attachments: Vec<Attachment>,
    ) -> ServiceResult<AchievementView> {
        if attachments.is_empty() {
            return Err(ServiceError::Validation("at least one file is required".into()));
        }

        let document_id = self.attachment_target(caller, id).await?;
        let count = attachments.len();
        let document = self
            .documents
            .add_attachments(&document_id, attachments)
            .await?
            .ok_or_else(|| ServiceError::not_found("Achievement"))?;

        info!(achievement_id = %id, count, "Attachments added");
        let reference = self.reload_by_document(&document_id).await?;
        Ok(AchievementView::new(reference, document))
    }

    pub async fn history(&self, id: &str) -> ServiceResult<Vec<achievement_status_history::Model>> {
        let reference = self
            .references
            .find_live_by_document_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Achievement"))?;

        Ok(achievement_status_history::Model::for_reference(&self.db, &reference.id).await?)
    }

    async fn load(&self, id: &str) -> ServiceResult<(achievement_reference::Model, AchievementDocument)> {
        let reference = self
            .references
            .find_live_by_document_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Achievement"))?;

        let document = self
            .documents
            .find_by_id(&reference.document_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Achievement"))?;

        Ok((reference, document))
    }

    async fn reload(&self, reference_id: &str) -> ServiceResult<achievement_reference::Model> {
        self.references
            .find_by_id(reference_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Achievement"))
    }

    async fn reload_by_document(&self, document_id: &str) -> ServiceResult<achievement_reference::Model> {
        self.references
            .find_live_by_document_id(document_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Achievement"))
    }

    async fn ensure_owner(&self, caller: &Caller, reference: &achievement_reference::Model) -> ServiceResult<()> {
        let student = student::Model::find_by_user_id(&self.db, &caller.user_id)
            .await?
            .ok_or_else(|| ServiceError::Forbidden("Only the owning student can modify this achievement".into()))?;

        if student.id != reference.student_id {
            warn!(user_id = %caller.user_id, reference_id = %reference.id, "Ownership check failed");
            return Err(ServiceError::Forbidden("You do not own this achievement".into()));
        }
        Ok(())
    }

    /// References in, joined views out, in reference order. References whose
    /// document is missing are dropped.
    async fn join(&self, references: Vec<achievement_reference::Model>) -> ServiceResult<Vec<AchievementView>> {
        if references.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = references.iter().map(|r| r.document_id.clone()).collect();
        let mut documents: HashMap<String, AchievementDocument> = self
            .documents
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|d| (d.id.clone(), d))
            .collect();

        Ok(references
            .into_iter()
            .filter_map(|reference| {
                let document = documents.remove(&reference.document_id)?;
                Some(AchievementView::new(reference, document))
            })
            .collect())
    }

    async fn record_history(
        &self,
        reference_id: &str,
        from: Option<AchievementStatus>,
        to: AchievementStatus,
        changed_by: &str,
        note: Option<&str>,
    ) {
        if let Err(err) = achievement_status_history::Model::record(
            &self.db,
            reference_id,
            from,
            to,
            Some(changed_by),
            note,
        )
        .await
        {
            warn!(reference_id, error = %err, "Failed to record status history");
        }
    }
}

fn validate_content(content: &AchievementContent) -> ServiceResult<()> {
    if content.title.trim().is_empty() {
        return Err(ServiceError::Validation("title is required".into()));
    }
    Ok(())
}

fn ensure_status(
    reference: &achievement_reference::Model,
    expected: AchievementStatus,
    message: &str,
) -> ServiceResult<()> {
    if reference.status != expected {
        return Err(ServiceError::InvalidState(format!(
            "{message} (current status: {})",
            reference.status
        )));
    }
    Ok(())
}

fn concurrent_change() -> ServiceError {
    ServiceError::InvalidState("Achievement status changed by another request".into())
}
