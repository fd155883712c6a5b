use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::models::achievement_reference::{self, AchievementStatus, ActiveModel, Column, Entity, Model};

/// Relational persistence for achievement references.
///
/// Every status change is a guarded `UPDATE ... WHERE status = <expected>`; the
/// `bool` results say whether the row was still in the expected state.
#[derive(Clone)]
pub struct AchievementReferenceRepository {
    db: DatabaseConnection,
}

impl AchievementReferenceRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, student_id: &str, document_id: &str) -> Result<Model, DbErr> {
        let now = Utc::now();
        ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            student_id: Set(student_id.to_owned()),
            document_id: Set(document_id.to_owned()),
            status: Set(AchievementStatus::Draft),
            submitted_at: Set(None),
            verified_at: Set(None),
            verified_by: Set(None),
            rejection_note: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
    }

    /// Looks up the reference for a document, skipping deleted ones.
    pub async fn find_live_by_document_id(&self, document_id: &str) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::DocumentId.eq(document_id))
            .filter(Column::Status.ne(AchievementStatus::Deleted))
            .one(&self.db)
            .await
    }

    pub async fn find_by_document_id(&self, document_id: &str) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::DocumentId.eq(document_id))
            .one(&self.db)
            .await
    }

    pub async fn list_for_student(&self, student_id: &str) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::Status.ne(AchievementStatus::Deleted))
            .order_by_asc(Column::CreatedAt)
            .all(&self.db)
            .await
    }

    pub async fn list_submitted_for_students(&self, student_ids: &[String]) -> Result<Vec<Model>, DbErr> {
        if student_ids.is_empty() {
            return Ok(Vec::new());
        }
        Entity::find()
            .filter(Column::StudentId.is_in(student_ids.iter().cloned()))
            .filter(Column::Status.eq(AchievementStatus::Submitted))
            .order_by_asc(Column::CreatedAt)
            .all(&self.db)
            .await
    }

    pub async fn list_live(&self) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::Status.ne(AchievementStatus::Deleted))
            .order_by_asc(Column::CreatedAt)
            .all(&self.db)
            .await
    }

    pub async fn verified_document_ids(&self) -> Result<Vec<String>, DbErr> {
        Entity::find()
            .filter(Column::Status.eq(AchievementStatus::Verified))
            .select_only()
            .column(Column::DocumentId)
            .into_tuple::<String>()
            .all(&self.db)
            .await
    }

    pub async fn verified_document_ids_for_student(&self, student_id: &str) -> Result<Vec<String>, DbErr> {
        Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::Status.eq(AchievementStatus::Verified))
            .order_by_asc(Column::VerifiedAt)
            .select_only()
            .column(Column::DocumentId)
            .into_tuple::<String>()
            .all(&self.db)
            .await
    }

    /// All references a student owns, in any state.
    pub async fn count_for_student(&self, student_id: &str) -> Result<u64, DbErr> {
        Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .count(&self.db)
            .await
    }

    pub async fn mark_submitted(&self, id: &str) -> Result<bool, DbErr> {
        let now = Utc::now();
        self.transition(
            id,
            AchievementStatus::Draft,
            ActiveModel {
                status: Set(AchievementStatus::Submitted),
                submitted_at: Set(Some(now)),
                updated_at: Set(now),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn mark_verified(&self, id: &str, verifier_id: &str) -> Result<bool, DbErr> {
        let now = Utc::now();
        self.transition(
            id,
            AchievementStatus::Submitted,
            ActiveModel {
                status: Set(AchievementStatus::Verified),
                verified_at: Set(Some(now)),
                verified_by: Set(Some(verifier_id.to_owned())),
                updated_at: Set(now),
                ..Default::default()
            },
        )
        .await
    }

    /// Undoes [`mark_verified`](Self::mark_verified) when the points write fails.
    pub async fn revert_verification(&self, id: &str) -> Result<bool, DbErr> {
        self.transition(
            id,
            AchievementStatus::Verified,
            ActiveModel {
                status: Set(AchievementStatus::Submitted),
                verified_at: Set(None),
                verified_by: Set(None),
                updated_at: Set(Utc::now()),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn mark_rejected(&self, id: &str, note: &str) -> Result<bool, DbErr> {
        self.transition(
            id,
            AchievementStatus::Submitted,
            ActiveModel {
                status: Set(AchievementStatus::Rejected),
                rejection_note: Set(Some(note.to_owned())),
                updated_at: Set(Utc::now()),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn mark_deleted(&self, id: &str) -> Result<bool, DbErr> {
        self.transition(
            id,
            AchievementStatus::Draft,
            ActiveModel {
                status: Set(AchievementStatus::Deleted),
                updated_at: Set(Utc::now()),
                ..Default::default()
            },
        )
        .await
    }

    /// Undoes [`mark_deleted`](Self::mark_deleted) when the document soft delete fails.
    pub async fn restore_draft(&self, id: &str) -> Result<bool, DbErr> {
        self.transition(
            id,
            AchievementStatus::Deleted,
            ActiveModel {
                status: Set(AchievementStatus::Draft),
                updated_at: Set(Utc::now()),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Model>, DbErr> {
        achievement_reference::Entity::find_by_id(id).one(&self.db).await
    }

    async fn transition(
        &self,
        id: &str,
        expected: AchievementStatus,
        changes: ActiveModel,
    ) -> Result<bool, DbErr> {
        let result = Entity::update_many()
            .set(changes)
            .filter(Column::Id.eq(id))
            .filter(Column::Status.eq(expected))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_lecturer, create_student, setup_test_db};

    #[tokio::test]
    async fn test_guarded_transitions() {
        let db = setup_test_db().await;
        let (_, student) = create_student(&db, "guard", None).await;
        let (reviewer, _) = create_lecturer(&db, "reviewer").await;
        let repo = AchievementReferenceRepository::new(db.clone());

        let reference = repo.create(&student.id, "doc-1").await.unwrap();
        assert_eq!(reference.status, AchievementStatus::Draft);

        // Not submitted yet.
        assert!(!repo.mark_verified(&reference.id, &reviewer.id).await.unwrap());

        assert!(repo.mark_submitted(&reference.id).await.unwrap());
        assert!(!repo.mark_submitted(&reference.id).await.unwrap());

        assert!(repo.mark_verified(&reference.id, &reviewer.id).await.unwrap());
        let verified = repo.find_by_id(&reference.id).await.unwrap().unwrap();
        assert_eq!(verified.status, AchievementStatus::Verified);
        assert_eq!(verified.verified_by.as_deref(), Some(reviewer.id.as_str()));
        assert!(verified.verified_at.is_some());
        assert!(verified.submitted_at.is_some());

        assert!(repo.revert_verification(&reference.id).await.unwrap());
        let reverted = repo.find_by_id(&reference.id).await.unwrap().unwrap();
        assert_eq!(reverted.status, AchievementStatus::Submitted);
        assert!(reverted.verified_by.is_none());
    }

    #[tokio::test]
    async fn test_deleted_references_are_hidden() {
        let db = setup_test_db().await;
        let (_, student) = create_student(&db, "hider", None).await;
        let repo = AchievementReferenceRepository::new(db.clone());

        let keep = repo.create(&student.id, "doc-keep").await.unwrap();
        let gone = repo.create(&student.id, "doc-gone").await.unwrap();
        assert!(repo.mark_deleted(&gone.id).await.unwrap());

        let listed = repo.list_for_student(&student.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, keep.id);
        assert!(repo.find_live_by_document_id("doc-gone").await.unwrap().is_none());
        assert!(repo.find_by_document_id("doc-gone").await.unwrap().is_some());
        assert_eq!(repo.count_for_student(&student.id).await.unwrap(), 2);

        assert!(repo.restore_draft(&gone.id).await.unwrap());
        assert_eq!(repo.list_live().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_verified_ids_and_submitted_scoping() {
        let db = setup_test_db().await;
        let (_, a) = create_student(&db, "a", None).await;
        let (_, b) = create_student(&db, "b", None).await;
        let (reviewer, _) = create_lecturer(&db, "rev").await;
        let repo = AchievementReferenceRepository::new(db.clone());

        let ra = repo.create(&a.id, "doc-a").await.unwrap();
        let rb = repo.create(&b.id, "doc-b").await.unwrap();
        repo.create(&b.id, "doc-b-draft").await.unwrap();
        repo.mark_submitted(&ra.id).await.unwrap();
        repo.mark_submitted(&rb.id).await.unwrap();
        repo.mark_verified(&rb.id, &reviewer.id).await.unwrap();

        let submitted = repo
            .list_submitted_for_students(&[a.id.clone(), b.id.clone()])
            .await
            .unwrap();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].id, ra.id);

        assert_eq!(repo.verified_document_ids().await.unwrap(), vec!["doc-b".to_string()]);
        assert!(repo.verified_document_ids_for_student(&a.id).await.unwrap().is_empty());
        assert!(repo.list_submitted_for_students(&[]).await.unwrap().is_empty());
    }
}
