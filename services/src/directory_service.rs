//! Student and lecturer lookups, and the advisor relationship.

use chrono::{DateTime, Utc};
use db::models::{lecturer, student, user};
use db::rbac::RoleName;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use tracing::info;
use util::pagination::{Page, Pagination};

use crate::caller::Caller;
use crate::error::{ServiceError, ServiceResult};

/// Student profile with the owning account's public fields.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StudentView {
    pub id: String,
    pub user_id: String,
    pub student_number: String,
    pub program_study: String,
    pub academic_year: String,
    pub advisor_id: Option<String>,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<(student::Model, Option<user::Model>)> for StudentView {
    fn from((student, user): (student::Model, Option<user::Model>)) -> Self {
        Self {
            id: student.id,
            user_id: student.user_id,
            student_number: student.student_number,
            program_study: student.program_study,
            academic_year: student.academic_year,
            advisor_id: student.advisor_id,
            username: user.as_ref().map(|u| u.username.clone()),
            full_name: user.as_ref().map(|u| u.full_name.clone()),
            email: user.map(|u| u.email),
            created_at: student.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LecturerView {
    pub id: String,
    pub user_id: String,
    pub lecturer_number: String,
    pub department: String,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<(lecturer::Model, Option<user::Model>)> for LecturerView {
    fn from((lecturer, user): (lecturer::Model, Option<user::Model>)) -> Self {
        Self {
            id: lecturer.id,
            user_id: lecturer.user_id,
            lecturer_number: lecturer.lecturer_number,
            department: lecturer.department,
            username: user.as_ref().map(|u| u.username.clone()),
            full_name: user.as_ref().map(|u| u.full_name.clone()),
            email: user.map(|u| u.email),
            created_at: lecturer.created_at,
        }
    }
}

pub struct DirectoryService {
    db: DatabaseConnection,
}

impl DirectoryService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_students(&self, pagination: &Pagination) -> ServiceResult<Page<StudentView>> {
        let rows = student::Entity::find()
            .find_also_related(user::Entity)
            .order_by_asc(student::Column::StudentNumber)
            .all(&self.db)
            .await?;

        Ok(pagination.apply(rows.into_iter().map(StudentView::from).collect()))
    }

    pub async fn get_student(&self, id: &str) -> ServiceResult<StudentView> {
        student::Entity::find_by_id(id)
            .find_also_related(user::Entity)
            .one(&self.db)
            .await?
            .map(StudentView::from)
            .ok_or_else(|| ServiceError::not_found("Student"))
    }

    /// `None` clears the advisor.
    pub async fn update_advisor(&self, student_id: &str, advisor_id: Option<&str>) -> ServiceResult<StudentView> {
        if let Some(advisor_id) = advisor_id {
            lecturer::Entity::find_by_id(advisor_id)
                .one(&self.db)
                .await?
                .ok_or_else(|| ServiceError::Validation("advisor_id does not match any lecturer".into()))?;
        }

        student::Model::set_advisor(&self.db, student_id, advisor_id).await?;
        info!(student_id, advisor_id = ?advisor_id, "Student advisor updated");
        self.get_student(student_id).await
    }

    pub async fn list_lecturers(&self, pagination: &Pagination) -> ServiceResult<Page<LecturerView>> {
        let rows = lecturer::Entity::find()
            .find_also_related(user::Entity)
            .order_by_asc(lecturer::Column::LecturerNumber)
            .all(&self.db)
            .await?;

        Ok(pagination.apply(rows.into_iter().map(LecturerView::from).collect()))
    }

    /// Lecturers may only look at their own advisees; other roles that hold
    /// the permission may look at anyone's.
    pub async fn advisees(&self, caller: &Caller, lecturer_id: &str) -> ServiceResult<Vec<StudentView>> {
        lecturer::Entity::find_by_id(lecturer_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Lecturer"))?;

        if caller.role_name() == Some(RoleName::Lecturer) {
            let own = lecturer::Model::find_by_user_id(&self.db, &caller.user_id).await?;
            if own.as_ref().map(|l| l.id.as_str()) != Some(lecturer_id) {
                return Err(ServiceError::Forbidden("You can only view your own advisees".into()));
            }
        }

        let rows = student::Entity::find()
            .filter(student::Column::AdvisorId.eq(lecturer_id))
            .find_also_related(user::Entity)
            .order_by_asc(student::Column::StudentNumber)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(StudentView::from).collect())
    }
}
