use serde::Deserialize;
use services::user_service::{NewLecturerProfile, NewStudentProfile, NewUser, UserChanges};
use validator::{Validate, ValidationError};

#[derive(Debug, Deserialize, Validate)]
pub struct StudentProfileRequest {
    #[validate(length(min = 1, message = "student.student_number is required"))]
    pub student_number: String,
    #[serde(default)]
    pub program_study: String,
    #[serde(default)]
    pub academic_year: String,
    #[serde(default)]
    pub advisor_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LecturerProfileRequest {
    #[validate(length(min = 1, message = "lecturer.lecturer_number is required"))]
    pub lecturer_number: String,
    #[serde(default)]
    pub department: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 50, message = "username must be between 3 and 50 characters"))]
    pub username: String,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "full_name is required"))]
    pub full_name: String,
    #[validate(length(min = 1, message = "role_id is required"))]
    pub role_id: String,
    #[validate(nested)]
    pub student: Option<StudentProfileRequest>,
    #[validate(nested)]
    pub lecturer: Option<LecturerProfileRequest>,
}

impl From<CreateUserRequest> for NewUser {
    fn from(req: CreateUserRequest) -> Self {
        NewUser {
            username: req.username,
            email: req.email,
            password: req.password,
            full_name: req.full_name,
            role_id: req.role_id,
            student: req.student.map(|s| NewStudentProfile {
                student_number: s.student_number,
                program_study: s.program_study,
                academic_year: s.academic_year,
                advisor_id: s.advisor_id.filter(|id| !id.trim().is_empty()),
            }),
            lecturer: req.lecturer.map(|l| NewLecturerProfile {
                lecturer_number: l.lecturer_number,
                department: l.department,
            }),
        }
    }
}

/// Partial update; at least one field must be present.
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "has_changes"))]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 50, message = "username must be between 3 and 50 characters"))]
    pub username: Option<String>,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100, message = "full_name must not be empty"))]
    pub full_name: Option<String>,
    pub is_active: Option<bool>,
}

fn has_changes(req: &UpdateUserRequest) -> Result<(), ValidationError> {
    if req.username.is_none() && req.email.is_none() && req.full_name.is_none() && req.is_active.is_none() {
        let mut err = ValidationError::new("empty_update");
        err.message = Some("At least one field must be provided".into());
        return Err(err);
    }
    Ok(())
}

impl From<UpdateUserRequest> for UserChanges {
    fn from(req: UpdateUserRequest) -> Self {
        UserChanges {
            username: req.username,
            email: req.email,
            full_name: req.full_name,
            is_active: req.is_active,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AssignRoleRequest {
    #[validate(length(min = 1, message = "role_id is required"))]
    pub role_id: String,
}
