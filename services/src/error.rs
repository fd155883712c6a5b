use db::documents::DocumentStoreError;
use jsonwebtoken::errors::ErrorKind;
use sea_orm::DbErr;
use thiserror::Error;

/// Failure taxonomy shared by every service.
///
/// Workflow rule violations are raised explicitly (`InvalidState`, `Forbidden`);
/// store and library failures arrive through the `From` impls as `Internal`.
#[derive(Debug, Error, PartialEq)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    InvalidState(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn not_found(what: &str) -> Self {
        ServiceError::NotFound(format!("{what} not found"))
    }
}

impl From<DbErr> for ServiceError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::RecordNotFound(msg) => ServiceError::NotFound(msg),
            other => ServiceError::Internal(format!("database error: {other}")),
        }
    }
}

impl From<DocumentStoreError> for ServiceError {
    fn from(err: DocumentStoreError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for ServiceError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidKeyFormat
            | ErrorKind::InvalidRsaKey(_)
            | ErrorKind::RsaFailedSigning
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::Crypto(_) => ServiceError::Internal(format!("token signing failed: {err}")),
            ErrorKind::ExpiredSignature => ServiceError::Unauthorized("Token has expired".into()),
            _ => ServiceError::Unauthorized("Invalid token".into()),
        }
    }
}
