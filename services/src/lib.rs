pub mod achievement_service;
pub mod auth_service;
pub mod caller;
pub mod directory_service;
pub mod error;
pub mod permission_service;
pub mod report_service;
pub mod token;
pub mod user_service;

pub use caller::Caller;
pub use error::{ServiceError, ServiceResult};
