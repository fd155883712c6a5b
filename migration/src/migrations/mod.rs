pub mod m202510010001_create_roles;
pub mod m202510010002_create_permissions;
pub mod m202510010003_create_users;
pub mod m202510010004_create_lecturers;
pub mod m202510010005_create_students;
pub mod m202510010006_create_achievement_references;
pub mod m202510010007_create_achievement_status_history;
pub mod m202510010008_create_refresh_tokens;
