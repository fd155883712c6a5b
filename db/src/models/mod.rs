pub mod achievement_reference;
pub mod achievement_status_history;
pub mod lecturer;
pub mod permission;
pub mod refresh_token;
pub mod role;
pub mod role_permission;
pub mod student;
pub mod user;

pub use achievement_reference::Entity as AchievementReference;
pub use achievement_status_history::Entity as AchievementStatusHistory;
pub use lecturer::Entity as Lecturer;
pub use permission::Entity as Permission;
pub use refresh_token::Entity as RefreshToken;
pub use role::Entity as Role;
pub use role_permission::Entity as RolePermission;
pub use student::Entity as Student;
pub use user::Entity as User;
