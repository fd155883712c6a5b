use db::rbac::RoleName;

/// Authenticated identity as seen by the services: the token subject and role.
#[derive(Debug, Clone, PartialEq)]
pub struct Caller {
    pub user_id: String,
    pub role: String,
}

impl Caller {
    pub fn new(user_id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: role.into(),
        }
    }

    /// `None` for role names outside the catalogue.
    pub fn role_name(&self) -> Option<RoleName> {
        RoleName::from_name(&self.role)
    }
}
