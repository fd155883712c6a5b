use services::Caller;
use services::token::AccessClaims;

/// Decoded access-token claims for the current request.
///
/// When the permission guard has run, `permissions` is filled in even if the
/// token itself carried none.
#[derive(Debug, Clone)]
pub struct AuthUser(pub AccessClaims);

impl AuthUser {
    pub fn user_id(&self) -> &str {
        &self.0.sub
    }

    pub fn caller(&self) -> Caller {
        Caller::new(self.0.sub.clone(), self.0.role.clone())
    }
}
