use std::path::{Path, PathBuf};
use std::sync::Arc;

use db::documents::AchievementDocumentStore;
use sea_orm::DatabaseConnection;
use services::achievement_service::AchievementService;
use services::auth_service::AuthService;
use services::directory_service::DirectoryService;
use services::permission_service::PermissionResolver;
use services::report_service::ReportService;
use services::token::TokenIssuer;
use services::user_service::UserService;

/// Everything a handler needs, built once in `main` (or per test).
///
/// Services are cheap to construct, so handlers ask for a fresh one instead of
/// the state holding long-lived instances.
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    documents: Arc<dyn AchievementDocumentStore>,
    tokens: Arc<TokenIssuer>,
    upload_root: PathBuf,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        documents: Arc<dyn AchievementDocumentStore>,
        tokens: TokenIssuer,
        upload_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            db,
            documents,
            tokens: Arc::new(tokens),
            upload_root: upload_root.into(),
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    pub fn upload_root(&self) -> &Path {
        &self.upload_root
    }

    pub fn achievements(&self) -> AchievementService {
        AchievementService::new(self.db.clone(), self.documents.clone())
    }

    pub fn reports(&self) -> ReportService {
        ReportService::new(self.db.clone(), self.documents.clone())
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.db.clone(), self.tokens.clone())
    }

    pub fn directory(&self) -> DirectoryService {
        DirectoryService::new(self.db.clone())
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.db.clone())
    }

    pub fn permissions(&self) -> PermissionResolver {
        PermissionResolver::new(self.db.clone())
    }
}
