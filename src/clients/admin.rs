use reqwest::Method;

use super::api::ApiClient;
use crate::error::{AppError, Result};
use crate::models::{AuditLog, User};

impl ApiClient {
    fn require_admin(&self) -> Result<()> {
        if self.require_session()?.is_admin() {
            Ok(())
        } else {
            Err(AppError::Unauthorized("admin role required".to_string()))
        }
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.require_admin()?;
        self.send_json(self.auth_request(Method::GET, "/admin/users"))
            .await
    }

    pub async fn audit_logs(&self) -> Result<Vec<AuditLog>> {
        self.require_admin()?;
        self.send_json(self.auth_request(Method::GET, "/admin/audits"))
            .await
    }
}
