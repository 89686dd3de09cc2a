use reqwest::Method;

use super::api::ApiClient;
use crate::error::{AppError, Result};
use crate::models::{AuthResponse, LoginRequest};

impl ApiClient {
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AppError::InvalidInput(
                "username and password are required".to_string(),
            ));
        }
        self.send_json(
            self.auth_request(Method::POST, "/auth/login")
                .json(&LoginRequest { username, password }),
        )
        .await
    }
}
