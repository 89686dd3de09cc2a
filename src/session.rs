use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{AuthResponse, Role};

/// Credentials of the logged-in operator. Owned by the application shell and
/// handed to every [`crate::clients::ApiClient`] that needs to authenticate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub role: Role,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<AuthResponse> for Session {
    fn from(resp: AuthResponse) -> Self {
        Session {
            token: resp.token,
            username: resp.username,
            role: resp.role,
        }
    }
}

/// Keeps the session on disk so it survives between invocations.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Option<Session>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => {
                let session: Session = serde_json::from_str(&raw)?;
                debug!("Loaded session for {}", session.username);
                Ok(Some(session))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let raw = serde_json::to_string_pretty(session)?;
        tokio::fs::write(&self.path, raw).await?;
        info!("Session saved for {}", session.username);
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                info!("Session cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Session {
        Session {
            token: "abc".into(),
            username: "root".into(),
            role: Role::Admin,
        }
    }

    #[tokio::test]
    async fn session_survives_save_and_load_then_clears() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested/session.json"));

        assert_eq!(store.load().await.unwrap(), None);

        store.save(&admin()).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, admin());
        assert!(loaded.is_admin());

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
        // clearing twice is fine
        store.clear().await.unwrap();
    }
}
