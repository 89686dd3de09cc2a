use std::io::{self, Write};

use tracing::info;

use super::{read_line, AppState};
use crate::error::{AppError, Result};
use crate::session::Session;

pub async fn login(state: &mut AppState, username: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => {
            print!("Password: ");
            io::stdout().flush()?;
            read_line()?.ok_or_else(|| AppError::InvalidInput("password is required".to_string()))?
        }
    };

    let response = state.api.login(username, &password).await?;
    let session = Session::from(response);
    state.store.save(&session).await?;
    info!("Logged in as {} ({:?})", session.username, session.role);
    println!("Logged in as {}", session.username);
    state.api = state.api.clone().with_session(session);
    Ok(())
}

pub async fn logout(state: &mut AppState) -> Result<()> {
    state.store.clear().await?;
    println!("Logged out");
    Ok(())
}

pub fn whoami(state: &AppState) -> Result<()> {
    let session = state.api.require_session()?;
    println!("{} ({:?})", session.username, session.role);
    Ok(())
}
