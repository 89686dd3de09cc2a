use clap::Subcommand;

use super::{render::truncate, AppState};
use crate::error::Result;

#[derive(Subcommand)]
pub enum AdminCommand {
    /// Registered users
    Users,
    /// Authentication audit trail
    Audits,
}

pub async fn run(state: &AppState, command: AdminCommand) -> Result<()> {
    let api = state.authed()?;
    match command {
        AdminCommand::Users => {
            let users = api.list_users().await?;
            println!("{:>6}  {:<20}  {:<30}  Role", "ID", "Username", "Email");
            for user in users {
                println!(
                    "{:>6}  {:<20}  {:<30}  {:?}",
                    user.id,
                    truncate(&user.username, 20),
                    truncate(&user.email, 30),
                    user.role
                );
            }
        }
        AdminCommand::Audits => {
            for log in api.audit_logs().await? {
                println!(
                    "{}  {:<16}  {:<16}  {}",
                    log.timestamp,
                    truncate(&log.username, 16),
                    log.action,
                    log.details.as_deref().unwrap_or("")
                );
            }
        }
    }
    Ok(())
}
