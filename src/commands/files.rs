use std::path::Path;

use clap::Subcommand;

use super::{confirm, render, validate, AppState};
use crate::error::Result;
use crate::services::upload;

#[derive(Subcommand)]
pub enum FilesCommand {
    /// List uploaded files, newest first
    List {
        /// 1-based
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        size: u32,
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one file and its sheets
    Show { id: i64 },
    /// Delete a file with all its rows
    Delete {
        id: i64,
        #[arg(long)]
        yes: bool,
    },
}

pub async fn run(state: &AppState, command: FilesCommand) -> Result<()> {
    let api = state.authed()?;
    match command {
        FilesCommand::List { page, size, search } => {
            let files = api.list_files(page.saturating_sub(1), size, search.as_deref()).await?;
            print!("{}", render::files_table(&files));
        }
        FilesCommand::Show { id } => {
            let (file, sheets) = tokio::join!(api.get_file(id), api.get_sheets(id));
            let file = file?;
            println!("{} (id {})", file.file_name, file.id);
            println!("  uploaded: {}", file.upload_timestamp);
            println!("  rows:     {}", file.total_rows);
            if file.needs_header_validation {
                println!("  header validation required: sheet-console validate {}", file.id);
            }
            for sheet in sheets? {
                println!(
                    "  sheet {:>3} #{} {} ({} rows, {} columns)",
                    sheet.sheet_index,
                    sheet.id,
                    sheet.sheet_name,
                    sheet.total_rows,
                    sheet.headers().len()
                );
            }
        }
        FilesCommand::Delete { id, yes } => {
            if !confirm(&format!("Delete file {} and all its rows? This cannot be undone.", id), yes)? {
                println!("Cancelled");
                return Ok(());
            }
            api.delete_file(id).await?;
            println!("File {} deleted", id);
        }
    }
    Ok(())
}

pub async fn upload(state: &AppState, path: &Path, start_validation: bool) -> Result<()> {
    let api = state.authed()?;
    let response = upload::upload_path(api, path, state.config.max_file_size).await?;

    println!("{}", response.message);
    for error in &response.errors {
        println!("  - {}", error);
    }
    if !response.success {
        return Ok(());
    }
    println!("{} rows processed", response.processed_rows);

    if let (true, Some(file_id)) = (response.needs_manual_validation, response.file_id) {
        if start_validation {
            return validate::run(state, file_id, response.needs_manual_validation).await;
        }
        println!("Header rows need confirming: sheet-console validate {}", file_id);
    }
    Ok(())
}

pub async fn reset(state: &AppState, yes: bool) -> Result<()> {
    let api = state.authed()?;
    if !confirm("Delete ALL files, rows and history?", yes)? {
        println!("Cancelled");
        return Ok(());
    }
    api.reset_all().await?;
    println!("Everything was reset");
    Ok(())
}
