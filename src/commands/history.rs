use clap::Subcommand;

use super::{render, AppState};
use crate::error::Result;
use crate::models::ModificationHistory;
use crate::services::history::sort_by_time;

#[derive(Subcommand)]
pub enum HistoryCommand {
    /// Changes to one row
    Row { row_id: i64 },
    /// Changes within a sheet, one page at a time
    Sheet {
        sheet_id: i64,
        /// 1-based
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        size: u32,
    },
    /// Every change on record
    All,
}

fn print_entries(mut entries: Vec<ModificationHistory>) {
    if entries.is_empty() {
        println!("No modifications recorded");
        return;
    }
    sort_by_time(&mut entries);
    for entry in &entries {
        print!("{}", render::history_entry(entry));
    }
}

pub async fn run(state: &AppState, command: HistoryCommand) -> Result<()> {
    let api = state.authed()?;
    match command {
        HistoryCommand::Row { row_id } => print_entries(api.row_history(row_id).await?),
        HistoryCommand::Sheet { sheet_id, page, size } => {
            let page = api.sheet_history(sheet_id, page.saturating_sub(1), size).await?;
            let (number, total_pages, total) = (page.number, page.total_pages, page.total_elements);
            print_entries(page.content);
            println!("page {}/{} ({} entries)", number + 1, total_pages.max(1), total);
        }
        HistoryCommand::All => print_entries(api.all_history().await?),
    }
    Ok(())
}
