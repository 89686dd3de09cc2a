use std::path::PathBuf;

use clap::{Args, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use super::{confirm, find_sheet, render, AppState};
use crate::clients::ApiClient;
use crate::error::{AppError, Result};
use crate::services::browser::{Debouncer, RowRequest, SheetBrowser, SortDirection, SortField};
use crate::services::{export, RowEditor};

#[derive(Args)]
pub struct BrowseArgs {
    pub file_id: i64,
    /// Sheet id, defaults to the first sheet
    #[arg(long)]
    pub sheet: Option<i64>,
    /// 1-based
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    #[arg(long)]
    pub size: Option<u32>,
    /// Column name, or `sheetIndex`
    #[arg(long)]
    pub sort: Option<String>,
    #[arg(long)]
    pub desc: bool,
    #[arg(long)]
    pub search: Option<String>,
    /// Keep reading navigation commands from stdin
    #[arg(short, long)]
    pub interactive: bool,
}

#[derive(Subcommand)]
pub enum RowsCommand {
    /// Show every column of a row
    Show {
        file_id: i64,
        row_id: i64,
        #[arg(long)]
        sheet: Option<i64>,
    },
    /// Add a row: `column=value` pairs
    Add {
        file_id: i64,
        #[arg(long)]
        sheet: Option<i64>,
        assignments: Vec<String>,
    },
    /// Change cells of a row: `column=value` pairs
    Edit {
        file_id: i64,
        row_id: i64,
        #[arg(long)]
        sheet: Option<i64>,
        assignments: Vec<String>,
    },
    Delete {
        row_id: i64,
        #[arg(long)]
        yes: bool,
    },
    /// Export a sheet's rows, filtered by keyword
    Download {
        file_id: i64,
        #[arg(long)]
        sheet: Option<i64>,
        #[arg(long)]
        keyword: Option<String>,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

/// One line typed in interactive browsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseInput {
    Next,
    Prev,
    /// 1-based
    Page(i64),
    Size(u32),
    Sort(SortField, SortDirection),
    Unsort,
    Sheet(i64),
    Detail(i64),
    Search(String),
    Refresh,
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_browse_input(line: &str) -> BrowseInput {
    let line = line.trim();
    if let Some(text) = line.strip_prefix('/') {
        return BrowseInput::Search(text.to_string());
    }
    let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match verb {
        "n" | "next" => BrowseInput::Next,
        "p" | "prev" => BrowseInput::Prev,
        "r" | "refresh" => BrowseInput::Refresh,
        "q" | "quit" | "exit" => BrowseInput::Quit,
        "h" | "help" | "?" => BrowseInput::Help,
        "unsort" => BrowseInput::Unsort,
        "search" => BrowseInput::Search(rest.to_string()),
        "g" | "page" => rest.parse().map(BrowseInput::Page).unwrap_or_else(|_| BrowseInput::Unknown(line.to_string())),
        "size" => rest.parse().map(BrowseInput::Size).unwrap_or_else(|_| BrowseInput::Unknown(line.to_string())),
        "sheet" => rest.parse().map(BrowseInput::Sheet).unwrap_or_else(|_| BrowseInput::Unknown(line.to_string())),
        "row" => rest.parse().map(BrowseInput::Detail).unwrap_or_else(|_| BrowseInput::Unknown(line.to_string())),
        "sort" if !rest.is_empty() => {
            let (column, direction) = match rest.rsplit_once(' ') {
                Some((column, dir)) => match dir.parse::<SortDirection>() {
                    Ok(direction) => (column.trim(), direction),
                    Err(_) => (rest, SortDirection::Asc),
                },
                None => (rest, SortDirection::Asc),
            };
            BrowseInput::Sort(SortField::parse(column), direction)
        }
        _ => BrowseInput::Unknown(line.to_string()),
    }
}

const BROWSE_HELP: &str = "\
commands: n(ext)  p(rev)  g N  size N  sort COLUMN [asc|desc]  unsort
          sheet ID  row ID  /TEXT or search TEXT  r(efresh)  q(uit)";

/// State change for one input; `Ok(None)` when nothing needs fetching.
fn apply_input(browser: &mut SheetBrowser, input: BrowseInput) -> Result<Option<RowRequest>> {
    let current = i64::from(browser.viewport().current_page());
    let request = match input {
        BrowseInput::Next => browser.go_to_page(current + 1),
        BrowseInput::Prev => browser.go_to_page(current - 1),
        BrowseInput::Page(page) => {
            let request = browser.go_to_page(page - 1);
            if request.is_none() {
                println!("no page {}", page);
            }
            request
        }
        BrowseInput::Size(size) => Some(browser.set_page_size(size)?),
        BrowseInput::Sort(field, direction) => Some(browser.set_sort(Some(field), direction)),
        BrowseInput::Unsort => Some(browser.set_sort(None, SortDirection::Asc)),
        BrowseInput::Sheet(id) => Some(browser.select_sheet(id)?),
        BrowseInput::Search(text) => Some(browser.set_keyword(&text)),
        BrowseInput::Refresh => Some(browser.refresh()),
        BrowseInput::Detail(id) => {
            match browser.rows().iter().find(|r| r.id == Some(id)) {
                Some(row) => print!("{}", render::row_detail(browser.columns(), row)),
                None => println!("row {} is not on this page", id),
            }
            None
        }
        BrowseInput::Help => {
            println!("{}", BROWSE_HELP);
            None
        }
        BrowseInput::Quit => None,
        BrowseInput::Unknown(line) => {
            println!("unknown command: {} (type help)", line);
            None
        }
    };
    Ok(request)
}

async fn fetch_and_print(browser: &mut SheetBrowser, api: &ApiClient, request: RowRequest) {
    if browser.fetch(api, request).await {
        print!("{}", render::rows_table(browser));
    }
}

pub async fn browse(state: &AppState, args: BrowseArgs) -> Result<()> {
    let api = state.authed()?;
    let mut browser = SheetBrowser::new(&state.config);

    let mut request = browser.set_sheets(api.get_sheets(args.file_id).await?);
    if let Some(id) = args.sheet {
        request = Some(browser.select_sheet(id)?);
    }
    if request.is_none() {
        println!("File {} has no sheets", args.file_id);
        return Ok(());
    }
    if let Some(size) = args.size {
        request = Some(browser.set_page_size(size)?);
    }
    if let Some(field) = &args.sort {
        let direction = if args.desc { SortDirection::Desc } else { SortDirection::Asc };
        request = Some(browser.set_sort(Some(SortField::parse(field)), direction));
    }
    if let Some(keyword) = &args.search {
        request = Some(browser.set_keyword(keyword));
    }
    if let Some(request) = request {
        browser.fetch(api, request).await;
    }
    if args.page > 1 {
        match browser.go_to_page(i64::from(args.page) - 1) {
            Some(request) => {
                browser.fetch(api, request).await;
            }
            None => println!("no page {}, showing page 1", args.page),
        }
    }
    print!("{}", render::rows_table(&browser));

    if !args.interactive {
        return Ok(());
    }

    println!("{}", BROWSE_HELP);
    let (mut debouncer, mut searches) = Debouncer::new(state.config.search_debounce());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_browse_input(&line) {
                    BrowseInput::Quit => break,
                    // typed searches settle before hitting the backend
                    BrowseInput::Search(text) => debouncer.push(text),
                    input => match apply_input(&mut browser, input) {
                        Ok(Some(request)) => fetch_and_print(&mut browser, api, request).await,
                        Ok(None) => {}
                        Err(e) => println!("{}", e),
                    },
                }
            }
            Some(keyword) = searches.recv() => {
                let request = browser.set_keyword(&keyword);
                fetch_and_print(&mut browser, api, request).await;
            }
        }
    }
    Ok(())
}

pub async fn run(state: &AppState, command: RowsCommand) -> Result<()> {
    let api = state.authed()?;
    match command {
        RowsCommand::Show { file_id, row_id, sheet } => {
            let sheet = find_sheet(api, file_id, sheet).await?;
            let row = api.get_row(row_id).await?;
            print!("{}", render::row_detail(&sheet.headers(), &row));
        }
        RowsCommand::Add { file_id, sheet, assignments } => {
            let sheet = find_sheet(api, file_id, sheet).await?;
            let mut editor = RowEditor::create(sheet.headers());
            editor.apply_assignments(assignments.iter().map(String::as_str))?;
            let created = api.create_row(sheet.id, &editor.finish()).await?;
            info!("Created row {:?} in sheet {}", created.id, sheet.sheet_name);
            print!("{}", render::row_detail(&sheet.headers(), &created));
        }
        RowsCommand::Edit { file_id, row_id, sheet, assignments } => {
            if assignments.is_empty() {
                return Err(AppError::InvalidInput("nothing to change".to_string()));
            }
            let sheet = find_sheet(api, file_id, sheet).await?;
            let row = api.get_row(row_id).await?;
            let mut editor = RowEditor::edit(sheet.headers(), &row);
            editor.apply_assignments(assignments.iter().map(String::as_str))?;
            let updated = api.update_row(row_id, &editor.finish()).await?;
            print!("{}", render::row_detail(&sheet.headers(), &updated));
        }
        RowsCommand::Delete { row_id, yes } => {
            if !confirm(&format!("Delete row {}?", row_id), yes)? {
                println!("Cancelled");
                return Ok(());
            }
            api.delete_row(row_id).await?;
            println!("Row {} deleted", row_id);
        }
        RowsCommand::Download { file_id, sheet, keyword, out } => {
            let sheet = find_sheet(api, file_id, sheet).await?;
            let out = out.unwrap_or_else(|| PathBuf::from(format!("{}.xlsx", sheet.sheet_name)));
            let written = export::download_to_path(api, sheet.id, keyword.as_deref(), &out).await?;
            println!("Saved {} bytes to {}", written, out.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_inputs() {
        assert_eq!(parse_browse_input("n"), BrowseInput::Next);
        assert_eq!(parse_browse_input(" prev "), BrowseInput::Prev);
        assert_eq!(parse_browse_input("g 4"), BrowseInput::Page(4));
        assert_eq!(parse_browse_input("size 100"), BrowseInput::Size(100));
        assert_eq!(parse_browse_input("row 12"), BrowseInput::Detail(12));
        assert_eq!(parse_browse_input("q"), BrowseInput::Quit);
    }

    #[test]
    fn sort_accepts_multi_word_columns() {
        assert_eq!(
            parse_browse_input("sort Order Date desc"),
            BrowseInput::Sort(SortField::Column("Order Date".into()), SortDirection::Desc)
        );
        assert_eq!(
            parse_browse_input("sort Order Date"),
            BrowseInput::Sort(SortField::Column("Order Date".into()), SortDirection::Asc)
        );
        assert_eq!(
            parse_browse_input("sort sheetIndex asc"),
            BrowseInput::Sort(SortField::SheetIndex, SortDirection::Asc)
        );
    }

    #[test]
    fn search_inputs_and_garbage() {
        assert_eq!(parse_browse_input("/acme corp"), BrowseInput::Search("acme corp".into()));
        assert_eq!(parse_browse_input("search "), BrowseInput::Search(String::new()));
        assert_eq!(parse_browse_input("g x"), BrowseInput::Unknown("g x".into()));
        assert_eq!(parse_browse_input("sort"), BrowseInput::Unknown("sort".into()));
    }
}
