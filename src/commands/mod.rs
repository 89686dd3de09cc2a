//! Command-line surface: argument definitions and dispatch to the services.

pub mod admin;
pub mod auth;
pub mod files;
pub mod graph;
pub mod history;
pub mod mapping;
pub mod render;
pub mod rows;
pub mod validate;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::warn;

use crate::clients::ApiClient;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::SheetEntity;
use crate::session::SessionStore;

#[derive(Parser)]
#[command(name = "sheet-console")]
#[command(about = "Operator console for the Excel ingestion backend", long_about = None)]
pub struct Cli {
    /// Backend base URL for both API and auth calls (overrides API_BASE_URL and AUTH_BASE_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and remember the session
    Login {
        #[arg(short, long)]
        username: String,
        /// Read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show who is logged in
    Whoami,

    /// Upload a spreadsheet
    Upload {
        path: PathBuf,
        /// Start header validation right away when the backend asks for it
        #[arg(long)]
        validate: bool,
    },

    /// Uploaded files
    #[command(subcommand)]
    Files(files::FilesCommand),

    /// Browse the rows of a file's sheets
    Browse(rows::BrowseArgs),

    /// Create, edit, delete or export rows
    #[command(subcommand)]
    Rows(rows::RowsCommand),

    /// Modification history
    #[command(subcommand)]
    History(history::HistoryCommand),

    /// Confirm the header row of every sheet of a file
    Validate {
        file_id: i64,
    },

    /// Column-to-field mapping of a sheet
    #[command(subcommand)]
    Mapping(mapping::MappingCommand),

    /// Reusable mapping templates
    #[command(subcommand)]
    Templates(mapping::TemplatesCommand),

    /// Aggregate a sheet into a chart
    Graph(graph::GraphArgs),

    /// Delete every file, row and history entry
    Reset {
        #[arg(long)]
        yes: bool,
    },

    /// User administration (ADMIN only)
    #[command(subcommand)]
    Admin(admin::AdminCommand),
}

// Application state
pub struct AppState {
    pub config: Config,
    pub store: SessionStore,
    pub api: ApiClient,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self> {
        let store = SessionStore::new(config.session_file.clone());
        let mut api = ApiClient::new(&config)?;
        match store.load().await {
            Ok(Some(session)) => api = api.with_session(session),
            Ok(None) => {}
            Err(e) => warn!("Ignoring unreadable session file {}: {}", store.path().display(), e),
        }
        Ok(Self { config, store, api })
    }

    /// The client, provided someone is logged in.
    pub fn authed(&self) -> Result<&ApiClient> {
        self.api.require_session()?;
        Ok(&self.api)
    }
}

pub async fn run(state: &mut AppState, command: Commands) -> Result<()> {
    match command {
        Commands::Login { username, password } => auth::login(state, &username, password).await,
        Commands::Logout => auth::logout(state).await,
        Commands::Whoami => auth::whoami(state),
        Commands::Upload { path, validate } => files::upload(state, &path, validate).await,
        Commands::Files(cmd) => files::run(state, cmd).await,
        Commands::Browse(args) => rows::browse(state, args).await,
        Commands::Rows(cmd) => rows::run(state, cmd).await,
        Commands::History(cmd) => history::run(state, cmd).await,
        Commands::Validate { file_id } => validate::run(state, file_id, true).await,
        Commands::Mapping(cmd) => mapping::run(state, cmd).await,
        Commands::Templates(cmd) => mapping::run_templates(state, cmd).await,
        Commands::Graph(args) => graph::run(state, args).await,
        Commands::Reset { yes } => files::reset(state, yes).await,
        Commands::Admin(cmd) => admin::run(state, cmd).await,
    }
}

/// Destructive actions go through here: `--yes` or an explicit `y`.
pub fn confirm(question: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    print!("{} [y/N] ", question);
    io::stdout().flush()?;
    let answer = read_line()?.unwrap_or_default();
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// One line from stdin, `None` at end of input.
pub fn read_line() -> Result<Option<String>> {
    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        Ok(None)
    } else {
        Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
    }
}

/// Sheet `sheet_id` of file `file_id`, or the first sheet when unspecified.
pub async fn find_sheet(api: &ApiClient, file_id: i64, sheet_id: Option<i64>) -> Result<SheetEntity> {
    let sheets = api.get_sheets(file_id).await?;
    let sheet = match sheet_id {
        Some(id) => sheets.into_iter().find(|s| s.id == id),
        None => sheets.into_iter().next(),
    };
    sheet.ok_or_else(|| {
        AppError::NotFound(match sheet_id {
            Some(id) => format!("sheet {} in file {}", id, file_id),
            None => format!("file {} has no sheets", file_id),
        })
    })
}
