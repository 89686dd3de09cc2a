use std::io::{self, Write};

use super::{read_line, render, AppState};
use crate::error::Result;
use crate::models::{SheetEntity, SheetPreview};
use crate::services::{HeaderPicker, SheetBrowser, ValidationWorkflow};

/// Prints each preview with row numbers and reads the operator's choice.
struct StdinPicker;

impl HeaderPicker for StdinPicker {
    fn pick(&mut self, sheet: &SheetEntity, preview: &SheetPreview) -> Option<u32> {
        println!("\nSheet {} ({} of the first rows):", sheet.sheet_name, preview.preview_rows.len());
        for (i, row) in preview.preview_rows.iter().enumerate() {
            let cells: Vec<String> = row.iter().map(|c| render::truncate(c, 16)).collect();
            println!("{:>4} | {}", i + 1, cells.join(" | "));
        }
        loop {
            print!("Header row number (empty to stop): ");
            io::stdout().flush().ok()?;
            let line = read_line().ok()??;
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            match line.parse() {
                Ok(n) => return Some(n),
                Err(_) => println!("{} is not a row number", line),
            }
        }
    }

    fn report(&mut self, message: &str) {
        println!("{}", message);
    }
}

/// `needs_validation` overrides the flag on the file record.
pub async fn run(state: &AppState, file_id: i64, needs_validation: bool) -> Result<()> {
    let api = state.authed()?;
    let workflow = ValidationWorkflow::new(api, state.config.preview_row_limit);
    let (file, validation) = workflow
        .run(file_id, Some(needs_validation), &mut StdinPicker)
        .await?;

    if !needs_validation && !file.needs_header_validation {
        println!("{} does not need header validation", file.file_name);
        return Ok(());
    }

    match validation.finish() {
        Ok(file_id) => {
            println!("All sheets of {} validated", file.file_name);
            let mut browser = SheetBrowser::new(&state.config);
            // headers changed with the reprocess
            if let Some(request) = browser.set_sheets(api.get_sheets(file_id).await?) {
                browser.fetch(api, request).await;
                print!("{}", render::rows_table(&browser));
            }
            println!("Browse further: sheet-console browse {}", file_id);
        }
        Err(e) => {
            println!("{}", e);
            println!("Resume with: sheet-console validate {}", file.id);
        }
    }
    Ok(())
}
