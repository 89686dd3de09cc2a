use crate::models::{FileEntity, ModificationHistory, OperationType, PageResponse, RowEntity};
use crate::services::browser::{PageItem, SheetBrowser};
use crate::services::history;

const CELL_WIDTH: usize = 20;

pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

fn cell(text: &str) -> String {
    format!("{:<width$}", truncate(text, CELL_WIDTH), width = CELL_WIDTH)
}

pub fn files_table(page: &PageResponse<FileEntity>) -> String {
    let mut out = format!("{:>6}  {:<40}  {:<20}  {:>8}\n", "ID", "File", "Uploaded", "Rows");
    for file in &page.content {
        let marker = if file.needs_header_validation { " (needs validation)" } else { "" };
        out.push_str(&format!(
            "{:>6}  {:<40}  {:<20}  {:>8}{}\n",
            file.id,
            truncate(&file.file_name, 40),
            history::display_timestamp(&file.upload_timestamp),
            file.total_rows,
            marker
        ));
    }
    out.push_str(&format!(
        "page {}/{} ({} files)\n",
        page.number + 1,
        page.total_pages.max(1),
        page.total_elements
    ));
    out
}

/// Page links, current page in brackets, 1-based like the operator sees them.
pub fn page_links(items: &[PageItem], current: u32) -> String {
    items
        .iter()
        .map(|item| match item {
            PageItem::Page(p) if *p == current => format!("[{}]", p + 1),
            PageItem::Page(p) => (p + 1).to_string(),
            PageItem::Ellipsis => "…".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn rows_table(browser: &SheetBrowser) -> String {
    let mut out = String::new();
    if let Some(sheet) = browser.selected_sheet() {
        out.push_str(&format!("Sheet {} ({})\n", sheet.sheet_name, sheet.id));
    }

    let columns = browser.visible_columns();
    let mut header = format!("{:>8}  ", "ID");
    for column in columns {
        header.push_str(&cell(column));
        header.push(' ');
    }
    if browser.hidden_column_count() > 0 {
        header.push_str(&format!("+{} columns", browser.hidden_column_count()));
    }
    out.push_str(header.trim_end());
    out.push('\n');

    if let Some(err) = browser.last_error() {
        out.push_str(&format!("(failed to load rows: {})\n", err));
    } else if browser.rows().is_empty() {
        out.push_str("(no rows)\n");
    }

    for row in browser.rows() {
        let mut line = format!("{:>8}  ", row.id.map(|id| id.to_string()).unwrap_or_default());
        for column in columns {
            let value = row.data.get(column).map(|v| v.to_string()).unwrap_or_default();
            line.push_str(&cell(&value));
            line.push(' ');
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    if let Some((start, end)) = browser.showing_range() {
        out.push_str(&format!("rows {}-{} of {}\n", start, end, browser.total_elements()));
    }
    let links = page_links(&browser.page_window(), browser.viewport().current_page());
    if !links.is_empty() {
        out.push_str(&format!("pages: {}\n", links));
    }
    out
}

/// Every column of one row, including those cut from the table.
pub fn row_detail(columns: &[String], row: &RowEntity) -> String {
    let width = columns.iter().map(|c| c.chars().count()).max().unwrap_or(0);
    let mut out = format!("Row {}\n", row.id.map(|id| id.to_string()).unwrap_or_else(|| "(new)".into()));
    for column in columns {
        let value = row.data.get(column).map(|v| v.to_string()).unwrap_or_default();
        out.push_str(&format!("  {:<width$} : {}\n", column, value, width = width));
    }
    out
}

pub fn history_entry(entry: &ModificationHistory) -> String {
    let mut out = format!(
        "#{} {} row {} at {}{}\n",
        entry.id,
        entry.operation_type,
        entry.row_entity_id,
        history::display_timestamp(&entry.timestamp),
        entry
            .sheet_name
            .as_deref()
            .map(|s| format!(" (sheet {})", s))
            .unwrap_or_default()
    );
    match entry.operation_type {
        OperationType::Create => {
            out.push_str(&indent(&history::pretty_snapshot(entry.new_data.as_deref())));
        }
        OperationType::Delete => {
            out.push_str(&indent(&history::pretty_snapshot(entry.old_data.as_deref())));
        }
        OperationType::Update => {
            let changes = history::diff(entry);
            if changes.is_empty() {
                out.push_str("    (no field changes)\n");
            }
            for change in changes {
                out.push_str(&format!(
                    "    {}: {} -> {}\n",
                    change.field,
                    history::format_value(change.old.as_ref()),
                    history::format_value(change.new.as_ref())
                ));
            }
        }
    }
    out
}

fn indent(text: &str) -> String {
    text.lines().map(|l| format!("    {}\n", l)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_text_is_cut_with_ellipsis() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijk", 5), "abcd…");
    }

    #[test]
    fn page_links_mark_current_page() {
        let items = [PageItem::Page(0), PageItem::Page(1), PageItem::Ellipsis, PageItem::Page(9)];
        assert_eq!(page_links(&items, 1), "1 [2] … 10");
    }

    #[test]
    fn update_entries_render_their_diff() {
        let entry = ModificationHistory {
            id: 3,
            row_entity_id: 8,
            operation_type: OperationType::Update,
            old_data: Some(r#"{"City":"Lyon"}"#.into()),
            new_data: Some(r#"{"City":"Paris"}"#.into()),
            timestamp: "2024-05-01T10:00:00".into(),
            sheet_name: Some("Clients".into()),
        };
        let text = history_entry(&entry);
        assert!(text.starts_with("#3 UPDATE row 8 at 2024-05-01 10:00:00 (sheet Clients)"));
        assert!(text.contains("City: Lyon -> Paris"));
    }
}
