pub mod debounce;
pub mod pages;
pub mod viewport;

pub use debounce::Debouncer;
pub use pages::{visible_pages, PageItem};
pub use viewport::{RowRequest, SortDirection, SortField, Viewport};

use tracing::{error, info, warn};

use crate::clients::ApiClient;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{PageResponse, RowEntity, SheetEntity};

/// Row table over the sheets of one file: which sheet is selected, its
/// columns, the viewport, and the last page that came back.
#[derive(Debug)]
pub struct SheetBrowser {
    sheets: Vec<SheetEntity>,
    selected: Option<usize>,
    columns: Vec<String>,
    viewport: Viewport,
    rows: Vec<RowEntity>,
    total_elements: u64,
    loading: bool,
    last_error: Option<String>,
    max_visible_columns: usize,
    window_radius: u32,
}

impl SheetBrowser {
    pub fn new(config: &Config) -> Self {
        Self {
            sheets: Vec::new(),
            selected: None,
            columns: Vec::new(),
            viewport: Viewport::new(config.page_sizes.clone(), config.default_page_size),
            rows: Vec::new(),
            total_elements: 0,
            loading: false,
            last_error: None,
            max_visible_columns: config.max_visible_columns,
            window_radius: config.page_window_radius,
        }
    }

    pub fn sheets(&self) -> &[SheetEntity] {
        &self.sheets
    }

    pub fn selected_sheet(&self) -> Option<&SheetEntity> {
        self.selected.map(|i| &self.sheets[i])
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn rows(&self) -> &[RowEntity] {
        &self.rows
    }

    pub fn total_elements(&self) -> u64 {
        self.total_elements
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Replaces the sheet list and selects the first sheet.
    pub fn set_sheets(&mut self, sheets: Vec<SheetEntity>) -> Option<RowRequest> {
        self.sheets = sheets;
        self.selected = None;
        let first = self.sheets.first().map(|s| s.id)?;
        self.select_sheet(first).ok()
    }

    /// Switching sheets resets the whole viewport and reloads the columns
    /// from the sheet's headers.
    pub fn select_sheet(&mut self, sheet_id: i64) -> Result<RowRequest> {
        let index = self
            .sheets
            .iter()
            .position(|s| s.id == sheet_id)
            .ok_or_else(|| AppError::InvalidInput(format!("sheet {} is not part of this file", sheet_id)))?;

        self.selected = Some(index);
        self.columns = self.sheets[index].headers();
        self.viewport.reset();
        self.rows.clear();
        self.total_elements = 0;
        info!(
            "Selected sheet {} ({} columns)",
            self.sheets[index].sheet_name,
            self.columns.len()
        );
        Ok(self.issue(|vp| vp.request()))
    }

    pub fn refresh(&mut self) -> RowRequest {
        self.issue(|vp| vp.request())
    }

    pub fn set_page_size(&mut self, size: u32) -> Result<RowRequest> {
        let request = self.viewport.set_page_size(size)?;
        self.loading = true;
        Ok(request)
    }

    pub fn set_sort(&mut self, field: Option<SortField>, direction: SortDirection) -> RowRequest {
        self.issue(|vp| vp.set_sort(field, direction))
    }

    pub fn set_keyword(&mut self, keyword: &str) -> RowRequest {
        self.issue(|vp| vp.set_keyword(keyword))
    }

    pub fn go_to_page(&mut self, page: i64) -> Option<RowRequest> {
        let request = self.viewport.go_to_page(page)?;
        self.loading = true;
        Some(request)
    }

    fn issue(&mut self, f: impl FnOnce(&mut Viewport) -> RowRequest) -> RowRequest {
        let request = f(&mut self.viewport);
        self.loading = true;
        request
    }

    /// Applies the answer to request `seq`. Answers to anything but the
    /// latest request are dropped; returns whether this one was applied.
    pub fn apply_page(&mut self, seq: u64, result: Result<PageResponse<RowEntity>>) -> bool {
        if !self.viewport.is_latest(seq) {
            warn!("Discarding stale row page (request {})", seq);
            return false;
        }

        self.loading = false;
        match result {
            Ok(page) => {
                self.rows = page.content;
                self.total_elements = page.total_elements;
                self.viewport.set_total_pages(page.total_pages);
                self.last_error = None;
            }
            Err(e) => {
                error!("Failed to load rows: {}", e);
                self.rows.clear();
                self.total_elements = 0;
                self.viewport.set_total_pages(0);
                self.last_error = Some(e.to_string());
            }
        }
        true
    }

    /// Runs `request` against the backend and applies the answer.
    pub async fn fetch(&mut self, api: &ApiClient, request: RowRequest) -> bool {
        let sheet_id = match self.selected_sheet() {
            Some(sheet) => sheet.id,
            None => {
                return self.apply_page(
                    request.seq,
                    Err(AppError::InvalidInput("no sheet selected".to_string())),
                )
            }
        };
        let result = api.list_rows(sheet_id, &request.query).await;
        self.apply_page(request.seq, result)
    }

    pub fn visible_columns(&self) -> &[String] {
        let n = self.columns.len().min(self.max_visible_columns);
        &self.columns[..n]
    }

    pub fn hidden_column_count(&self) -> usize {
        self.columns.len().saturating_sub(self.max_visible_columns)
    }

    pub fn page_window(&self) -> Vec<PageItem> {
        visible_pages(
            self.viewport.current_page(),
            self.viewport.total_pages(),
            self.window_radius,
        )
    }

    /// 1-based bounds of the rows on screen, `None` when the page is empty.
    pub fn showing_range(&self) -> Option<(u64, u64)> {
        if self.rows.is_empty() {
            return None;
        }
        let size = u64::from(self.viewport.page_size());
        let start = u64::from(self.viewport.current_page()) * size + 1;
        let end = (start - 1 + size).min(self.total_elements);
        Some((start, end))
    }
}
