//! Manual header confirmation for files whose header row the backend could
//! not detect. One sheet is previewed at a time; after each successful
//! reprocess the next unvalidated sheet opens by itself.

use std::collections::BTreeSet;

use tracing::{error, info, warn};

use crate::clients::ApiClient;
use crate::error::{AppError, Result};
use crate::models::{FileEntity, SheetEntity, SheetPreview};

/// Reprocess call the operator's header choice turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReprocessRequest {
    pub sheet_id: i64,
    /// 1-based row number.
    pub header_row_index: u32,
}

#[derive(Debug, Clone)]
pub struct HeaderValidation {
    file_id: i64,
    sheets: Vec<SheetEntity>,
    validated: BTreeSet<i64>,
    sheet_to_preview: Option<i64>,
    last_error: Option<String>,
}

impl HeaderValidation {
    pub fn new(file_id: i64, sheets: Vec<SheetEntity>, needs_validation: bool) -> Self {
        let mut state = Self {
            file_id,
            sheets,
            validated: BTreeSet::new(),
            sheet_to_preview: None,
            last_error: None,
        };
        if needs_validation {
            state.sheet_to_preview = state.next_unvalidated();
        }
        state
    }

    pub fn sheets(&self) -> &[SheetEntity] {
        &self.sheets
    }

    pub fn is_validated(&self, sheet_id: i64) -> bool {
        self.validated.contains(&sheet_id)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Sheet whose preview is open, if any.
    pub fn sheet_to_preview(&self) -> Option<&SheetEntity> {
        let id = self.sheet_to_preview?;
        self.sheets.iter().find(|s| s.id == id)
    }

    pub fn next_unvalidated(&self) -> Option<i64> {
        self.sheets
            .iter()
            .map(|s| s.id)
            .find(|id| !self.validated.contains(id))
    }

    pub fn open_preview(&mut self, sheet_id: i64) -> Result<()> {
        if !self.sheets.iter().any(|s| s.id == sheet_id) {
            return Err(AppError::InvalidInput(format!("sheet {} is not part of this file", sheet_id)));
        }
        self.sheet_to_preview = Some(sheet_id);
        Ok(())
    }

    pub fn close_preview(&mut self) {
        self.sheet_to_preview = None;
    }

    /// Closes the preview and returns the reprocess to issue. `preview_len`
    /// is the number of rows the operator could pick from.
    pub fn select_header(&mut self, header_row_index: u32, preview_len: usize) -> Result<ReprocessRequest> {
        let sheet_id = self
            .sheet_to_preview
            .ok_or_else(|| AppError::InvalidInput("no sheet preview is open".to_string()))?;
        if header_row_index == 0 || header_row_index as usize > preview_len {
            return Err(AppError::InvalidInput(format!(
                "header row must be between 1 and {}",
                preview_len
            )));
        }
        self.sheet_to_preview = None;
        Ok(ReprocessRequest {
            sheet_id,
            header_row_index,
        })
    }

    /// Only a backend acknowledgment marks a sheet validated.
    /// Ids outside this file are ignored.
    pub fn reprocess_succeeded(&mut self, sheet_id: i64) {
        if !self.sheets.iter().any(|s| s.id == sheet_id) {
            warn!("Ignoring reprocess of sheet {}, not part of file {}", sheet_id, self.file_id);
            return;
        }
        self.validated.insert(sheet_id);
        self.last_error = None;
        self.sheet_to_preview = self.next_unvalidated();
    }

    /// The sheet stays pending and nothing opens; the operator retries.
    pub fn reprocess_failed(&mut self, sheet_id: i64, err: &AppError) {
        warn!("Reprocess of sheet {} failed: {}", sheet_id, err);
        self.last_error = Some(err.to_string());
        self.sheet_to_preview = None;
    }

    pub fn all_sheets_validated(&self) -> bool {
        !self.sheets.is_empty() && self.sheets.iter().all(|s| self.validated.contains(&s.id))
    }

    /// File id to browse once every sheet is confirmed.
    pub fn finish(&self) -> Result<i64> {
        if self.all_sheets_validated() {
            return Ok(self.file_id);
        }
        let pending = self
            .sheets
            .iter()
            .filter(|s| !self.validated.contains(&s.id))
            .count();
        Err(AppError::InvalidInput(format!(
            "{} of {} sheets still need a header row",
            pending,
            self.sheets.len()
        )))
    }
}

/// Whatever shows the preview and lets the operator click a row number.
pub trait HeaderPicker {
    /// 1-based row number chosen as header, `None` to close the preview.
    fn pick(&mut self, sheet: &SheetEntity, preview: &SheetPreview) -> Option<u32>;

    fn report(&mut self, _message: &str) {}
}

pub struct ValidationWorkflow<'a> {
    api: &'a ApiClient,
    preview_limit: u32,
}

impl<'a> ValidationWorkflow<'a> {
    pub fn new(api: &'a ApiClient, preview_limit: u32) -> Self {
        Self { api, preview_limit }
    }

    /// `needs_validation` comes from whoever knows better than the file
    /// record, typically the upload answer; `None` trusts the file.
    pub async fn load(&self, file_id: i64, needs_validation: Option<bool>) -> Result<(FileEntity, HeaderValidation)> {
        let (file, sheets) = tokio::join!(self.api.get_file(file_id), self.api.get_sheets(file_id));
        let file = file?;
        let sheets = sheets?;
        info!("Loaded {} sheets for {}", sheets.len(), file.file_name);
        let needs_validation = needs_validation.unwrap_or(file.needs_header_validation);
        let state = HeaderValidation::new(file.id, sheets, needs_validation);
        Ok((file, state))
    }

    /// Loads the file and confirms headers until the picker stops.
    pub async fn run<P: HeaderPicker>(
        &self,
        file_id: i64,
        needs_validation: Option<bool>,
        picker: &mut P,
    ) -> Result<(FileEntity, HeaderValidation)> {
        let (file, mut state) = self.load(file_id, needs_validation).await?;
        self.drive(&mut state, picker).await?;
        Ok((file, state))
    }

    /// Walks open previews until the picker closes one, a reprocess fails,
    /// or nothing is left to validate.
    pub async fn drive<P: HeaderPicker>(&self, state: &mut HeaderValidation, picker: &mut P) -> Result<()> {
        while let Some(sheet) = state.sheet_to_preview().cloned() {
            let preview = self
                .api
                .sheet_preview(state.file_id, sheet.sheet_index, self.preview_limit)
                .await?;

            let Some(row) = picker.pick(&sheet, &preview) else {
                state.close_preview();
                break;
            };

            let request = match state.select_header(row, preview.preview_rows.len()) {
                Ok(request) => request,
                Err(e) => {
                    picker.report(&e.to_string());
                    continue;
                }
            };

            match self
                .api
                .reprocess_sheet(request.sheet_id, request.header_row_index)
                .await
            {
                Ok(()) => {
                    info!("Header row {} confirmed for {}", row, sheet.sheet_name);
                    picker.report(&format!("Header validated for sheet {}", sheet.sheet_name));
                    state.reprocess_succeeded(request.sheet_id);
                }
                Err(e) => {
                    error!("Reprocess failed for {}: {}", sheet.sheet_name, e);
                    picker.report(&format!("Reprocessing {} failed: {}", sheet.sheet_name, e));
                    state.reprocess_failed(request.sheet_id, &e);
                    break;
                }
            }
        }
        Ok(())
    }
}
