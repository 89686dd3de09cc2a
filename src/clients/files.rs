use reqwest::multipart::{Form, Part};
use reqwest::Method;

use super::api::{ApiClient, QueryParams};
use crate::error::Result;
use crate::models::{FileEntity, PageResponse, SheetEntity, UploadResponse};

const EXCEL_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const LEGACY_EXCEL_MIME: &str = "application/vnd.ms-excel";

impl ApiClient {
    /// Sends a spreadsheet as the multipart `file` field.
    pub async fn upload_file(&self, file_name: &str, content: Vec<u8>) -> Result<UploadResponse> {
        let mime = if file_name.to_lowercase().ends_with(".xls") {
            LEGACY_EXCEL_MIME
        } else {
            EXCEL_MIME
        };
        let part = Part::bytes(content)
            .file_name(file_name.to_string())
            .mime_str(mime)?;
        let form = Form::new().part("file", part);

        self.send_json(self.request(Method::POST, "/excel/upload").multipart(form))
            .await
    }

    /// Newest uploads first.
    pub async fn list_files(
        &self,
        page: u32,
        size: u32,
        search: Option<&str>,
    ) -> Result<PageResponse<FileEntity>> {
        let params = QueryParams::new()
            .set("page", page)
            .set("size", size)
            .set("sort", "uploadTimestamp,desc")
            .set_opt("search", search);

        self.send_json(self.request(Method::GET, "/files").query(params.as_slice()))
            .await
    }

    pub async fn get_file(&self, id: i64) -> Result<FileEntity> {
        self.send_json(self.request(Method::GET, &format!("/files/{}", id)))
            .await
    }

    /// Sheets of a file, ordered by position in the workbook.
    pub async fn get_sheets(&self, file_id: i64) -> Result<Vec<SheetEntity>> {
        let mut sheets: Vec<SheetEntity> = self
            .send_json(self.request(Method::GET, &format!("/files/{}/sheets", file_id)))
            .await?;
        sheets.sort_by_key(|s| s.sheet_index);
        Ok(sheets)
    }

    pub async fn delete_file(&self, id: i64) -> Result<()> {
        self.send_empty(self.request(Method::DELETE, &format!("/files/{}", id)))
            .await
    }

    /// Wipes every file, row and history entry on the backend.
    pub async fn reset_all(&self) -> Result<()> {
        self.send_empty(self.request(Method::DELETE, "/reset")).await
    }
}
