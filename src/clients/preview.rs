use reqwest::Method;
use serde::Serialize;

use super::api::{ApiClient, QueryParams};
use crate::error::Result;
use crate::models::SheetPreview;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReprocessBody {
    header_row_index: u32,
}

impl ApiClient {
    /// First `limit` raw rows of a sheet, before any header detection.
    pub async fn sheet_preview(&self, file_id: i64, sheet_index: u32, limit: u32) -> Result<SheetPreview> {
        let params = QueryParams::new().set("limit", limit);
        self.send_json(
            self.request(
                Method::GET,
                &format!("/preview/file/{}/sheet/{}", file_id, sheet_index),
            )
            .query(params.as_slice()),
        )
        .await
    }

    /// `header_row_index` is 1-based, as shown to the operator.
    pub async fn reprocess_sheet(&self, sheet_id: i64, header_row_index: u32) -> Result<()> {
        self.send_empty(
            self.request(Method::POST, &format!("/excel/sheet/{}/reprocess", sheet_id))
                .json(&ReprocessBody { header_row_index }),
        )
        .await
    }
}
