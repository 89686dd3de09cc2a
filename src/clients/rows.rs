use reqwest::Method;
use tokio::io::AsyncWrite;

use super::api::{ApiClient, QueryParams};
use crate::error::Result;
use crate::models::{PageResponse, RowEntity};

/// Query parameters of one row page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowsQuery {
    pub page: u32,
    pub size: u32,
    pub keyword: Option<String>,
    /// Already formatted as `field,direction`.
    pub sort: Option<String>,
}

impl ApiClient {
    pub async fn list_rows(&self, sheet_id: i64, query: &RowsQuery) -> Result<PageResponse<RowEntity>> {
        let params = QueryParams::new()
            .set("page", query.page)
            .set("size", query.size)
            .set_opt("keyword", query.keyword.as_deref())
            .set_opt("sort", query.sort.as_deref());

        self.send_json(
            self.request(Method::GET, &format!("/rows/sheet/{}", sheet_id))
                .query(params.as_slice()),
        )
        .await
    }

    pub async fn get_row(&self, id: i64) -> Result<RowEntity> {
        self.send_json(self.request(Method::GET, &format!("/rows/{}", id)))
            .await
    }

    pub async fn create_row(&self, sheet_id: i64, row: &RowEntity) -> Result<RowEntity> {
        self.send_json(
            self.request(Method::POST, &format!("/rows/sheet/{}", sheet_id))
                .json(row),
        )
        .await
    }

    pub async fn update_row(&self, id: i64, row: &RowEntity) -> Result<RowEntity> {
        self.send_json(self.request(Method::PUT, &format!("/rows/{}", id)).json(row))
            .await
    }

    pub async fn delete_row(&self, id: i64) -> Result<()> {
        self.send_empty(self.request(Method::DELETE, &format!("/rows/{}", id)))
            .await
    }

    /// Exports the sheet's rows, filtered by the same keyword as the table,
    /// into `sink`. Returns the number of bytes written.
    pub async fn download_rows<W>(&self, sheet_id: i64, keyword: Option<&str>, sink: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        let params = QueryParams::new().set_opt("keyword", keyword);
        self.send_to(
            self.request(Method::GET, &format!("/rows/sheet/{}/download", sheet_id))
                .query(params.as_slice()),
            sink,
        )
        .await
    }
}
