use reqwest::Method;

use super::api::{ApiClient, QueryParams};
use crate::error::Result;
use crate::models::{ModificationHistory, PageResponse};

impl ApiClient {
    pub async fn row_history(&self, row_id: i64) -> Result<Vec<ModificationHistory>> {
        self.send_json(self.request(Method::GET, &format!("/history/row/{}", row_id)))
            .await
    }

    pub async fn sheet_history(
        &self,
        sheet_id: i64,
        page: u32,
        size: u32,
    ) -> Result<PageResponse<ModificationHistory>> {
        let params = QueryParams::new().set("page", page).set("size", size);
        self.send_json(
            self.request(Method::GET, &format!("/history/sheet/{}", sheet_id))
                .query(params.as_slice()),
        )
        .await
    }

    pub async fn all_history(&self) -> Result<Vec<ModificationHistory>> {
        self.send_json(self.request(Method::GET, "/history/all")).await
    }
}
