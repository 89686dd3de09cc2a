use reqwest::Method;

use super::api::ApiClient;
use crate::error::Result;
use crate::models::{GraphData, GraphRequest};

impl ApiClient {
    pub async fn generate_graph(&self, sheet_id: i64, request: &GraphRequest) -> Result<GraphData> {
        self.send_json(
            self.request(Method::POST, &format!("/graphs/sheet/{}", sheet_id))
                .json(request),
        )
        .await
    }
}
