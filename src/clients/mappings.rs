use reqwest::Method;

use super::api::ApiClient;
use crate::error::Result;
use crate::models::{NewSheetMappingTemplate, SheetMapping, SheetMappingTemplate};

impl ApiClient {
    /// `None` when the sheet has never been mapped.
    pub async fn get_mapping(&self, sheet_id: i64) -> Result<Option<SheetMapping>> {
        match self
            .send_json(self.request(Method::GET, &format!("/sheets/{}/mapping", sheet_id)))
            .await
        {
            Ok(mapping) => Ok(Some(mapping)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn save_mapping(&self, sheet_id: i64, mapping: &SheetMapping) -> Result<SheetMapping> {
        self.send_json(
            self.request(Method::POST, &format!("/sheets/{}/mapping", sheet_id))
                .json(mapping),
        )
        .await
    }

    /// Returns the sheet's mapping as rewritten by the backend.
    pub async fn apply_template(&self, sheet_id: i64, template_id: i64) -> Result<SheetMapping> {
        self.send_json(
            self.request(
                Method::POST,
                &format!("/sheets/{}/mapping/apply-template/{}", sheet_id, template_id),
            )
            .json(&serde_json::json!({})),
        )
        .await
    }

    pub async fn list_templates(&self) -> Result<Vec<SheetMappingTemplate>> {
        self.send_json(self.request(Method::GET, "/mappings/templates"))
            .await
    }

    pub async fn create_template(&self, template: &NewSheetMappingTemplate) -> Result<SheetMappingTemplate> {
        self.send_json(self.request(Method::POST, "/mappings/templates").json(template))
            .await
    }
}
