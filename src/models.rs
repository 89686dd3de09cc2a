use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// One spreadsheet cell. Spreadsheets are untyped, so a cell is whatever
/// scalar the backend stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl CellValue {
    /// Interprets operator-typed text: `null`/empty, booleans, numbers, else text.
    pub fn parse_input(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
            return CellValue::Null;
        }
        match trimmed {
            "true" => return CellValue::Bool(true),
            "false" => return CellValue::Bool(false),
            _ => {}
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return CellValue::Number(Number::from(i));
        }
        if let Some(n) = trimmed.parse::<f64>().ok().and_then(Number::from_f64) {
            return CellValue::Number(n);
        }
        CellValue::String(trimmed.to_string())
    }

    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::String(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::String(s) => f.write_str(s),
        }
    }
}

/// Column name to cell, in the order the backend or the editor wrote them.
pub type RowData = IndexMap<String, CellValue>;

fn parse_headers(headers_json: Option<&str>) -> Vec<String> {
    match headers_json {
        Some(raw) if !raw.trim().is_empty() => serde_json::from_str(raw).unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable headersJson: {}", e);
            Vec::new()
        }),
        _ => Vec::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntity {
    pub id: i64,
    pub file_name: String,
    pub upload_timestamp: String,
    #[serde(default)]
    pub headers_json: Option<String>,
    #[serde(default, alias = "totalProcessedRows")]
    pub total_rows: u64,
    #[serde(default)]
    pub sheet_count: Option<u32>,
    #[serde(default)]
    pub processed: bool,
    #[serde(default)]
    pub needs_header_validation: bool,
}

impl FileEntity {
    pub fn headers(&self) -> Vec<String> {
        parse_headers(self.headers_json.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetEntity {
    pub id: i64,
    pub sheet_name: String,
    pub sheet_index: u32,
    #[serde(default)]
    pub headers_json: Option<String>,
    #[serde(default)]
    pub total_rows: u64,
}

impl SheetEntity {
    pub fn headers(&self) -> Vec<String> {
        parse_headers(self.headers_json.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RowEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_index: Option<u32>,
    #[serde(default)]
    pub data: RowData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationType {
    Create,
    Update,
    Delete,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OperationType::Create => "CREATE",
            OperationType::Update => "UPDATE",
            OperationType::Delete => "DELETE",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModificationHistory {
    pub id: i64,
    pub row_entity_id: i64,
    pub operation_type: OperationType,
    #[serde(default)]
    pub old_data: Option<String>,
    #[serde(default)]
    pub new_data: Option<String>,
    pub timestamp: String,
    #[serde(default)]
    pub sheet_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRule {
    pub source: String,
    pub destination: String,
}

impl MappingRule {
    pub fn unmapped(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SheetMapping {
    #[serde(default)]
    pub mappings: Vec<MappingRule>,
    #[serde(default)]
    pub ignore_unmapped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetMappingTemplate {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub mapping_definition_json: String,
}

impl SheetMappingTemplate {
    pub fn definition(&self) -> serde_json::Result<SheetMapping> {
        serde_json::from_str(&self.mapping_definition_json)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSheetMappingTemplate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub mapping_definition: SheetMapping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Pie,
    Bar,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AggregationType {
    Count,
    Sum,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphRequest {
    pub chart_type: ChartType,
    pub category_column: String,
    pub value_columns: Vec<String>,
    pub aggregation_type: AggregationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grouping_column: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub label: Option<String>,
    pub data: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GraphData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u32,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub first: bool,
    #[serde(default)]
    pub last: bool,
    #[serde(default)]
    pub empty: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub errors: Vec<String>,
    #[serde(default)]
    pub processed_rows: u64,
    #[serde(default)]
    pub file_id: Option<i64>,
    #[serde(default)]
    pub needs_manual_validation: bool,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SheetPreview {
    pub preview_rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: i64,
    pub username: String,
    pub action: String,
    #[serde(default)]
    pub details: Option<String>,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn row_data_keeps_scalar_kinds() {
        let row: RowEntity = serde_json::from_value(json!({
            "id": 7,
            "data": {"name": "Ada", "age": 36, "active": true, "note": null, "score": 9.5}
        }))
        .unwrap();

        assert_eq!(row.id, Some(7));
        assert_eq!(row.data["name"], CellValue::String("Ada".into()));
        assert_eq!(row.data["age"], CellValue::Number(36.into()));
        assert_eq!(row.data["active"], CellValue::Bool(true));
        assert_eq!(row.data["note"], CellValue::Null);
        assert_eq!(row.data["score"].to_string(), "9.5");
    }

    #[test]
    fn row_data_keeps_column_order_both_ways() {
        let raw = r#"{"data":{"Zone":"N","Amount":3,"City":"Lyon"}}"#;
        let row: RowEntity = serde_json::from_str(raw).unwrap();
        assert_eq!(row.data.keys().collect::<Vec<_>>(), ["Zone", "Amount", "City"]);
        assert_eq!(serde_json::to_string(&row).unwrap(), raw);
    }

    #[test]
    fn file_row_count_reads_either_field_name() {
        let file: FileEntity = serde_json::from_value(json!({
            "id": 4,
            "fileName": "orders.xlsx",
            "uploadTimestamp": "2024-05-01T10:00:00",
            "totalProcessedRows": 812
        }))
        .unwrap();
        assert_eq!(file.total_rows, 812);
        assert!(!file.needs_header_validation);

        let file: FileEntity = serde_json::from_value(json!({
            "id": 4,
            "fileName": "orders.xlsx",
            "uploadTimestamp": "2024-05-01T10:00:00",
            "totalRows": 9
        }))
        .unwrap();
        assert_eq!(file.total_rows, 9);
    }

    #[test]
    fn operator_input_is_typed() {
        assert_eq!(CellValue::parse_input(""), CellValue::Null);
        assert_eq!(CellValue::parse_input("NULL"), CellValue::Null);
        assert_eq!(CellValue::parse_input("false"), CellValue::Bool(false));
        assert_eq!(CellValue::parse_input("42"), CellValue::Number(42.into()));
        assert_eq!(CellValue::parse_input("3.25").to_string(), "3.25");
        assert_eq!(CellValue::parse_input("12 rue"), CellValue::String("12 rue".into()));
    }

    #[test]
    fn sheet_headers_parse_from_json_and_tolerate_garbage() {
        let mut sheet = SheetEntity {
            id: 1,
            sheet_name: "Orders".into(),
            sheet_index: 0,
            headers_json: Some(r#"["Order Date","Amount"]"#.into()),
            total_rows: 3,
        };
        assert_eq!(sheet.headers(), vec!["Order Date", "Amount"]);

        sheet.headers_json = Some("not json".into());
        assert!(sheet.headers().is_empty());

        sheet.headers_json = None;
        assert!(sheet.headers().is_empty());
    }

    #[test]
    fn upload_response_treats_null_errors_as_empty() {
        let resp: UploadResponse = serde_json::from_value(json!({
            "success": true,
            "message": "ok",
            "errors": null,
            "processedRows": 12,
            "fileId": 3,
            "needsManualValidation": true
        }))
        .unwrap();
        assert!(resp.errors.is_empty());
        assert_eq!(resp.file_id, Some(3));
        assert!(resp.needs_manual_validation);
    }

    #[test]
    fn graph_request_wire_names() {
        let req = GraphRequest {
            chart_type: ChartType::Bar,
            category_column: "Region".into(),
            value_columns: vec!["Amount".into()],
            aggregation_type: AggregationType::Sum,
            grouping_column: None,
            limit: Some(10),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({
                "chartType": "bar",
                "categoryColumn": "Region",
                "valueColumns": ["Amount"],
                "aggregationType": "SUM",
                "limit": 10
            })
        );
    }
}
