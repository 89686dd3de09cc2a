use std::fmt::Write as _;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use crate::clients::ApiClient;
use crate::error::{AppError, Result};
use crate::models::{AggregationType, ChartType, GraphData, GraphRequest, RowEntity};

pub const LIMIT_CHOICES: [Option<u32>; 4] = [Some(10), Some(20), Some(50), None];
const DEFAULT_LIMIT: Option<u32> = Some(20);
const BAR_WIDTH: usize = 40;

static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").expect("number pattern is valid")
});

/// Numeric prefix of a cell as typed in a sheet; `"12,5 kg"` reads as 12.5.
pub fn leading_number(raw: &str) -> Option<f64> {
    let normalized = raw.replacen(',', ".", 1);
    LEADING_NUMBER
        .find(&normalized)
        .and_then(|m| m.as_str().trim().parse().ok())
}

/// Columns whose first non-empty sample value reads as a number. Without
/// samples every column is offered.
pub fn detect_numeric_columns(columns: &[String], sample_rows: &[RowEntity]) -> Vec<String> {
    if sample_rows.is_empty() {
        return columns.to_vec();
    }
    columns
        .iter()
        .filter(|column| {
            sample_rows
                .iter()
                .filter_map(|row| row.data.get(column.as_str()))
                .find(|value| !value.is_blank())
                .is_some_and(|value| leading_number(&value.to_string()).is_some())
        })
        .cloned()
        .collect()
}

/// Chart settings being put together before the aggregation request.
#[derive(Debug, Clone)]
pub struct ChartPanel {
    columns: Vec<String>,
    numeric_columns: Vec<String>,
    request: GraphRequest,
}

impl ChartPanel {
    pub fn new(columns: Vec<String>, sample_rows: &[RowEntity]) -> Self {
        let numeric_columns = detect_numeric_columns(&columns, sample_rows);
        let request = GraphRequest {
            chart_type: ChartType::Pie,
            category_column: columns.first().cloned().unwrap_or_default(),
            value_columns: Vec::new(),
            aggregation_type: AggregationType::Count,
            grouping_column: None,
            limit: DEFAULT_LIMIT,
        };
        Self {
            columns,
            numeric_columns,
            request,
        }
    }

    pub fn request(&self) -> &GraphRequest {
        &self.request
    }

    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    fn require_column(&self, column: &str) -> Result<()> {
        if self.columns.iter().any(|c| c == column) {
            Ok(())
        } else {
            Err(AppError::InvalidInput(format!("unknown column: {}", column)))
        }
    }

    /// Pie charts only count, so switching to pie drops value columns.
    pub fn set_chart_type(&mut self, chart_type: ChartType) {
        self.request.chart_type = chart_type;
        if chart_type == ChartType::Pie {
            self.request.value_columns.clear();
            self.request.aggregation_type = AggregationType::Count;
        }
    }

    pub fn set_aggregation(&mut self, aggregation: AggregationType) {
        self.request.aggregation_type = aggregation;
    }

    pub fn set_category(&mut self, column: &str) -> Result<()> {
        self.require_column(column)?;
        self.request.category_column = column.to_string();
        Ok(())
    }

    pub fn toggle_value_column(&mut self, column: &str) -> Result<()> {
        if !self.numeric_columns.iter().any(|c| c == column) {
            return Err(AppError::InvalidInput(format!("{} is not a numeric column", column)));
        }
        if let Some(pos) = self.request.value_columns.iter().position(|c| c == column) {
            self.request.value_columns.remove(pos);
        } else {
            self.request.value_columns.push(column.to_string());
        }
        Ok(())
    }

    pub fn set_grouping(&mut self, column: Option<&str>) -> Result<()> {
        if let Some(c) = column {
            self.require_column(c)?;
        }
        self.request.grouping_column = column.map(str::to_string);
        Ok(())
    }

    pub fn set_limit(&mut self, limit: Option<u32>) -> Result<()> {
        if !LIMIT_CHOICES.contains(&limit) {
            return Err(AppError::InvalidInput("limit must be 10, 20, 50 or all".to_string()));
        }
        self.request.limit = limit;
        Ok(())
    }

    pub fn can_generate(&self) -> bool {
        if self.request.category_column.is_empty() {
            return false;
        }
        self.request.aggregation_type == AggregationType::Count || !self.request.value_columns.is_empty()
    }

    pub async fn generate(&self, api: &ApiClient, sheet_id: i64) -> Result<GraphData> {
        if !self.can_generate() {
            return Err(AppError::InvalidInput(
                "choose a category column, and value columns when summing".to_string(),
            ));
        }
        let data = api.generate_graph(sheet_id, &self.request).await?;
        info!("Chart for sheet {} has {} labels", sheet_id, data.labels.len());
        Ok(data)
    }
}

/// Horizontal text bars, one block per dataset.
pub fn render_text(data: &GraphData) -> String {
    let mut out = String::new();
    if data.labels.is_empty() {
        out.push_str("(no data)\n");
        return out;
    }
    let label_width = data.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    for (i, dataset) in data.datasets.iter().enumerate() {
        let title = dataset.label.clone().unwrap_or_else(|| format!("Series {}", i + 1));
        let _ = writeln!(out, "{}", title);

        let max = dataset.data.iter().cloned().fold(0.0_f64, f64::max);
        for (label, value) in data.labels.iter().zip(&dataset.data) {
            let len = if max > 0.0 {
                ((value / max) * BAR_WIDTH as f64).round().max(0.0) as usize
            } else {
                0
            };
            let _ = writeln!(
                out,
                "  {:<width$} | {} {}",
                label,
                "#".repeat(len),
                value,
                width = label_width
            );
        }
    }
    out
}
