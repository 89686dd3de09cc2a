use clap::{Args, ValueEnum};

use super::{find_sheet, AppState};
use crate::clients::RowsQuery;
use crate::error::{AppError, Result};
use crate::models::{AggregationType, ChartType};
use crate::services::chart::render_text;
use crate::services::ChartPanel;

#[derive(Clone, Copy, ValueEnum)]
pub enum ChartArg {
    Pie,
    Bar,
    Line,
}

impl From<ChartArg> for ChartType {
    fn from(arg: ChartArg) -> Self {
        match arg {
            ChartArg::Pie => ChartType::Pie,
            ChartArg::Bar => ChartType::Bar,
            ChartArg::Line => ChartType::Line,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum AggregationArg {
    Count,
    Sum,
}

impl From<AggregationArg> for AggregationType {
    fn from(arg: AggregationArg) -> Self {
        match arg {
            AggregationArg::Count => AggregationType::Count,
            AggregationArg::Sum => AggregationType::Sum,
        }
    }
}

#[derive(Args)]
pub struct GraphArgs {
    pub file_id: i64,
    #[arg(long)]
    pub sheet: Option<i64>,
    #[arg(long, value_enum, default_value = "pie")]
    pub chart: ChartArg,
    /// Defaults to the first column
    #[arg(long)]
    pub category: Option<String>,
    /// Numeric column to aggregate, repeatable
    #[arg(long = "value")]
    pub values: Vec<String>,
    #[arg(long, value_enum, default_value = "count")]
    pub aggregation: AggregationArg,
    #[arg(long)]
    pub group: Option<String>,
    /// 10, 20, 50 or `all`
    #[arg(long, default_value = "20", value_parser = parse_limit)]
    pub limit: Limit,
}

/// Category cap; `None` keeps every category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit(pub Option<u32>);

fn parse_limit(raw: &str) -> std::result::Result<Limit, String> {
    if raw.eq_ignore_ascii_case("all") {
        return Ok(Limit(None));
    }
    raw.parse()
        .map(|n| Limit(Some(n)))
        .map_err(|_| format!("{} is not a number or `all`", raw))
}

pub async fn run(state: &AppState, args: GraphArgs) -> Result<()> {
    let api = state.authed()?;
    let sheet = find_sheet(api, args.file_id, args.sheet).await?;

    let chart_type = ChartType::from(args.chart);
    let aggregation = AggregationType::from(args.aggregation);
    if chart_type == ChartType::Pie && (aggregation == AggregationType::Sum || !args.values.is_empty()) {
        return Err(AppError::InvalidInput("pie charts only count rows".to_string()));
    }

    // a first page of rows tells numeric columns apart
    let samples = api
        .list_rows(
            sheet.id,
            &RowsQuery {
                page: 0,
                size: state.config.preview_row_limit,
                keyword: None,
                sort: None,
            },
        )
        .await
        .map(|page| page.content)
        .unwrap_or_default();

    let mut panel = ChartPanel::new(sheet.headers(), &samples);
    panel.set_chart_type(chart_type);
    panel.set_aggregation(aggregation);
    if let Some(category) = &args.category {
        panel.set_category(category)?;
    }
    for column in &args.values {
        panel.toggle_value_column(column)?;
    }
    panel.set_grouping(args.group.as_deref())?;
    panel.set_limit(args.limit.0)?;

    let data = panel.generate(api, sheet.id).await?;
    println!(
        "{} of {} by {}",
        match aggregation {
            AggregationType::Count => "Count",
            AggregationType::Sum => "Sum",
        },
        sheet.sheet_name,
        panel.request().category_column
    );
    print!("{}", render_text(&data));
    Ok(())
}
