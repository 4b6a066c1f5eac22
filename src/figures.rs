//! Chart descriptors.
//!
//! The JSON shape follows plotly's figure schema (`{data: [...], layout: {...}}`)
//! so a front end can hand each figure straight to `Plotly.newPlot`.

use crate::models::Indicator;
use crate::table::SeriesTable;
use serde::{Deserialize, Serialize};

/// Year used by the snapshot (bar) charts.
pub const SNAPSHOT_YEAR: i32 = 2018;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    Scatter,
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceMode {
    Lines,
    Markers,
}

/// X values: years for time series, country names for snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisValues {
    Years(Vec<i32>),
    Categories(Vec<String>),
}

impl AxisValues {
    pub fn len(&self) -> usize {
        match self {
            AxisValues::Years(v) => v.len(),
            AxisValues::Categories(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One renderable series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: TraceKind,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub mode: Option<TraceMode>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    pub x: AxisValues,
    /// Missing observations serialize as `null`, which plotly renders as a gap.
    pub y: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Axis {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub title: String,
    pub xaxis: Axis,
    pub yaxis: Axis,
}

impl Layout {
    pub fn new(title: &str, x_title: &str, y_title: &str) -> Self {
        Self {
            title: title.into(),
            xaxis: Axis {
                title: x_title.into(),
            },
            yaxis: Axis {
                title: y_title.into(),
            },
        }
    }

    /// Fixed caption and axis titles for an indicator's chart.
    pub fn for_indicator(indicator: Indicator) -> Self {
        match indicator {
            Indicator::ExportValueIndex => Layout::new(
                "Annual Export Value Trend",
                "Year",
                "Export Value Index (2000 = 100)",
            ),
            Indicator::CostOfExport => {
                Layout::new("2018 Cost of Exports in U.S. Dollars", "Country", "USD")
            }
            Indicator::ExportTaxes => Layout::new(
                "2018 Export Taxes as Percentage of Sales",
                "Country",
                "% - Revenue",
            ),
            Indicator::BalanceOfPayments => Layout::new(
                "Annual Net Exports of Goods and Services",
                "Year",
                "Current USD",
            ),
        }
    }
}

/// A chart: series plus layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    /// Layout only, no series. Stands in for an indicator that failed to load.
    pub fn empty(indicator: Indicator) -> Self {
        Self {
            data: Vec::new(),
            layout: Layout::for_indicator(indicator),
        }
    }
}

/// One line trace per country in `order` that has rows in `table`.
fn line_traces(table: &SeriesTable, order: &[String]) -> Vec<Trace> {
    order
        .iter()
        .filter_map(|country| {
            let (x, y): (Vec<i32>, Vec<Option<f64>>) =
                table.for_country(country).map(|o| (o.year, o.value)).unzip();
            (!x.is_empty()).then(|| Trace {
                kind: TraceKind::Scatter,
                mode: Some(TraceMode::Lines),
                name: Some(country.clone()),
                x: AxisValues::Years(x),
                y,
            })
        })
        .collect()
}

/// Single bar trace of each country's value in `year`.
///
/// Countries without a row for `year` are left out; with several, the first wins.
fn snapshot_trace(table: &SeriesTable, year: i32) -> Trace {
    let mut x: Vec<String> = Vec::new();
    let mut y: Vec<Option<f64>> = Vec::new();
    for row in table.rows.iter().filter(|r| r.year == year) {
        if !x.contains(&row.country) {
            x.push(row.country.clone());
            y.push(row.value);
        }
    }
    Trace {
        kind: TraceKind::Bar,
        mode: None,
        name: None,
        x: AxisValues::Categories(x),
        y,
    }
}

/// Chart 1: export value index per country over time.
pub fn export_value_figure(table: &SeriesTable) -> Figure {
    Figure {
        data: line_traces(table, &table.countries()),
        layout: Layout::for_indicator(Indicator::ExportValueIndex),
    }
}

/// Chart 2: cost to export in the snapshot year.
pub fn export_cost_figure(table: &SeriesTable) -> Figure {
    Figure {
        data: vec![snapshot_trace(table, SNAPSHOT_YEAR)],
        layout: Layout::for_indicator(Indicator::CostOfExport),
    }
}

/// Chart 3: export taxes in the snapshot year.
pub fn export_tax_figure(table: &SeriesTable) -> Figure {
    Figure {
        data: vec![snapshot_trace(table, SNAPSHOT_YEAR)],
        layout: Layout::for_indicator(Indicator::ExportTaxes),
    }
}

/// Chart 4: net exports per country over time.
///
/// Legend order follows `country_order` (chart 1's countries); countries only
/// this table has are appended in table order.
pub fn net_exports_figure(table: &SeriesTable, country_order: &[String]) -> Figure {
    let mut order: Vec<String> = country_order.to_vec();
    for c in table.countries() {
        if !order.contains(&c) {
            order.push(c);
        }
    }
    Figure {
        data: line_traces(table, &order),
        layout: Layout::for_indicator(Indicator::BalanceOfPayments),
    }
}
