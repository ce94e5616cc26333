// Rendered dashboard model - what the renderer produces and handlers serialize
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Envelope returned for one dashboard render.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedDashboard {
    pub dashboard_id: String,
    pub title: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub root: RenderedBlock,
}

/// One rendered node. Placeholder variants (`Loading`, `BlockError`,
/// `Unknown`) scope a problem to a single widget so the rest of the tree
/// renders normally.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderedBlock {
    Metric {
        title: Option<String>,
        value: Option<f64>,
        unit: Option<String>,
        precision: Option<i32>,
    },
    Chart {
        title: Option<String>,
        shape: ChartShape,
        categories: Vec<String>,
        points: Vec<ChartPoint>,
    },
    Donut {
        title: Option<String>,
        slices: Vec<DonutSlice>,
    },
    Table {
        title: Option<String>,
        columns: Vec<String>,
        rows: Vec<Vec<serde_json::Value>>,
    },
    Text {
        body: String,
    },
    Callout {
        title: Option<String>,
        body: String,
        tone: String,
    },
    Grid {
        title: Option<String>,
        columns: u32,
        children: Vec<RenderedBlock>,
    },
    Loading {
        title: Option<String>,
    },
    BlockError {
        title: Option<String>,
        message: String,
    },
    Unknown {
        block_type: String,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartShape {
    Line,
    Bar,
}

/// One x-axis entry with a value per category, in category order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonutSlice {
    pub label: String,
    pub value: f64,
}

impl RenderedBlock {
    pub fn unknown(block_type: &str) -> Self {
        Self::Unknown {
            block_type: block_type.to_string(),
            message: format!("Unknown block type: {}", block_type),
        }
    }
}
