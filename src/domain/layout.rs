// Dashboard layout descriptor - the declarative block tree fetched from the gateway
use serde::{Deserialize, Serialize};

/// One result row: field name mapped to a JSON value.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Root node of a dashboard layout. Same shape as any other block; by
/// convention the outermost node is a container.
pub type DashboardLayout = BlockConfig;

/// A single node in the layout tree.
///
/// `block_type` is deliberately an open string rather than a closed enum:
/// a layout authored against a newer gateway may carry block types this
/// binary does not know, and those must reach the renderer (which degrades
/// to a placeholder) instead of failing deserialization.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BlockConfig {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub source: Option<BlockSource>,
    /// Type-specific rendering parameters. Opaque to the data-binding layer.
    #[serde(default)]
    pub props: serde_json::Value,
    #[serde(default)]
    pub children: Vec<BlockConfig>,
}

/// Where a block's data comes from. Valid input carries one of the two;
/// if both are present, inline `data` wins and the query is never dispatched.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BlockSource {
    #[serde(default)]
    pub data: Option<Vec<Row>>,
    #[serde(default)]
    pub query: Option<String>,
}

impl BlockConfig {
    /// The query this block needs resolved, if any. Inline data takes
    /// precedence over a query, so a block with both returns `None`.
    pub fn pending_query(&self) -> Option<&str> {
        let source = self.source.as_ref()?;
        if source.data.is_some() {
            return None;
        }
        source.query.as_deref()
    }

    /// Inline rows, if the block carries pre-resolved data.
    pub fn inline_data(&self) -> Option<&[Row]> {
        self.source.as_ref()?.data.as_deref()
    }
}

/// Block kinds the renderer ships strategies for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    MetricCard,
    LineChart,
    BarChart,
    DonutChart,
    Table,
    Text,
    Callout,
    Grid,
}

impl BlockKind {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "MetricCard" => Some(Self::MetricCard),
            "LineChart" => Some(Self::LineChart),
            "BarChart" => Some(Self::BarChart),
            "DonutChart" => Some(Self::DonutChart),
            "Table" => Some(Self::Table),
            "Text" => Some(Self::Text),
            "Callout" => Some(Self::Callout),
            "Grid" => Some(Self::Grid),
            _ => None,
        }
    }
}
