// Block renderer - type-keyed dispatch over the layout tree
use crate::application::query_binder::QueryOutcome;
use crate::domain::layout::{BlockConfig, BlockKind, Row};
use crate::domain::rendered::{ChartPoint, ChartShape, DonutSlice, RenderedBlock};
use crate::domain::value::{coerce_number, label_of, number_or_zero};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

/// Render strategy for one block kind. Strategies receive the block's
/// resolved rows (inline or fetched; empty when the block has no source)
/// and its already-rendered children.
pub trait RenderBlock: Send + Sync {
    fn render(&self, block: &BlockConfig, rows: &[Row], children: Vec<RenderedBlock>)
    -> RenderedBlock;
}

/// Dispatch table from block kind to render strategy. Loading, failed
/// and unknown states are handled here, before any strategy runs, so a
/// strategy only ever sees usable rows.
pub struct BlockRegistry {
    table: HashMap<BlockKind, Box<dyn RenderBlock>>,
}

impl BlockRegistry {
    pub fn with_builtins() -> Self {
        let mut table: HashMap<BlockKind, Box<dyn RenderBlock>> = HashMap::new();
        table.insert(BlockKind::MetricCard, Box::new(MetricRenderer));
        table.insert(BlockKind::LineChart, Box::new(ChartRenderer(ChartShape::Line)));
        table.insert(BlockKind::BarChart, Box::new(ChartRenderer(ChartShape::Bar)));
        table.insert(BlockKind::DonutChart, Box::new(DonutRenderer));
        table.insert(BlockKind::Table, Box::new(TableRenderer));
        table.insert(BlockKind::Text, Box::new(TextRenderer));
        table.insert(BlockKind::Callout, Box::new(CalloutRenderer));
        table.insert(BlockKind::Grid, Box::new(GridRenderer));
        Self { table }
    }

    /// Render one node and its subtree, depth-first, children in layout
    /// order. `bindings` is the settled-query snapshot; a query missing
    /// from it is still in flight and renders as a loading placeholder.
    pub fn render_tree(
        &self,
        block: &BlockConfig,
        bindings: &HashMap<String, QueryOutcome>,
    ) -> RenderedBlock {
        let children: Vec<RenderedBlock> = block
            .children
            .iter()
            .map(|child| self.render_tree(child, bindings))
            .collect();

        let strategy = match BlockKind::parse(&block.block_type).and_then(|k| self.table.get(&k)) {
            Some(strategy) => strategy,
            None => {
                tracing::debug!("no renderer registered for block type {}", block.block_type);
                return RenderedBlock::unknown(&block.block_type);
            }
        };

        // Inline data wins over a query (BlockConfig::pending_query).
        if let Some(rows) = block.inline_data() {
            return strategy.render(block, rows, children);
        }
        match block.pending_query() {
            Some(query) => match bindings.get(query) {
                Some(outcome) => match outcome.error() {
                    Some(message) => RenderedBlock::BlockError {
                        title: block.title.clone(),
                        message: message.to_string(),
                    },
                    None => strategy.render(block, outcome.rows(), children),
                },
                None => RenderedBlock::Loading {
                    title: block.title.clone(),
                },
            },
            None => strategy.render(block, &[], children),
        }
    }
}

/// Deserialize a strategy's props from the block, falling back to
/// defaults when props are missing or malformed. Malformed props are a
/// rendering concern and must not take the widget down.
fn props_of<T: DeserializeOwned + Default>(block: &BlockConfig) -> T {
    if block.props.is_null() {
        return T::default();
    }
    serde_json::from_value(block.props.clone()).unwrap_or_else(|e| {
        tracing::debug!("malformed props on {} block: {e}", block.block_type);
        T::default()
    })
}

// -- MetricCard --------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct MetricProps {
    value_field: Option<String>,
    unit: Option<String>,
    precision: Option<i32>,
}

struct MetricRenderer;

impl RenderBlock for MetricRenderer {
    fn render(&self, block: &BlockConfig, rows: &[Row], _: Vec<RenderedBlock>) -> RenderedBlock {
        let props: MetricProps = props_of(block);
        let field = props.value_field.as_deref().unwrap_or("value");
        let value = rows.first().and_then(|row| row.get(field)).and_then(coerce_number);
        RenderedBlock::Metric {
            title: block.title.clone(),
            value,
            unit: props.unit,
            precision: props.precision,
        }
    }
}

// -- LineChart / BarChart ----------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ChartProps {
    /// x-axis field; defaults to "index".
    index: Option<String>,
    /// Value fields, one series each. Derived from the first row when
    /// absent: every coercible field except the index.
    categories: Vec<String>,
}

struct ChartRenderer(ChartShape);

impl RenderBlock for ChartRenderer {
    fn render(&self, block: &BlockConfig, rows: &[Row], _: Vec<RenderedBlock>) -> RenderedBlock {
        let props: ChartProps = props_of(block);
        let index = props.index.as_deref().unwrap_or("index");

        let categories = if props.categories.is_empty() {
            derive_categories(rows, index)
        } else {
            props.categories
        };

        let points = rows
            .iter()
            .map(|row| ChartPoint {
                label: row.get(index).map(label_of).unwrap_or_default(),
                values: categories
                    .iter()
                    .map(|c| row.get(c).map(number_or_zero).unwrap_or(0.0))
                    .collect(),
            })
            .collect();

        RenderedBlock::Chart {
            title: block.title.clone(),
            shape: self.0,
            categories,
            points,
        }
    }
}

fn derive_categories(rows: &[Row], index: &str) -> Vec<String> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    first
        .iter()
        .filter(|(name, value)| name.as_str() != index && coerce_number(value).is_some())
        .map(|(name, _)| name.clone())
        .collect()
}

// -- DonutChart --------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct DonutProps {
    category: Option<String>,
    value_field: Option<String>,
}

struct DonutRenderer;

impl RenderBlock for DonutRenderer {
    fn render(&self, block: &BlockConfig, rows: &[Row], _: Vec<RenderedBlock>) -> RenderedBlock {
        let props: DonutProps = props_of(block);
        let category = props.category.as_deref().unwrap_or("category");
        let value_field = props.value_field.as_deref().unwrap_or("value");

        let slices = rows
            .iter()
            .map(|row| DonutSlice {
                label: row.get(category).map(label_of).unwrap_or_default(),
                value: row.get(value_field).map(number_or_zero).unwrap_or(0.0),
            })
            .collect();

        RenderedBlock::Donut {
            title: block.title.clone(),
            slices,
        }
    }
}

// -- Table -------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TableProps {
    columns: Vec<String>,
}

struct TableRenderer;

impl RenderBlock for TableRenderer {
    fn render(&self, block: &BlockConfig, rows: &[Row], _: Vec<RenderedBlock>) -> RenderedBlock {
        let props: TableProps = props_of(block);
        let columns = if props.columns.is_empty() {
            rows.first()
                .map(|row| row.keys().cloned().collect())
                .unwrap_or_default()
        } else {
            props.columns
        };

        let rendered_rows = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|c| normalize_cell(row.get(c).cloned().unwrap_or(serde_json::Value::Null)))
                    .collect()
            })
            .collect();

        RenderedBlock::Table {
            title: block.title.clone(),
            columns,
            rows: rendered_rows,
        }
    }
}

/// String-typed numerics from the tenant store become JSON numbers so
/// table consumers can sort and format them. Everything else is passed
/// through untouched.
fn normalize_cell(value: serde_json::Value) -> serde_json::Value {
    if let serde_json::Value::String(s) = &value {
        let parsed = s.trim().parse::<f64>().ok().and_then(serde_json::Number::from_f64);
        if let Some(n) = parsed {
            return serde_json::Value::Number(n);
        }
    }
    value
}

// -- Text / Callout ----------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TextProps {
    body: String,
}

struct TextRenderer;

impl RenderBlock for TextRenderer {
    fn render(&self, block: &BlockConfig, _: &[Row], _: Vec<RenderedBlock>) -> RenderedBlock {
        let props: TextProps = props_of(block);
        RenderedBlock::Text { body: props.body }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct CalloutProps {
    body: String,
    tone: String,
}

impl Default for CalloutProps {
    fn default() -> Self {
        Self {
            body: String::new(),
            tone: "info".to_string(),
        }
    }
}

struct CalloutRenderer;

impl RenderBlock for CalloutRenderer {
    fn render(&self, block: &BlockConfig, _: &[Row], _: Vec<RenderedBlock>) -> RenderedBlock {
        let props: CalloutProps = props_of(block);
        RenderedBlock::Callout {
            title: block.title.clone(),
            body: props.body,
            tone: props.tone,
        }
    }
}

// -- Grid --------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GridProps {
    columns: u32,
}

impl Default for GridProps {
    fn default() -> Self {
        Self { columns: 2 }
    }
}

struct GridRenderer;

impl RenderBlock for GridRenderer {
    fn render(&self, block: &BlockConfig, _: &[Row], children: Vec<RenderedBlock>) -> RenderedBlock {
        let props: GridProps = props_of(block);
        RenderedBlock::Grid {
            title: block.title.clone(),
            columns: props.columns,
            children,
        }
    }
}
