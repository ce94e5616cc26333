// Dashboard service - Use case for rendering one dashboard
use crate::application::block_renderer::BlockRegistry;
use crate::application::gateway_port::{QueryExecutor, TokenProvider};
use crate::application::query_binder::QueryBinder;
use crate::domain::layout::{BlockConfig, DashboardLayout};
use crate::domain::rendered::RenderedDashboard;
use crate::infrastructure::config::prepare_query;
use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Clone)]
pub struct DashboardService {
    executor: Arc<dyn QueryExecutor>,
    tokens: Arc<dyn TokenProvider>,
    registry: Arc<BlockRegistry>,
}

impl DashboardService {
    pub fn new(executor: Arc<dyn QueryExecutor>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            executor,
            tokens,
            registry: Arc::new(BlockRegistry::with_builtins()),
        }
    }

    /// Render one dashboard from its layout. A fresh `QueryBinder` is
    /// constructed per call and dropped with it: the cache's lifetime is
    /// one render session, so staleness is bounded by one request and no
    /// invalidation policy is needed.
    pub async fn render_dashboard(
        &self,
        dashboard_id: &str,
        layout: &DashboardLayout,
        vars: &HashMap<String, String>,
    ) -> RenderedDashboard {
        let layout = prepare_layout(layout, vars);
        let queries = collect_queries(&layout);

        let binder = QueryBinder::new(self.executor.clone(), self.tokens.clone());
        join_all(queries.iter().map(|query| binder.fetch(query))).await;

        let bindings = binder.snapshot().await;
        RenderedDashboard {
            dashboard_id: dashboard_id.to_string(),
            title: layout.title.clone(),
            generated_at: chrono::Utc::now(),
            root: self.registry.render_tree(&layout, &bindings),
        }
    }
}

/// Apply `${var}` template substitution to every query in the tree, so
/// the cache key and the dispatched query are the same literal string.
fn prepare_layout(block: &BlockConfig, vars: &HashMap<String, String>) -> BlockConfig {
    let mut prepared = block.clone();
    if let Some(source) = prepared.source.as_mut() {
        if let Some(query) = source.query.as_mut() {
            *query = prepare_query(query, vars);
        }
    }
    prepared.children = block
        .children
        .iter()
        .map(|child| prepare_layout(child, vars))
        .collect();
    prepared
}

/// The distinct query strings the tree needs resolved. Blocks carrying
/// inline data contribute nothing - static data wins and must not cost
/// a network call.
fn collect_queries(block: &BlockConfig) -> Vec<String> {
    let mut queries = Vec::new();
    let mut seen = HashSet::new();
    collect_into(block, &mut queries, &mut seen);
    queries
}

fn collect_into(block: &BlockConfig, queries: &mut Vec<String>, seen: &mut HashSet<String>) {
    if let Some(query) = block.pending_query() {
        if seen.insert(query.to_string()) {
            queries.push(query.to_string());
        }
    }
    for child in &block.children {
        collect_into(child, queries, seen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::layout::Row;
    use crate::domain::rendered::RenderedBlock;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticToken;

    #[async_trait]
    impl TokenProvider for StaticToken {
        async fn get_token(&self) -> anyhow::Result<Option<String>> {
            Ok(Some("tok".to_string()))
        }
    }

    #[derive(Default)]
    struct RecordingExecutor {
        calls: AtomicUsize,
        queries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl QueryExecutor for RecordingExecutor {
        async fn run_query(&self, query: &str, _token: &str) -> anyhow::Result<Vec<Row>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().unwrap().push(query.to_string());
            let row = json!({ "value": "7" });
            match row {
                serde_json::Value::Object(map) => Ok(vec![map]),
                _ => unreachable!(),
            }
        }
    }

    fn layout(json: serde_json::Value) -> DashboardLayout {
        serde_json::from_value(json).unwrap()
    }

    fn service(executor: Arc<RecordingExecutor>) -> DashboardService {
        DashboardService::new(executor, Arc::new(StaticToken))
    }

    #[tokio::test]
    async fn test_static_data_precedence_issues_no_network_call() {
        let executor = Arc::new(RecordingExecutor::default());
        let service = service(executor.clone());
        let layout = layout(json!({
            "type": "MetricCard",
            "title": "Revenue",
            "source": {
                "data": [{ "value": 99 }],
                "query": "SELECT sum(amount) FROM payments"
            }
        }));

        let rendered = service.render_dashboard("d1", &layout, &HashMap::new()).await;

        assert_eq!(executor.calls.load(Ordering::SeqCst), 0);
        match rendered.root {
            RenderedBlock::Metric { value, .. } => assert_eq!(value, Some(99.0)),
            other => panic!("expected metric, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_identical_queries_across_blocks_fetch_once() {
        let executor = Arc::new(RecordingExecutor::default());
        let service = service(executor.clone());
        let layout = layout(json!({
            "type": "Grid",
            "children": [
                { "type": "MetricCard", "source": { "query": "SELECT count(*) FROM runs" } },
                { "type": "MetricCard", "source": { "query": "SELECT count(*) FROM runs" } },
                { "type": "MetricCard", "source": { "query": "SELECT count(*) FROM agents" } }
            ]
        }));

        service.render_dashboard("d1", &layout, &HashMap::new()).await;

        assert_eq!(executor.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_template_vars_are_substituted_before_dispatch() {
        let executor = Arc::new(RecordingExecutor::default());
        let service = service(executor.clone());
        let layout = layout(json!({
            "type": "LineChart",
            "source": { "query": "SELECT * FROM runs WHERE time >= now() - ${hours}h" }
        }));
        let mut vars = HashMap::new();
        vars.insert("hours".to_string(), "12".to_string());

        service.render_dashboard("d1", &layout, &vars).await;

        let queries = executor.queries.lock().unwrap();
        assert_eq!(queries[0], "SELECT * FROM runs WHERE time >= now() - 12h");
    }

    #[tokio::test]
    async fn test_complete_render_resolves_every_query_bound_block() {
        let executor = Arc::new(RecordingExecutor::default());
        let service = service(executor.clone());
        let layout = layout(json!({
            "type": "Grid",
            "title": "Ops",
            "children": [
                { "type": "MetricCard", "title": "Runs", "source": { "query": "SELECT count(*) FROM runs" } },
                { "type": "Text", "props": { "body": "notes" } }
            ]
        }));

        let rendered = service.render_dashboard("d1", &layout, &HashMap::new()).await;

        let RenderedBlock::Grid { children, .. } = rendered.root else {
            panic!("expected grid");
        };
        match &children[0] {
            // "7" arrives as a string row and must come out numeric
            RenderedBlock::Metric { value, .. } => assert_eq!(*value, Some(7.0)),
            other => panic!("expected metric, got {other:?}"),
        }
        assert_eq!(rendered.dashboard_id, "d1");
        assert_eq!(rendered.title, Some("Ops".to_string()));
    }
}
