// Ports for the upstream gateway and session collaborators
use crate::domain::layout::{DashboardLayout, Row};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Summary entry for the dashboard index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DashboardSummary {
    pub id: String,
    pub name: String,
}

/// Executes one query string against the per-tenant store behind the
/// gateway. The query is opaque to this layer; the token is supplied by
/// the caller and must be fresh.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn run_query(&self, query: &str, token: &str) -> anyhow::Result<Vec<Row>>;
}

/// Session collaborator. `None` means "not authenticated" and callers
/// must fail closed. Called before every outbound request - tokens are
/// short-lived and must never be cached here.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn get_token(&self) -> anyhow::Result<Option<String>>;
}

/// Dashboard-configuration collaborator. Layouts are opaque JSON trees
/// owned by the gateway.
#[async_trait]
pub trait LayoutProvider: Send + Sync {
    async fn list_dashboards(&self) -> anyhow::Result<Vec<DashboardSummary>>;

    async fn fetch_layout(&self, dashboard_id: &str) -> anyhow::Result<DashboardLayout>;
}
