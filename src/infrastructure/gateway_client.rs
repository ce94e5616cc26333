// Gateway HTTP adapter - query execution and layout retrieval
use crate::application::gateway_port::{DashboardSummary, LayoutProvider, QueryExecutor};
use crate::domain::layout::{DashboardLayout, Row};
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure taxonomy for gateway calls. Converted to per-entry error
/// strings by the query binder; never propagated into a render tree.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
}

/// The query endpoint returns either a bare row array or a `{ data }`
/// envelope, depending on gateway version.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QueryResponse {
    Rows(Vec<Row>),
    Envelope { data: Vec<Row> },
}

impl QueryResponse {
    fn into_rows(self) -> Vec<Row> {
        match self {
            Self::Rows(rows) => rows,
            Self::Envelope { data } => data,
        }
    }
}

impl GatewayClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::Status { status, body })
    }
}

#[async_trait]
impl QueryExecutor for GatewayClient {
    async fn run_query(&self, query: &str, token: &str) -> anyhow::Result<Vec<Row>> {
        let url = format!("{}/query", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&QueryRequest { query })
            .send()
            .await
            .map_err(GatewayError::from)
            .context("failed to send query to gateway")?;

        let response = Self::check_status(response).await?;
        let payload = response
            .json::<QueryResponse>()
            .await
            .context("failed to parse query response")?;

        Ok(payload.into_rows())
    }
}

#[async_trait]
impl LayoutProvider for GatewayClient {
    async fn list_dashboards(&self) -> anyhow::Result<Vec<DashboardSummary>> {
        let url = format!("{}/dashboards", self.base_url);
        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(GatewayError::from)
            .context("failed to list dashboards")?;

        let response = Self::check_status(response).await?;
        Ok(response
            .json::<Vec<DashboardSummary>>()
            .await
            .context("failed to parse dashboard index")?)
    }

    async fn fetch_layout(&self, dashboard_id: &str) -> anyhow::Result<DashboardLayout> {
        let url = format!("{}/dashboards/{}", self.base_url, dashboard_id);
        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(GatewayError::from)
            .with_context(|| format!("failed to fetch layout for dashboard {dashboard_id}"))?;

        let response = Self::check_status(response).await?;
        Ok(response
            .json::<DashboardLayout>()
            .await
            .context("failed to parse dashboard layout")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_response_accepts_bare_array() {
        let payload = json!([{ "a": 1 }, { "a": 2 }]);
        let parsed: QueryResponse = serde_json::from_value(payload).unwrap();
        assert_eq!(parsed.into_rows().len(), 2);
    }

    #[test]
    fn test_query_response_accepts_data_envelope() {
        let payload = json!({ "data": [{ "a": 1 }] });
        let parsed: QueryResponse = serde_json::from_value(payload).unwrap();
        assert_eq!(parsed.into_rows().len(), 1);
    }

    #[test]
    fn test_non_object_rows_are_a_decode_error() {
        let payload = json!([1, 2, 3]);
        assert!(serde_json::from_value::<QueryResponse>(payload).is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = GatewayClient::new("http://gw.local/".to_string());
        assert_eq!(client.base_url, "http://gw.local");
    }
}
