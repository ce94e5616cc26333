use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize, Clone)]
pub struct GatewayConfig {
    pub gateway: GatewaySettings,
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GatewaySettings {
    /// Base URL of the upstream gateway. Required, never defaulted.
    pub base_url: String,
    /// Bearer token for the gateway session. Absent means unauthenticated;
    /// queries then fail closed at dispatch time.
    pub api_token: Option<String>,
    pub index_poll_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub listen: String,
}

pub fn load_gateway_config() -> anyhow::Result<GatewayConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/gateway"))
        .add_source(config::Environment::with_prefix("DASHBOARD_GATEWAY").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Replace template variables in a query string
pub fn prepare_query(query: &str, vars: &HashMap<String, String>) -> String {
    let mut result = query.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_query() {
        let mut vars = HashMap::new();
        vars.insert("tenant".to_string(), "acme".to_string());
        vars.insert("hours".to_string(), "12".to_string());

        let query = "SELECT * FROM runs WHERE tenant='${tenant}' AND time >= now() - ${hours}h";
        let result = prepare_query(query, &vars);

        assert_eq!(
            result,
            "SELECT * FROM runs WHERE tenant='acme' AND time >= now() - 12h"
        );
    }

    #[test]
    fn test_prepare_query_leaves_unknown_placeholders() {
        let vars = HashMap::new();
        let query = "SELECT * FROM runs WHERE time >= now() - ${hours}h";
        assert_eq!(prepare_query(query, &vars), query);
    }
}
