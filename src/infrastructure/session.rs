// Session adapter - bearer token source for gateway calls
use crate::application::gateway_port::TokenProvider;
use async_trait::async_trait;

/// Token provider backed by the configured API token. A missing token is
/// a valid state: callers receive `None` and fail closed instead of
/// sending unauthenticated queries.
pub struct StaticTokenProvider {
    token: Option<String>,
}

impl StaticTokenProvider {
    pub fn new(token: Option<String>) -> Self {
        let token = token.filter(|t| !t.trim().is_empty());
        Self { token }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn get_token(&self) -> anyhow::Result<Option<String>> {
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blank_token_reads_as_unauthenticated() {
        let provider = StaticTokenProvider::new(Some("   ".to_string()));
        assert_eq!(provider.get_token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_configured_token_is_served() {
        let provider = StaticTokenProvider::new(Some("tok".to_string()));
        assert_eq!(provider.get_token().await.unwrap(), Some("tok".to_string()));
    }
}
