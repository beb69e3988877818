//! Typed HTTP client for the Khata backend.
//!
//! Provides a minimal client over the backend's REST and RPC endpoints
//! with key-based auth, generic GET/RPC helpers, and the non-throwing
//! [`Gateway`](gateway::Gateway) façade used by front-end surfaces.

pub mod gateway;

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use khata_core::models::Agent;
use khata_session::CredentialVerifier;
use reqwest::Client;
use serde::de::DeserializeOwned;

/// Path prefix for table/view reads and RPC calls.
pub(crate) const REST_PREFIX: &str = "/rest/v1";

/// HTTP client for the Khata backend with key-based auth.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ApiClient {
    pub fn new(base_url: String, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Create client from environment: KHATA_API_URL, KHATA_API_KEY.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("KHATA_API_URL")
            .unwrap_or_else(|_| "http://localhost:54321".to_string());

        let api_key = std::env::var("KHATA_API_KEY").context("Missing API key. Set KHATA_API_KEY")?;

        Self::new(base_url, api_key)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", self.api_key.as_str())
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    /// GET a table or view. Deserializes the JSON response rows.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.build_url(path);
        let mut request = self.client.get(&url);
        request = self.apply_auth(request);

        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await.context("Failed to send request")?;
        Self::decode(response).await
    }

    /// Call a named server-side procedure with a JSON argument object.
    pub async fn rpc<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        function: &str,
        args: &B,
    ) -> Result<T> {
        let url = self.build_url(&format!("{}/rpc/{}", REST_PREFIX, function));
        let request = self.client.post(&url).json(args);
        let request = self.apply_auth(request);

        let response = request.send().await.context("Failed to send request")?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "Backend request failed with status {}: {}",
                status,
                error_text
            ));
        }

        let body: T = response
            .json()
            .await
            .context("Failed to parse response as JSON")?;

        Ok(body)
    }
}

#[async_trait]
impl CredentialVerifier for ApiClient {
    /// One RPC round trip: the procedure returns zero-or-one agent rows.
    async fn verify_pin(&self, phone: &str, pin: &str) -> Result<Option<Agent>> {
        let rows: Vec<Agent> = self
            .rpc(
                "verify_agent_pin",
                &serde_json::json!({
                    "agent_phone": phone,
                    "agent_pin": pin,
                }),
            )
            .await?;

        Ok(rows.into_iter().next())
    }
}

// Re-export the façade for convenience.
pub use gateway::Gateway;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_slash_normalized() {
        let client = ApiClient::new(
            "http://localhost:54321/".to_string(),
            "test-key".to_string(),
        )
        .unwrap();

        assert_eq!(client.base_url(), "http://localhost:54321");
        assert_eq!(
            client.build_url("/rest/v1/subscription_plans"),
            "http://localhost:54321/rest/v1/subscription_plans"
        );
    }
}
