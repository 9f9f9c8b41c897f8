use crate::errors::AppError;
use crate::models::{
    AccessToken, Credentials, ScoreResult, SecureScoreEnvelope, TokenResponse,
};
use chrono::Utc;
use reqwest::Client;
use std::time::{Duration, Instant};

/// Client for the Microsoft Graph secure score integration.
///
/// Performs the full authenticate + fetch cycle per invocation. No token or
/// result is reused across calls: freshness of the rendered data must be
/// provable per request.
#[derive(Clone)]
pub struct GraphScoreClient {
    client: Client,
    auth_base_url: String,
    graph_base_url: String,
    credentials: Credentials,
}

impl GraphScoreClient {
    /// Creates a new `GraphScoreClient`.
    ///
    /// # Arguments
    ///
    /// * `auth_base_url` - Identity provider base URL (no trailing slash).
    /// * `graph_base_url` - Graph API base URL (no trailing slash).
    /// * `credentials` - Client-credentials triple for the token exchange.
    pub fn new(
        auth_base_url: String,
        graph_base_url: String,
        credentials: Credentials,
    ) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::Internal(format!("Failed to create Graph client: {}", e))
            })?;

        Ok(Self {
            client,
            auth_base_url,
            graph_base_url,
            credentials,
        })
    }

    /// Acquires a bearer token via the OAuth2 client-credentials grant.
    ///
    /// A single exchange, never retried. Incomplete credentials fail before
    /// any network call is attempted.
    pub async fn authenticate(&self) -> Result<AccessToken, AppError> {
        if !self.credentials.is_complete() {
            return Err(AppError::auth(
                None,
                "client_id, tenant_id and client_secret are all required",
            ));
        }

        let url = format!(
            "{}/{}/oauth2/v2.0/token",
            self.auth_base_url, self.credentials.tenant_id
        );
        tracing::info!("Requesting access token for tenant {}", self.credentials.tenant_id);

        let scope = format!("{}/.default", self.graph_base_url);
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("scope", scope.as_str()),
        ];

        let response = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::auth(None, format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::auth(
                Some(status.as_u16()),
                format!("Identity provider returned {}: {}", status, error_text),
            ));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            AppError::auth(None, format!("Failed to parse token response: {}", e))
        })?;

        if token.access_token.is_empty() {
            return Err(AppError::auth(None, "Token response missing access_token"));
        }

        tracing::debug!("Access token acquired (expires in {}s)", token.expires_in);
        Ok(AccessToken {
            value: token.access_token,
            expires_in: token.expires_in,
        })
    }

    /// Issues exactly one authenticated GET against the secure score endpoint.
    ///
    /// The latency window covers only this call, so the dashboard's
    /// `fetch_latency_ms` reflects the score fetch and not the token exchange.
    pub async fn fetch_score(&self, token: &AccessToken) -> Result<ScoreResult, AppError> {
        let url = format!(
            "{}/v1.0/security/secureScores?$top=1",
            self.graph_base_url
        );
        tracing::info!("Fetching secure score");

        let started = Instant::now();
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", token.value))
            .send()
            .await
            .map_err(|e| AppError::fetch(None, format!("Score request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::fetch(
                Some(status.as_u16()),
                format!("Score endpoint returned {}: {}", status, error_text),
            ));
        }

        let envelope: SecureScoreEnvelope = response.json().await.map_err(|e| {
            AppError::fetch(None, format!("Failed to parse score response: {}", e))
        })?;
        let fetch_latency_ms = started.elapsed().as_millis() as u64;

        let entry = envelope.value.into_iter().next().ok_or_else(|| {
            AppError::fetch(None, "Score response contained no entries")
        })?;

        let result = ScoreResult {
            tenant_id: entry.azure_tenant_id,
            score_value: entry.current_score,
            max_score: entry.max_score,
            api_timestamp: entry.created_date_time,
            fetch_latency_ms,
            server_time_utc: Utc::now(),
        };

        tracing::info!(
            "Secure score {}/{} for tenant {} fetched in {}ms",
            result.score_value,
            result.max_score,
            result.tenant_id,
            result.fetch_latency_ms
        );
        Ok(result)
    }

    /// Runs authenticate then fetch_score, short-circuiting on the first
    /// failure and surfacing its typed error unchanged.
    pub async fn get_live_score(&self) -> Result<ScoreResult, AppError> {
        let token = self.authenticate().await?;
        self.fetch_score(&token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_credentials() -> Credentials {
        Credentials {
            client_id: "client".to_string(),
            tenant_id: "tenant".to_string(),
            client_secret: "secret".to_string(),
        }
    }

    #[tokio::test]
    async fn test_client_creation() {
        let client = GraphScoreClient::new(
            "https://login.microsoftonline.com".to_string(),
            "https://graph.microsoft.com".to_string(),
            test_credentials(),
        );
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn incomplete_credentials_fail_before_any_network_call() {
        let client = GraphScoreClient::new(
            "https://login.microsoftonline.com".to_string(),
            "https://graph.microsoft.com".to_string(),
            Credentials {
                client_id: "client".to_string(),
                tenant_id: "tenant".to_string(),
                client_secret: "".to_string(),
            },
        )
        .unwrap();

        let err = client.authenticate().await.unwrap_err();
        match err {
            AppError::Auth { status, .. } => assert_eq!(status, None),
            other => panic!("expected Auth error, got {}", other),
        }
    }
}
