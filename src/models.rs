use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============ Startup Configuration Models ============

/// Client-credentials triple supplied once at process start.
///
/// Held only in process memory. `Debug` is implemented manually so the
/// secret can never leak through a formatting path.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub tenant_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("tenant_id", &self.tenant_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// All three fields are required and non-empty.
    pub fn is_complete(&self) -> bool {
        !self.client_id.trim().is_empty()
            && !self.tenant_id.trim().is_empty()
            && !self.client_secret.trim().is_empty()
    }
}

/// Bearer token obtained fresh for each request cycle and discarded after use.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub value: String,
    /// Lifetime declared by the identity provider, in seconds.
    pub expires_in: u64,
}

// ============ Upstream Wire Models ============

/// Identity provider token endpoint response (OAuth2 client-credentials grant).
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: u64,
}

/// Envelope returned by the Graph secure score endpoint.
#[derive(Debug, Deserialize)]
pub struct SecureScoreEnvelope {
    pub value: Vec<SecureScoreEntry>,
}

/// One secure score snapshot. The endpoint returns newest first; the
/// dashboard renders only the first entry.
#[derive(Debug, Deserialize)]
pub struct SecureScoreEntry {
    #[serde(rename = "azureTenantId")]
    pub azure_tenant_id: String,
    #[serde(rename = "currentScore")]
    pub current_score: f64,
    #[serde(rename = "maxScore")]
    pub max_score: f64,
    #[serde(rename = "createdDateTime")]
    pub created_date_time: String,
}

// ============ Response Models ============

/// Normalized result of one authenticate + fetch cycle.
///
/// Immutable once built; exists only for the duration of rendering one
/// response. `fetch_latency_ms` and `server_time_utc` are the liveness
/// proof: together they show the data was retrieved during this request,
/// not served from a cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResult {
    pub tenant_id: String,
    pub score_value: f64,
    pub max_score: f64,
    /// Computation timestamp as reported by the upstream provider.
    pub api_timestamp: String,
    /// Duration of the score-endpoint call only (excludes authentication).
    pub fetch_latency_ms: u64,
    pub server_time_utc: DateTime<Utc>,
}

impl ScoreResult {
    /// Score as a percentage of the maximum, clamped to 0..=100 for display.
    pub fn score_percent(&self) -> f64 {
        if self.max_score <= 0.0 {
            return 0.0;
        }
        (self.score_value / self.max_score * 100.0).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_completeness() {
        let creds = Credentials {
            client_id: "id".to_string(),
            tenant_id: "tenant".to_string(),
            client_secret: "secret".to_string(),
        };
        assert!(creds.is_complete());

        let creds = Credentials {
            client_id: "id".to_string(),
            tenant_id: "  ".to_string(),
            client_secret: "secret".to_string(),
        };
        assert!(!creds.is_complete());
    }

    #[test]
    fn credentials_debug_redacts_secret() {
        let creds = Credentials {
            client_id: "id".to_string(),
            tenant_id: "tenant".to_string(),
            client_secret: "hunter2".to_string(),
        };
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn score_percent_handles_zero_max() {
        let result = ScoreResult {
            tenant_id: "t".to_string(),
            score_value: 450.0,
            max_score: 0.0,
            api_timestamp: "2024-01-01T00:00:00Z".to_string(),
            fetch_latency_ms: 12,
            server_time_utc: Utc::now(),
        };
        assert_eq!(result.score_percent(), 0.0);
    }

    #[test]
    fn secure_score_entry_parses_graph_payload() {
        let json = serde_json::json!({
            "value": [{
                "azureTenantId": "abc",
                "currentScore": 450.0,
                "maxScore": 900.0,
                "createdDateTime": "2024-01-01T00:00:00Z"
            }]
        });
        let envelope: SecureScoreEnvelope = serde_json::from_value(json).unwrap();
        assert_eq!(envelope.value.len(), 1);
        assert_eq!(envelope.value[0].azure_tenant_id, "abc");
        assert_eq!(envelope.value[0].current_score, 450.0);
    }
}
