use serde::Deserialize;

const DEFAULT_AUTH_BASE_URL: &str = "https://login.microsoftonline.com";
const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub client_id: String,
    pub tenant_id: String,
    pub client_secret: String,
    pub port: u16,
    pub auth_base_url: String,
    pub graph_base_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            client_id: std::env::var("AZURE_CLIENT_ID")
                .map_err(|_| anyhow::anyhow!("AZURE_CLIENT_ID environment variable required"))
                .and_then(|id| {
                    if id.trim().is_empty() {
                        anyhow::bail!("AZURE_CLIENT_ID cannot be empty");
                    }
                    Ok(id)
                })?,
            tenant_id: std::env::var("AZURE_TENANT_ID")
                .map_err(|_| anyhow::anyhow!("AZURE_TENANT_ID environment variable required"))
                .and_then(|id| {
                    if id.trim().is_empty() {
                        anyhow::bail!("AZURE_TENANT_ID cannot be empty");
                    }
                    Ok(id)
                })?,
            client_secret: std::env::var("AZURE_CLIENT_SECRET")
                .map_err(|_| anyhow::anyhow!("AZURE_CLIENT_SECRET environment variable required"))
                .and_then(|secret| {
                    if secret.trim().is_empty() {
                        anyhow::bail!("AZURE_CLIENT_SECRET cannot be empty");
                    }
                    Ok(secret)
                })?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            auth_base_url: validate_base_url(
                std::env::var("AUTH_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_AUTH_BASE_URL.to_string()),
                "AUTH_BASE_URL",
            )?,
            graph_base_url: validate_base_url(
                std::env::var("GRAPH_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_GRAPH_BASE_URL.to_string()),
                "GRAPH_BASE_URL",
            )?,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Auth base URL: {}", config.auth_base_url);
        tracing::debug!("Graph base URL: {}", config.graph_base_url);
        tracing::debug!("Tenant: {}", config.tenant_id);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

/// Checks a base URL is non-empty and http(s), and strips a trailing slash
/// so it can be joined with endpoint paths by format!.
fn validate_base_url(url: String, name: &str) -> anyhow::Result<String> {
    if url.trim().is_empty() {
        anyhow::bail!("{} cannot be empty", name);
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("{} must start with http:// or https://", name);
    }
    Ok(url.trim_end_matches('/').to_string())
}
