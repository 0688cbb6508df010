use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Nutrition database credentials. Optional: when absent, every food
    /// routes straight to the generative fallback.
    #[serde(default)]
    pub fatsecret: Option<FatSecretConfig>,
    /// Generative model used for extraction and fallback estimation.
    #[serde(default)]
    pub llm: Option<LlmConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    None,
    ApiKey,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("mealog.db")
}

/// FatSecret platform API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FatSecretConfig {
    pub client_id: String,
    pub client_secret: String,
    /// REST endpoint (default: the public platform URL)
    #[serde(default = "default_fatsecret_api_url")]
    pub api_url: String,
    /// OAuth2 token endpoint
    #[serde(default = "default_fatsecret_token_url")]
    pub token_url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_fatsecret_api_url() -> String {
    "https://platform.fatsecret.com/rest/server.api".to_string()
}

fn default_fatsecret_token_url() -> String {
    "https://oauth.fatsecret.com/connect/token".to_string()
}

fn default_timeout() -> u32 {
    30
}

/// Generative model configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    /// Required for anthropic, unused for ollama
    #[serde(default)]
    pub api_key: Option<String>,
    pub model: String,
    /// Override the provider's default API base URL
    #[serde(default)]
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    Anthropic,
    Ollama,
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fatsecret: Option<SanitizedFatSecretConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm: Option<SanitizedLlmConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: String,
}

/// Sanitized FatSecret config (credentials hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedFatSecretConfig {
    pub credentials_configured: bool,
    pub api_url: String,
    pub timeout_secs: u32,
}

/// Sanitized LLM config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedLlmConfig {
    pub provider: String,
    pub model: String,
    pub api_key_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                method: match config.auth.method {
                    AuthMethod::None => "none".to_string(),
                    AuthMethod::ApiKey => "api_key".to_string(),
                },
            },
            server: config.server.clone(),
            database: config.database.clone(),
            fatsecret: config.fatsecret.as_ref().map(|fs| SanitizedFatSecretConfig {
                credentials_configured: !fs.client_id.is_empty() && !fs.client_secret.is_empty(),
                api_url: fs.api_url.clone(),
                timeout_secs: fs.timeout_secs,
            }),
            llm: config.llm.as_ref().map(|llm| SanitizedLlmConfig {
                provider: match llm.provider {
                    LlmProvider::Anthropic => "anthropic".to_string(),
                    LlmProvider::Ollama => "ollama".to_string(),
                },
                model: llm.model.clone(),
                api_key_configured: llm.api_key.as_ref().is_some_and(|key| !key.is_empty()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_config() {
        let toml = r#"
[auth]
method = "none"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(matches!(config.auth.method, AuthMethod::None));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.path.to_str().unwrap(), "mealog.db");
        assert!(config.fatsecret.is_none());
        assert!(config.llm.is_none());
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[auth]
method = "api_key"
api_key = "secret"

[server]
host = "127.0.0.1"
port = 9000

[database]
path = "/data/mealog.db"

[fatsecret]
client_id = "id"
client_secret = "shh"

[llm]
provider = "anthropic"
api_key = "sk-test"
model = "claude-3-5-haiku-latest"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.auth.api_key.as_deref(), Some("secret"));

        let fatsecret = config.fatsecret.as_ref().unwrap();
        assert_eq!(fatsecret.client_id, "id");
        assert_eq!(fatsecret.timeout_secs, 30); // default
        assert!(fatsecret.api_url.contains("platform.fatsecret.com"));

        let llm = config.llm.as_ref().unwrap();
        assert_eq!(llm.provider, LlmProvider::Anthropic);
        assert_eq!(llm.model, "claude-3-5-haiku-latest");
    }

    #[test]
    fn test_deserialize_missing_auth_fails() {
        let toml = r#"
[server]
port = 8080
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_sanitized_config_redacts_secrets() {
        let toml = r#"
[auth]
method = "api_key"
api_key = "secret"

[fatsecret]
client_id = "id"
client_secret = "shh"

[llm]
provider = "ollama"
model = "llama3"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let sanitized = SanitizedConfig::from(&config);

        assert_eq!(sanitized.auth.method, "api_key");
        let fatsecret = sanitized.fatsecret.as_ref().unwrap();
        assert!(fatsecret.credentials_configured);

        let llm = sanitized.llm.as_ref().unwrap();
        assert_eq!(llm.provider, "ollama");
        assert!(!llm.api_key_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("shh"));
        assert!(!json.contains("\"secret\""));
    }
}
