use tracing::warn;

use super::{
    types::{AuthMethod, Config, LlmProvider},
    ConfigError,
};

/// Validate configuration beyond what serde enforces structurally.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.auth.method == AuthMethod::ApiKey
        && config.auth.api_key.as_ref().is_none_or(|k| k.is_empty())
    {
        return Err(ConfigError::ValidationError(
            "auth.api_key must be set when auth.method is \"api_key\"".to_string(),
        ));
    }

    if let Some(fatsecret) = &config.fatsecret {
        if fatsecret.client_id.is_empty() || fatsecret.client_secret.is_empty() {
            return Err(ConfigError::ValidationError(
                "fatsecret.client_id and fatsecret.client_secret must be non-empty".to_string(),
            ));
        }
    } else {
        warn!("No [fatsecret] section: all foods will be AI-estimated");
    }

    if let Some(llm) = &config.llm {
        if llm.provider == LlmProvider::Anthropic
            && llm.api_key.as_ref().is_none_or(|k| k.is_empty())
        {
            return Err(ConfigError::ValidationError(
                "llm.api_key must be set for the anthropic provider".to_string(),
            ));
        }
        if llm.model.is_empty() {
            return Err(ConfigError::ValidationError(
                "llm.model cannot be empty".to_string(),
            ));
        }
    } else {
        warn!("No [llm] section: extraction and fallback estimation are disabled");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    fn base_config() -> Config {
        load_config_from_str(
            r#"
[auth]
method = "none"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_validate_minimal_config() {
        assert!(validate_config(&base_config()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = base_config();
        config.server.port = 0;
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_api_key_auth_requires_key() {
        let config = load_config_from_str(
            r#"
[auth]
method = "api_key"
"#,
        )
        .unwrap();
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_empty_fatsecret_credentials_fail() {
        let config = load_config_from_str(
            r#"
[auth]
method = "none"

[fatsecret]
client_id = ""
client_secret = "x"
"#,
        )
        .unwrap();
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_anthropic_requires_api_key() {
        let config = load_config_from_str(
            r#"
[auth]
method = "none"

[llm]
provider = "anthropic"
model = "claude-3-5-haiku-latest"
"#,
        )
        .unwrap();
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_ollama_needs_no_api_key() {
        let config = load_config_from_str(
            r#"
[auth]
method = "none"

[llm]
provider = "ollama"
model = "llama3"
"#,
        )
        .unwrap();
        assert!(validate_config(&config).is_ok());
    }
}
