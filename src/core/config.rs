//! Loads `config.toml`: logging settings and generation providers.

use llm::builder::{LLMBackend, LLMBuilder};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use crate::api::{EchoGenerator, Generator, LlmGenerator};

#[derive(Deserialize, Debug, Default)]
pub struct Config {
    #[serde(default)]
    pub default_provider: Option<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Deserialize, Debug, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Deserialize, Debug, Clone)]
pub struct ProviderConfig {
    pub backend: String,
    #[serde(default)]
    pub model: Option<String>,
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
    /// Only used by the `echo` backend.
    #[serde(default)]
    pub prefix: Option<String>,
}

/// Parses the content of a config file.
pub fn parse_config(content: &str) -> Result<Config, String> {
    toml::from_str(content).map_err(|e| format!("Failed to parse config.toml: {}", e))
}

/// Reads the config file at `path`. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<Config, String> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read config.toml: {}", e))?;
    parse_config(&content)
}

/// Builds one generator per configured provider.
pub fn build_providers(config: &Config) -> Result<HashMap<String, Arc<dyn Generator>>, String> {
    let mut providers: HashMap<String, Arc<dyn Generator>> = HashMap::new();
    for (name, provider_conf) in &config.providers {
        let generator = build_provider(name, provider_conf)?;
        providers.insert(name.clone(), generator);
    }
    Ok(providers)
}

fn build_provider(name: &str, conf: &ProviderConfig) -> Result<Arc<dyn Generator>, String> {
    if conf.backend.eq_ignore_ascii_case("echo") {
        return Ok(Arc::new(EchoGenerator::new(
            conf.prefix.clone().unwrap_or_default(),
        )));
    }

    let backend = LLMBackend::from_str(&conf.backend)
        .map_err(|_| format!("Invalid backend '{}' for provider '{}'", conf.backend, name))?;
    let model = conf
        .model
        .as_deref()
        .ok_or_else(|| format!("Provider '{}' has no model configured", name))?;

    let api_key_env_var = conf.api_key_env.clone().unwrap_or_else(|| match backend {
        LLMBackend::OpenAI => "OPENAI_API_KEY".to_string(),
        LLMBackend::Anthropic => "ANTHROPIC_API_KEY".to_string(),
        LLMBackend::Google => "GOOGLE_API_KEY".to_string(),
        LLMBackend::Groq => "GROQ_API_KEY".to_string(),
        LLMBackend::Mistral => "MISTRAL_API_KEY".to_string(),
        LLMBackend::DeepSeek => "DEEPSEEK_API_KEY".to_string(),
        _ => String::new(),
    });

    let api_key = if !api_key_env_var.is_empty() {
        env::var(&api_key_env_var).map_err(|_| {
            format!(
                "Environment variable '{}' not set for provider '{}'",
                api_key_env_var, name
            )
        })?
    } else {
        String::new() // Some backends like Ollama don't require a key
    };

    let mut builder = LLMBuilder::new().backend(backend).model(model);
    if !api_key.is_empty() {
        builder = builder.api_key(api_key);
    }
    if let Some(base_url) = &conf.base_url {
        builder = builder.base_url(base_url);
    }

    let provider = builder.build().map_err(|e| e.to_string())?;
    Ok(Arc::new(LlmGenerator::new(provider)))
}

/// Picks the provider to run with: explicit name, then the configured
/// default, then the only configured provider.
pub fn select_provider(
    config: &Config,
    providers: &HashMap<String, Arc<dyn Generator>>,
    requested: Option<&str>,
) -> Result<Arc<dyn Generator>, String> {
    let name = match requested.or(config.default_provider.as_deref()) {
        Some(name) => name.to_string(),
        None if providers.len() == 1 => providers.keys().next().cloned().unwrap_or_default(),
        None if providers.is_empty() => {
            return Err("No providers configured in config.toml".to_string())
        }
        None => {
            return Err("Several providers configured; pick one with --provider".to_string())
        }
    };
    providers
        .get(&name)
        .cloned()
        .ok_or_else(|| format!("Provider '{}' not found in config.toml", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
default_provider = "dry"

[logging]
level = "debug"
format = "json"

[providers.dry]
backend = "echo"
prefix = "echo:"

[providers.other]
backend = "echo"
"#;

    #[test]
    fn missing_sections_use_defaults() {
        let config = parse_config("").unwrap();
        assert!(config.providers.is_empty());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn parses_logging_and_providers() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.providers["dry"].prefix.as_deref(), Some("echo:"));
        assert_eq!(config.default_provider.as_deref(), Some("dry"));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(parse_config("[logging\nlevel=").is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("config.toml")).unwrap();
        assert!(config.default_provider.is_none());
    }

    #[tokio::test]
    async fn selects_configured_echo_provider() {
        let config = parse_config(SAMPLE).unwrap();
        let providers = build_providers(&config).unwrap();

        let dry = select_provider(&config, &providers, None).unwrap();
        let cancel = tokio_util::sync::CancellationToken::new();
        assert_eq!(dry.generate("x", &cancel).await.unwrap(), "echo:x");

        let other = select_provider(&config, &providers, Some("other")).unwrap();
        assert_eq!(other.generate("x", &cancel).await.unwrap(), "x");

        assert!(select_provider(&config, &providers, Some("nope")).is_err());
    }

    #[test]
    fn ambiguous_selection_without_default_fails() {
        let mut config = parse_config(SAMPLE).unwrap();
        config.default_provider = None;
        let providers = build_providers(&config).unwrap();
        assert!(select_provider(&config, &providers, None).is_err());
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let config = parse_config("[providers.x]\nbackend = \"nonsense\"\nmodel = \"m\"").unwrap();
        assert!(build_providers(&config).is_err());
    }
}
