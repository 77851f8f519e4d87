//! procflow configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main procflow configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR); `--log-level` wins
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Guidance provider tuning
    pub guidance: GuidanceConfig,

    /// Prompt template location
    pub prompts: PromptsConfig,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config, then user config
        for candidate in Self::fallback_paths() {
            if !candidate.exists() {
                continue;
            }
            match Self::load_from_file(&candidate) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {:#}", candidate.display(), e);
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only `log-level`, before logging is set up
    ///
    /// Follows the same chain as [`Config::load`] and never fails: an
    /// unreadable file simply yields `None`, and the full load reports it.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        #[derive(Deserialize)]
        struct LogLevelOnly {
            #[serde(rename = "log-level")]
            log_level: Option<String>,
        }

        let path = match config_path {
            Some(path) => path.clone(),
            None => Self::fallback_paths().into_iter().find(|p| p.exists())?,
        };
        let content = fs::read_to_string(path).ok()?;
        serde_yaml::from_str::<LogLevelOnly>(&content).ok()?.log_level
    }

    /// `./.procflow.yml`, then `{config_dir}/procflow/procflow.yml`
    fn fallback_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".procflow.yml")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("procflow").join("procflow.yml"));
        }
        paths
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM provider configuration
///
/// Fields left out of the YAML take the defaults of the configured
/// `provider`, not of the default provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RawLlmConfig")]
pub struct LlmConfig {
    /// Provider name: "gemini", "anthropic" or "openai"
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

/// `llm` section as written, before provider defaults are applied
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawLlmConfig {
    provider: Option<String>,
    model: Option<String>,
    #[serde(rename = "api-key-env")]
    api_key_env: Option<String>,
    #[serde(rename = "base-url")]
    base_url: Option<String>,
    #[serde(rename = "max-tokens")]
    max_tokens: Option<u32>,
    #[serde(rename = "timeout-ms")]
    timeout_ms: Option<u64>,
}

impl From<RawLlmConfig> for LlmConfig {
    fn from(raw: RawLlmConfig) -> Self {
        let defaults = Self::for_provider(raw.provider.as_deref().unwrap_or(DEFAULT_PROVIDER));
        Self {
            provider: defaults.provider,
            model: raw.model.unwrap_or(defaults.model),
            api_key_env: raw.api_key_env.unwrap_or(defaults.api_key_env),
            base_url: raw.base_url.unwrap_or(defaults.base_url),
            max_tokens: raw.max_tokens.unwrap_or(defaults.max_tokens),
            timeout_ms: raw.timeout_ms.unwrap_or(defaults.timeout_ms),
        }
    }
}

const DEFAULT_PROVIDER: &str = "gemini";

impl Default for LlmConfig {
    fn default() -> Self {
        Self::for_provider(DEFAULT_PROVIDER)
    }
}

impl LlmConfig {
    /// Defaults for a known provider; unknown names keep the Gemini endpoint
    pub fn for_provider(provider: &str) -> Self {
        let (model, api_key_env, base_url) = match provider {
            "anthropic" => ("claude-sonnet-4-20250514", "ANTHROPIC_API_KEY", "https://api.anthropic.com"),
            "openai" => ("gpt-4o-mini", "OPENAI_API_KEY", "https://api.openai.com"),
            _ => (
                "gemini-2.5-flash",
                "GEMINI_API_KEY",
                "https://generativelanguage.googleapis.com",
            ),
        };

        Self {
            provider: provider.to_string(),
            model: model.to_string(),
            api_key_env: api_key_env.to_string(),
            base_url: base_url.to_string(),
            max_tokens: 1024,
            timeout_ms: 60_000,
        }
    }

    /// The API key, if the configured environment variable is set and non-empty
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }

    /// Whether a backend credential is available
    pub fn has_credentials(&self) -> bool {
        self.api_key().is_some()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Guidance provider tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidanceConfig {
    /// Simulated latency of the offline generator in milliseconds
    #[serde(rename = "offline-delay-ms")]
    pub offline_delay_ms: u64,

    /// Sampling temperature for structured guidance
    #[serde(rename = "guidance-temperature")]
    pub guidance_temperature: f32,

    /// Sampling temperature for follow-up answers
    #[serde(rename = "answer-temperature")]
    pub answer_temperature: f32,
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            offline_delay_ms: 800,
            guidance_temperature: 0.3,
            answer_temperature: 0.5,
        }
    }
}

impl GuidanceConfig {
    pub fn offline_delay(&self) -> Duration {
        Duration::from_millis(self.offline_delay_ms)
    }
}

/// Prompt template location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    /// Directory searched for `{name}.pmt` overrides before the embedded templates
    pub dir: PathBuf,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".procflow/prompts"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.llm.model, "gemini-2.5-flash");
        assert_eq!(config.llm.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.guidance.offline_delay_ms, 800);
        assert_eq!(config.guidance.guidance_temperature, 0.3);
        assert_eq!(config.guidance.answer_temperature, 0.5);
        assert_eq!(config.prompts.dir, PathBuf::from(".procflow/prompts"));
    }

    #[test]
    fn test_provider_defaults() {
        let config = LlmConfig::for_provider("anthropic");
        assert!(config.model.contains("sonnet"));
        assert_eq!(config.api_key_env, "ANTHROPIC_API_KEY");
        assert_eq!(config.base_url, "https://api.anthropic.com");

        let config = LlmConfig::for_provider("openai");
        assert_eq!(config.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.base_url, "https://api.openai.com");
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
log-level: debug

llm:
  provider: anthropic
  model: claude-opus-4
  api-key-env: MY_API_KEY
  base-url: https://api.example.com
  max-tokens: 2048
  timeout-ms: 30000

guidance:
  offline-delay-ms: 0
  guidance-temperature: 0.1

prompts:
  dir: /tmp/prompts
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.llm.model, "claude-opus-4");
        assert_eq!(config.llm.api_key_env, "MY_API_KEY");
        assert_eq!(config.llm.max_tokens, 2048);
        assert_eq!(config.llm.timeout(), Duration::from_secs(30));
        assert_eq!(config.guidance.offline_delay(), Duration::ZERO);
        assert_eq!(config.guidance.guidance_temperature, 0.1);
        // Unspecified keeps the default
        assert_eq!(config.guidance.answer_temperature, 0.5);
        assert_eq!(config.prompts.dir, PathBuf::from("/tmp/prompts"));
    }

    #[test]
    fn test_provider_only_config_uses_provider_defaults() {
        let config: Config = serde_yaml::from_str("llm:\n  provider: anthropic\n").unwrap();

        assert_eq!(config.llm.provider, "anthropic");
        assert_eq!(config.llm.model, "claude-sonnet-4-20250514");
        assert_eq!(config.llm.api_key_env, "ANTHROPIC_API_KEY");
        assert_eq!(config.llm.base_url, "https://api.anthropic.com");
        assert_eq!(config.llm.max_tokens, 1024);

        let config: Config = serde_yaml::from_str("llm:\n  provider: openai\n  model: gpt-5\n").unwrap();
        assert_eq!(config.llm.model, "gpt-5");
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.llm.base_url, "https://api.openai.com");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
llm:
  model: gemini-2.0-flash
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.model, "gemini-2.0-flash");
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.llm.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.guidance.offline_delay_ms, 800);
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("procflow.yml");
        fs::write(&path, "guidance:\n  offline-delay-ms: 5\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.guidance.offline_delay_ms, 5);
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_load_log_level_reads_only_the_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("procflow.yml");
        fs::write(&path, "log-level: DEBUG\nllm:\n  provider: openai\n").unwrap();
        assert_eq!(Config::load_log_level(Some(&path)), Some("DEBUG".to_string()));

        // A file the full load rejects still yields no level instead of an error
        fs::write(&path, "log-level: [not, a, string]\n").unwrap();
        assert_eq!(Config::load_log_level(Some(&path)), None);

        let missing = dir.path().join("missing.yml");
        assert_eq!(Config::load_log_level(Some(&missing)), None);
    }

    #[test]
    fn test_api_key_requires_non_empty_value() {
        let mut config = LlmConfig::default();

        config.api_key_env = "PROCFLOW_TEST_UNSET_KEY_7F3A".to_string();
        assert_eq!(config.api_key(), None);
        assert!(!config.has_credentials());

        // SAFETY: the variable names are unique to this test
        unsafe {
            std::env::set_var("PROCFLOW_TEST_BLANK_KEY_7F3A", "   ");
            std::env::set_var("PROCFLOW_TEST_SET_KEY_7F3A", " secret ");
        }

        config.api_key_env = "PROCFLOW_TEST_BLANK_KEY_7F3A".to_string();
        assert_eq!(config.api_key(), None);

        config.api_key_env = "PROCFLOW_TEST_SET_KEY_7F3A".to_string();
        assert_eq!(config.api_key(), Some("secret".to_string()));
    }
}
