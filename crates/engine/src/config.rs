//! Engine configuration from environment variables.
//!
//! `main` loads `.env.local` and `.env` from the repository root first, so
//! values there behave exactly like exported variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use storyteller_domain::value_objects::{DEFAULT_MAX_MESSAGES, DEFAULT_SAMPLE_INTERVAL_MS};

use crate::infrastructure::artifacts::DEFAULT_MEDIA_DIR;
use crate::infrastructure::comfyui::DEFAULT_COMFYUI_URL;
use crate::infrastructure::openai_compat::{
    DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MODEL, DEFAULT_LLM_TIMEOUT_SECS,
};
use crate::infrastructure::speech::{DEFAULT_TTS_BASE_URL, DEFAULT_TTS_MODEL};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{variable} must be {expected}, got '{value}'")]
    Invalid {
        variable: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_timeout: Duration,
    pub llm_max_retries: u32,
    pub comfyui_url: String,
    pub comfyui_checkpoint: Option<String>,
    pub tts_base_url: String,
    pub tts_model: String,
    pub media_dir: PathBuf,
    pub max_history_messages: usize,
    pub emotion_sample_interval: chrono::Duration,
    pub server_host: String,
    pub server_port: u16,
    pub cors_allowed_origins: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            llm_base_url: DEFAULT_LLM_BASE_URL.to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            llm_timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
            llm_max_retries: 3,
            comfyui_url: DEFAULT_COMFYUI_URL.to_string(),
            comfyui_checkpoint: None,
            tts_base_url: DEFAULT_TTS_BASE_URL.to_string(),
            tts_model: DEFAULT_TTS_MODEL.to_string(),
            media_dir: PathBuf::from(DEFAULT_MEDIA_DIR),
            max_history_messages: DEFAULT_MAX_MESSAGES,
            emotion_sample_interval: chrono::Duration::milliseconds(DEFAULT_SAMPLE_INTERVAL_MS),
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            cors_allowed_origins: None,
        }
    }
}

impl EngineConfig {
    /// Read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset and blank values take the default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let llm_timeout_secs: u64 = parse_or(
            "LLM_TIMEOUT_SECS",
            get("LLM_TIMEOUT_SECS"),
            DEFAULT_LLM_TIMEOUT_SECS,
            "a whole number of seconds",
        )?;
        let interval_ms: i64 = parse_or(
            "EMOTION_SAMPLE_INTERVAL_MS",
            get("EMOTION_SAMPLE_INTERVAL_MS"),
            DEFAULT_SAMPLE_INTERVAL_MS,
            "a whole number of milliseconds",
        )?;
        if interval_ms < 0 {
            return Err(ConfigError::Invalid {
                variable: "EMOTION_SAMPLE_INTERVAL_MS",
                expected: "a non-negative number of milliseconds",
                value: interval_ms.to_string(),
            });
        }

        let (port_variable, port_value) = match get("SERVER_PORT") {
            Some(value) => ("SERVER_PORT", Some(value)),
            None => ("PORT", get("PORT")),
        };

        Ok(Self {
            llm_base_url: get("LLM_BASE_URL")
                .or_else(|| get("OLLAMA_BASE_URL"))
                .unwrap_or(defaults.llm_base_url),
            llm_model: get("LLM_MODEL").unwrap_or(defaults.llm_model),
            llm_timeout: Duration::from_secs(llm_timeout_secs),
            llm_max_retries: parse_or(
                "LLM_MAX_RETRIES",
                get("LLM_MAX_RETRIES"),
                defaults.llm_max_retries,
                "a whole number",
            )?,
            comfyui_url: get("COMFYUI_URL").unwrap_or(defaults.comfyui_url),
            comfyui_checkpoint: get("COMFYUI_CHECKPOINT"),
            tts_base_url: get("TTS_BASE_URL").unwrap_or(defaults.tts_base_url),
            tts_model: get("TTS_MODEL").unwrap_or(defaults.tts_model),
            media_dir: get("MEDIA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.media_dir),
            max_history_messages: parse_or(
                "MAX_HISTORY_TURNS",
                get("MAX_HISTORY_TURNS"),
                defaults.max_history_messages,
                "a whole number of messages",
            )?,
            emotion_sample_interval: chrono::Duration::milliseconds(interval_ms),
            server_host: get("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_or(
                port_variable,
                port_value,
                defaults.server_port,
                "a TCP port (0-65535)",
            )?,
            cors_allowed_origins: get("CORS_ALLOWED_ORIGINS"),
        })
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.server_host, self.server_port);
        raw.parse().map_err(|_| ConfigError::Invalid {
            variable: "SERVER_HOST",
            expected: "an IP address",
            value: self.server_host.clone(),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    variable: &'static str,
    value: Option<String>,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
            variable,
            expected,
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<EngineConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.llm_base_url, "http://localhost:11434");
        assert_eq!(config.max_history_messages, 10);
        assert_eq!(config.emotion_sample_interval.num_milliseconds(), 1000);
        assert_eq!(config.server_port, 3000);
    }

    #[test]
    fn legacy_ollama_url_is_honored() {
        let config = config_from(&[("OLLAMA_BASE_URL", "http://gpu:11434")]).unwrap();
        assert_eq!(config.llm_base_url, "http://gpu:11434");

        let config = config_from(&[
            ("OLLAMA_BASE_URL", "http://gpu:11434"),
            ("LLM_BASE_URL", "http://vllm:8000"),
        ])
        .unwrap();
        assert_eq!(config.llm_base_url, "http://vllm:8000");
    }

    #[test]
    fn port_falls_back_to_port_variable() {
        assert_eq!(config_from(&[("PORT", "8080")]).unwrap().server_port, 8080);
        assert_eq!(
            config_from(&[("PORT", "8080"), ("SERVER_PORT", "9000")])
                .unwrap()
                .server_port,
            9000
        );
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let err = config_from(&[("MAX_HISTORY_TURNS", "ten")]).unwrap_err();
        assert!(err.to_string().contains("MAX_HISTORY_TURNS"));

        assert!(config_from(&[("PORT", "70000")]).is_err());
        assert!(config_from(&[("EMOTION_SAMPLE_INTERVAL_MS", "-5")]).is_err());
    }

    #[test]
    fn blank_values_use_defaults() {
        let config = config_from(&[("LLM_MODEL", "   "), ("MEDIA_DIR", "")]).unwrap();
        assert_eq!(config.llm_model, "llama3.2");
        assert_eq!(config.media_dir, PathBuf::from("media"));
    }

    #[test]
    fn listen_addr_combines_host_and_port() {
        let config = config_from(&[("SERVER_HOST", "127.0.0.1"), ("SERVER_PORT", "4000")]).unwrap();
        assert_eq!(config.listen_addr().unwrap().to_string(), "127.0.0.1:4000");
    }
}
