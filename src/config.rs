use eyre::{Context, Result, eyre};
use funcloop::agent::{LoopConfig, RetryPolicy};
use funcloop::llm::OllamaConfig;
use funcloop::llm::ollama::{DEFAULT_MODEL, DEFAULT_URL};
use funcloop::tools::WeatherBackend;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub llm: LlmConfig,
    pub agent: AgentConfig,
    pub weather: WeatherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub url: String,
    pub temperature: Option<f32>,
    pub timeout_ms: u64,
    pub stream: bool,
    pub wirelog: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            url: DEFAULT_URL.to_string(),
            temperature: None,
            timeout_ms: 120000,
            stream: false,
            wirelog: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub max_retries: u32,
    pub retry_policy: RetryPolicy,
    pub max_turns: u32,
    pub turn_timeout_ms: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_policy: RetryPolicy::AllTurns,
            max_turns: 16,
            turn_timeout_ms: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeatherBackendKind {
    #[default]
    Dummy,
    WeatherApi,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub backend: WeatherBackendKind,
    /// Environment variable holding the WeatherAPI.com key
    pub api_key_env: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            backend: WeatherBackendKind::Dummy,
            api_key_env: "WEATHER_API_KEY".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            llm: LlmConfig::default(),
            agent: AgentConfig::default(),
            weather: WeatherConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let project_name = env!("CARGO_PKG_NAME");
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    pub fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            max_retries: self.agent.max_retries,
            retry_policy: self.agent.retry_policy,
            max_turns: self.agent.max_turns,
            turn_timeout: self.agent.turn_timeout_ms.map(Duration::from_millis),
            temperature: self.llm.temperature,
        }
    }

    pub fn ollama_config(&self) -> OllamaConfig {
        OllamaConfig {
            url: self.llm.url.clone(),
            model: self.llm.model.clone(),
            timeout: Duration::from_millis(self.llm.timeout_ms),
            wirelog: self.llm.wirelog,
        }
    }

    /// Resolve the weather backend, reading the API key from the environment
    pub fn weather_backend(&self) -> Result<WeatherBackend> {
        match self.weather.backend {
            WeatherBackendKind::Dummy => Ok(WeatherBackend::Dummy),
            WeatherBackendKind::WeatherApi => {
                let api_key = std::env::var(&self.weather.api_key_env)
                    .ok()
                    .filter(|key| !key.trim().is_empty())
                    .ok_or_else(|| eyre!("{} is not set", self.weather.api_key_env))?;
                Ok(WeatherBackend::WeatherApi { api_key })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.log_level.as_deref(), Some("info"));
        assert_eq!(config.llm.model, "llama3.2");
        assert_eq!(config.llm.url, "http://localhost:11434");
        assert!(!config.llm.stream);
        assert_eq!(config.agent.max_retries, 3);
        assert_eq!(config.agent.retry_policy, RetryPolicy::AllTurns);
        assert_eq!(config.weather.backend, WeatherBackendKind::Dummy);
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "llm:\n  model: mistral\n  temperature: 0.2\nagent:\n  max_retries: 5\n  retry_policy: errors-only\n  turn_timeout_ms: 3000\nweather:\n  backend: weather-api"
        )
        .unwrap();

        let config = Config::load(Some(&file.path().to_path_buf())).unwrap();

        assert_eq!(config.llm.model, "mistral");
        assert_eq!(config.llm.temperature, Some(0.2));
        // unspecified fields keep their defaults
        assert_eq!(config.llm.url, "http://localhost:11434");
        assert_eq!(config.agent.max_retries, 5);
        assert_eq!(config.agent.retry_policy, RetryPolicy::ErrorsOnly);
        assert_eq!(config.agent.max_turns, 16);
        assert_eq!(config.weather.backend, WeatherBackendKind::WeatherApi);
        assert_eq!(config.weather.api_key_env, "WEATHER_API_KEY");
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let path = PathBuf::from("/nonexistent/funcloop.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_load_invalid_yaml_fails() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "agent:\n  max_retries: lots").unwrap();
        assert!(Config::load(Some(&file.path().to_path_buf())).is_err());
    }

    #[test]
    fn test_loop_config() {
        let mut config = Config::default();
        config.agent.turn_timeout_ms = Some(1500);
        config.llm.temperature = Some(0.0);

        let loop_config = config.loop_config();
        assert_eq!(loop_config.max_retries, 3);
        assert_eq!(loop_config.turn_timeout, Some(Duration::from_millis(1500)));
        assert_eq!(loop_config.temperature, Some(0.0));
    }

    #[test]
    fn test_ollama_config() {
        let mut config = Config::default();
        config.llm.timeout_ms = 5000;
        config.llm.wirelog = true;

        let ollama = config.ollama_config();
        assert_eq!(ollama.model, "llama3.2");
        assert_eq!(ollama.timeout, Duration::from_secs(5));
        assert!(ollama.wirelog);
    }

    #[test]
    fn test_weather_backend_dummy() {
        let config = Config::default();
        assert!(matches!(config.weather_backend().unwrap(), WeatherBackend::Dummy));
    }

    #[test]
    fn test_weather_backend_missing_key() {
        let mut config = Config::default();
        config.weather.backend = WeatherBackendKind::WeatherApi;
        config.weather.api_key_env = "FUNCLOOP_TEST_UNSET_WEATHER_KEY".to_string();

        let err = config.weather_backend().unwrap_err();
        assert!(err.to_string().contains("FUNCLOOP_TEST_UNSET_WEATHER_KEY"));
    }
}
