use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_USER_AGENT: &str = "wxagent/0.1 (https://github.com/wxagent/wxagent)";

pub const DEFAULT_GEOCODE_URL: &str = "https://geocode.maps.co";
pub const DEFAULT_CURRENT_WEATHER_URL: &str = "https://api.api-ninjas.com";
pub const DEFAULT_FORECAST_URL: &str = "https://api.weather.gov";

// Environment variables read by `Config::apply_env`.
pub const ENV_GEOCODE_API_KEY: &str = "GEOCODE_API_KEY";
pub const ENV_WEATHER_API_KEY: &str = "API_NINJAS_KEY";
pub const ENV_MODEL_ID: &str = "OPENAI_MODEL";
pub const ENV_MODEL_API_BASE: &str = "OPENAI_API_URL";
pub const ENV_MODEL_API_KEY: &str = "API_KEY";
pub const ENV_USER_AGENT: &str = "WXAGENT_USER_AGENT";
pub const ENV_TIMEOUT_SECS: &str = "WXAGENT_TIMEOUT_SECS";

/// Language-model endpoint used by the agent that calls our tools.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model_id: Option<String>,
    pub api_base: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    /// Sent on every request. The forecast service refuses requests without one.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Base URLs of the upstream services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub geocode: String,
    pub current_weather: String,
    pub forecast: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            geocode: DEFAULT_GEOCODE_URL.to_string(),
            current_weather: DEFAULT_CURRENT_WEATHER_URL.to_string(),
            forecast: DEFAULT_FORECAST_URL.to_string(),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// geocode_api_key = "..."
/// weather_api_key = "..."
///
/// [model]
/// model_id = "gpt-4o-mini"
///
/// [http]
/// timeout_secs = 10
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub geocode_api_key: Option<String>,
    pub weather_api_key: Option<String>,
    pub model: ModelConfig,
    pub http: HttpConfig,
    pub endpoints: Endpoints,
}

/// Everything the weather tools need, checked once at startup.
#[derive(Debug, Clone)]
pub struct WeatherSettings {
    pub geocode_api_key: String,
    pub weather_api_key: String,
    pub http: HttpConfig,
    pub endpoints: Endpoints,
}

impl WeatherSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }
}

#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub model_id: String,
    pub api_base: String,
    pub api_key: String,
}

impl Config {
    /// Load the config file, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_file()?;
        cfg.apply_env(|name| std::env::var(name).ok())?;
        Ok(cfg)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load_file() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Invalid configuration TOML")
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(path)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "wxagent", "wxagent")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Override file values with whatever `lookup` finds. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_GEOCODE_API_KEY) {
            self.geocode_api_key = Some(v);
        }
        if let Some(v) = get(ENV_WEATHER_API_KEY) {
            self.weather_api_key = Some(v);
        }
        if let Some(v) = get(ENV_MODEL_ID) {
            self.model.model_id = Some(v);
        }
        if let Some(v) = get(ENV_MODEL_API_BASE) {
            self.model.api_base = Some(v);
        }
        if let Some(v) = get(ENV_MODEL_API_KEY) {
            self.model.api_key = Some(v);
        }
        if let Some(v) = get(ENV_USER_AGENT) {
            self.http.user_agent = v;
        }
        if let Some(v) = get(ENV_TIMEOUT_SECS) {
            self.http.timeout_secs = v
                .trim()
                .parse()
                .with_context(|| {
                    format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds, got '{v}'")
                })?;
        }

        Ok(())
    }

    /// Validate the weather keys and HTTP settings.
    pub fn weather_settings(&self) -> Result<WeatherSettings> {
        let mut missing = Vec::new();
        let geocode_api_key = required(&self.geocode_api_key, ENV_GEOCODE_API_KEY, &mut missing);
        let weather_api_key = required(&self.weather_api_key, ENV_WEATHER_API_KEY, &mut missing);
        ensure_present(&missing)?;

        if self.http.timeout_secs == 0 {
            return Err(anyhow!("http.timeout_secs must be greater than zero"));
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(anyhow!(
                "http.user_agent is empty; the forecast service rejects anonymous requests"
            ));
        }

        Ok(WeatherSettings {
            geocode_api_key,
            weather_api_key,
            http: self.http.clone(),
            endpoints: self.endpoints.clone(),
        })
    }

    /// Validate the language-model parameters.
    pub fn model_settings(&self) -> Result<ModelSettings> {
        let mut missing = Vec::new();
        let model_id = required(&self.model.model_id, ENV_MODEL_ID, &mut missing);
        let api_base = required(&self.model.api_base, ENV_MODEL_API_BASE, &mut missing);
        let api_key = required(&self.model.api_key, ENV_MODEL_API_KEY, &mut missing);
        ensure_present(&missing)?;

        Ok(ModelSettings {
            model_id,
            api_base,
            api_key,
        })
    }
}

fn required(
    value: &Option<String>,
    env: &'static str,
    missing: &mut Vec<&'static str>,
) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => {
            missing.push(env);
            String::new()
        }
    }
}

fn ensure_present(missing: &[&'static str]) -> Result<()> {
    if missing.is_empty() {
        return Ok(());
    }

    Err(anyhow!(
        "Missing required configuration: {}.\n\
         Hint: set the environment variable(s) or run `wxagent configure`.",
        missing.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_are_usable_apart_from_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.http.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(cfg.endpoints.forecast, DEFAULT_FORECAST_URL);
        assert!(!cfg.http.user_agent.is_empty());
    }

    #[test]
    fn weather_settings_report_every_missing_key() {
        let err = Config::default().weather_settings().unwrap_err();
        let msg = err.to_string();

        assert!(msg.contains("GEOCODE_API_KEY"));
        assert!(msg.contains("API_NINJAS_KEY"));
        assert!(msg.contains("Hint: set the environment variable"));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = Config::from_toml(
            r#"
            geocode_api_key = "from-file"

            [http]
            timeout_secs = 30
            "#,
        )
        .expect("valid toml");

        cfg.apply_env(env(&[
            ("GEOCODE_API_KEY", "from-env"),
            ("API_NINJAS_KEY", "ninja"),
            ("WXAGENT_TIMEOUT_SECS", "5"),
        ]))
        .expect("valid env");

        let settings = cfg.weather_settings().expect("all keys present");
        assert_eq!(settings.geocode_api_key, "from-env");
        assert_eq!(settings.weather_api_key, "ninja");
        assert_eq!(settings.timeout(), Duration::from_secs(5));
        assert_eq!(settings.http.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut cfg = Config {
            weather_api_key: Some("kept".into()),
            ..Config::default()
        };
        cfg.apply_env(env(&[("API_NINJAS_KEY", "  ")])).expect("valid env");
        assert_eq!(cfg.weather_api_key.as_deref(), Some("kept"));
    }

    #[test]
    fn bad_timeout_is_a_config_error() {
        let mut cfg = Config::default();
        let err = cfg
            .apply_env(env(&[("WXAGENT_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("WXAGENT_TIMEOUT_SECS"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let cfg = Config {
            geocode_api_key: Some("g".into()),
            weather_api_key: Some("w".into()),
            http: HttpConfig {
                timeout_secs: 0,
                ..HttpConfig::default()
            },
            ..Config::default()
        };
        assert!(cfg.weather_settings().is_err());
    }

    #[test]
    fn model_settings_require_all_three() {
        let mut cfg = Config::default();
        cfg.apply_env(env(&[("OPENAI_MODEL", "gpt-4o-mini")]))
            .expect("valid env");

        let msg = cfg.model_settings().unwrap_err().to_string();
        assert!(!msg.contains("OPENAI_MODEL"));
        assert!(msg.contains("OPENAI_API_URL"));
        assert!(msg.contains("API_KEY"));

        cfg.apply_env(env(&[
            ("OPENAI_API_URL", "https://models.example/v1"),
            ("API_KEY", "secret"),
        ]))
        .expect("valid env");
        let model = cfg.model_settings().expect("complete");
        assert_eq!(model.model_id, "gpt-4o-mini");
    }

    #[test]
    fn toml_roundtrip_keeps_sections() {
        let mut cfg = Config::default();
        cfg.model.model_id = Some("m".into());
        cfg.endpoints.geocode = "http://localhost:9000".into();

        let text = toml::to_string_pretty(&cfg).expect("serializable");
        let back = Config::from_toml(&text).expect("parsable");
        assert_eq!(back, cfg);
    }
}
