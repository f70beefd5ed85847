use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use wxagent_core::{
    Config, WeatherTools,
    config::ModelConfig,
    tools::DEFAULT_FORECAST_DAYS,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "wxagent", version, about = "Weather tools for agents")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively store API keys and model settings in the config file.
    Configure,

    /// Validate configuration (file + environment) without calling any service.
    Check,

    /// Current conditions at a location.
    Current {
        /// Address or location name.
        location: String,
    },

    /// Today, tonight and tomorrow at a location.
    Today {
        /// Address or location name.
        location: String,
    },

    /// Daytime forecast for the next days.
    Days {
        /// Address or location name.
        location: String,

        /// How many days to show.
        #[arg(long, default_value_t = DEFAULT_FORECAST_DAYS)]
        days: usize,
    },

    /// Print the tool declarations as JSON.
    Tools,

    /// Invoke a tool by name, the way an agent would.
    Call {
        /// Tool name, e.g. "get_weather".
        tool: String,

        /// Arguments as a JSON object.
        #[arg(long, default_value = "{}")]
        args: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Check => check(),
            Command::Tools => {
                let json = serde_json::to_string_pretty(&WeatherTools::declarations())
                    .context("Failed to serialize tool declarations")?;
                println!("{json}");
                Ok(())
            }
            Command::Current { location } => {
                println!("{}", tools()?.get_weather(&location).await);
                Ok(())
            }
            Command::Today { location } => {
                println!("{}", tools()?.get_weather_forecast_today(&location).await);
                Ok(())
            }
            Command::Days { location, days } => {
                print!("{}", tools()?.get_weather_forecast_days(&location, days).await);
                Ok(())
            }
            Command::Call { tool, args } => {
                let args: serde_json::Value =
                    serde_json::from_str(&args).context("--args must be a JSON object")?;
                let text = tools()?.invoke(&tool, args).await?;
                println!("{text}");
                Ok(())
            }
        }
    }
}

/// Load and validate configuration before any request goes out.
fn tools() -> Result<WeatherTools> {
    let settings = Config::load()?.weather_settings()?;
    tracing::debug!(
        timeout_secs = settings.http.timeout_secs,
        user_agent = %settings.http.user_agent,
        geocode = %settings.endpoints.geocode,
        current_weather = %settings.endpoints.current_weather,
        forecast = %settings.endpoints.forecast,
        "configuration loaded"
    );
    WeatherTools::from_settings(&settings)
}

fn check() -> Result<()> {
    let path = Config::config_file_path()?;
    let cfg = Config::load()?;

    let settings = cfg.weather_settings()?;
    println!("Config file: {}", path.display());
    println!(
        "Weather tools: ok (timeout {}s, user agent \"{}\")",
        settings.http.timeout_secs, settings.http.user_agent
    );

    match cfg.model_settings() {
        Ok(model) => println!("Model: {} at {}", model.model_id, model.api_base),
        Err(err) => println!("Model: not configured\n{err}"),
    }

    Ok(())
}

fn configure() -> Result<()> {
    // Edit only what is on disk; environment overrides are not persisted.
    let mut cfg = Config::load_file()?;

    cfg.geocode_api_key = prompt_secret("Geocoding API key:", cfg.geocode_api_key.take())?;
    cfg.weather_api_key = prompt_secret("Current-weather API key:", cfg.weather_api_key.take())?;

    let ModelConfig {
        model_id,
        api_base,
        api_key,
    } = std::mem::take(&mut cfg.model);
    cfg.model = ModelConfig {
        model_id: prompt_text("Model id:", model_id)?,
        api_base: prompt_text("Model API base URL:", api_base)?,
        api_key: prompt_secret("Model API key:", api_key)?,
    };

    cfg.http.user_agent = Text::new("User-Agent (name and contact):")
        .with_default(&cfg.http.user_agent)
        .prompt()?;

    let path = cfg.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

fn prompt_text(message: &str, current: Option<String>) -> Result<Option<String>> {
    let mut prompt = Text::new(message);
    if let Some(current) = current.as_deref() {
        prompt = prompt.with_default(current);
    }
    let value = prompt.prompt()?;
    Ok(Some(value).filter(|v| !v.trim().is_empty()))
}

/// Leaving the prompt empty keeps the stored secret.
fn prompt_secret(message: &str, current: Option<String>) -> Result<Option<String>> {
    let help = if current.is_some() {
        "leave empty to keep the stored value"
    } else {
        "leave empty to skip"
    };

    let value = Password::new(message)
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_help_message(help)
        .prompt()?;

    if value.trim().is_empty() {
        Ok(current)
    } else {
        Ok(Some(value))
    }
}
