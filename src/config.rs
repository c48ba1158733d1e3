use std::env;
use std::path::PathBuf;

use thiserror::Error;

pub const BOT_TOKEN_ENV: &str = "BOT_TOKEN";
pub const WEATHER_API_KEY_ENV: &str = "WEATHER_API_KEY";
const WEATHER_API_URL_ENV: &str = "WEATHER_API_URL";
const FOOD_API_URL_ENV: &str = "FOOD_API_URL";
const LOOKUP_RETRIES_ENV: &str = "LOOKUP_RETRIES";
const CHART_FONT_PATH_ENV: &str = "CHART_FONT_PATH";

const DEFAULT_WEATHER_API_URL: &str = "http://api.openweathermap.org";
const DEFAULT_FOOD_API_URL: &str = "https://world.openfoodfacts.org";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),
    #[error("environment variable {name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bot_token: String,
    pub weather_api_key: String,
    pub weather_api_url: String,
    pub food_api_url: String,
    pub lookup_retries: u32,
    pub chart_font_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Пустые значения считаем отсутствующими
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let bot_token = get(BOT_TOKEN_ENV).ok_or(ConfigError::Missing(BOT_TOKEN_ENV))?;
        let weather_api_key = get(WEATHER_API_KEY_ENV)
            .ok_or(ConfigError::Missing(WEATHER_API_KEY_ENV))?;

        let lookup_retries = match get(LOOKUP_RETRIES_ENV) {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                name: LOOKUP_RETRIES_ENV,
                value,
            })?,
            None => 0,
        };

        Ok(Config {
            bot_token,
            weather_api_key,
            weather_api_url: get(WEATHER_API_URL_ENV)
                .unwrap_or_else(|| DEFAULT_WEATHER_API_URL.to_string()),
            food_api_url: get(FOOD_API_URL_ENV).unwrap_or_else(|| DEFAULT_FOOD_API_URL.to_string()),
            lookup_retries,
            chart_font_path: get(CHART_FONT_PATH_ENV).map(PathBuf::from),
        })
    }
}
