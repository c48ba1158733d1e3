use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;

use super::{LookupError, WeatherLookup};

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    main: Option<MainBlock>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: Option<f64>,
}

/// Клиент OpenWeatherMap (текущая погода, метрические единицы)
pub struct OpenWeatherClient {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    pub fn new(client: ClientWithMiddleware, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl WeatherLookup for OpenWeatherClient {
    async fn current_temperature(&self, city: &str) -> Result<f64, LookupError> {
        let response = self
            .client
            .get(format!("{}/data/2.5/weather", self.base_url))
            .query(&[("q", city), ("appid", self.api_key.as_str()), ("units", "metric")])
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(LookupError::Status(status));
        }

        let body = response
            .json::<WeatherResponse>()
            .await
            .map_err(LookupError::Payload)?;

        body.main
            .and_then(|main| main.temp)
            .ok_or(LookupError::MissingData)
    }
}
