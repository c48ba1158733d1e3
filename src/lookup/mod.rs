pub mod food;
pub mod weather;

pub use food::OpenFoodFactsClient;
pub use weather::OpenWeatherClient;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use thiserror::Error;

use crate::models::FoodItem;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest_middleware::Error),
    #[error("unexpected status {0}")]
    Status(StatusCode),
    #[error("malformed payload: {0}")]
    Payload(#[source] reqwest::Error),
    #[error("response has no usable data")]
    MissingData,
}

impl LookupError {
    /// Запрос сорвался: сервис не ответил или ответил не JSON.
    /// Статус не 200 и ответ без нужных полей сюда не относятся.
    pub fn is_request_failure(&self) -> bool {
        matches!(self, LookupError::Transport(_) | LookupError::Payload(_))
    }
}

#[async_trait]
pub trait WeatherLookup: Send + Sync {
    /// Текущая температура в городе, °C
    async fn current_temperature(&self, city: &str) -> Result<f64, LookupError>;
}

#[async_trait]
pub trait FoodLookup: Send + Sync {
    /// Первый найденный продукт или `None`, если поиск ничего не дал
    async fn find_food(&self, query: &str) -> Result<Option<FoodItem>, LookupError>;
}

pub fn http_client(retries: u32) -> ClientWithMiddleware {
    let retry_policy = ExponentialBackoff::builder()
        .build_with_max_retries(retries);

    ClientBuilder::new(Client::new())
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build()
}
