use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::{FoodLookup, LookupError};
use crate::models::FoodItem;

const UNKNOWN_PRODUCT: &str = "Неизвестно";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
struct Product {
    product_name: Option<String>,
    #[serde(default)]
    nutriments: Nutriments,
}

#[derive(Debug, Default, Deserialize)]
struct Nutriments {
    #[serde(rename = "energy-kcal_100g", default, deserialize_with = "lenient_number")]
    energy_kcal_100g: Option<f64>,
}

/// OpenFoodFacts иногда отдаёт числа строками
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

impl From<Product> for FoodItem {
    fn from(product: Product) -> Self {
        let name = product
            .product_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| UNKNOWN_PRODUCT.to_string());

        FoodItem {
            name,
            kcal_per_100g: product.nutriments.energy_kcal_100g.unwrap_or(0.0),
        }
    }
}

/// Поиск продуктов в OpenFoodFacts
pub struct OpenFoodFactsClient {
    client: ClientWithMiddleware,
    base_url: String,
}

impl OpenFoodFactsClient {
    pub fn new(client: ClientWithMiddleware, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl FoodLookup for OpenFoodFactsClient {
    async fn find_food(&self, query: &str) -> Result<Option<FoodItem>, LookupError> {
        let response = self
            .client
            .get(format!("{}/cgi/search.pl", self.base_url))
            .query(&[
                ("action", "process"),
                ("search_terms", query),
                ("json", "true"),
            ])
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(LookupError::Status(status));
        }

        let body = response
            .json::<SearchResponse>()
            .await
            .map_err(LookupError::Payload)?;

        Ok(body.products.into_iter().next().map(FoodItem::from))
    }
}
