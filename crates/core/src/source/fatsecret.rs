//! FatSecret platform API backend.
//!
//! Authenticates via the OAuth2 client-credentials grant and keeps the
//! bearer token cached in memory for the process lifetime. A 401 on any
//! call invalidates the cached token and triggers exactly one
//! re-authentication and retry; a second 401 fails the call.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::FatSecretConfig;
use crate::metrics::{EXTERNAL_SERVICE_REQUESTS, SEARCH_RESULTS};

use super::types::{FoodCandidate, FoodDetails, FoodServing, SourceError};
use super::NutritionSource;

/// FatSecret REST client.
pub struct FatSecretClient {
    client: reqwest::Client,
    config: FatSecretConfig,
    token: RwLock<Option<String>>,
}

impl FatSecretClient {
    /// Create a new client from configuration. Does not authenticate yet;
    /// the first call acquires the token lazily.
    pub fn new(config: FatSecretConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config,
            token: RwLock::new(None),
        }
    }

    /// Return the cached token, exchanging credentials for a fresh one if
    /// none is cached. Concurrent exchanges are tolerated; the last writer
    /// wins and every caller still holds a valid token.
    async fn ensure_token(&self) -> Result<String, SourceError> {
        if let Some(token) = self.token.read().await.clone() {
            return Ok(token);
        }

        debug!("Requesting FatSecret access token");
        let response = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("scope", "basic"),
            ])
            .send()
            .await
            .map_err(|e| SourceError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Auth(format!(
                "Token exchange failed: HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Json(e.to_string()))?;

        *self.token.write().await = Some(token_response.access_token.clone());
        info!("FatSecret client authenticated");

        Ok(token_response.access_token)
    }

    /// Issue an authenticated GET, re-authenticating once on 401.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        let mut reauthenticated = false;

        loop {
            let token = self.ensure_token().await?;

            let response = self
                .client
                .get(url)
                .bearer_auth(&token)
                .send()
                .await
                .map_err(|e| SourceError::Http(e.to_string()))?;

            let status = response.status();

            if status.as_u16() == 401 {
                if reauthenticated {
                    return Err(SourceError::Auth(
                        "Rejected again after re-authentication".to_string(),
                    ));
                }
                warn!("FatSecret token rejected, re-authenticating");
                *self.token.write().await = None;
                reauthenticated = true;
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(SourceError::Api {
                    status: status.as_u16(),
                    message: body.chars().take(200).collect(),
                });
            }

            return response
                .json::<T>()
                .await
                .map_err(|e| SourceError::Json(e.to_string()));
        }
    }

    fn search_url(&self, term: &str) -> String {
        format!(
            "{}?method=foods.search&search_expression={}&format=json",
            self.config.api_url.trim_end_matches('/'),
            urlencoding::encode(term)
        )
    }

    fn details_url(&self, food_id: &str) -> String {
        format!(
            "{}?method=food.get.v4&food_id={}&format=json",
            self.config.api_url.trim_end_matches('/'),
            urlencoding::encode(food_id)
        )
    }
}

#[async_trait]
impl NutritionSource for FatSecretClient {
    fn name(&self) -> &str {
        "fatsecret"
    }

    async fn search(&self, term: &str) -> Result<Vec<FoodCandidate>, SourceError> {
        debug!(term = term, "Searching FatSecret");

        let result = self
            .get_json::<SearchResponse>(&self.search_url(term))
            .await;

        let status = if result.is_ok() { "success" } else { "error" };
        EXTERNAL_SERVICE_REQUESTS
            .with_label_values(&["fatsecret", "search", status])
            .inc();

        let candidates: Vec<FoodCandidate> = result?
            .foods
            .and_then(|foods| foods.food)
            .map(OneOrMany::into_vec)
            .unwrap_or_default()
            .into_iter()
            .map(FoodCandidate::from)
            .collect();

        SEARCH_RESULTS.with_label_values(&[]).observe(candidates.len() as f64);
        debug!(term = term, results = candidates.len(), "FatSecret search complete");

        Ok(candidates)
    }

    async fn get_details(&self, food_id: &str) -> Result<FoodDetails, SourceError> {
        debug!(food_id = food_id, "Fetching FatSecret food details");

        let result = self
            .get_json::<DetailsResponse>(&self.details_url(food_id))
            .await;

        let status = if result.is_ok() { "success" } else { "error" };
        EXTERNAL_SERVICE_REQUESTS
            .with_label_values(&["fatsecret", "get_details", status])
            .inc();

        let food = result?
            .food
            .ok_or_else(|| SourceError::MissingFood(food_id.to_string()))?;

        Ok(FoodDetails::from(food))
    }
}

// ============================================================================
// Wire types
// ============================================================================
//
// FatSecret serializes numbers as JSON strings and collapses single-element
// arrays into bare objects; the wire types absorb both quirks.

/// A field that may arrive as a single object or an array of objects.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

fn parse_num(value: &Option<String>) -> f64 {
    value
        .as_deref()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0)
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    foods: Option<SearchFoods>,
}

#[derive(Debug, Deserialize)]
struct SearchFoods {
    /// Absent entirely when the search matched nothing.
    #[serde(default)]
    food: Option<OneOrMany<SearchFood>>,
}

#[derive(Debug, Deserialize)]
struct SearchFood {
    food_id: String,
    food_name: String,
    food_type: String,
    brand_name: Option<String>,
    food_description: Option<String>,
}

impl From<SearchFood> for FoodCandidate {
    fn from(wire: SearchFood) -> Self {
        Self {
            id: wire.food_id,
            name: wire.food_name,
            food_type: wire.food_type,
            brand: wire.brand_name,
            description: wire.food_description,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    food: Option<DetailsFood>,
}

#[derive(Debug, Deserialize)]
struct DetailsFood {
    food_id: String,
    food_name: String,
    food_type: String,
    servings: Option<DetailsServings>,
}

#[derive(Debug, Deserialize)]
struct DetailsServings {
    serving: OneOrMany<ServingWire>,
}

#[derive(Debug, Deserialize)]
struct ServingWire {
    serving_description: Option<String>,
    metric_serving_amount: Option<String>,
    metric_serving_unit: Option<String>,
    number_of_units: Option<String>,
    measurement_description: Option<String>,
    calories: Option<String>,
    carbohydrate: Option<String>,
    protein: Option<String>,
    fat: Option<String>,
    saturated_fat: Option<String>,
    sodium: Option<String>,
    fiber: Option<String>,
    sugar: Option<String>,
}

impl From<ServingWire> for FoodServing {
    fn from(wire: ServingWire) -> Self {
        Self {
            serving_description: wire.serving_description.unwrap_or_default(),
            metric_serving_amount: parse_num(&wire.metric_serving_amount),
            metric_serving_unit: wire.metric_serving_unit.unwrap_or_default(),
            number_of_units: parse_num(&wire.number_of_units),
            measurement_description: wire.measurement_description.unwrap_or_default(),
            calories: parse_num(&wire.calories),
            carbohydrate: parse_num(&wire.carbohydrate),
            protein: parse_num(&wire.protein),
            fat: parse_num(&wire.fat),
            saturated_fat: parse_num(&wire.saturated_fat),
            sodium: parse_num(&wire.sodium),
            fiber: parse_num(&wire.fiber),
            sugar: parse_num(&wire.sugar),
        }
    }
}

impl From<DetailsFood> for FoodDetails {
    fn from(wire: DetailsFood) -> Self {
        Self {
            id: wire.food_id,
            name: wire.food_name,
            food_type: wire.food_type,
            servings: wire
                .servings
                .map(|s| s.serving.into_vec())
                .unwrap_or_default()
                .into_iter()
                .map(FoodServing::from)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> FatSecretConfig {
        FatSecretConfig {
            client_id: "test-id".to_string(),
            client_secret: "test-secret".to_string(),
            api_url: "https://platform.fatsecret.example/rest/server.api".to_string(),
            token_url: "https://oauth.fatsecret.example/connect/token".to_string(),
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_search_url() {
        let client = FatSecretClient::new(test_config());
        let url = client.search_url("pasta al pomodoro");

        assert!(url.starts_with("https://platform.fatsecret.example/rest/server.api?"));
        assert!(url.contains("method=foods.search"));
        assert!(url.contains("search_expression=pasta%20al%20pomodoro"));
        assert!(url.contains("format=json"));
    }

    #[test]
    fn test_details_url() {
        let client = FatSecretClient::new(test_config());
        let url = client.details_url("33691");

        assert!(url.contains("method=food.get.v4"));
        assert!(url.contains("food_id=33691"));
    }

    #[test]
    fn test_parse_search_response_array() {
        let json = r#"{
            "foods": {
                "food": [
                    {"food_id": "1", "food_name": "Pasta", "food_type": "Generic"},
                    {"food_id": "2", "food_name": "Pasta Sauce", "food_type": "Brand",
                     "brand_name": "Some Brand"}
                ],
                "max_results": "20",
                "total_results": "2",
                "page_number": "0"
            }
        }"#;

        let response: SearchResponse = serde_json::from_str(json).unwrap();
        let foods = response.foods.unwrap().food.unwrap().into_vec();
        assert_eq!(foods.len(), 2);
        assert_eq!(foods[0].food_name, "Pasta");
        assert_eq!(foods[1].brand_name.as_deref(), Some("Some Brand"));
    }

    #[test]
    fn test_parse_search_response_single_object() {
        // FatSecret collapses one-element arrays into a bare object
        let json = r#"{
            "foods": {
                "food": {"food_id": "1", "food_name": "Pasta", "food_type": "Generic"},
                "total_results": "1"
            }
        }"#;

        let response: SearchResponse = serde_json::from_str(json).unwrap();
        let foods = response.foods.unwrap().food.unwrap().into_vec();
        assert_eq!(foods.len(), 1);
        assert_eq!(foods[0].food_id, "1");
    }

    #[test]
    fn test_parse_search_response_empty() {
        let json = r#"{"foods": null}"#;
        let response: SearchResponse = serde_json::from_str(json).unwrap();
        assert!(response.foods.is_none());
    }

    #[test]
    fn test_parse_details_with_string_numbers() {
        let json = r#"{
            "food": {
                "food_id": "33691",
                "food_name": "Pasta with Tomato Sauce",
                "food_type": "Generic",
                "servings": {
                    "serving": [{
                        "serving_description": "100 g",
                        "metric_serving_amount": "100.000",
                        "metric_serving_unit": "g",
                        "number_of_units": "100.000",
                        "measurement_description": "g",
                        "calories": "150",
                        "carbohydrate": "28.31",
                        "protein": "5.11",
                        "fat": "1.98",
                        "saturated_fat": "0.432",
                        "sodium": "324",
                        "fiber": "2.4",
                        "sugar": "3.75"
                    }]
                }
            }
        }"#;

        let response: DetailsResponse = serde_json::from_str(json).unwrap();
        let details = FoodDetails::from(response.food.unwrap());

        assert_eq!(details.id, "33691");
        assert_eq!(details.servings.len(), 1);
        let serving = &details.servings[0];
        assert!(serving.is_per_100g());
        assert_eq!(serving.calories, 150.0);
        assert_eq!(serving.carbohydrate, 28.31);
        assert_eq!(serving.sodium, 324.0);
    }

    #[test]
    fn test_parse_details_missing_food() {
        let json = r#"{"error": {"code": 106, "message": "Invalid ID"}}"#;
        let response: DetailsResponse = serde_json::from_str(json).unwrap();
        assert!(response.food.is_none());
    }

    #[test]
    fn test_parse_num_lenient() {
        assert_eq!(parse_num(&Some("12.5".to_string())), 12.5);
        assert_eq!(parse_num(&Some("not a number".to_string())), 0.0);
        assert_eq!(parse_num(&None), 0.0);
    }
}
