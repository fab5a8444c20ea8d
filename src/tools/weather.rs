//! Current-weather lookup against OpenWeatherMap.
//!
//! One GET per lookup, metric units, no retry and no caching. Failures never
//! escape as errors: they are folded into [`WeatherResult::Error`] so the
//! agent can still answer using the error text.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use super::Tool;
use crate::agent::ExecutionContext;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("OpenWeatherMap API key is not set.")]
    MissingApiKey,

    #[error("{0}")]
    Request(#[from] reqwest::Error),
}

/// Outcome of a lookup: the provider's record verbatim, or an error payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WeatherResult {
    Error { error: String },
    Report(Value),
}

impl WeatherResult {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error { error } => Some(error),
            Self::Report(_) => None,
        }
    }

    /// Temperature in degrees Celsius (`main.temp`).
    pub fn temperature(&self) -> Option<f64> {
        match self {
            Self::Report(value) => value["main"]["temp"].as_f64(),
            Self::Error { .. } => None,
        }
    }

    /// Human-readable condition (`weather[0].description`).
    pub fn condition(&self) -> Option<&str> {
        match self {
            Self::Report(value) => value["weather"][0]["description"].as_str(),
            Self::Error { .. } => None,
        }
    }
}

pub struct WeatherLookup {
    http: reqwest::Client,
    api_key: Option<String>,
    url: String,
}

impl WeatherLookup {
    pub fn new(api_key: Option<String>, url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            url: url.into(),
        }
    }

    /// Issue the provider request. Returns an error before any I/O when no
    /// API key is configured.
    pub async fn fetch(&self, city: &str) -> Result<Value, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::MissingApiKey)?;

        let response = self
            .http
            .get(&self.url)
            .query(&[("q", city), ("appid", api_key), ("units", "metric")])
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    /// Look up current weather for `city`.
    pub async fn lookup(&self, city: &str) -> WeatherResult {
        let outcome = self.fetch(city).await;
        settle(city, outcome, None)
    }
}

fn settle(
    city: &str,
    outcome: Result<Value, WeatherError>,
    ctx: Option<&mut ExecutionContext>,
) -> WeatherResult {
    match outcome {
        Ok(value) => {
            let result = WeatherResult::Report(value);
            tracing::debug!(
                city,
                temperature = ?result.temperature(),
                condition = ?result.condition(),
                "Weather lookup succeeded"
            );
            result
        }
        Err(WeatherError::MissingApiKey) => WeatherResult::Error {
            error: WeatherError::MissingApiKey.to_string(),
        },
        Err(e @ WeatherError::Request(_)) => {
            tracing::warn!(city, "API Request Error: {}", e);
            if let Some(ctx) = ctx {
                ctx.warn(format!("API Request Error: {}", e));
            }
            WeatherResult::Error {
                error: format!(
                    "Could not fetch weather data for {}. Please check the city name.",
                    city
                ),
            }
        }
    }
}

#[async_trait]
impl Tool for WeatherLookup {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Fetches the current weather for a given city using the OpenWeatherMap API. Returns the raw weather record (temperatures in Celsius) or an object with an 'error' field."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "The name of the city, e.g. 'London'"
                }
            },
            "required": ["city"]
        })
    }

    async fn execute(&self, args: Value, ctx: &mut ExecutionContext) -> anyhow::Result<String> {
        let city = args["city"]
            .as_str()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("Missing 'city' argument"))?;

        let outcome = self.fetch(city).await;
        let result = settle(city, outcome, Some(ctx));
        Ok(serde_json::to_string(&result)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{closed_port_url, spawn_server};
    use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn london() -> Value {
        json!({"name": "London", "main": {"temp": 15}, "weather": [{"description": "cloudy"}]})
    }

    #[tokio::test]
    async fn missing_key_skips_network() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/weather",
            get(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Json(london()) }
            }),
        );
        let addr = spawn_server(app).await;

        let lookup = WeatherLookup::new(None, format!("http://{}/weather", addr));
        let result = lookup.lookup("London").await;

        assert_eq!(result.error(), Some("OpenWeatherMap API key is not set."));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn sends_metric_query_and_returns_record_verbatim() {
        let app = Router::new().route(
            "/weather",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                if params.get("q").map(String::as_str) != Some("London")
                    || params.get("appid").map(String::as_str) != Some("owm-key")
                    || params.get("units").map(String::as_str) != Some("metric")
                {
                    return Err(StatusCode::BAD_REQUEST);
                }
                Ok(Json(london()))
            }),
        );
        let addr = spawn_server(app).await;

        let lookup = WeatherLookup::new(
            Some("owm-key".to_string()),
            format!("http://{}/weather", addr),
        );
        let result = lookup.lookup("London").await;

        assert_eq!(result, WeatherResult::Report(london()));
        assert_eq!(result.temperature(), Some(15.0));
        assert_eq!(result.condition(), Some("cloudy"));
    }

    #[tokio::test]
    async fn transport_failure_becomes_error_result() {
        let lookup = WeatherLookup::new(Some("owm-key".to_string()), closed_port_url("/weather"));
        let result = lookup.lookup("Atlantis").await;
        assert_eq!(
            result.error(),
            Some("Could not fetch weather data for Atlantis. Please check the city name.")
        );
    }

    #[tokio::test]
    async fn error_status_becomes_error_result() {
        let app = Router::new().route(
            "/weather",
            get(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({"cod": "404", "message": "city not found"})),
                )
            }),
        );
        let addr = spawn_server(app).await;

        let lookup = WeatherLookup::new(
            Some("owm-key".to_string()),
            format!("http://{}/weather", addr),
        );
        let result = lookup.lookup("Nowhere").await;
        assert_eq!(
            result.error(),
            Some("Could not fetch weather data for Nowhere. Please check the city name.")
        );
    }

    #[tokio::test]
    async fn tool_reports_transport_warning_to_context() {
        let lookup = WeatherLookup::new(Some("owm-key".to_string()), closed_port_url("/weather"));
        let mut ctx = ExecutionContext::new();

        let output = lookup
            .execute(json!({"city": "Oslo"}), &mut ctx)
            .await
            .unwrap();

        let payload: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(
            payload,
            json!({"error": "Could not fetch weather data for Oslo. Please check the city name."})
        );
        assert_eq!(ctx.warnings().len(), 1);
        assert!(ctx.warnings()[0].starts_with("API Request Error: "));
    }

    #[tokio::test]
    async fn tool_requires_city_argument() {
        let lookup = WeatherLookup::new(None, closed_port_url("/weather"));
        let mut ctx = ExecutionContext::new();
        let err = lookup.execute(json!({}), &mut ctx).await.unwrap_err();
        assert_eq!(err.to_string(), "Missing 'city' argument");
    }
}
