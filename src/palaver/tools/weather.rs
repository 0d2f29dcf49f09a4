//! Weather lookup tool backed by Open-Meteo.
//!
//! Two requests per call: the geocoding API resolves the city name to
//! coordinates, then the forecast API returns current conditions. Neither
//! endpoint requires an API key.

use async_trait::async_trait;
use serde_json::Value;
use std::error::Error as StdError;
use std::time::Duration;

use crate::palaver::tool_loop::ToolHandler;
use crate::palaver::transport::get_shared_http_client;
use crate::palaver::wire::{build_tool, Tool, ToolParameter, ToolParameterType};

const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Current weather conditions for a named city.
pub struct WeatherTool;

impl WeatherTool {
    pub fn schema() -> Tool {
        build_tool(
            "get_weather",
            "Get the current weather conditions for a city.",
            vec![ToolParameter::new(
                "city",
                ToolParameterType::String,
                "City name, e.g. \"Amsterdam\"",
            )
            .required()],
        )
    }
}

#[async_trait]
impl ToolHandler for WeatherTool {
    async fn call(&self, arguments: &str) -> Result<String, Box<dyn StdError + Send + Sync>> {
        let parsed: Value = match serde_json::from_str(arguments) {
            Ok(parsed) => parsed,
            Err(err) => return Ok(format!("Error: invalid arguments: {}", err)),
        };
        let city = match parsed.get("city").and_then(|value| value.as_str()) {
            Some(city) if !city.is_empty() => city,
            _ => return Ok("Error: missing required parameter 'city'.".to_string()),
        };

        let client = get_shared_http_client();
        let geocode_url = format!(
            "{}?name={}&count=1",
            GEOCODING_URL,
            urlencoding::encode(city)
        );
        let geocoded: Value = client
            .get(&geocode_url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .json()
            .await?;
        let place = match geocoded
            .get("results")
            .and_then(|results| results.get(0))
        {
            Some(place) => place,
            None => return Ok(format!("Error: no location found for '{}'.", city)),
        };
        let latitude = place.get("latitude").and_then(|v| v.as_f64()).unwrap_or(0.0);
        let longitude = place
            .get("longitude")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        let name = place
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or(city);
        let country = place
            .get("country")
            .and_then(|v| v.as_str())
            .unwrap_or_default();

        let forecast_url = format!(
            "{}?latitude={}&longitude={}&current=temperature_2m,relative_humidity_2m,wind_speed_10m",
            FORECAST_URL, latitude, longitude
        );
        let forecast: Value = client
            .get(&forecast_url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .json()
            .await?;
        let current = match forecast.get("current") {
            Some(current) => current,
            None => return Ok(format!("Error: no weather data available for '{}'.", city)),
        };
        let temperature = current
            .get("temperature_2m")
            .and_then(|v| v.as_f64())
            .unwrap_or(f64::NAN);
        let humidity = current
            .get("relative_humidity_2m")
            .and_then(|v| v.as_f64())
            .unwrap_or(f64::NAN);
        let wind = current
            .get("wind_speed_10m")
            .and_then(|v| v.as_f64())
            .unwrap_or(f64::NAN);

        Ok(format!(
            "Current weather in {}{}{}: {:.1} degrees C, {:.0}% relative humidity, wind {:.1} km/h.",
            name,
            if country.is_empty() { "" } else { ", " },
            country,
            temperature,
            humidity,
            wind
        ))
    }
}
