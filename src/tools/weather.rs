//! getCurrentWeather - demo tool backed by fixed data or WeatherAPI.com

use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{Tool, ToolError, ToolInput, required_str};

const WEATHER_API_URL: &str = "http://api.weatherapi.com/v1/forecast.json";

/// Where weather data comes from
#[derive(Debug, Clone)]
pub enum WeatherBackend {
    /// Deterministic canned reports, no network
    Dummy,
    /// Live forecast from WeatherAPI.com
    WeatherApi { api_key: String },
}

pub struct WeatherTool {
    backend: WeatherBackend,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct Forecast {
    location: ForecastLocation,
    current: ForecastCurrent,
}

#[derive(Debug, Deserialize)]
struct ForecastLocation {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ForecastCurrent {
    temp_c: f64,
    temp_f: f64,
    condition: ForecastCondition,
}

#[derive(Debug, Deserialize)]
struct ForecastCondition {
    text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Celsius,
    Fahrenheit,
}

impl Unit {
    fn parse(s: &str) -> Result<Self, ToolError> {
        match s.to_lowercase().as_str() {
            "celsius" => Ok(Unit::Celsius),
            "fahrenheit" => Ok(Unit::Fahrenheit),
            other => Err(ToolError::InvalidInput(format!(
                "unit must be 'celsius' or 'fahrenheit', got '{}'",
                other
            ))),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Unit::Celsius => "celsius",
            Unit::Fahrenheit => "fahrenheit",
        }
    }
}

impl WeatherTool {
    pub fn new(backend: WeatherBackend) -> Self {
        Self {
            backend,
            client: reqwest::Client::new(),
        }
    }

    pub fn dummy() -> Self {
        Self::new(WeatherBackend::Dummy)
    }

    fn dummy_report(location: &str, unit: Unit) -> Value {
        let temperature = match unit {
            Unit::Celsius => json!("6"),
            Unit::Fahrenheit => json!(43),
        };
        json!({
            "location": location,
            "temperature": temperature,
            "unit": unit.as_str(),
            "forecast": ["sunny", "windy"]
        })
    }

    async fn live_report(&self, api_key: &str, location: &str, unit: Unit) -> Result<Value, ToolError> {
        debug!("Fetching forecast for {}", location);
        let response = self
            .client
            .get(WEATHER_API_URL)
            .query(&[
                ("key", api_key),
                ("q", location),
                ("days", "1"),
                ("aqi", "no"),
                ("alerts", "no"),
            ])
            .send()
            .await
            .map_err(|e| ToolError::Failed(format!("weather request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::Failed(format!("weather API not available ({})", status)));
        }

        let forecast: Forecast = response
            .json()
            .await
            .map_err(|e| ToolError::Failed(format!("unreadable weather response: {}", e)))?;

        Ok(Self::summarize(&forecast, unit))
    }

    fn summarize(forecast: &Forecast, unit: Unit) -> Value {
        let temperature = match unit {
            Unit::Celsius => forecast.current.temp_c,
            Unit::Fahrenheit => forecast.current.temp_f,
        };
        json!({
            "location": forecast.location.name,
            "temperature": temperature,
            "unit": unit.as_str(),
            "forecast": [forecast.current.condition.text]
        })
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "getCurrentWeather"
    }

    fn description(&self) -> &str {
        "Get the current weather in a given location"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "The city and state, e.g. San Francisco, CA"
                },
                "unit": {
                    "type": "string",
                    "enum": ["celsius", "fahrenheit"]
                }
            },
            "required": ["location", "unit"]
        })
    }

    async fn invoke(&self, input: &ToolInput) -> Result<String, ToolError> {
        let location = required_str(input, "location")?;
        let unit = Unit::parse(required_str(input, "unit")?)?;

        let report = match &self.backend {
            WeatherBackend::Dummy => Self::dummy_report(location, unit),
            WeatherBackend::WeatherApi { api_key } => self.live_report(api_key, location, unit).await?,
        };

        Ok(report.to_string())
    }
}
