//! Weather tool.
//!
//! Reports current conditions and an optional daily forecast from
//! OpenWeatherMap. Without an API key, or when the upstream call fails, the
//! tool answers with deterministic mock data instead of an error.

mod client;
mod mock;
mod types;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;
use rmcp::model::CallToolResult;
use tracing::{info, warn};

use crate::core::config::Config;

use super::ToolDefinition;
use super::common::structured_result;

pub use client::{WeatherClient, WeatherError};
pub use mock::mock_report;
pub use types::{
    MAX_DAYS, Units, WeatherCondition, WeatherDay, WeatherParams, WeatherReport,
    WeatherTemperature,
};

#[derive(Debug, Clone, Default)]
pub struct WeatherTool;

impl WeatherTool {
    /// Produce a report, falling back to mock data on any upstream failure.
    pub async fn lookup(params: &WeatherParams, config: &Config) -> WeatherReport {
        let Some(api_key) = config.credentials.openweather_api_key.as_deref() else {
            info!(
                "No OpenWeatherMap API key configured, using mock weather for {}",
                params.location
            );
            return mock_report(params, Local::now().date_naive());
        };

        let result = match WeatherClient::new(&config.weather, api_key) {
            Ok(client) => client.report(params).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(report) => report,
            Err(e) => {
                warn!("Weather lookup for {} failed, using mock data: {}", params.location, e);
                mock_report(params, Local::now().date_naive())
            }
        }
    }

    fn summary(report: &WeatherReport) -> String {
        let symbol = match report.units {
            Units::Metric => "°C",
            Units::Imperial => "°F",
            Units::Standard => "K",
        };
        let conditions = report
            .current
            .conditions
            .first()
            .map(|c| c.description.as_str())
            .unwrap_or("unknown conditions");
        format!(
            "{}, {}: {}{}, {}",
            report.location, report.country, report.current.temperature.current, symbol, conditions
        )
    }
}

#[async_trait]
impl ToolDefinition for WeatherTool {
    const NAME: &'static str = "weather";

    const DESCRIPTION: &'static str = "Get current weather and an optional daily forecast (up to 7 days) for a location. Units can be metric, imperial or standard. Returns temperatures, conditions, humidity, wind, pressure, sunrise and sunset.";

    type Params = WeatherParams;

    async fn execute(params: WeatherParams, config: Arc<Config>) -> CallToolResult {
        let report = Self::lookup(&params, &config).await;
        structured_result(Self::summary(&report), &report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(days: u8) -> WeatherParams {
        WeatherParams {
            location: "Testville".to_string(),
            units: Units::Metric,
            days,
        }
    }

    #[tokio::test]
    async fn test_mock_without_api_key() {
        let mut config = Config::default();
        config.credentials.openweather_api_key = None;
        let report = WeatherTool::lookup(&params(3), &config).await;
        assert_eq!(report.location, "Testville");
        assert_eq!(report.forecast.map(|f| f.len()), Some(2));
    }

    #[tokio::test]
    async fn test_falls_back_on_upstream_failure() {
        let mut config = Config::default();
        config.credentials.openweather_api_key = Some("key".to_string());
        config.weather.api_base_url = "http://127.0.0.1:9".to_string();
        config.weather.timeout_secs = 1;
        let report = WeatherTool::lookup(&params(1), &config).await;
        assert_eq!(report.country, "US");
        assert_eq!(report.current.temperature.current, 22.5);
    }

    #[tokio::test]
    async fn test_execute_output() {
        let mut config = Config::default();
        config.credentials.openweather_api_key = None;
        let result = WeatherTool::execute(params(1), Arc::new(config)).await;
        assert_eq!(result.is_error, Some(false));
        let output = result.structured_content.unwrap();
        assert_eq!(output["units"], "metric");
        assert_eq!(output["current"]["humidity"], 65);
        assert!(output.get("forecast").is_none());
    }

    #[test]
    fn test_summary() {
        let report = mock_report(&params(1), Local::now().date_naive());
        assert_eq!(WeatherTool::summary(&report), "Testville, US: 22.5°C, clear sky");
    }
}
