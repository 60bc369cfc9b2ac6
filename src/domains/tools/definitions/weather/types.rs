//! Weather tool input, output and OpenWeatherMap response types.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Unit system for temperatures and wind speed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Celsius, metres per second.
    #[default]
    Metric,
    /// Fahrenheit, miles per hour.
    Imperial,
    /// Kelvin, metres per second.
    Standard,
}

impl Units {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
            Self::Standard => "standard",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for the weather tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct WeatherParams {
    #[schemars(description = "Location to get weather for (city name, 'city,country', zip code)")]
    pub location: String,

    #[schemars(description = "Units: metric, imperial or standard (default: metric)")]
    #[serde(default)]
    pub units: Units,

    #[schemars(description = "Number of days to report, 1-7 (default: 1). More than 1 adds a forecast")]
    #[serde(default = "default_days")]
    pub days: u8,
}

fn default_days() -> u8 {
    1
}

/// Largest number of days the tool reports.
pub const MAX_DAYS: u8 = 7;

impl WeatherParams {
    /// Requested days clamped to `1..=MAX_DAYS`.
    pub fn days(&self) -> u8 {
        self.days.clamp(1, MAX_DAYS)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WeatherCondition {
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WeatherTemperature {
    pub current: f64,
    pub feels_like: f64,
    pub min: f64,
    pub max: f64,
}

/// Weather for one day, either observed now or forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WeatherDay {
    /// Date as `YYYY-MM-DD`.
    pub date: String,
    pub temperature: WeatherTemperature,
    pub conditions: Vec<WeatherCondition>,
    /// Relative humidity in percent.
    pub humidity: i64,
    pub wind_speed: f64,
    /// Wind direction in degrees.
    pub wind_direction: i64,
    /// Atmospheric pressure in hPa.
    pub pressure: i64,
    /// `HH:MM`, or `N/A` for forecast days.
    pub sunrise: String,
    pub sunset: String,
}

/// Structured output of the weather tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WeatherReport {
    pub location: String,
    pub country: String,
    pub units: Units,
    pub current: WeatherDay,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast: Option<Vec<WeatherDay>>,
}

// OpenWeatherMap payloads. Only the fields the tool reads are declared.

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiMain {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiWind {
    pub speed: f64,
    #[serde(default)]
    pub deg: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiCondition {
    pub main: String,
    pub description: String,
    pub icon: String,
}

impl From<ApiCondition> for WeatherCondition {
    fn from(c: ApiCondition) -> Self {
        Self {
            main: c.main,
            description: c.description,
            icon: c.icon,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiSys {
    #[serde(default)]
    pub country: String,
    pub sunrise: i64,
    pub sunset: i64,
}

/// Response of `/weather`.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiCurrent {
    pub name: String,
    pub main: ApiMain,
    pub wind: ApiWind,
    pub weather: Vec<ApiCondition>,
    pub sys: ApiSys,
    /// Offset from UTC in seconds.
    #[serde(default)]
    pub timezone: i32,
}

/// A three-hour slot of `/forecast`.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiSlot {
    pub dt: i64,
    pub main: ApiMain,
    pub wind: ApiWind,
    pub weather: Vec<ApiCondition>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiCity {
    #[serde(default)]
    pub timezone: i32,
}

/// Response of `/forecast`.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiForecast {
    pub list: Vec<ApiSlot>,
    pub city: ApiCity,
}
