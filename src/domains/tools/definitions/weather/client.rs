//! OpenWeatherMap client and forecast aggregation.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::core::config::WeatherConfig;

use super::types::{
    ApiCurrent, ApiForecast, ApiSlot, WeatherCondition, WeatherDay, WeatherParams, WeatherReport,
    WeatherTemperature,
};

const USER_AGENT: &str = concat!("aytch_mcp/", env!("CARGO_PKG_VERSION"));

/// Three-hour slots per day in `/forecast`.
const SLOTS_PER_DAY: usize = 8;

/// Upper bound of slots `/forecast` returns.
const MAX_SLOTS: usize = 40;

/// Most common conditions kept per forecast day.
const MAX_CONDITIONS: usize = 3;

/// Errors from the weather API.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Weather API returned {status}: {message}")]
    Upstream { status: u16, message: String },
}

/// Thin async client for the OpenWeatherMap 2.5 API.
pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl WeatherClient {
    pub fn new(config: &WeatherConfig, api_key: impl Into<String>) -> Result<Self, WeatherError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Fetch current weather and, for more than one day, the forecast.
    pub async fn report(&self, params: &WeatherParams) -> Result<WeatherReport, WeatherError> {
        let days = params.days();
        let current: ApiCurrent = self
            .get_json(
                "weather",
                &[
                    ("q", params.location.clone()),
                    ("units", params.units.to_string()),
                ],
            )
            .await?;

        let forecast = if days > 1 {
            let count = (usize::from(days) * SLOTS_PER_DAY).min(MAX_SLOTS);
            let data: ApiForecast = self
                .get_json(
                    "forecast",
                    &[
                        ("q", params.location.clone()),
                        ("units", params.units.to_string()),
                        ("cnt", count.to_string()),
                    ],
                )
                .await?;
            let offset = utc_offset(data.city.timezone);
            Some(aggregate_forecast(data.list, offset, usize::from(days)))
        } else {
            None
        };

        let offset = utc_offset(current.timezone);
        let location = current.name.clone();
        let country = current.sys.country.clone();
        Ok(WeatherReport {
            location,
            country,
            units: params.units,
            current: current_day(current, Utc::now().with_timezone(&offset)),
            forecast,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(WeatherError::Upstream {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

fn utc_offset(seconds: i32) -> FixedOffset {
    FixedOffset::east_opt(seconds).unwrap_or_else(|| Utc.fix())
}

fn local_time(timestamp: i64, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    DateTime::from_timestamp(timestamp, 0).map(|t| t.with_timezone(&offset))
}

fn clock(timestamp: i64, offset: FixedOffset) -> String {
    local_time(timestamp, offset)
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

fn current_day(data: ApiCurrent, now: DateTime<FixedOffset>) -> WeatherDay {
    let offset = *now.offset();
    WeatherDay {
        date: now.format("%Y-%m-%d").to_string(),
        temperature: WeatherTemperature {
            current: data.main.temp,
            feels_like: data.main.feels_like,
            min: data.main.temp_min,
            max: data.main.temp_max,
        },
        conditions: data.weather.into_iter().map(WeatherCondition::from).collect(),
        humidity: data.main.humidity as i64,
        wind_speed: data.wind.speed,
        wind_direction: data.wind.deg as i64,
        pressure: data.main.pressure as i64,
        sunrise: clock(data.sys.sunrise, offset),
        sunset: clock(data.sys.sunset, offset),
    }
}

/// Fold three-hour slots into at most `days` daily summaries, grouped by the
/// location's local date in order of appearance.
pub(super) fn aggregate_forecast(
    slots: Vec<ApiSlot>,
    offset: FixedOffset,
    days: usize,
) -> Vec<WeatherDay> {
    let mut groups: Vec<(String, Vec<ApiSlot>)> = Vec::new();
    for slot in slots {
        let Some(time) = local_time(slot.dt, offset) else {
            continue;
        };
        let date = time.format("%Y-%m-%d").to_string();
        match groups.iter_mut().find(|(d, _)| *d == date) {
            Some((_, group)) => group.push(slot),
            None => groups.push((date, vec![slot])),
        }
    }

    groups
        .into_iter()
        .take(days)
        .map(|(date, group)| summarize_day(date, group))
        .collect()
}

fn summarize_day(date: String, slots: Vec<ApiSlot>) -> WeatherDay {
    let min = slots.iter().map(|s| s.main.temp_min).fold(f64::INFINITY, f64::min);
    let max = slots.iter().map(|s| s.main.temp_max).fold(f64::NEG_INFINITY, f64::max);
    let humidity = mean(&slots, |s| s.main.humidity).trunc() as i64;
    let wind_speed = mean(&slots, |s| s.wind.speed);
    let wind_direction = mean(&slots, |s| s.wind.deg).trunc() as i64;
    let pressure = mean(&slots, |s| s.main.pressure).trunc() as i64;

    let first = &slots[0].main;
    let temperature = WeatherTemperature {
        current: first.temp,
        feels_like: first.feels_like,
        min,
        max,
    };

    WeatherDay {
        date,
        temperature,
        conditions: most_common_conditions(&slots),
        humidity,
        wind_speed,
        wind_direction,
        pressure,
        sunrise: "N/A".to_string(),
        sunset: "N/A".to_string(),
    }
}

fn mean(slots: &[ApiSlot], field: impl Fn(&ApiSlot) -> f64) -> f64 {
    slots.iter().map(field).sum::<f64>() / slots.len() as f64
}

/// The most frequent leading conditions, ties kept in first-seen order.
fn most_common_conditions(slots: &[ApiSlot]) -> Vec<WeatherCondition> {
    let mut tally: Vec<(WeatherCondition, usize)> = Vec::new();
    for condition in slots.iter().filter_map(|s| s.weather.first()) {
        let condition = WeatherCondition::from(condition.clone());
        match tally.iter_mut().find(|(c, _)| *c == condition) {
            Some((_, n)) => *n += 1,
            None => tally.push((condition, 1)),
        }
    }
    // Stable sort keeps first-seen order among equal counts.
    tally.sort_by(|a, b| b.1.cmp(&a.1));
    tally
        .into_iter()
        .take(MAX_CONDITIONS)
        .map(|(c, _)| c)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::weather::types::{
        ApiCondition, ApiMain, ApiSys, ApiWind,
    };

    fn slot(dt: i64, temp: f64, main: &str) -> ApiSlot {
        ApiSlot {
            dt,
            main: ApiMain {
                temp,
                feels_like: temp - 1.0,
                temp_min: temp - 2.0,
                temp_max: temp + 2.0,
                pressure: 1010.0,
                humidity: 51.0,
            },
            wind: ApiWind {
                speed: 3.0,
                deg: 91.0,
            },
            weather: vec![ApiCondition {
                main: main.to_string(),
                description: main.to_lowercase(),
                icon: "01d".to_string(),
            }],
        }
    }

    // 2024-01-01T00:00:00Z
    const MIDNIGHT: i64 = 1_704_067_200;
    const HOUR: i64 = 3600;

    #[test]
    fn test_aggregate_groups_by_local_date() {
        let slots = vec![
            slot(MIDNIGHT, 10.0, "Rain"),
            slot(MIDNIGHT + 3 * HOUR, 12.0, "Clear"),
            slot(MIDNIGHT + 6 * HOUR, 14.0, "Clear"),
            slot(MIDNIGHT + 24 * HOUR, 5.0, "Snow"),
            slot(MIDNIGHT + 48 * HOUR, 5.0, "Snow"),
        ];
        let utc = FixedOffset::east_opt(0).unwrap();
        let days = aggregate_forecast(slots, utc, 2);
        assert_eq!(days.len(), 2);

        let first = &days[0];
        assert_eq!(first.date, "2024-01-01");
        assert_eq!(first.temperature.current, 10.0);
        assert_eq!(first.temperature.feels_like, 9.0);
        assert_eq!(first.temperature.min, 8.0);
        assert_eq!(first.temperature.max, 16.0);
        assert_eq!(first.conditions[0].main, "Clear");
        assert_eq!(first.conditions[1].main, "Rain");
        assert_eq!(first.humidity, 51);
        assert_eq!(first.wind_direction, 91);
        assert_eq!(first.pressure, 1010);
        assert_eq!(first.sunrise, "N/A");
        assert_eq!(days[1].date, "2024-01-02");
    }

    #[test]
    fn test_aggregate_respects_offset() {
        let slots = vec![slot(MIDNIGHT, 10.0, "Rain"), slot(MIDNIGHT + 3 * HOUR, 12.0, "Rain")];
        let west = FixedOffset::west_opt(2 * HOUR as i32).unwrap();
        let days = aggregate_forecast(slots, west, 5);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, "2023-12-31");
        assert_eq!(days[1].date, "2024-01-01");
    }

    #[test]
    fn test_condition_ties_keep_first_seen_order() {
        let slots = vec![
            slot(MIDNIGHT, 1.0, "Fog"),
            slot(MIDNIGHT + HOUR, 1.0, "Rain"),
            slot(MIDNIGHT + 2 * HOUR, 1.0, "Snow"),
            slot(MIDNIGHT + 3 * HOUR, 1.0, "Clear"),
            slot(MIDNIGHT + 4 * HOUR, 1.0, "Clear"),
        ];
        let names: Vec<_> = most_common_conditions(&slots)
            .into_iter()
            .map(|c| c.main)
            .collect();
        assert_eq!(names, vec!["Clear", "Fog", "Rain"]);
    }

    #[test]
    fn test_current_day() {
        let data = ApiCurrent {
            name: "Paris".to_string(),
            main: ApiMain {
                temp: 20.0,
                feels_like: 19.5,
                temp_min: 18.0,
                temp_max: 22.0,
                pressure: 1012.0,
                humidity: 40.0,
            },
            wind: ApiWind {
                speed: 4.1,
                deg: 270.0,
            },
            weather: vec![ApiCondition {
                main: "Clouds".to_string(),
                description: "few clouds".to_string(),
                icon: "02d".to_string(),
            }],
            sys: ApiSys {
                country: "FR".to_string(),
                sunrise: MIDNIGHT + 7 * HOUR,
                sunset: MIDNIGHT + 16 * HOUR,
            },
            timezone: 3600,
        };
        let offset = FixedOffset::east_opt(3600).unwrap();
        let now = DateTime::from_timestamp(MIDNIGHT + 12 * HOUR, 0)
            .unwrap()
            .with_timezone(&offset);
        let day = current_day(data, now);
        assert_eq!(day.date, "2024-01-01");
        assert_eq!(day.sunrise, "08:00");
        assert_eq!(day.sunset, "17:00");
        assert_eq!(day.conditions.len(), 1);
        assert_eq!(day.pressure, 1012);
    }

    #[test]
    fn test_parse_api_payload() {
        let json = r#"{
            "name": "London",
            "main": {"temp": 11.2, "feels_like": 10.1, "temp_min": 9.0, "temp_max": 12.5,
                     "pressure": 1018, "humidity": 81},
            "wind": {"speed": 4.6, "deg": 250},
            "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"}],
            "sys": {"country": "GB", "sunrise": 1704095400, "sunset": 1704123900},
            "timezone": 0,
            "cod": 200
        }"#;
        let data: ApiCurrent = serde_json::from_str(json).unwrap();
        assert_eq!(data.name, "London");
        assert_eq!(data.sys.country, "GB");
        assert_eq!(data.main.humidity, 81.0);
    }
}
