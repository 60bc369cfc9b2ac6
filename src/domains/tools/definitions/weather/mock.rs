//! Deterministic weather data used without an API key or after an upstream failure.

use chrono::{Days, NaiveDate};

use super::types::{WeatherCondition, WeatherDay, WeatherParams, WeatherReport, WeatherTemperature};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Build a mock report for `params`, dated from `today`.
pub fn mock_report(params: &WeatherParams, today: NaiveDate) -> WeatherReport {
    let current = WeatherDay {
        date: today.format(DATE_FORMAT).to_string(),
        temperature: WeatherTemperature {
            current: 22.5,
            feels_like: 23.0,
            min: 18.0,
            max: 25.0,
        },
        conditions: vec![condition("Clear", "clear sky", "01d")],
        humidity: 65,
        wind_speed: 5.2,
        wind_direction: 180,
        pressure: 1013,
        sunrise: "06:30".to_string(),
        sunset: "20:15".to_string(),
    };

    let days = params.days();
    let forecast = (days > 1).then(|| (1..days).map(|i| mock_day(today, i)).collect());

    WeatherReport {
        location: params.location.clone(),
        country: "US".to_string(),
        units: params.units,
        current,
        forecast,
    }
}

fn mock_day(today: NaiveDate, offset: u8) -> WeatherDay {
    let i = i64::from(offset);
    let f = f64::from(offset);
    let date = today
        .checked_add_days(Days::new(u64::from(offset)))
        .unwrap_or(today);
    let conditions = if offset % 2 == 0 {
        condition("Clear", "clear sky", "01d")
    } else {
        condition("Clouds", "scattered clouds", "03d")
    };

    WeatherDay {
        date: date.format(DATE_FORMAT).to_string(),
        temperature: WeatherTemperature {
            current: 22.0 + f,
            feels_like: 22.5 + f,
            min: 18.0 + f,
            max: 25.0 + f,
        },
        conditions: vec![conditions],
        humidity: 65 - i,
        wind_speed: 5.2 + f * 0.5,
        wind_direction: (180 + i * 10) % 360,
        pressure: 1013 - i,
        sunrise: format!("06:{:02}", 30 + i),
        sunset: format!("20:{:02}", 15 - i),
    }
}

fn condition(main: &str, description: &str, icon: &str) -> WeatherCondition {
    WeatherCondition {
        main: main.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::weather::types::Units;

    fn params(days: u8) -> WeatherParams {
        WeatherParams {
            location: "Springfield".to_string(),
            units: Units::Imperial,
            days,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, 30).unwrap()
    }

    #[test]
    fn test_single_day_has_no_forecast() {
        let report = mock_report(&params(1), today());
        assert_eq!(report.location, "Springfield");
        assert_eq!(report.country, "US");
        assert_eq!(report.units, Units::Imperial);
        assert_eq!(report.current.date, "2024-12-30");
        assert_eq!(report.current.temperature.current, 22.5);
        assert!(report.forecast.is_none());
    }

    #[test]
    fn test_forecast_days() {
        let report = mock_report(&params(7), today());
        let forecast = report.forecast.unwrap();
        assert_eq!(forecast.len(), 6);

        let first = &forecast[0];
        assert_eq!(first.date, "2024-12-31");
        assert_eq!(first.conditions[0].main, "Clouds");
        assert_eq!(first.humidity, 64);
        assert_eq!(first.sunrise, "06:31");
        assert_eq!(first.sunset, "20:14");

        let second = &forecast[1];
        assert_eq!(second.date, "2025-01-01");
        assert_eq!(second.conditions[0].main, "Clear");
        assert_eq!(second.wind_direction, 200);

        assert_eq!(forecast[5].sunset, "20:09");
    }

    #[test]
    fn test_days_are_clamped() {
        let report = mock_report(&params(30), today());
        assert_eq!(report.forecast.unwrap().len(), 6);
    }
}
