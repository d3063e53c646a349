//! Texts shown for a weather report.

use chrono::DateTime;

use crate::{
    config::Units,
    model::{Condition, CurrentWeather, Forecast, ForecastItem},
};

const FORECAST_TIME_FORMAT: &str = "%a %d %b, %H:%M";

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentWeatherDisplay {
    pub location_text: String,
    pub condition_text: String,
    pub temperature_text: String,
}

impl CurrentWeatherDisplay {
    pub fn new(current: &CurrentWeather, units: Units) -> Self {
        Self {
            location_text: current.name.clone(),
            condition_text: condition_text(&current.weather),
            temperature_text: temperature_text(current.main.temp, units),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastItemDisplay {
    pub time_date_text: String,
    pub temperature_text: String,
    pub condition_text: String,
}

impl ForecastItemDisplay {
    pub fn new(item: &ForecastItem, units: Units) -> Self {
        let time_date_text = DateTime::from_timestamp(item.dt, 0)
            .map(|dt| dt.format(FORECAST_TIME_FORMAT).to_string())
            .unwrap_or_else(|| "-".to_string());

        Self {
            time_date_text,
            temperature_text: temperature_text(item.temperatures.temp, units),
            condition_text: condition_text(&item.weather),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastDisplay {
    pub location_text: String,
    pub items: Vec<ForecastItemDisplay>,
}

impl ForecastDisplay {
    pub fn new(forecast: &Forecast, units: Units) -> Self {
        Self {
            location_text: forecast.city.name.clone(),
            items: forecast
                .list
                .iter()
                .map(|item| ForecastItemDisplay::new(item, units))
                .collect(),
        }
    }
}

fn temperature_text(temp: f64, units: Units) -> String {
    format!("{temp:.1}{}", units.temperature_suffix())
}

fn condition_text(conditions: &[Condition]) -> String {
    let Some(first) = conditions.first() else {
        return "Unknown".to_string();
    };

    let mut chars = first.description.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => first.main.as_str().to_string(),
    }
}
