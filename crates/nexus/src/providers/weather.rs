//! Weather API provider
//!
//! Fetches current conditions plus an N-day forecast (with air quality)
//! and normalizes the response into a [`WeatherRecord`].

use crate::config::endpoints::WEATHER_API;
use crate::error::Result;
use crate::network::HttpClient;
use crate::store::state::{
    Condition, CurrentCondition, CurrentMain, ForecastDay, HourlyPoint, WeatherRecord, Wind,
};

use serde::Deserialize;
use std::collections::BTreeMap;

// =============================================================================
// Internal API response types (serde)
// =============================================================================

#[derive(Debug, Deserialize)]
struct WaResponse {
    current: WaCurrent,
    forecast: WaForecast,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    humidity: f64,
    feelslike_c: f64,
    condition: WaCondition,
    wind_kph: f64,
    wind_degree: f64,
    wind_dir: String,
    #[serde(default)]
    air_quality: Option<BTreeMap<String, f64>>,
}

#[derive(Debug, Deserialize, Default)]
struct WaCondition {
    #[serde(default)]
    text: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    #[serde(default)]
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    date: String,
    day: WaDay,
    #[serde(default)]
    hour: Vec<WaHour>,
}

#[derive(Debug, Deserialize)]
struct WaDay {
    maxtemp_c: f64,
    mintemp_c: f64,
    avgtemp_c: f64,
    #[serde(default)]
    condition: WaCondition,
    #[serde(default)]
    avghumidity: f64,
    #[serde(default)]
    daily_chance_of_rain: f64,
}

#[derive(Debug, Deserialize)]
struct WaHour {
    time: String,
    temp_c: f64,
    #[serde(default)]
    condition: WaCondition,
    #[serde(default)]
    wind_kph: f64,
    #[serde(default)]
    humidity: f64,
    #[serde(default)]
    chance_of_rain: f64,
}

// =============================================================================
// WaResponse -> WeatherRecord conversion
// =============================================================================

impl From<WaCondition> for Condition {
    fn from(c: WaCondition) -> Self {
        Condition {
            text: c.text,
            icon: c.icon,
        }
    }
}

impl From<WaHour> for HourlyPoint {
    fn from(h: WaHour) -> Self {
        HourlyPoint {
            time: h.time,
            temp: h.temp_c,
            condition: h.condition.into(),
            wind_speed: h.wind_kph,
            humidity: h.humidity,
            rain_chance: h.chance_of_rain,
        }
    }
}

impl From<WaForecastDay> for ForecastDay {
    fn from(d: WaForecastDay) -> Self {
        ForecastDay {
            date: d.date,
            max_temp: d.day.maxtemp_c,
            min_temp: d.day.mintemp_c,
            avg_temp: d.day.avgtemp_c,
            condition: d.day.condition.into(),
            humidity: d.day.avghumidity,
            rain_chance: d.day.daily_chance_of_rain,
            hourly: d.hour.into_iter().map(HourlyPoint::from).collect(),
        }
    }
}

impl From<WaResponse> for WeatherRecord {
    fn from(r: WaResponse) -> Self {
        WeatherRecord {
            main: CurrentMain {
                temp: r.current.temp_c,
                humidity: r.current.humidity,
                feels_like: r.current.feelslike_c,
            },
            weather: vec![CurrentCondition {
                main: r.current.condition.text,
                icon: r.current.condition.icon,
            }],
            wind: Wind {
                speed: r.current.wind_kph,
                deg: r.current.wind_degree,
                dir: r.current.wind_dir,
            },
            air_quality: r.current.air_quality,
            forecast: r.forecast.forecastday.into_iter().map(ForecastDay::from).collect(),
        }
    }
}

// =============================================================================
// WeatherProvider
// =============================================================================

/// Weather API client
pub struct WeatherProvider {
    client: HttpClient,
    base_url: String,
    api_key: String,
}

impl WeatherProvider {
    /// Create a provider against the default server
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new()?,
            base_url: WEATHER_API.to_string(),
            api_key: api_key.into(),
        })
    }

    /// Create a provider with a custom base URL (for testing or proxies)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new()?,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    /// Fetch the forecast for one city
    ///
    /// `dt` restricts the forecast to a single date (yyyy-MM-dd), `hour`
    /// to a single hour of that date; both are passed through untouched.
    pub fn forecast(
        &self,
        city: &str,
        days: u32,
        dt: Option<&str>,
        hour: Option<u32>,
    ) -> Result<WeatherRecord> {
        let params = build_query(&self.api_key, city, days, dt, hour);
        let params_ref: Vec<(&str, &str)> =
            params.iter().map(|(k, v)| (*k, v.as_str())).collect();

        let url = format!("{}/forecast.json", self.base_url);
        let response: WaResponse = self.client.get_json_query(&url, &params_ref)?;
        Ok(response.into())
    }
}

/// Assemble the forecast query in request order
fn build_query(
    api_key: &str,
    city: &str,
    days: u32,
    dt: Option<&str>,
    hour: Option<u32>,
) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("key", api_key.to_string()),
        ("q", city.to_string()),
        ("days", days.to_string()),
        ("aqi", "yes".to_string()),
    ];
    if let Some(dt) = dt {
        params.push(("dt", dt.to_string()));
    }
    if let Some(h) = hour {
        params.push(("hour", h.to_string()));
    }
    params
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_response() -> WaResponse {
        serde_json::from_str(SAMPLE_JSON).unwrap()
    }

    const SAMPLE_JSON: &str = r#"{
        "location": {"name": "Tokyo", "country": "Japan"},
        "current": {
            "temp_c": 18.0,
            "humidity": 55,
            "feelslike_c": 17.2,
            "condition": {"text": "Partly cloudy", "icon": "//cdn/116.png", "code": 1003},
            "wind_kph": 15.1,
            "wind_degree": 230,
            "wind_dir": "SW",
            "air_quality": {"co": 230.3, "pm2_5": 8.1, "us-epa-index": 1}
        },
        "forecast": {
            "forecastday": [
                {
                    "date": "2025-03-01",
                    "day": {
                        "maxtemp_c": 19.0,
                        "mintemp_c": 9.5,
                        "avgtemp_c": 14.2,
                        "condition": {"text": "Sunny", "icon": "//cdn/113.png", "code": 1000},
                        "avghumidity": 50,
                        "daily_chance_of_rain": 10
                    },
                    "hour": [
                        {
                            "time": "2025-03-01 00:00",
                            "temp_c": 10.0,
                            "condition": {"text": "Clear", "icon": "//cdn/113.png"},
                            "wind_kph": 8.0,
                            "humidity": 60,
                            "chance_of_rain": 0
                        },
                        {
                            "time": "2025-03-01 01:00",
                            "temp_c": 9.8,
                            "condition": {"text": "Clear", "icon": "//cdn/113.png"},
                            "wind_kph": 7.5,
                            "humidity": 62,
                            "chance_of_rain": 0
                        }
                    ]
                }
            ]
        }
    }"#;

    #[test]
    fn test_current_conditions_normalized() {
        let record: WeatherRecord = sample_response().into();
        assert_eq!(record.main.temp, 18.0);
        assert_eq!(record.main.humidity, 55.0);
        assert_eq!(record.main.feels_like, 17.2);
    }

    #[test]
    fn test_condition_text_becomes_main() {
        let record: WeatherRecord = sample_response().into();
        assert_eq!(record.weather.len(), 1);
        assert_eq!(record.weather[0].main, "Partly cloudy");
        assert_eq!(record.weather[0].icon, "//cdn/116.png");
    }

    #[test]
    fn test_wind_normalized() {
        let record: WeatherRecord = sample_response().into();
        assert_eq!(record.wind.speed, 15.1);
        assert_eq!(record.wind.deg, 230.0);
        assert_eq!(record.wind.dir, "SW");
    }

    #[test]
    fn test_air_quality_carried_through() {
        let record: WeatherRecord = sample_response().into();
        let aqi = record.air_quality.expect("air quality present");
        assert_eq!(aqi.get("pm2_5"), Some(&8.1));
        assert_eq!(aqi.get("us-epa-index"), Some(&1.0));
    }

    #[test]
    fn test_forecast_day_projection() {
        let record: WeatherRecord = sample_response().into();
        assert_eq!(record.forecast.len(), 1);
        let day = &record.forecast[0];
        assert_eq!(day.date, "2025-03-01");
        assert_eq!(day.max_temp, 19.0);
        assert_eq!(day.min_temp, 9.5);
        assert_eq!(day.avg_temp, 14.2);
        assert_eq!(day.condition.text, "Sunny");
        assert_eq!(day.humidity, 50.0);
        assert_eq!(day.rain_chance, 10.0);
    }

    #[test]
    fn test_hourly_projection() {
        let record: WeatherRecord = sample_response().into();
        let hours = &record.forecast[0].hourly;
        assert_eq!(hours.len(), 2);
        assert_eq!(hours[0].time, "2025-03-01 00:00");
        assert_eq!(hours[0].temp, 10.0);
        assert_eq!(hours[0].wind_speed, 8.0);
        assert_eq!(hours[1].humidity, 62.0);
    }

    #[test]
    fn test_missing_air_quality_is_none() {
        let json = r#"{
            "current": {
                "temp_c": 5.0, "humidity": 80, "feelslike_c": 2.0,
                "condition": {"text": "Mist", "icon": "//cdn/143.png"},
                "wind_kph": 4.0, "wind_degree": 10, "wind_dir": "N"
            },
            "forecast": {"forecastday": []}
        }"#;
        let response: WaResponse = serde_json::from_str(json).unwrap();
        let record: WeatherRecord = response.into();
        assert_eq!(record.air_quality, None);
        assert!(record.forecast.is_empty());
    }

    #[test]
    fn test_empty_forecastday_list() {
        let json = r#"{
            "current": {
                "temp_c": 5.0, "humidity": 80, "feelslike_c": 2.0,
                "condition": {},
                "wind_kph": 4.0, "wind_degree": 10, "wind_dir": "N"
            },
            "forecast": {}
        }"#;
        let response: WaResponse = serde_json::from_str(json).unwrap();
        let record: WeatherRecord = response.into();
        assert!(record.forecast.is_empty());
        assert_eq!(record.weather[0].main, "");
    }

    #[test]
    fn test_provider_with_custom_base_url() {
        let provider = WeatherProvider::with_base_url("k", "http://localhost:9000").unwrap();
        assert_eq!(provider.base_url, "http://localhost:9000");
    }

    #[test]
    fn test_query_carries_days_and_aqi() {
        let params = build_query("secret", "Paris", 3, None, None);
        assert_eq!(
            params,
            vec![
                ("key", "secret".to_string()),
                ("q", "Paris".to_string()),
                ("days", "3".to_string()),
                ("aqi", "yes".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_appends_dt_and_hour_when_given() {
        let params = build_query("k", "Tokyo", 1, Some("2025-03-01"), Some(9));
        assert!(params.contains(&("dt", "2025-03-01".to_string())));
        assert!(params.contains(&("hour", "9".to_string())));
    }

    #[test]
    fn test_query_omits_dt_and_hour_by_default() {
        let params = build_query("k", "Tokyo", 1, None, None);
        assert!(!params.iter().any(|(k, _)| *k == "dt" || *k == "hour"));
    }

    #[test]
    fn test_forecast_unreachable_server_errors() {
        let provider = WeatherProvider::with_base_url("k", "http://invalid.invalid.invalid").unwrap();
        let result = provider.forecast("Tokyo", 1, None, None);
        assert!(result.is_err());
    }

    // ---- Integration test (requires network + WEATHER_API_KEY, marked #[ignore]) ----

    #[test]
    #[ignore]
    fn test_integration_forecast() {
        let key = std::env::var("WEATHER_API_KEY").expect("WEATHER_API_KEY");
        let provider = WeatherProvider::new(key).unwrap();
        let record = provider.forecast("London", 3, None, None).unwrap();
        assert!(!record.forecast.is_empty());
        assert!(record.forecast.len() <= 3);
    }
}
