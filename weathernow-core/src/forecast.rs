//! Client for the Open-Meteo forecast endpoint.
//!
//! One request carries three field lists (current, daily, hourly) and
//! `timezone=auto`; the response comes back as parallel arrays in the
//! location's local time. "Today" for the week grid is the weekday of the
//! local `current.time`, so no timezone database is consulted here.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::bucket::{LengthPolicy, bucketize};
use crate::error::{WeatherNowError, truncate_body};
use crate::model::{
    CurrentConditions, DailySummary, Forecast, HourlySample, Place, WeatherCondition,
};

pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com";

const ENDPOINT: &str = "forecast";
const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,apparent_temperature,wind_speed_10m,precipitation,weather_code";
const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,weather_code";
const HOURLY_FIELDS: &str = "temperature_2m,weather_code";
const FORECAST_DAYS: &str = "7";

/// The endpoint's local timestamps omit seconds.
const LOCAL_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Clone)]
pub struct ForecastClient {
    base_url: String,
    http: Client,
    policy: LengthPolicy,
}

impl ForecastClient {
    pub fn new(policy: LengthPolicy) -> Self {
        Self::with_base_url(DEFAULT_FORECAST_URL.to_string(), policy)
    }

    pub fn with_base_url(base_url: String, policy: LengthPolicy) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
            policy,
        }
    }

    /// Fetch and assemble the full forecast for a resolved place.
    pub async fn fetch(&self, place: &Place) -> Result<Forecast, WeatherNowError> {
        let url = format!("{}/v1/forecast", self.base_url);
        let latitude = place.latitude.to_string();
        let longitude = place.longitude.to_string();

        debug!(place = %place, "fetching forecast");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("current", CURRENT_FIELDS),
                ("daily", DAILY_FIELDS),
                ("hourly", HOURLY_FIELDS),
                ("timezone", "auto"),
                ("forecast_days", FORECAST_DAYS),
            ])
            .send()
            .await
            .map_err(|source| WeatherNowError::Http { endpoint: ENDPOINT, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| WeatherNowError::Http { endpoint: ENDPOINT, source })?;

        if !status.is_success() {
            return Err(WeatherNowError::Status {
                endpoint: ENDPOINT,
                status,
                body: truncate_body(&body),
            });
        }

        let parsed: ForecastResponse = serde_json::from_str(&body)
            .map_err(|source| WeatherNowError::Decode { endpoint: ENDPOINT, source })?;

        self.assemble(place.clone(), parsed)
    }

    fn assemble(
        &self,
        place: Place,
        response: ForecastResponse,
    ) -> Result<Forecast, WeatherNowError> {
        let now = parse_local_time(&response.current.time)?;

        let current = CurrentConditions {
            time: now,
            condition: WeatherCondition::from_wmo_code(response.current.weather_code),
            temperature_c: response.current.temperature_2m,
            feels_like_c: response.current.apparent_temperature,
            humidity_pct: response.current.relative_humidity_2m,
            wind_kmh: response.current.wind_speed_10m,
            precipitation_mm: response.current.precipitation,
        };

        // Days with a missing value are skipped; partial upstream data
        // shrinks the summary instead of failing the whole forecast.
        let d = &response.daily;
        let daily = d
            .time
            .iter()
            .enumerate()
            .filter_map(|(i, date)| {
                let high_c = d.temperature_2m_max.get(i).copied().flatten()?;
                let low_c = d.temperature_2m_min.get(i).copied().flatten()?;
                let code = d.weather_code.get(i).copied().flatten()?;
                Some(DailySummary {
                    date: *date,
                    condition: WeatherCondition::from_wmo_code(code),
                    high_c,
                    low_c,
                })
            })
            .collect();

        let h = &response.hourly;
        let samples = h
            .time
            .iter()
            .zip(&h.temperature_2m)
            .zip(&h.weather_code)
            .map(|((time, temperature_c), code)| {
                Ok(HourlySample {
                    time: parse_local_time(time)?,
                    condition: WeatherCondition::from_wmo_code(*code),
                    temperature_c: *temperature_c,
                })
            })
            .collect::<Result<Vec<_>, WeatherNowError>>()?;

        let week = bucketize(samples, now.weekday(), self.policy)?;

        Ok(Forecast { place, timezone: response.timezone, current, daily, week })
    }
}

fn parse_local_time(raw: &str) -> Result<NaiveDateTime, WeatherNowError> {
    NaiveDateTime::parse_from_str(raw, LOCAL_TIME_FORMAT).map_err(|err| {
        WeatherNowError::Malformed {
            endpoint: ENDPOINT,
            detail: format!("bad timestamp {raw:?}: {err}"),
        }
    })
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    timezone: String,
    current: CurrentData,
    daily: DailyData,
    hourly: HourlyData,
}

#[derive(Debug, Deserialize)]
struct CurrentData {
    time: String,
    temperature_2m: f64,
    relative_humidity_2m: u8,
    apparent_temperature: f64,
    wind_speed_10m: f64,
    precipitation: f64,
    weather_code: u8,
}

#[derive(Debug, Deserialize)]
struct DailyData {
    time: Vec<NaiveDate>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    weather_code: Vec<Option<u8>>,
}

#[derive(Debug, Deserialize)]
struct HourlyData {
    time: Vec<String>,
    temperature_2m: Vec<f64>,
    weather_code: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::HOURS_PER_WEEK;
    use chrono::{Duration, NaiveDate, Weekday};
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn place() -> Place {
        Place {
            id: 2950159,
            name: "Berlin".into(),
            region: None,
            country: "Germany".into(),
            latitude: 52.52,
            longitude: 13.41,
            timezone: Some("Europe/Berlin".into()),
        }
    }

    /// A full response whose hourly series starts at midnight on `start`.
    /// 2024-07-04 is a Thursday.
    fn response_json(start: NaiveDate, hours: usize) -> serde_json::Value {
        let midnight = start.and_hms_opt(0, 0, 0).unwrap();
        let times: Vec<String> = (0..hours)
            .map(|h| (midnight + Duration::hours(h as i64)).format(LOCAL_TIME_FORMAT).to_string())
            .collect();
        let temps: Vec<f64> = (0..hours).map(|h| h as f64 / 10.0).collect();
        let codes: Vec<u8> = vec![0; hours];

        let days: Vec<String> = (0..7)
            .map(|d| (start + Duration::days(d)).format("%Y-%m-%d").to_string())
            .collect();

        json!({
            "latitude": 52.52,
            "longitude": 13.41,
            "timezone": "Europe/Berlin",
            "current": {
                "time": (midnight + Duration::hours(13)).format(LOCAL_TIME_FORMAT).to_string(),
                "temperature_2m": 18.4,
                "relative_humidity_2m": 46,
                "apparent_temperature": 17.1,
                "wind_speed_10m": 12.3,
                "precipitation": 0.2,
                "weather_code": 2,
            },
            "daily": {
                "time": days,
                "temperature_2m_max": [24.1, 22.0, null, 21.3, 20.0, 19.5, 23.2],
                "temperature_2m_min": [14.0, 13.2, 12.8, 11.9, 12.0, 13.1, 14.4],
                "weather_code": [0, 2, 3, 61, 71, 95, 45],
            },
            "hourly": {
                "time": times,
                "temperature_2m": temps,
                "weather_code": codes,
            },
        })
    }

    const THURSDAY: NaiveDate = NaiveDate::from_ymd_opt(2024, 7, 4).unwrap();

    #[tokio::test]
    async fn fetch_assembles_a_full_forecast() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("timezone", "auto"))
            .and(query_param("hourly", HOURLY_FIELDS))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(response_json(THURSDAY, HOURS_PER_WEEK)),
            )
            .mount(&server)
            .await;

        let client = ForecastClient::with_base_url(server.uri(), LengthPolicy::Strict);
        let forecast = client.fetch(&place()).await.unwrap();

        assert_eq!(forecast.timezone, "Europe/Berlin");
        assert_eq!(forecast.current.temperature_c, 18.4);
        assert_eq!(forecast.current.condition, WeatherCondition::PartlyCloudy);
        assert_eq!(forecast.current.humidity_pct, 46);

        // The null max on day 3 drops that day from the summary.
        assert_eq!(forecast.daily.len(), 6);
        assert_eq!(forecast.daily[0].high_c, 24.1);

        // current.time is a Thursday, so the week anchors at slot 3 and the
        // first hour of that slot is the start of the series.
        assert_eq!(forecast.week.today(), Weekday::Thu);
        let first = forecast.week.day(3)[0].as_ref().unwrap();
        assert_eq!(first.time, THURSDAY.and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(forecast.week.default_day_selector(), 4);
    }

    #[tokio::test]
    async fn short_hourly_series_is_padded_under_the_default_policy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(response_json(THURSDAY, 72)))
            .mount(&server)
            .await;

        let client = ForecastClient::with_base_url(server.uri(), LengthPolicy::Pad);
        let forecast = client.fetch(&place()).await.unwrap();

        let filled: usize = forecast.week.days().flatten().filter(|h| h.is_some()).count();
        assert_eq!(filled, 72);
    }

    #[tokio::test]
    async fn short_hourly_series_is_rejected_when_strict() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(response_json(THURSDAY, 72)))
            .mount(&server)
            .await;

        let client = ForecastClient::with_base_url(server.uri(), LengthPolicy::Strict);
        let err = client.fetch(&place()).await.unwrap_err();
        assert!(matches!(err, WeatherNowError::HourCount { actual: 72, .. }));
    }

    #[tokio::test]
    async fn upstream_failure_is_an_error_not_a_forecast() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(503).set_body_string("try later"))
            .mount(&server)
            .await;

        let client = ForecastClient::with_base_url(server.uri(), LengthPolicy::Pad);
        let err = client.fetch(&place()).await.unwrap_err();

        match err {
            WeatherNowError::Status { status, body, .. } => {
                assert_eq!(status.as_u16(), 503);
                assert_eq!(body, "try later");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn local_timestamps_without_seconds_parse() {
        let parsed = parse_local_time("2024-07-04T13:00").unwrap();
        assert_eq!(parsed, THURSDAY.and_hms_opt(13, 0, 0).unwrap());

        assert!(parse_local_time("2024-07-04 13:00").is_err());
    }
}
