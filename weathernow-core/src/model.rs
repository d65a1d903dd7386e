use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::bucket::WeekGrid;

/// A resolved geographic place.
///
/// `region` is `None` when the upstream admin area merely repeats the place
/// name, so "Paris, Paris, France" collapses to "Paris, France". `id` is the
/// stable upstream record id and doubles as the duplicate-fetch key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: u64,
    pub name: String,
    pub region: Option<String>,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: Option<String>,
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.region {
            Some(region) => write!(f, "{}, {}, {}", self.name, region, self.country),
            None => write!(f, "{}, {}", self.name, self.country),
        }
    }
}

/// Weather condition buckets mapped from WMO weather codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Clear,
    PartlyCloudy,
    Overcast,
    Fog,
    Drizzle,
    Rain,
    Snow,
    Thunderstorm,
    Unknown,
}

impl WeatherCondition {
    /// Map a WMO weather code to its condition bucket.
    /// See: https://open-meteo.com/en/docs#weathervariables
    pub fn from_wmo_code(code: u8) -> Self {
        match code {
            0 | 1 => Self::Clear,
            2 => Self::PartlyCloudy,
            3 => Self::Overcast,
            45 | 48 => Self::Fog,
            51 | 53 | 55 | 56 | 57 => Self::Drizzle,
            61 | 63 | 65 | 66 | 67 | 80 | 81 | 82 => Self::Rain,
            71 | 73 | 75 | 77 | 85 | 86 => Self::Snow,
            95 | 96 | 99 => Self::Thunderstorm,
            _ => Self::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Clear => "clear sky",
            Self::PartlyCloudy => "partly cloudy",
            Self::Overcast => "overcast",
            Self::Fog => "fog",
            Self::Drizzle => "drizzle",
            Self::Rain => "rain",
            Self::Snow => "snow",
            Self::Thunderstorm => "thunderstorms",
            Self::Unknown => "unknown",
        }
    }
}

/// One hour of forecast, timestamped in the location's local time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlySample {
    pub time: NaiveDateTime,
    pub condition: WeatherCondition,
    pub temperature_c: f64,
}

/// The instantaneous conditions block of a forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Location-local timestamp of the observation.
    pub time: NaiveDateTime,
    pub condition: WeatherCondition,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_kmh: f64,
    pub precipitation_mm: f64,
}

/// One day of the daily min/max summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub condition: WeatherCondition,
    pub high_c: f64,
    pub low_c: f64,
}

/// A complete forecast for a resolved place.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub place: Place,
    /// IANA timezone resolved by the upstream (`timezone=auto`).
    pub timezone: String,
    pub current: CurrentConditions,
    pub daily: Vec<DailySummary>,
    /// Hourly week, Monday-first, anchored on the location-local "today".
    pub week: WeekGrid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wmo_code_clear() {
        assert_eq!(WeatherCondition::from_wmo_code(0), WeatherCondition::Clear);
        assert_eq!(WeatherCondition::from_wmo_code(1), WeatherCondition::Clear);
    }

    #[test]
    fn wmo_code_cloud_cover() {
        assert_eq!(WeatherCondition::from_wmo_code(2), WeatherCondition::PartlyCloudy);
        assert_eq!(WeatherCondition::from_wmo_code(3), WeatherCondition::Overcast);
    }

    #[test]
    fn wmo_code_fog() {
        assert_eq!(WeatherCondition::from_wmo_code(45), WeatherCondition::Fog);
        assert_eq!(WeatherCondition::from_wmo_code(48), WeatherCondition::Fog);
    }

    #[test]
    fn wmo_code_drizzle_includes_freezing() {
        for code in [51, 53, 55, 56, 57] {
            assert_eq!(WeatherCondition::from_wmo_code(code), WeatherCondition::Drizzle);
        }
    }

    #[test]
    fn wmo_code_rain_includes_showers() {
        for code in [61, 63, 65, 66, 67, 80, 81, 82] {
            assert_eq!(WeatherCondition::from_wmo_code(code), WeatherCondition::Rain);
        }
    }

    #[test]
    fn wmo_code_snow() {
        for code in [71, 73, 75, 77, 85, 86] {
            assert_eq!(WeatherCondition::from_wmo_code(code), WeatherCondition::Snow);
        }
    }

    #[test]
    fn wmo_code_thunderstorm() {
        for code in [95, 96, 99] {
            assert_eq!(WeatherCondition::from_wmo_code(code), WeatherCondition::Thunderstorm);
        }
    }

    #[test]
    fn wmo_code_unmapped_is_unknown() {
        assert_eq!(WeatherCondition::from_wmo_code(42), WeatherCondition::Unknown);
        assert_eq!(WeatherCondition::from_wmo_code(255), WeatherCondition::Unknown);
    }

    #[test]
    fn place_display_includes_region_when_present() {
        let mut place = Place {
            id: 1,
            name: "Springfield".into(),
            region: Some("Illinois".into()),
            country: "United States".into(),
            latitude: 39.8,
            longitude: -89.65,
            timezone: Some("America/Chicago".into()),
        };
        assert_eq!(place.to_string(), "Springfield, Illinois, United States");

        place.region = None;
        assert_eq!(place.to_string(), "Springfield, United States");
    }
}
