//! Unit preferences and conversion.
//!
//! All upstream values are metric (°C, km/h, mm); conversion happens at
//! display time. The rounding here matches what users of the app see:
//! whole degrees, whole mph, whole inches.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn format(self, celsius: f64) -> String {
        match self {
            Self::Celsius => format!("{}°C", celsius.round() as i64),
            Self::Fahrenheit => format!("{}°F", (1.8 * celsius + 32.0).round() as i64),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WindUnit {
    #[default]
    #[serde(rename = "km/h")]
    KilometersPerHour,
    #[serde(rename = "mph")]
    MilesPerHour,
}

impl WindUnit {
    pub fn format(self, kmh: f64) -> String {
        match self {
            Self::KilometersPerHour => format!("{}km/h", kmh.round() as i64),
            Self::MilesPerHour => format!("{}mph", (kmh * 0.621371).round() as i64),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PrecipitationUnit {
    #[default]
    #[serde(rename = "mm")]
    Millimeters,
    #[serde(rename = "in")]
    Inches,
}

impl PrecipitationUnit {
    pub fn format(self, mm: f64) -> String {
        match self {
            Self::Millimeters => format!("{mm}mm"),
            Self::Inches => format!("{}in", (mm / 25.4).round() as i64),
        }
    }
}

/// Per-dimension unit preferences. Defaults to metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Units {
    #[serde(default)]
    pub temperature: TemperatureUnit,
    #[serde(default)]
    pub wind: WindUnit,
    #[serde(default)]
    pub precipitation: PrecipitationUnit,
}

impl Units {
    pub fn metric() -> Self {
        Self::default()
    }

    pub fn imperial() -> Self {
        Self {
            temperature: TemperatureUnit::Fahrenheit,
            wind: WindUnit::MilesPerHour,
            precipitation: PrecipitationUnit::Inches,
        }
    }

    /// The "switch all" operation: a fully-metric selection becomes imperial,
    /// anything else becomes metric.
    pub fn switched(self) -> Self {
        if self == Self::metric() { Self::imperial() } else { Self::metric() }
    }
}
