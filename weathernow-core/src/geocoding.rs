//! Client for the Open-Meteo geocoding search endpoint.

use std::fmt::Debug;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::{WeatherNowError, truncate_body};

pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com";

/// Upstream cap on the `count` query parameter.
pub const MAX_CANDIDATES: u8 = 10;

const ENDPOINT: &str = "geocoding search";

/// Raw place record as returned by the search endpoint. Records may lack
/// `country` or `admin1`; the resolver filters those out.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeoCandidate {
    pub id: u64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
    pub admin1: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    /// Absent entirely when nothing matched.
    results: Option<Vec<GeoCandidate>>,
}

/// Upstream place search. The resolver's disambiguation logic is written
/// against this trait so it can be tested without HTTP.
#[async_trait]
pub trait GeocodingBackend: Send + Sync + Debug {
    /// Search places by a (possibly comma-joined) name. An absent `results`
    /// field upstream means "no match" and yields an empty list.
    async fn search(&self, name: &str, count: u8) -> Result<Vec<GeoCandidate>, WeatherNowError>;
}

#[derive(Debug, Clone)]
pub struct OpenMeteoGeocoder {
    base_url: String,
    http: Client,
}

impl OpenMeteoGeocoder {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_GEOCODING_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string(), http: Client::new() }
    }
}

impl Default for OpenMeteoGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GeocodingBackend for OpenMeteoGeocoder {
    async fn search(&self, name: &str, count: u8) -> Result<Vec<GeoCandidate>, WeatherNowError> {
        let url = format!("{}/v1/search", self.base_url);
        let count = count.clamp(1, MAX_CANDIDATES).to_string();

        debug!(%name, %count, "searching places");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("name", name),
                ("count", count.as_str()),
                ("language", "en"),
                ("format", "json"),
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

        let parsed: SearchResponse = serde_json::from_str(&body)
            .map_err(|source| WeatherNowError::Decode { endpoint: ENDPOINT, source })?;

        Ok(parsed.results.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn candidate_json(id: u64, name: &str, admin1: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "latitude": 39.8,
            "longitude": -89.65,
            "country": "United States",
            "admin1": admin1,
            "timezone": "America/Chicago",
        })
    }

    #[tokio::test]
    async fn search_decodes_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "Springfield"))
            .and(query_param("count", "5"))
            .and(query_param("format", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    candidate_json(1, "Springfield", "Illinois"),
                    candidate_json(2, "Springfield", "Missouri"),
                ]
            })))
            .mount(&server)
            .await;

        let geocoder = OpenMeteoGeocoder::with_base_url(server.uri());
        let found = geocoder.search("Springfield", 5).await.unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "Springfield");
        assert_eq!(found[0].admin1.as_deref(), Some("Illinois"));
        assert_eq!(found[1].id, 2);
    }

    #[tokio::test]
    async fn absent_results_field_means_no_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "generationtime_ms": 0.5
            })))
            .mount(&server)
            .await;

        let geocoder = OpenMeteoGeocoder::with_base_url(server.uri());
        let found = geocoder.search("Atlantis", 5).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn upstream_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let geocoder = OpenMeteoGeocoder::with_base_url(server.uri());
        let err = geocoder.search("Springfield", 5).await.unwrap_err();

        match err {
            WeatherNowError::Status { status, body, .. } => {
                assert_eq!(status.as_u16(), 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn count_is_clamped_to_the_upstream_cap() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("count", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
            .mount(&server)
            .await;

        let geocoder = OpenMeteoGeocoder::with_base_url(server.uri());
        let found = geocoder.search("Springfield", 200).await.unwrap();
        assert!(found.is_empty());
    }
}
