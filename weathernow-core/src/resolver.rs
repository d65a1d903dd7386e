//! Location disambiguation over the geocoding search.
//!
//! The search endpoint takes a comma-joined string opportunistically: it
//! sometimes parses "name, region" itself and sometimes matches nothing. The
//! resolver recovers the latter case by re-querying on the bare name and
//! filtering by region locally, so "Springfield, Illinois" works regardless
//! of what the upstream parser makes of it.

use tracing::debug;

use crate::error::WeatherNowError;
use crate::geocoding::{GeoCandidate, GeocodingBackend};
use crate::model::Place;

/// A free-text search string split on commas into up to three parts:
/// `name`, `name, region` or `name, region, country`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub name: String,
    pub region: Option<String>,
    pub country: Option<String>,
}

impl SearchQuery {
    /// Split on commas and trim. Returns `None` when the name part is empty.
    /// Parts beyond `[name, region, country]` are ignored.
    pub fn parse(input: &str) -> Option<Self> {
        let mut parts = input.split(',').map(str::trim);
        let name = parts.next().filter(|p| !p.is_empty())?.to_string();
        let region = parts.next().filter(|p| !p.is_empty()).map(str::to_string);
        let country = parts.next().filter(|p| !p.is_empty()).map(str::to_string);
        Some(Self { name, region, country })
    }
}

/// Resolves free-text input to candidate places.
#[derive(Debug)]
pub struct LocationResolver {
    backend: Box<dyn GeocodingBackend>,
    count: u8,
}

impl LocationResolver {
    pub fn new(backend: Box<dyn GeocodingBackend>, count: u8) -> Self {
        Self { backend, count }
    }

    /// The single best match, or `None` when nothing usable matched.
    pub async fn resolve(&self, input: &str) -> Result<Option<Place>, WeatherNowError> {
        Ok(self.candidates(input).await?.into_iter().next())
    }

    /// All usable matches, in upstream relevance order.
    pub async fn suggest(&self, input: &str) -> Result<Vec<Place>, WeatherNowError> {
        self.candidates(input).await
    }

    async fn candidates(&self, input: &str) -> Result<Vec<Place>, WeatherNowError> {
        let Some(query) = SearchQuery::parse(input) else {
            return Ok(Vec::new());
        };

        match (&query.region, &query.country) {
            (None, None) => {
                let found = self.backend.search(&query.name, self.count).await?;
                Ok(normalize(found))
            }

            (Some(region), None) => {
                let combined = format!("{}, {region}", query.name);
                let found = self.backend.search(&combined, self.count).await?;
                if !found.is_empty() {
                    return Ok(normalize(found));
                }

                // The upstream treated the qualifier as unmatched; re-query by
                // name alone and filter by region locally.
                debug!(query = %combined, "combined search empty, filtering by region locally");
                let found = self.backend.search(&query.name, self.count).await?;
                Ok(filter_by_region(normalize(found), region))
            }

            (region, Some(country)) => {
                // The country disambiguates better than a middle token the
                // upstream may not parse; the region is applied locally.
                let combined = format!("{}, {country}", query.name);
                let found = self.backend.search(&combined, self.count).await?;
                let places = normalize(found);
                Ok(match region {
                    Some(region) => filter_by_region(places, region),
                    None => places,
                })
            }
        }
    }
}

fn normalize(candidates: Vec<GeoCandidate>) -> Vec<Place> {
    candidates.into_iter().filter_map(normalize_candidate).collect()
}

/// Records missing a country or admin area cannot be disambiguated or
/// displayed; drop them. A region that merely repeats the place name is
/// collapsed away.
fn normalize_candidate(candidate: GeoCandidate) -> Option<Place> {
    let country = candidate.country?;
    let region = candidate.admin1?;
    let region = if is_redundant(&region, &candidate.name) { None } else { Some(region) };

    Some(Place {
        id: candidate.id,
        name: candidate.name,
        region,
        country,
        latitude: candidate.latitude,
        longitude: candidate.longitude,
        timezone: candidate.timezone,
    })
}

fn is_redundant(region: &str, name: &str) -> bool {
    let region = region.to_lowercase();
    let name = name.to_lowercase();
    region.contains(&name) || name.contains(&region)
}

fn filter_by_region(places: Vec<Place>, region: &str) -> Vec<Place> {
    let wanted = region.to_lowercase();
    places
        .into_iter()
        .filter(|place| place.region.as_deref().is_some_and(|r| r.to_lowercase() == wanted))
        .collect()
}
