//! Address lookup for bootcamp locations and radius search.

use std::time::Duration;

use devcamper_config::GeocoderConfig;
use devcamper_core::BoxFuture;
use devcamper_models::Location;
use serde::Deserialize;
use tracing::instrument;

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("geocoder responded with status {0}")]
    Status(u16),
    #[error("no location found for '{0}'")]
    NotFound(String),
    #[error("unsupported geocoder provider '{0}'")]
    UnsupportedProvider(String),
}

pub trait Geocoder: Send + Sync {
    /// Resolves a free-form address or zipcode to coordinates and address parts.
    fn geocode<'a>(&'a self, address: &'a str) -> BoxFuture<'a, Result<Location, GeocodeError>>;
}

/// Geocoder backed by the MapQuest geocoding API.
pub struct MapQuestGeocoder {
    client: reqwest::Client,
    config: GeocoderConfig,
}

impl MapQuestGeocoder {
    pub fn new(config: GeocoderConfig) -> Result<Self, GeocodeError> {
        if !config.provider.eq_ignore_ascii_case("mapquest") {
            return Err(GeocodeError::UnsupportedProvider(config.provider));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { client, config })
    }

    #[instrument(skip(self))]
    async fn lookup(&self, address: &str) -> Result<Location, GeocodeError> {
        let url = format!(
            "{}/geocoding/v1/address",
            self.config.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .get(&url)
            .query(&[("key", self.config.api_key.as_str()), ("location", address)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeocodeError::Status(response.status().as_u16()));
        }

        let body: MapQuestResponse = response.json().await?;
        body.into_location()
            .ok_or_else(|| GeocodeError::NotFound(address.to_string()))
    }
}

impl Geocoder for MapQuestGeocoder {
    fn geocode<'a>(&'a self, address: &'a str) -> BoxFuture<'a, Result<Location, GeocodeError>> {
        Box::pin(self.lookup(address))
    }
}

#[derive(Debug, Deserialize)]
struct MapQuestResponse {
    #[serde(default)]
    results: Vec<MapQuestResult>,
}

#[derive(Debug, Deserialize)]
struct MapQuestResult {
    #[serde(default)]
    locations: Vec<MapQuestLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapQuestLocation {
    #[serde(default)]
    street: String,
    /// City.
    #[serde(default)]
    admin_area5: String,
    /// State.
    #[serde(default)]
    admin_area3: String,
    /// Country code.
    #[serde(default)]
    admin_area1: String,
    #[serde(default)]
    postal_code: String,
    lat_lng: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

impl MapQuestResponse {
    fn into_location(self) -> Option<Location> {
        let loc = self.results.into_iter().next()?.locations.into_iter().next()?;

        let state_zip = [loc.admin_area3.as_str(), loc.postal_code.as_str()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        let formatted = [
            loc.street.as_str(),
            loc.admin_area5.as_str(),
            state_zip.as_str(),
            loc.admin_area1.as_str(),
        ]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ");

        Some(Location {
            longitude: Some(loc.lat_lng.lng),
            latitude: Some(loc.lat_lng.lat),
            formatted_address: non_empty(formatted),
            street: non_empty(loc.street),
            city: non_empty(loc.admin_area5),
            state: non_empty(loc.admin_area3),
            zipcode: non_empty(loc.postal_code),
            country: non_empty(loc.admin_area1),
        })
    }
}
