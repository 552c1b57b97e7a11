//! Google geocoding API client.

use reqwest::Url;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::ServiceConfig;
use crate::domain::Coordinates;
use crate::error::GeocodingError;
use crate::remote::Geocoder;

const BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

pub struct GoogleGeocoder {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GoogleGeocoder {
    pub fn new(client: Client, config: &ServiceConfig) -> Self {
        Self {
            client,
            api_key: config.geocode_api_key.clone(),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Request URL for an ordered list of address components.
    ///
    /// Components are space-joined, which form encoding renders as `+` separators.
    fn request_url(&self, components: &[&str]) -> Result<Url, GeocodingError> {
        let address = components.join(" ");
        Url::parse_with_params(&self.base_url, &[("address", address.as_str()), ("key", self.api_key.as_str())])
            .map_err(|e| GeocodingError::Transport(format!("invalid geocoder URL: {e}")))
    }
}

impl Geocoder for GoogleGeocoder {
    #[instrument(skip(self))]
    fn geocode(&self, components: &[&str]) -> Result<Coordinates, GeocodingError> {
        let url = self.request_url(components)?;
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| GeocodingError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(GeocodingError::Status {
                status: status.as_u16().to_string(),
                message: super::body_text(resp),
            });
        }

        let body: GeocodeResponse = resp
            .json()
            .map_err(|e| GeocodingError::Transport(format!("failed to parse geocoder response: {e}")))?;

        let coords = first_location(body, &components.join("+"))?;
        debug!(lat = coords.latitude, lng = coords.longitude, "geocoded");
        Ok(coords)
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Coordinates,
}

fn first_location(body: GeocodeResponse, query: &str) -> Result<Coordinates, GeocodingError> {
    let GeocodeResponse {
        status,
        results,
        error_message,
    } = body;

    match status.as_str() {
        "OK" => results
            .into_iter()
            .next()
            .map(|r| r.geometry.location)
            .ok_or_else(|| GeocodingError::NoResults(query.to_string())),
        "ZERO_RESULTS" => Err(GeocodingError::NoResults(query.to_string())),
        _ => Err(GeocodingError::Status {
            status: status.clone(),
            message: error_message.unwrap_or_default(),
        }),
    }
}
