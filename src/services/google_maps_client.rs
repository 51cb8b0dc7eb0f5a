// src/services/google_maps_client.rs
// DOCUMENTATION: Google Maps API client
// PURPOSE: Geocoding, nearby search, pagination and place details

use crate::errors::ScraperError;
use crate::services::extraction::CategoryTags;
use async_trait::async_trait;
use geo_types::Point;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Fields requested from Place Details for every restaurant
pub const DETAIL_FIELDS: &[&str] = &[
    "name",
    "formatted_address",
    "formatted_phone_number",
    "rating",
    "user_ratings_total",
    "type",
    "opening_hours",
    "website",
    "geometry",
];

/// Upstream places provider
/// DOCUMENTATION: Seam between the ingestion pipeline and Google.
/// Points are (x = longitude, y = latitude).
#[async_trait]
pub trait PlacesApi: Send + Sync {
    /// Resolve free text to a coordinate; Ok(None) when nothing matched
    async fn geocode(&self, query: &str) -> Result<Option<Point<f64>>, ScraperError>;

    /// First page of a nearby search
    async fn nearby_search(
        &self,
        center: Point<f64>,
        radius: u32,
        place_type: &str,
    ) -> Result<SearchPage, ScraperError>;

    /// Follow-up page addressed only by its continuation token
    async fn next_page(&self, page_token: &str) -> Result<SearchPage, ScraperError>;

    /// Detailed information for one place, limited to `fields`
    async fn place_details(
        &self,
        place_id: &str,
        fields: &[&str],
    ) -> Result<PlaceDetails, ScraperError>;
}

/// One page of nearby-search results
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchPage {
    #[serde(default)]
    pub results: Vec<NearbyPlace>,
    /// Present when more results are available
    pub next_page_token: Option<String>,
}

/// Nearby-search hit; only the id is needed to fetch details
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NearbyPlace {
    pub place_id: String,
    pub name: Option<String>,
}

/// Place Details payload
/// DOCUMENTATION: Every field is optional; absent fields become nulls or
/// placeholders during normalization
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlaceDetails {
    pub name: Option<String>,
    pub formatted_address: Option<String>,
    pub formatted_phone_number: Option<String>,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u32>,
    /// Category tags; older payloads use the singular key
    #[serde(default, alias = "type")]
    pub types: CategoryTags,
    pub opening_hours: Option<OpeningHours>,
    pub website: Option<String>,
    pub geometry: Option<Geometry>,
}

/// Opening hours metadata
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OpeningHours {
    pub open_now: Option<bool>,
    /// Human-readable line per day, in Google's order
    pub weekday_text: Option<Vec<String>>,
}

/// Geographic location from Google
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Geometry {
    pub location: Option<LatLng>,
}

/// Coordinates from Google
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<LatLng> for Point<f64> {
    fn from(location: LatLng) -> Self {
        Point::new(location.lng, location.lat)
    }
}

/// Common envelope fields of every Google web-service response
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: String,
    error_message: Option<String>,
    #[serde(flatten)]
    body: T,
}

#[derive(Debug, Deserialize)]
struct GeocodeBody {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct DetailsBody {
    result: Option<PlaceDetails>,
}

/// Map a Google status to success or a typed error
/// DOCUMENTATION: OK and ZERO_RESULTS succeed; quota exhaustion is
/// RateLimitExceeded; anything else carries the provider message
fn check_status(status: &str, error_message: Option<String>) -> Result<(), ScraperError> {
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        "OVER_QUERY_LIMIT" => {
            log::error!("Google Maps API quota exceeded");
            Err(ScraperError::RateLimitExceeded)
        }
        other => {
            let msg = error_message.unwrap_or_else(|| format!("Unknown status: {}", other));
            log::error!("Google Maps API returned {}: {}", other, msg);
            Err(ScraperError::ExternalApiError(format!("{}: {}", other, msg)))
        }
    }
}

/// Google Maps API client
/// DOCUMENTATION: Handles authentication and HTTP calls to the Maps web services
pub struct GoogleMapsClient {
    /// HTTP client for making requests
    client: Client,
    /// Google Maps API key
    api_key: String,
    /// Root URL, e.g. https://maps.googleapis.com/maps/api
    base_url: String,
}

impl GoogleMapsClient {
    /// Create new Google Maps API client
    pub fn new(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// GET a JSON endpoint with the API key appended
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Envelope<T>, ScraperError> {
        let url = self.endpoint(path);

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                log::error!("Google Maps request to {} failed: {}", path, e);
                ScraperError::ExternalApiError(format!("Request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            log::error!("Google Maps API error {}: {}", status, body);
            return Err(ScraperError::ExternalApiError(format!(
                "API error {}: {}",
                status, body
            )));
        }

        response.json::<Envelope<T>>().await.map_err(|e| {
            log::error!("Failed to parse Google Maps response from {}: {}", path, e);
            ScraperError::ExternalApiError(format!("Parse error: {}", e))
        })
    }
}

#[async_trait]
impl PlacesApi for GoogleMapsClient {
    async fn geocode(&self, query: &str) -> Result<Option<Point<f64>>, ScraperError> {
        log::debug!("Geocoding: {}", query);

        let envelope: Envelope<GeocodeBody> =
            self.get_json("geocode/json", &[("address", query)]).await?;
        check_status(&envelope.status, envelope.error_message)?;

        Ok(envelope
            .body
            .results
            .into_iter()
            .next()
            .and_then(|result| result.geometry.location)
            .map(Point::from))
    }

    async fn nearby_search(
        &self,
        center: Point<f64>,
        radius: u32,
        place_type: &str,
    ) -> Result<SearchPage, ScraperError> {
        let location = format!("{},{}", center.y(), center.x());
        let radius = radius.to_string();

        log::debug!(
            "Nearby search: location={}, radius={}, type={}",
            location,
            radius,
            place_type
        );

        let envelope: Envelope<SearchPage> = self
            .get_json(
                "place/nearbysearch/json",
                &[
                    ("location", location.as_str()),
                    ("radius", radius.as_str()),
                    ("type", place_type),
                ],
            )
            .await?;
        check_status(&envelope.status, envelope.error_message)?;

        log::info!("Nearby search returned {} results", envelope.body.results.len());
        Ok(envelope.body)
    }

    async fn next_page(&self, page_token: &str) -> Result<SearchPage, ScraperError> {
        log::debug!("Fetching next search page");

        let envelope: Envelope<SearchPage> = self
            .get_json("place/nearbysearch/json", &[("pagetoken", page_token)])
            .await?;
        check_status(&envelope.status, envelope.error_message)?;

        log::info!("Next page returned {} results", envelope.body.results.len());
        Ok(envelope.body)
    }

    async fn place_details(
        &self,
        place_id: &str,
        fields: &[&str],
    ) -> Result<PlaceDetails, ScraperError> {
        let fields = fields.join(",");

        log::debug!("Place details lookup: place_id={}", place_id);

        let envelope: Envelope<DetailsBody> = self
            .get_json(
                "place/details/json",
                &[("place_id", place_id), ("fields", fields.as_str())],
            )
            .await?;
        check_status(&envelope.status, envelope.error_message)?;

        envelope.body.result.ok_or_else(|| {
            ScraperError::ExternalApiError(format!("Details for {} had no result", place_id))
        })
    }
}
