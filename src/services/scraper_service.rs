// src/services/scraper_service.rs
// DOCUMENTATION: Restaurant ingestion per postal code
// PURPOSE: Orchestrate geocode -> nearby search -> pagination -> details

use crate::config::Config;
use crate::errors::ScraperError;
use crate::models::{NewRestaurant, Restaurant, MISSING_TEXT};
use crate::services::extraction::{extract_business_hours, extract_cuisine_type};
use crate::services::{NearbyPlace, PlaceDetails, PlacesApi, RateLimiter, DETAIL_FIELDS};
use geo_types::Point;
use std::time::Instant;

/// Place category searched for
pub const RESTAURANT_TYPE: &str = "restaurant";

/// Outcome of ingesting one postal code
/// DOCUMENTATION: Records in discovery order plus what went wrong along the way.
/// Always returned, even when the search aborted early.
#[derive(Debug, Clone)]
pub struct ScrapeBatch {
    /// Postal code that was searched
    pub postal_code: String,
    /// Normalized records, in discovery order
    pub restaurants: Vec<Restaurant>,
    /// Total number of Google API requests made
    pub api_requests: u32,
    /// Search pages fetched (first page plus continuations)
    pub pages_fetched: u32,
    /// Places dropped because their details could not be fetched
    pub places_skipped: u32,
    /// One human-readable line per recovered failure
    pub errors: Vec<String>,
    /// Wall time spent on this postal code, in milliseconds
    pub duration_ms: u128,
}

impl ScrapeBatch {
    pub fn new(postal_code: &str) -> Self {
        Self {
            postal_code: postal_code.to_string(),
            restaurants: Vec::new(),
            api_requests: 0,
            pages_fetched: 0,
            places_skipped: 0,
            errors: Vec::new(),
            duration_ms: 0,
        }
    }

    fn record_error(&mut self, message: String) {
        self.errors.push(message);
    }
}

/// Build a normalized record from a Place Details payload
/// DOCUMENTATION: Only name and address get the "N/A" placeholder; every
/// other missing field stays null
pub fn normalize_place(details: PlaceDetails, postal_code: &str) -> Restaurant {
    let location = details.geometry.and_then(|geometry| geometry.location);
    let weekday_text = details
        .opening_hours
        .and_then(|hours| hours.weekday_text);

    NewRestaurant {
        name: details.name.unwrap_or_else(|| MISSING_TEXT.to_string()),
        address: details
            .formatted_address
            .unwrap_or_else(|| MISSING_TEXT.to_string()),
        postal_code: postal_code.to_string(),
        phone: details.formatted_phone_number,
        rating: details.rating,
        review_count: details.user_ratings_total,
        cuisine_type: Some(extract_cuisine_type(&details.types.into_vec())),
        business_hours: extract_business_hours(weekday_text.as_deref()),
        website: details.website,
        latitude: location.map(|l| l.lat),
        longitude: location.map(|l| l.lng),
        created_at: None,
    }
    .into()
}

/// Ingestion service for Google Maps restaurants
/// DOCUMENTATION: Strictly sequential; every call to the API is awaited
/// before the next one is issued
pub struct ScraperService<A: PlacesApi> {
    api: A,
    limiter: RateLimiter,
    search_radius: u32,
    max_results_per_postal_code: usize,
}

impl<A: PlacesApi> ScraperService<A> {
    pub fn new(api: A, config: &Config) -> Self {
        Self {
            api,
            limiter: RateLimiter::from_config(config),
            search_radius: config.search_radius,
            max_results_per_postal_code: config.max_results_per_postal_code,
        }
    }

    /// Replace the delay policy
    #[allow(dead_code)]
    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    /// Resolve a postal code to search coordinates
    /// DOCUMENTATION: Empty results and errors both fall back to (0, 0);
    /// the search still runs against that point
    async fn resolve_location(&self, postal_code: &str, batch: &mut ScrapeBatch) -> Point<f64> {
        batch.api_requests += 1;

        match self.api.geocode(postal_code).await {
            Ok(Some(point)) => point,
            Ok(None) => {
                log::warn!("No geocoding result for {}; using (0, 0)", postal_code);
                Point::new(0.0, 0.0)
            }
            Err(e) => {
                let message = format!("Geocoding failed for {}: {}", postal_code, e);
                log::error!("{}", message);
                batch.record_error(message);
                Point::new(0.0, 0.0)
            }
        }
    }

    /// Fetch details for one search hit and normalize them
    async fn fetch_restaurant(
        &self,
        place: &NearbyPlace,
        postal_code: &str,
    ) -> Result<Restaurant, ScraperError> {
        self.limiter.wait().await;
        let details = self.api.place_details(&place.place_id, DETAIL_FIELDS).await?;
        Ok(normalize_place(details, postal_code))
    }

    /// Turn one page of search hits into records; failed details are skipped
    async fn collect_page(&self, places: &[NearbyPlace], batch: &mut ScrapeBatch) {
        for place in places {
            batch.api_requests += 1;

            match self.fetch_restaurant(place, &batch.postal_code).await {
                Ok(restaurant) => {
                    log::debug!("Normalized place: {}", restaurant.name);
                    batch.restaurants.push(restaurant);
                }
                Err(e) => {
                    batch.places_skipped += 1;
                    let message = format!(
                        "Could not fetch details for {} ({}): {}",
                        place.name.as_deref().unwrap_or(MISSING_TEXT),
                        place.place_id,
                        e
                    );
                    log::warn!("{}", message);
                    batch.record_error(message);
                }
            }
        }
    }

    /// Collect every restaurant discoverable for a postal code
    /// DOCUMENTATION: Main ingestion method
    ///
    /// Process:
    /// 1. Geocode the postal code (fallback (0, 0))
    /// 2. Nearby search for restaurants around that point
    /// 3. Place Details for every hit
    /// 4. Follow continuation tokens until none is returned
    ///
    /// A failed search stops this postal code and keeps what was collected.
    pub async fn search_postal_code(&self, postal_code: &str) -> ScrapeBatch {
        let start_time = Instant::now();
        let mut batch = ScrapeBatch::new(postal_code);

        log::info!("Searching restaurants in {}", postal_code);

        let center = self.resolve_location(postal_code, &mut batch).await;

        self.limiter.wait().await;
        batch.api_requests += 1;
        let mut page = match self
            .api
            .nearby_search(center, self.search_radius, RESTAURANT_TYPE)
            .await
        {
            Ok(page) => page,
            Err(e) => {
                let message = format!("Search failed for {}: {}", postal_code, e);
                log::error!("{}", message);
                batch.record_error(message);
                batch.duration_ms = start_time.elapsed().as_millis();
                return batch;
            }
        };

        loop {
            batch.pages_fetched += 1;
            self.collect_page(&page.results, &mut batch).await;

            let Some(token) = page.next_page_token.take() else {
                break;
            };

            self.limiter.wait_for_page_token().await;
            batch.api_requests += 1;
            page = match self.api.next_page(&token).await {
                Ok(next) => next,
                Err(e) => {
                    let message = format!(
                        "Pagination failed for {} after {} page(s): {}",
                        postal_code, batch.pages_fetched, e
                    );
                    log::error!("{}", message);
                    batch.record_error(message);
                    break;
                }
            };
        }

        if batch.restaurants.len() > self.max_results_per_postal_code {
            log::warn!(
                "{} returned {} restaurants (configured cap {})",
                postal_code,
                batch.restaurants.len(),
                self.max_results_per_postal_code
            );
        }

        batch.duration_ms = start_time.elapsed().as_millis();

        log::info!(
            "Finished {}: {} restaurants, {} skipped, {} requests in {}ms",
            postal_code,
            batch.restaurants.len(),
            batch.places_skipped,
            batch.api_requests,
            batch.duration_ms
        );

        batch
    }
}
