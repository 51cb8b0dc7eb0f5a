// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Load config, collect restaurants per postal code, persist and export

mod config;
mod console;
mod db;
mod errors;
mod models;
mod services;

use anyhow::Context;
use config::Config;
use console::{require_postal_codes, ConsoleView};
use db::{DocumentStore, RestaurantRepository};
use dotenv::dotenv;
use services::{DataService, GoogleMapsClient, OutputPaths, ScraperService, Sink};
use std::process;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Initialize logging (RUST_LOG wins over LOG_LEVEL)
    let log_env = env_logger::Env::default().default_filter_or(Config::log_filter());
    env_logger::Builder::from_env(log_env).init();

    // 3. Load configuration
    let config = Config::from_env();

    let view = ConsoleView;

    if let Err(e) = config.validate() {
        log::error!("[{}] {}", e.code(), e);
        view.show_error(&e.to_string());
        view.show_error("Set GOOGLE_MAPS_API_KEY (and friends) in the .env file");
        process::exit(1);
    }

    view.show_welcome_message();

    // 4. Postal codes from the user
    let postal_codes = view.read_postal_codes(&mut std::io::stdin().lock())?;
    if let Err(e) = require_postal_codes(&postal_codes) {
        log::error!("[{}] {}", e.code(), e);
        view.show_error(&e.to_string());
        process::exit(1);
    }

    log::info!("Processing postal codes: {:?}", postal_codes);

    // 5. Ingestion, one postal code at a time
    let client = GoogleMapsClient::new(
        config.google_maps_api_key.clone(),
        config.google_maps_base_url.clone(),
    );
    let scraper = ScraperService::new(client, &config);

    let mut all_restaurants = Vec::new();
    for postal_code in &postal_codes {
        view.show_progress(&format!("Searching restaurants in {}...", postal_code));
        let batch = scraper.search_postal_code(postal_code).await;
        view.show_batch(&batch);
        all_restaurants.extend(batch.restaurants);
    }

    if all_restaurants.is_empty() {
        view.show_error("No restaurants found");
        return Ok(());
    }

    // 6. Persistence and exports
    view.show_progress("Processing and saving data...");

    let pool = config::init_db_pool(&config).context("Invalid DATABASE_URL")?;
    let repository = RestaurantRepository::new(pool);
    let data_service = DataService::new(&repository, OutputPaths::new(&config.output_dir));

    let report = data_service
        .process_and_save(&all_restaurants, &postal_codes)
        .await;
    view.show_sink_report(&report);

    let store_failed = report
        .failures
        .iter()
        .any(|failure| failure.sink == Sink::DocumentStore);
    if !store_failed {
        match data_service.stored_summary(&postal_codes).await {
            Ok(summary) => {
                for (postal_code, stored) in &summary.per_postal_code {
                    match stored.average_rating {
                        Some(rating) => log::info!(
                            "Document store holds {} restaurants for {} (average rating {:.2})",
                            stored.count,
                            postal_code,
                            rating
                        ),
                        None => log::info!(
                            "Document store holds {} restaurants for {}",
                            stored.count,
                            postal_code
                        ),
                    }
                }
                log::info!("Document store holds {} restaurants in total", summary.total);
                if let Some((oldest, newest)) = summary.stored_between {
                    log::info!("Stored documents span {} to {}", oldest, newest);
                }
            }
            Err(e) => log::warn!("Could not read back stored restaurants: {}", e),
        }
    }
    repository.close().await;

    if report.is_complete() {
        view.show_success("Data processed and saved successfully");
    }

    view.show_statistics(&report.statistics);

    Ok(())
}
