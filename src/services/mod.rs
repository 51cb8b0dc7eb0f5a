// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod data_service;
pub mod export_service;
pub mod extraction;
pub mod google_maps_client;
pub mod rate_limiter;
pub mod scraper_service;

pub use data_service::*;
pub use export_service::*;
pub use google_maps_client::*;
pub use rate_limiter::*;
pub use scraper_service::*;
