// src/services/data_service.rs
// DOCUMENTATION: Persistence and export of a run's records
// PURPOSE: Fan the accumulated records out to every sink, isolating failures

use crate::db::DocumentStore;
use crate::errors::ScraperError;
use crate::db::StoredRestaurant;
use crate::models::{RatingStatistics, Restaurant, StatisticsReport};
use crate::services::export_service::{
    export_to_csv, export_to_json, write_statistics_report, OutputPaths,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// Destination of the final record set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sink {
    DocumentStore,
    Csv,
    Json,
    Statistics,
}

impl fmt::Display for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Sink::DocumentStore => "document store",
            Sink::Csv => "CSV export",
            Sink::Json => "JSON export",
            Sink::Statistics => "statistics report",
        };
        f.write_str(name)
    }
}

/// One failed sink
#[derive(Debug)]
pub struct SinkFailure {
    pub sink: Sink,
    pub error: ScraperError,
}

impl fmt::Display for SinkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error saving to {}: {}", self.sink, self.error)
    }
}

/// What every sink produced
#[derive(Debug)]
pub struct SinkReport {
    /// Identifiers generated by the document store
    pub stored_ids: Vec<Uuid>,
    pub csv_files: Vec<PathBuf>,
    pub json_file: Option<PathBuf>,
    pub statistics_file: Option<PathBuf>,
    /// Computed even if writing it failed
    pub statistics: StatisticsReport,
    pub failures: Vec<SinkFailure>,
}

impl SinkReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Stored documents for one postal code
#[derive(Debug, Clone, PartialEq)]
pub struct PostalCodeSummary {
    pub count: usize,
    /// Mean over the stored documents that carry a rating
    pub average_rating: Option<f64>,
}

impl PostalCodeSummary {
    fn from_stored(stored: &[StoredRestaurant]) -> Self {
        let rating = RatingStatistics::from_ratings(
            stored.iter().filter_map(|doc| doc.restaurant.rating),
        );

        Self {
            count: stored.len(),
            average_rating: (rating.count > 0).then_some(rating.mean),
        }
    }
}

/// What the store currently holds
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSummary {
    pub per_postal_code: BTreeMap<String, PostalCodeSummary>,
    pub total: usize,
    /// Native timestamps of the oldest and newest stored documents
    pub stored_between: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

/// Sink orchestration
/// DOCUMENTATION: Each sink runs in sequence and its failure is recorded
/// without stopping the others
pub struct DataService<'a> {
    store: &'a dyn DocumentStore,
    paths: OutputPaths,
}

impl<'a> DataService<'a> {
    pub fn new(store: &'a dyn DocumentStore, paths: OutputPaths) -> Self {
        Self { store, paths }
    }

    /// Process and save all data
    /// DOCUMENTATION: document store, then CSV, JSON and the statistics report
    pub async fn process_and_save(
        &self,
        restaurants: &[Restaurant],
        postal_codes: &[String],
    ) -> SinkReport {
        let mut failures = Vec::new();

        let stored_ids = match self.store.insert_many(restaurants).await {
            Ok(ids) => {
                log::info!("Saved {} restaurants to the document store", ids.len());
                ids
            }
            Err(error) => {
                log::error!("[{}] Error saving to the document store: {}", error.code(), error);
                failures.push(SinkFailure {
                    sink: Sink::DocumentStore,
                    error,
                });
                Vec::new()
            }
        };

        let csv_files = match export_to_csv(restaurants, postal_codes, &self.paths) {
            Ok(files) => files,
            Err(error) => {
                log::error!("[{}] CSV export failed: {}", error.code(), error);
                failures.push(SinkFailure {
                    sink: Sink::Csv,
                    error,
                });
                Vec::new()
            }
        };

        let json_file = match export_to_json(restaurants, &self.paths) {
            Ok(path) => Some(path),
            Err(error) => {
                log::error!("[{}] JSON export failed: {}", error.code(), error);
                failures.push(SinkFailure {
                    sink: Sink::Json,
                    error,
                });
                None
            }
        };

        let statistics = StatisticsReport::compute(restaurants, postal_codes);
        let statistics_file = match write_statistics_report(&statistics, &self.paths) {
            Ok(path) => Some(path),
            Err(error) => {
                log::error!("[{}] Statistics report failed: {}", error.code(), error);
                failures.push(SinkFailure {
                    sink: Sink::Statistics,
                    error,
                });
                None
            }
        };

        SinkReport {
            stored_ids,
            csv_files,
            json_file,
            statistics_file,
            statistics,
            failures,
        }
    }

    /// Read back what the store holds for the given postal codes and overall
    pub async fn stored_summary(
        &self,
        postal_codes: &[String],
    ) -> Result<StoreSummary, ScraperError> {
        let mut per_postal_code = BTreeMap::new();

        for postal_code in postal_codes {
            let stored = self.store.find_by_postal_code(postal_code).await?;
            per_postal_code.insert(postal_code.clone(), PostalCodeSummary::from_stored(&stored));
        }

        let all = self.store.find_all().await?;
        let oldest = all.iter().map(|doc| doc.created_at).min();
        let newest = all.iter().map(|doc| doc.created_at).max();

        Ok(StoreSummary {
            per_postal_code,
            total: all.len(),
            stored_between: oldest.zip(newest),
        })
    }
}
