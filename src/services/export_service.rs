// src/services/export_service.rs
// DOCUMENTATION: Flat-file exports
// PURPOSE: CSV (combined and per postal code), JSON, and the statistics report

use crate::errors::ScraperError;
use crate::models::{Restaurant, StatisticsReport};
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Output file layout under the configured root
#[derive(Debug, Clone)]
pub struct OutputPaths {
    root: PathBuf,
}

impl OutputPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn csv_dir(&self) -> PathBuf {
        self.root.join("csv")
    }

    pub fn json_dir(&self) -> PathBuf {
        self.root.join("json")
    }

    pub fn combined_csv(&self) -> PathBuf {
        self.csv_dir().join("restaurantes_completo.csv")
    }

    /// Per-code file; characters unsafe in file names become '_'
    pub fn postal_code_csv(&self, postal_code: &str) -> PathBuf {
        self.csv_dir()
            .join(format!("restaurantes_{}.csv", file_safe(postal_code)))
    }

    /// Numbered per-code file for codes whose sanitized names collide
    fn numbered_postal_code_csv(&self, postal_code: &str, n: usize) -> PathBuf {
        self.csv_dir()
            .join(format!("restaurantes_{}_{}.csv", file_safe(postal_code), n))
    }

    pub fn combined_json(&self) -> PathBuf {
        self.json_dir().join("restaurantes_completo.json")
    }

    pub fn statistics_json(&self) -> PathBuf {
        self.json_dir().join("reporte_estadisticas.json")
    }
}

fn file_safe(postal_code: &str) -> String {
    postal_code
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// CSV row (serialization only)
/// DOCUMENTATION: business_hours is flattened to JSON text; absent values
/// become empty cells
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantCsvRow {
    pub name: String,
    pub address: String,
    pub postal_code: String,
    pub phone: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
    pub cuisine_type: Option<String>,
    pub business_hours: Option<String>,
    pub website: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: String,
}

impl TryFrom<&Restaurant> for RestaurantCsvRow {
    type Error = ScraperError;

    fn try_from(restaurant: &Restaurant) -> Result<Self, Self::Error> {
        let business_hours = restaurant
            .business_hours
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        Ok(Self {
            name: restaurant.name.clone(),
            address: restaurant.address.clone(),
            postal_code: restaurant.postal_code.clone(),
            phone: restaurant.phone.clone(),
            rating: restaurant.rating,
            review_count: restaurant.review_count,
            cuisine_type: restaurant.cuisine_type.clone(),
            business_hours,
            website: restaurant.website.clone(),
            latitude: restaurant.latitude,
            longitude: restaurant.longitude,
            created_at: restaurant.created_at().to_rfc3339(),
        })
    }
}

/// Write records to one CSV file; the header is written even with no rows
fn write_csv<'a, I>(restaurants: I, path: &Path) -> Result<(), ScraperError>
where
    I: IntoIterator<Item = &'a Restaurant>,
{
    let file = File::create(path).map_err(|e| {
        ScraperError::ExportError(format!("Failed to create {}: {}", path.display(), e))
    })?;
    let mut csv_writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(file));

    csv_writer.write_record([
        "name",
        "address",
        "postal_code",
        "phone",
        "rating",
        "review_count",
        "cuisine_type",
        "business_hours",
        "website",
        "latitude",
        "longitude",
        "created_at",
    ])?;

    for restaurant in restaurants {
        csv_writer.serialize(RestaurantCsvRow::try_from(restaurant)?)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Pretty-print a value as UTF-8 JSON
fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), ScraperError> {
    let file = File::create(path).map_err(|e| {
        ScraperError::ExportError(format!("Failed to create {}: {}", path.display(), e))
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// Export to CSV
/// DOCUMENTATION: One combined file plus one file per requested postal code,
/// filtered from the in-memory records
pub fn export_to_csv(
    restaurants: &[Restaurant],
    postal_codes: &[String],
    paths: &OutputPaths,
) -> Result<Vec<PathBuf>, ScraperError> {
    fs::create_dir_all(paths.csv_dir())?;

    let mut written = Vec::with_capacity(postal_codes.len() + 1);

    let combined = paths.combined_csv();
    write_csv(restaurants, &combined)?;
    written.push(combined);

    // Distinct codes may sanitize to the same name; later ones get a number
    let mut claimed: HashMap<PathBuf, &str> = HashMap::new();

    for postal_code in postal_codes {
        let mut path = paths.postal_code_csv(postal_code);
        let mut n = 2;
        while let Some(owner) = claimed.get(&path) {
            if *owner == postal_code.as_str() {
                break;
            }
            path = paths.numbered_postal_code_csv(postal_code, n);
            n += 1;
        }
        if claimed.contains_key(&path) {
            // Repeated code, already written
            continue;
        }
        if path != paths.postal_code_csv(postal_code) {
            log::warn!(
                "CSV name for {:?} collides with another postal code; writing {}",
                postal_code,
                path.display()
            );
        }
        claimed.insert(path.clone(), postal_code.as_str());

        write_csv(
            restaurants.iter().filter(|r| &r.postal_code == postal_code),
            &path,
        )?;
        written.push(path);
    }

    log::info!("Exported {} restaurants to CSV", restaurants.len());
    Ok(written)
}

/// Export to JSON with ISO-8601 timestamps
pub fn export_to_json(
    restaurants: &[Restaurant],
    paths: &OutputPaths,
) -> Result<PathBuf, ScraperError> {
    fs::create_dir_all(paths.json_dir())?;

    let path = paths.combined_json();
    write_json(restaurants, &path)?;

    log::info!("Exported {} restaurants to JSON", restaurants.len());
    Ok(path)
}

/// Write the statistics report
pub fn write_statistics_report(
    report: &StatisticsReport,
    paths: &OutputPaths,
) -> Result<PathBuf, ScraperError> {
    fs::create_dir_all(paths.json_dir())?;

    let path = paths.statistics_json();
    write_json(report, &path)?;

    log::info!("Statistics report written to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BusinessHours, NewRestaurant};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn restaurant(name: &str, postal_code: &str) -> Restaurant {
        let mut hours = BusinessHours::new();
        hours.insert("day_0".to_string(), "Monday: Closed".to_string());

        NewRestaurant {
            name: name.to_string(),
            address: format!("{}, {}", name, postal_code),
            postal_code: postal_code.to_string(),
            rating: Some(4.2),
            business_hours: Some(hours),
            created_at: Some(Utc.with_ymd_and_hms(2024, 5, 2, 8, 0, 0).unwrap()),
            ..NewRestaurant::default()
        }
        .into()
    }

    fn read_rows(path: &Path) -> Vec<RestaurantCsvRow> {
        let mut reader = csv::Reader::from_path(path).unwrap();
        reader.deserialize().map(|row| row.unwrap()).collect()
    }

    #[test]
    fn test_postal_code_file_name_is_sanitized() {
        let paths = OutputPaths::new("data");
        assert_eq!(
            paths.postal_code_csv("28001"),
            PathBuf::from("data/csv/restaurantes_28001.csv")
        );
        assert_eq!(
            paths.postal_code_csv("../x y"),
            PathBuf::from("data/csv/restaurantes____x_y.csv")
        );
    }

    #[test]
    fn test_csv_combined_and_per_postal_code() {
        let dir = TempDir::new().unwrap();
        let paths = OutputPaths::new(dir.path());
        let restaurants = vec![
            restaurant("A", "28001"),
            restaurant("B", "28002"),
            restaurant("C", "28001"),
        ];
        let codes = vec!["28001".to_string(), "28002".to_string(), "28003".to_string()];

        let written = export_to_csv(&restaurants, &codes, &paths).unwrap();
        assert_eq!(written.len(), 4);

        assert_eq!(read_rows(&paths.combined_csv()).len(), 3);

        let first = read_rows(&paths.postal_code_csv("28001"));
        let names: Vec<&str> = first.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);

        assert_eq!(read_rows(&paths.postal_code_csv("28002")).len(), 1);

        // Requested code with no results still gets a header-only file
        let empty = fs::read_to_string(paths.postal_code_csv("28003")).unwrap();
        assert!(empty.starts_with("name,address,postal_code"));
        assert_eq!(empty.lines().count(), 1);
    }

    #[test]
    fn test_colliding_postal_code_names_keep_both_files() {
        let dir = TempDir::new().unwrap();
        let paths = OutputPaths::new(dir.path());
        let restaurants = vec![restaurant("A", "28 001"), restaurant("B", "28_001")];
        let codes = vec![
            "28 001".to_string(),
            "28_001".to_string(),
            "28 001".to_string(),
        ];

        let written = export_to_csv(&restaurants, &codes, &paths).unwrap();
        assert_eq!(written.len(), 3);

        let first = read_rows(&paths.postal_code_csv("28 001"));
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].name, "A");

        let second_path = dir.path().join("csv/restaurantes_28_001_2.csv");
        assert_eq!(written[2], second_path);
        let second = read_rows(&second_path);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].name, "B");
    }

    #[test]
    fn test_csv_row_flattens_hours_and_timestamp() {
        let dir = TempDir::new().unwrap();
        let paths = OutputPaths::new(dir.path());
        export_to_csv(&[restaurant("A", "28001")], &[], &paths).unwrap();

        let rows = read_rows(&paths.combined_csv());
        assert_eq!(rows[0].business_hours.as_deref(), Some(r#"{"day_0":"Monday: Closed"}"#));
        assert_eq!(rows[0].created_at, "2024-05-02T08:00:00+00:00");
        assert_eq!(rows[0].rating, Some(4.2));
        assert!(rows[0].phone.is_none());
    }

    #[test]
    fn test_json_export_uses_iso_timestamps() {
        let dir = TempDir::new().unwrap();
        let paths = OutputPaths::new(dir.path());
        let path = export_to_json(&[restaurant("Café Gijón", "28004")], &paths).unwrap();

        let raw = fs::read_to_string(path).unwrap();
        assert!(raw.contains("Café Gijón"));

        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed[0]["created_at"], "2024-05-02T08:00:00Z");
        assert_eq!(parsed[0]["business_hours"]["day_0"], "Monday: Closed");
    }

    #[test]
    fn test_statistics_report_file() {
        let dir = TempDir::new().unwrap();
        let paths = OutputPaths::new(dir.path());
        let restaurants = vec![restaurant("A", "28001")];
        let report = StatisticsReport::compute(&restaurants, &["28001".to_string()]);

        let path = write_statistics_report(&report, &paths).unwrap();
        let parsed: StatisticsReport =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(parsed, report);
    }
}
