// src/console/view.rs
// DOCUMENTATION: Console interaction
// PURPOSE: Prompt for postal codes and print progress, results and statistics

use crate::errors::ScraperError;
use crate::models::StatisticsReport;
use crate::services::{ScrapeBatch, SinkReport};
use std::io::{self, BufRead, Write};

// --- ANSI colors ---
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

/// Fewest postal codes a run accepts
pub const MIN_POSTAL_CODES: usize = 3;

/// Split a comma-separated list, trimming entries and dropping empty ones
pub fn parse_postal_codes(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reject runs with fewer than MIN_POSTAL_CODES codes
pub fn require_postal_codes(codes: &[String]) -> Result<(), ScraperError> {
    if codes.len() < MIN_POSTAL_CODES {
        return Err(ScraperError::InvalidInput(format!(
            "At least {} postal codes are required (got {})",
            MIN_POSTAL_CODES,
            codes.len()
        )));
    }
    Ok(())
}

/// Line-oriented console view
pub struct ConsoleView;

impl ConsoleView {
    pub fn show_welcome_message(&self) {
        println!("{}╔══════════════════════════════════════════════════════════╗{}", CYAN, RESET);
        println!("{}║   🍽️  Restaurant Scraper - Google Maps by postal code      ║{}", CYAN, RESET);
        println!("{}╚══════════════════════════════════════════════════════════╝{}", CYAN, RESET);
    }

    pub fn show_progress(&self, message: &str) {
        println!("{}⏳ {}{}", CYAN, message, RESET);
    }

    pub fn show_success(&self, message: &str) {
        println!("{}✅ {}{}", GREEN, message, RESET);
    }

    pub fn show_warning(&self, message: &str) {
        println!("{}⚠️  {}{}", YELLOW, message, RESET);
    }

    pub fn show_error(&self, message: &str) {
        println!("{}❌ ERROR: {}{}", RED, message, RESET);
    }

    /// Prompt on stdout and read one line of postal codes from `input`
    pub fn read_postal_codes<R: BufRead>(&self, input: &mut R) -> Result<Vec<String>, ScraperError> {
        println!("\n{}📍 Enter the postal codes to analyse:{}", BOLD, RESET);
        println!("Example: 28001,28002,28003");
        print!("Postal codes (comma separated): ");
        io::stdout().flush()?;

        let mut line = String::new();
        input
            .read_line(&mut line)
            .map_err(|e| ScraperError::InvalidInput(format!("Could not read input: {}", e)))?;

        Ok(parse_postal_codes(&line))
    }

    /// Result line for one postal code plus one line per recovered error
    pub fn show_batch(&self, batch: &ScrapeBatch) {
        self.show_success(&format!(
            "Found {} restaurants in {}",
            batch.restaurants.len(),
            batch.postal_code
        ));
        for error in &batch.errors {
            self.show_warning(error);
        }
    }

    pub fn show_sink_report(&self, report: &SinkReport) {
        if !report.stored_ids.is_empty() {
            self.show_success(&format!(
                "Saved {} restaurants to the document store",
                report.stored_ids.len()
            ));
        }
        if let Some(path) = &report.json_file {
            self.show_success(&format!("JSON written to {}", path.display()));
        }
        if let Some(path) = &report.statistics_file {
            self.show_success(&format!("Statistics report written to {}", path.display()));
        }
        if !report.csv_files.is_empty() {
            self.show_success(&format!("{} CSV files written", report.csv_files.len()));
        }
        for failure in &report.failures {
            self.show_error(&failure.to_string());
        }
    }

    pub fn show_statistics(&self, stats: &StatisticsReport) {
        println!("\n{}📊 STATISTICS:{}", BOLD, RESET);
        println!("Total restaurants: {}", stats.summary.total_restaurants);
        println!("Postal codes analysed: {:?}", stats.summary.postal_codes);
        println!("Average rating: {:.2}", stats.summary.average_rating);
    }
}
