// src/models/statistics.rs
// DOCUMENTATION: Aggregate statistics over one run's records
// PURPOSE: Derived report written to reporte_estadisticas.json

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Restaurant;

/// Statistics report
/// DOCUMENTATION: Computed once per run over the complete record set.
/// Serialized keys keep the established report format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsReport {
    #[serde(rename = "resumen_general")]
    pub summary: StatisticsSummary,

    /// Records per cuisine label (records without a label are not counted)
    #[serde(rename = "tipos_cocina")]
    pub cuisine_types: BTreeMap<String, u64>,

    #[serde(rename = "estadisticas_rating")]
    pub rating: RatingStatistics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSummary {
    #[serde(rename = "total_restaurantes")]
    pub total_restaurants: u64,

    /// Postal codes requested for the run, in input order
    #[serde(rename = "codigos_postales_analizados")]
    pub postal_codes: Vec<String>,

    /// Only codes that produced at least one record appear here
    #[serde(rename = "restaurantes_por_codigo_postal")]
    pub restaurants_per_postal_code: BTreeMap<String, u64>,

    #[serde(rename = "rating_promedio")]
    pub average_rating: f64,

    #[serde(rename = "restaurantes_con_telefono")]
    pub with_phone: u64,

    #[serde(rename = "restaurantes_con_website")]
    pub with_website: u64,
}

/// Rating aggregates; every figure is 0 when no record carries a rating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingStatistics {
    #[serde(rename = "promedio")]
    pub mean: f64,

    #[serde(rename = "mediana")]
    pub median: f64,

    #[serde(rename = "maximo")]
    pub max: f64,

    #[serde(rename = "minimo")]
    pub min: f64,

    #[serde(rename = "total_con_rating")]
    pub count: u64,
}

impl RatingStatistics {
    /// Aggregate the ratings that are present and finite
    pub fn from_ratings<I>(ratings: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values: Vec<f64> = ratings.into_iter().filter(|r| r.is_finite()).collect();

        if values.is_empty() {
            return RatingStatistics {
                mean: 0.0,
                median: 0.0,
                max: 0.0,
                min: 0.0,
                count: 0,
            };
        }

        values.sort_by(f64::total_cmp);

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let median = if count % 2 == 1 {
            values[count / 2]
        } else {
            (values[count / 2 - 1] + values[count / 2]) / 2.0
        };

        RatingStatistics {
            mean,
            median,
            max: values[count - 1],
            min: values[0],
            count: count as u64,
        }
    }
}

impl StatisticsReport {
    /// Compute the report for a run
    /// DOCUMENTATION: Aggregates per postal code, per cuisine label,
    /// rating figures and phone/website coverage
    pub fn compute(restaurants: &[Restaurant], postal_codes: &[String]) -> Self {
        let mut restaurants_per_postal_code: BTreeMap<String, u64> = BTreeMap::new();
        let mut cuisine_types: BTreeMap<String, u64> = BTreeMap::new();

        for restaurant in restaurants {
            *restaurants_per_postal_code
                .entry(restaurant.postal_code.clone())
                .or_insert(0) += 1;

            if let Some(cuisine) = &restaurant.cuisine_type {
                *cuisine_types.entry(cuisine.clone()).or_insert(0) += 1;
            }
        }

        let rating = RatingStatistics::from_ratings(restaurants.iter().filter_map(|r| r.rating));

        StatisticsReport {
            summary: StatisticsSummary {
                total_restaurants: restaurants.len() as u64,
                postal_codes: postal_codes.to_vec(),
                restaurants_per_postal_code,
                average_rating: rating.mean,
                with_phone: restaurants.iter().filter(|r| r.has_phone()).count() as u64,
                with_website: restaurants.iter().filter(|r| r.has_website()).count() as u64,
            },
            cuisine_types,
            rating,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewRestaurant;

    fn rated(postal_code: &str, rating: Option<f64>, cuisine: &str) -> Restaurant {
        NewRestaurant {
            name: "R".to_string(),
            address: "A".to_string(),
            postal_code: postal_code.to_string(),
            rating,
            cuisine_type: Some(cuisine.to_string()),
            ..NewRestaurant::default()
        }
        .into()
    }

    #[test]
    fn test_rating_statistics_known_set() {
        let restaurants = vec![
            rated("28001", Some(3.0), "General"),
            rated("28001", Some(4.0), "Italiana"),
            rated("28002", Some(5.0), "General"),
            rated("28002", None, "Bar"),
        ];

        let report = StatisticsReport::compute(&restaurants, &["28001".into(), "28002".into()]);

        assert_eq!(report.rating.mean, 4.0);
        assert_eq!(report.rating.median, 4.0);
        assert_eq!(report.rating.min, 3.0);
        assert_eq!(report.rating.max, 5.0);
        assert_eq!(report.rating.count, 3);
        assert_eq!(report.summary.average_rating, 4.0);
        assert_eq!(report.summary.total_restaurants, 4);
    }

    #[test]
    fn test_no_ratings_defaults_to_zero() {
        let restaurants = vec![rated("28001", None, "General")];
        let report = StatisticsReport::compute(&restaurants, &["28001".into()]);

        assert_eq!(report.rating.mean, 0.0);
        assert_eq!(report.rating.median, 0.0);
        assert_eq!(report.rating.count, 0);
    }

    #[test]
    fn test_even_count_median_averages_middle_pair() {
        let stats = RatingStatistics::from_ratings(vec![4.5, 3.0, 5.0, 4.0]);
        assert_eq!(stats.median, 4.25);
        assert_eq!(stats.count, 4);
    }

    #[test]
    fn test_non_finite_ratings_ignored() {
        let stats = RatingStatistics::from_ratings(vec![f64::NAN, 2.0]);
        assert_eq!(stats.count, 1);
        assert_eq!(stats.mean, 2.0);
    }

    #[test]
    fn test_grouping_and_coverage() {
        let mut with_contact = rated("28003", Some(4.0), "Bar");
        with_contact.phone = Some("600 000 000".to_string());
        with_contact.website = Some("https://bar.example".to_string());

        let restaurants = vec![
            rated("28001", None, "General"),
            rated("28001", None, "General"),
            with_contact,
        ];
        let codes = vec!["28001".to_string(), "28002".to_string(), "28003".to_string()];
        let report = StatisticsReport::compute(&restaurants, &codes);

        assert_eq!(report.summary.restaurants_per_postal_code.get("28001"), Some(&2));
        assert_eq!(report.summary.restaurants_per_postal_code.get("28002"), None);
        assert_eq!(report.summary.postal_codes, codes);
        assert_eq!(report.cuisine_types.get("General"), Some(&2));
        assert_eq!(report.cuisine_types.get("Bar"), Some(&1));
        assert_eq!(report.summary.with_phone, 1);
        assert_eq!(report.summary.with_website, 1);
    }

    #[test]
    fn test_report_serializes_with_report_keys() {
        let report = StatisticsReport::compute(&[], &["28001".into()]);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["resumen_general"]["total_restaurantes"], 0);
        assert_eq!(json["estadisticas_rating"]["promedio"], 0.0);
        assert!(json["tipos_cocina"].as_object().unwrap().is_empty());
    }
}
