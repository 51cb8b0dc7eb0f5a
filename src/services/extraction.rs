// src/services/extraction.rs
// DOCUMENTATION: Field extraction from raw Google payloads
// PURPOSE: Cuisine-type inference and business-hours flattening

use crate::models::BusinessHours;
use serde::{Deserialize, Serialize};

/// Label for places confirmed as restaurants without a recognised cuisine
pub const GENERAL_CUISINE: &str = "General";

/// Label for places whose categories were never recognised
pub const FALLBACK_CUISINE: &str = "Restaurante";

/// Priority table: Google type -> display cuisine label
const CUISINE_MAP: &[(&str, &str)] = &[
    ("italian_restaurant", "Italiana"),
    ("mexican_restaurant", "Mexicana"),
    ("chinese_restaurant", "China"),
    ("japanese_restaurant", "Japonesa"),
    ("fast_food_restaurant", "Comida Rápida"),
    ("pizza_restaurant", "Pizza"),
    ("cafe", "Café"),
    ("restaurant", GENERAL_CUISINE),
    ("meal_takeaway", "Para Llevar"),
    ("bakery", "Panadería"),
    ("bar", "Bar"),
];

/// Category tags as sent by the upstream
/// DOCUMENTATION: Normally a list, but a bare string or null is accepted
/// and normalized to a list of zero or one element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryTags {
    Many(Vec<String>),
    One(String),
    None,
}

impl Default for CategoryTags {
    fn default() -> Self {
        CategoryTags::Many(Vec::new())
    }
}

impl CategoryTags {
    /// Normalize to a sequence; an empty bare string counts as no tag
    pub fn into_vec(self) -> Vec<String> {
        match self {
            CategoryTags::Many(tags) => tags,
            CategoryTags::One(tag) if tag.is_empty() => Vec::new(),
            CategoryTags::One(tag) => vec![tag],
            CategoryTags::None => Vec::new(),
        }
    }
}

impl From<Vec<String>> for CategoryTags {
    fn from(tags: Vec<String>) -> Self {
        CategoryTags::Many(tags)
    }
}

/// Look up a tag in the priority table
fn cuisine_label(tag: &str) -> Option<&'static str> {
    CUISINE_MAP
        .iter()
        .find(|(google_type, _)| *google_type == tag)
        .map(|(_, label)| *label)
}

/// Infer the display cuisine label from category tags
/// DOCUMENTATION: Two passes, first match wins in each:
/// 1. the first tag present in the priority table gives its label
/// 2. otherwise the first tag containing "restaurant" gives "General"
/// Anything else (including no tags) gives "Restaurante".
pub fn extract_cuisine_type(tags: &[String]) -> String {
    if let Some(label) = tags.iter().find_map(|tag| cuisine_label(tag)) {
        return label.to_string();
    }

    if tags.iter().any(|tag| tag.contains("restaurant")) {
        return GENERAL_CUISINE.to_string();
    }

    FALLBACK_CUISINE.to_string()
}

/// Flatten weekday text lines into positional day labels
/// DOCUMENTATION: Missing or empty schedules give None; lines keep input
/// order and are copied verbatim
pub fn extract_business_hours(weekday_text: Option<&[String]>) -> Option<BusinessHours> {
    let lines = weekday_text.filter(|lines| !lines.is_empty())?;

    Some(
        lines
            .iter()
            .enumerate()
            .map(|(i, line)| (format!("day_{}", i), line.clone()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_cuisine_known_types() {
        assert_eq!(extract_cuisine_type(&tags(&["italian_restaurant"])), "Italiana");
        assert_eq!(extract_cuisine_type(&tags(&["cafe"])), "Café");
        assert_eq!(extract_cuisine_type(&tags(&["restaurant"])), "General");
    }

    #[test]
    fn test_cuisine_unknown_types() {
        assert_eq!(extract_cuisine_type(&tags(&["unknown_type"])), "Restaurante");
        assert_eq!(extract_cuisine_type(&[]), "Restaurante");
        assert_eq!(
            extract_cuisine_type(&tags(&["some_random_restaurant"])),
            "General"
        );
    }

    #[test]
    fn test_cuisine_first_exact_match_wins() {
        assert_eq!(
            extract_cuisine_type(&tags(&["unknown_type", "restaurant"])),
            "General"
        );
        // "restaurant" appears first but the table scan is per tag in order
        assert_eq!(
            extract_cuisine_type(&tags(&["restaurant", "italian_restaurant"])),
            "General"
        );
        assert_eq!(
            extract_cuisine_type(&tags(&["point_of_interest", "bar", "cafe"])),
            "Bar"
        );
        // Substring pass only runs when no tag is in the table
        assert_eq!(
            extract_cuisine_type(&tags(&["vegan_restaurant", "bakery"])),
            "Panadería"
        );
    }

    #[test]
    fn test_cuisine_substring_is_case_sensitive() {
        assert_eq!(extract_cuisine_type(&tags(&["Restaurant"])), "Restaurante");
    }

    #[test]
    fn test_bare_string_tag_is_normalized() {
        let parsed: CategoryTags = serde_json::from_str(r#""restaurant""#).unwrap();
        assert_eq!(extract_cuisine_type(&parsed.into_vec()), "General");

        let null: CategoryTags = serde_json::from_str("null").unwrap();
        assert!(null.into_vec().is_empty());

        let list: CategoryTags = serde_json::from_str(r#"["cafe","food"]"#).unwrap();
        assert_eq!(list.into_vec(), tags(&["cafe", "food"]));

        assert!(CategoryTags::One(String::new()).into_vec().is_empty());
    }

    #[test]
    fn test_business_hours_valid() {
        let lines = tags(&["Monday: 9:00 AM – 10:00 PM", "Tuesday: 9:00 AM – 10:00 PM"]);
        let hours = extract_business_hours(Some(&lines)).unwrap();

        assert_eq!(hours.len(), 2);
        assert_eq!(hours["day_0"], "Monday: 9:00 AM – 10:00 PM");
        assert_eq!(hours["day_1"], "Tuesday: 9:00 AM – 10:00 PM");
    }

    #[test]
    fn test_business_hours_keeps_upstream_order() {
        let lines = tags(&["Sunday: Closed", "Monday: 12–4 PM"]);
        let hours = extract_business_hours(Some(&lines)).unwrap();
        let values: Vec<&String> = hours.values().collect();
        assert_eq!(values, vec!["Sunday: Closed", "Monday: 12–4 PM"]);

        let lines: Vec<String> = (0..11).map(|i| format!("line{}", i)).collect();
        let hours = extract_business_hours(Some(&lines)).unwrap();
        let values: Vec<&String> = hours.values().collect();
        assert_eq!(values, lines.iter().collect::<Vec<_>>());
        let keys: Vec<&str> = hours.keys().map(String::as_str).collect();
        assert_eq!(keys[2], "day_2");
        assert_eq!(keys[10], "day_10");
    }

    #[test]
    fn test_business_hours_invalid() {
        assert!(extract_business_hours(None).is_none());
        assert!(extract_business_hours(Some(&[])).is_none());
    }
}
