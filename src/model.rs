//! Inventory data model shared by the API client, draft builder, and store.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Item category. Closed set; the wire form is lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Electronics,
    Mechanical,
    Power,
    Materials,
    Tools,
    Other,
}

impl Category {
    /// All categories, in display order.
    pub const ALL: [Category; 6] = [
        Category::Electronics,
        Category::Mechanical,
        Category::Power,
        Category::Materials,
        Category::Tools,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Electronics => "electronics",
            Category::Mechanical => "mechanical",
            Category::Power => "power",
            Category::Materials => "materials",
            Category::Tools => "tools",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "electronics" => Ok(Category::Electronics),
            "mechanical" => Ok(Category::Mechanical),
            "power" => Ok(Category::Power),
            "materials" => Ok(Category::Materials),
            "tools" => Ok(Category::Tools),
            "other" => Ok(Category::Other),
            other => Err(format!(
                "Unknown category '{}'. Available categories: electronics, mechanical, power, materials, tools, other",
                other
            )),
        }
    }
}

/// Storage location. The set of known locations is extensible on the server
/// side, so unknown values round-trip verbatim instead of being rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Location(pub String);

/// Locations the org currently uses. Shown as suggestions; not enforced.
pub const KNOWN_LOCATIONS: &[&str] = &[
    "workshop",
    "storage-room",
    "electronics-lab",
    "container",
    "office",
];

impl Location {
    pub fn new(name: impl Into<String>) -> Self {
        Location(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether this matches one of the locations the org currently uses.
    pub fn is_known(&self) -> bool {
        KNOWN_LOCATIONS.iter().any(|l| *l == self.0)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Location {
    fn from(s: &str) -> Self {
        Location(s.to_string())
    }
}

/// A persisted inventory record as returned by the API.
///
/// `id` and `created_at` are assigned by the persistence layer and never
/// change afterwards. `quantity` is unsigned so a committed negative value
/// is unrepresentable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub id: String,
    pub name: String,
    pub category: Category,
    #[serde(default)]
    pub location: Location,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl InventoryRecord {
    /// Records at or below this quantity count as low stock.
    pub const LOW_STOCK_THRESHOLD: u32 = 5;

    pub fn is_low_stock(&self) -> bool {
        self.quantity <= Self::LOW_STOCK_THRESHOLD
    }
}

/// Request body for `POST /api/items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub name: String,
    pub category: Category,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_reference: Option<String>,
}

/// Request body for `PUT /api/items/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdate {
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_wire_form_is_lowercase() {
        let json = serde_json::to_string(&Category::Electronics).unwrap();
        assert_eq!(json, "\"electronics\"");
        let parsed: Category = serde_json::from_str("\"tools\"").unwrap();
        assert_eq!(parsed, Category::Tools);
    }

    #[test]
    fn test_category_from_str_case_insensitive() {
        assert_eq!("Electronics".parse::<Category>(), Ok(Category::Electronics));
        assert_eq!("POWER".parse::<Category>(), Ok(Category::Power));
        assert!("gadgets".parse::<Category>().is_err());
    }

    #[test]
    fn test_unknown_location_round_trips_verbatim() {
        let loc: Location = serde_json::from_str("\"attic-shelf-9\"").unwrap();
        assert_eq!(loc.as_str(), "attic-shelf-9");
        assert!(!loc.is_known());
        assert_eq!(serde_json::to_string(&loc).unwrap(), "\"attic-shelf-9\"");
    }

    #[test]
    fn test_known_location() {
        assert!(Location::from("workshop").is_known());
        assert!(!Location::from("somewhere-else").is_known());
    }

    #[test]
    fn test_record_deserializes_from_api_json() {
        let json = serde_json::json!({
            "id": "a1",
            "name": "Motor Controller",
            "category": "electronics",
            "location": "electronics-lab",
            "quantity": 5,
            "imageReference": "https://example.com/motor.png",
            "createdAt": "2025-04-10T12:00:00Z"
        });
        let record: InventoryRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.id, "a1");
        assert_eq!(record.category, Category::Electronics);
        assert_eq!(record.quantity, 5);
        assert!(record.is_low_stock());
    }

    #[test]
    fn test_record_without_location_or_image() {
        let json = serde_json::json!({
            "id": "b2",
            "name": "Battery Cell",
            "category": "power",
            "quantity": 120,
            "createdAt": "2025-04-09T08:30:00Z"
        });
        let record: InventoryRecord = serde_json::from_value(json).unwrap();
        assert!(record.location.is_empty());
        assert!(record.image_reference.is_none());
        assert!(!record.is_low_stock());
    }

    #[test]
    fn test_new_item_omits_empty_optionals() {
        let body = NewItem {
            name: "Wheel Hub".to_string(),
            category: Category::Mechanical,
            quantity: 12,
            location: None,
            image_reference: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("location").is_none());
        assert!(json.get("imageReference").is_none());
    }
}
