//! Recognition results and category inference.
//!
//! The recognition endpoint extracts best-effort structured fields from a
//! captured label photo. Category is not trusted from the service; it is
//! derived locally from the raw extracted text so inference stays
//! reproducible.

use serde::{Deserialize, Serialize};

use crate::draft::DraftRecord;
use crate::model::{Category, Location};

/// Response from `POST /api/scan`. Every field is best-effort; absent
/// fields decode to their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResponse {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub raw_text: String,
}

/// Keyword vocabularies for category inference, in match order.
///
/// The order is fixed: the first vocabulary containing any keyword found in
/// the raw text wins, so text mentioning both "motor" and "bolt" is always
/// electronics.
const CATEGORY_VOCABULARIES: &[(Category, &[&str])] = &[
    (
        Category::Electronics,
        &[
            "motor", "controller", "sensor", "servo", "esc", "pcb", "arduino", "led", "board",
            "camera",
        ],
    ),
    (
        Category::Mechanical,
        &[
            "bolt", "nut", "screw", "bearing", "wheel", "hub", "gear", "spring", "shaft", "bracket",
        ],
    ),
    (
        Category::Power,
        &["battery", "cell", "charger", "voltage", "regulator", "fuse", "power",
        ],
    ),
    (
        Category::Materials,
        &[
            "carbon", "fiber", "sheet", "aluminium", "aluminum", "steel", "filament", "resin",
            "plate",
        ],
    ),
    (
        Category::Tools,
        &["wrench", "plier", "drill", "caliper", "solder", "hammer", "screwdriver", "tool",
        ],
    ),
];

/// Infer a category from recognized raw text.
///
/// Scans the fixed vocabulary order above with a lowercase substring match;
/// no match falls back to [`Category::Other`].
pub fn infer_category(raw_text: &str) -> Category {
    let lower = raw_text.to_lowercase();
    for (category, keywords) in CATEGORY_VOCABULARIES {
        if keywords.iter().any(|keyword| lower.contains(keyword)) {
            return *category;
        }
    }
    Category::Other
}

impl ScanResponse {
    /// Map this recognition result onto a draft record.
    ///
    /// Only fields the service actually extracted overwrite the draft;
    /// anything the user already staged (including the captured image)
    /// stays in place.
    pub fn apply_to(&self, draft: &mut DraftRecord) {
        if !self.name.trim().is_empty() {
            draft.name = self.name.trim().to_string();
        }
        if self.quantity >= 1 {
            draft.quantity = self.quantity;
        }
        if !self.location.trim().is_empty() {
            draft.location = Location::new(self.location.trim());
        }
        draft.category = Some(infer_category(&self.raw_text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_vocabulary_wins() {
        // "motor" (electronics) appears alongside "bolt" (mechanical):
        // electronics is checked first, so electronics wins.
        let category = infer_category("M4 bolt bag next to motor driver");
        assert_eq!(category, Category::Electronics);
    }

    #[test]
    fn test_inference_is_case_insensitive() {
        assert_eq!(infer_category("CARBON Fiber Sheet"), Category::Materials);
        assert_eq!(infer_category("Battery CELL 18650"), Category::Power);
    }

    #[test]
    fn test_no_match_falls_back_to_other() {
        assert_eq!(infer_category("mystery box"), Category::Other);
        assert_eq!(infer_category(""), Category::Other);
    }

    #[test]
    fn test_each_vocabulary_is_reachable() {
        assert_eq!(infer_category("servo horn"), Category::Electronics);
        assert_eq!(infer_category("wheel hub"), Category::Mechanical);
        assert_eq!(infer_category("spare fuse"), Category::Power);
        assert_eq!(infer_category("resin bottle"), Category::Materials);
        assert_eq!(infer_category("torque wrench"), Category::Tools);
    }

    #[test]
    fn test_apply_to_fills_draft_fields() {
        let mut draft = DraftRecord::default();
        draft.image_reference = Some("data:image/png;base64,xyz".to_string());

        let response = ScanResponse {
            name: " Motor Controller ".to_string(),
            quantity: 3,
            location: "electronics-lab".to_string(),
            raw_text: "MOTOR CONTROLLER v2".to_string(),
        };
        response.apply_to(&mut draft);

        assert_eq!(draft.name, "Motor Controller");
        assert_eq!(draft.quantity, 3);
        assert_eq!(draft.location.as_str(), "electronics-lab");
        assert_eq!(draft.category, Some(Category::Electronics));
        // The staged capture is untouched
        assert_eq!(
            draft.image_reference.as_deref(),
            Some("data:image/png;base64,xyz")
        );
    }

    #[test]
    fn test_apply_to_keeps_existing_values_for_empty_fields() {
        let mut draft = DraftRecord {
            name: "Suspension Spring".to_string(),
            quantity: 16,
            ..DraftRecord::default()
        };

        let response = ScanResponse {
            name: "  ".to_string(),
            quantity: 0,
            location: String::new(),
            raw_text: "spring steel".to_string(),
        };
        response.apply_to(&mut draft);

        assert_eq!(draft.name, "Suspension Spring");
        assert_eq!(draft.quantity, 16);
        assert!(draft.location.is_empty());
        assert_eq!(draft.category, Some(Category::Mechanical));
    }

    #[test]
    fn test_scan_response_tolerates_missing_fields() {
        let response: ScanResponse = serde_json::from_str("{\"name\": \"Battery Cell\"}").unwrap();
        assert_eq!(response.name, "Battery Cell");
        assert_eq!(response.quantity, 0);
        assert!(response.raw_text.is_empty());
    }
}
