use serde::{Deserialize, Serialize};

pub const DEFAULT_DOSE: &str = "1 tablet";
pub const DEFAULT_FREQUENCY: &str = "1 time daily";
pub const DEFAULT_DURATION: &str = "7 days";
pub const DEFAULT_INSTRUCTIONS: &str = "after food";

/// Name carried by the placeholder record returned when nothing matched.
pub const NO_MEDICINES_DETECTED: &str = "No medicines detected";

/// One medicine line read off a prescription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MedicineRecord {
    pub name: String,
    pub dose: String,
    pub frequency: String,
    pub duration: String,
    pub instructions: String,
}

impl MedicineRecord {
    /// Build a record from captured fields, filling absent ones with defaults.
    pub fn with_defaults(
        name: &str,
        dose: Option<&str>,
        frequency: Option<&str>,
        duration: Option<&str>,
        instructions: Option<&str>,
    ) -> Self {
        Self {
            name: name.trim().to_string(),
            dose: dose.map(str::trim).unwrap_or(DEFAULT_DOSE).to_string(),
            frequency: frequency.map(str::trim).unwrap_or(DEFAULT_FREQUENCY).to_string(),
            duration: duration.map(str::trim).unwrap_or(DEFAULT_DURATION).to_string(),
            instructions: instructions
                .map(str::trim)
                .unwrap_or(DEFAULT_INSTRUCTIONS)
                .to_string(),
        }
    }

    pub fn sentinel() -> Self {
        Self {
            name: NO_MEDICINES_DETECTED.to_string(),
            dose: String::new(),
            frequency: String::new(),
            duration: String::new(),
            instructions: String::new(),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self == &Self::sentinel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let record = MedicineRecord::with_defaults("Cetirizine", Some("10mg"), None, None, None);
        assert_eq!(record.dose, "10mg");
        assert_eq!(record.frequency, "1 time daily");
        assert_eq!(record.duration, "7 days");
        assert_eq!(record.instructions, "after food");
        assert!(!record.is_sentinel());
    }

    #[test]
    fn test_sentinel_shape() {
        let sentinel = MedicineRecord::sentinel();
        assert_eq!(sentinel.name, "No medicines detected");
        assert!(sentinel.dose.is_empty());
        assert!(sentinel.frequency.is_empty());
        assert!(sentinel.duration.is_empty());
        assert!(sentinel.instructions.is_empty());
        assert!(sentinel.is_sentinel());
    }

    #[test]
    fn test_serializes_with_plain_field_names() {
        let record = MedicineRecord::with_defaults("Ibuprofen", Some("400 mg"), None, None, None);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["name"], "Ibuprofen");
        assert_eq!(json["dose"], "400 mg");
        assert_eq!(json["frequency"], "1 time daily");
        assert_eq!(json.as_object().unwrap().len(), 5);
    }
}
