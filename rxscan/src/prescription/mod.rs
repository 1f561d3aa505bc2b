//! Structured medicine records parsed out of prescription text.

pub mod extractor;
mod models;

pub use extractor::{extract_medicines, scan_mentions, Mention};
pub use models::{
    MedicineRecord, DEFAULT_DOSE, DEFAULT_DURATION, DEFAULT_FREQUENCY, DEFAULT_INSTRUCTIONS,
    NO_MEDICINES_DETECTED,
};
