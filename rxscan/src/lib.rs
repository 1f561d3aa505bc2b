//! rxscan: reads medicine names, doses and schedules out of photographed
//! prescriptions.
//!
//! An upload is normalized to a clean black-and-white page ([`ocr`]),
//! recognized by tesseract and parsed into [`prescription::MedicineRecord`]s.
//! [`api`] serves the HTML form and JSON endpoints around that
//! [`pipeline::PrescriptionPipeline`].

pub mod api;
pub mod config;
pub mod error;
pub mod ocr;
pub mod pipeline;
pub mod prescription;
pub mod upload;
