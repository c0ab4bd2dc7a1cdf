//! rxscan core: structured clinical facts from prescription text.

pub mod config;
pub mod error;
pub mod extraction;
pub mod fs_manager;
pub mod logging;
pub mod text_extract;

pub use config::{ExtractorConfig, FailurePolicy};
pub use error::{AppError, AppResult};
pub use extraction::{extract_clinical_data, ClinicalExtractor, ClinicalRecord};

#[cfg(test)]
mod tests;
