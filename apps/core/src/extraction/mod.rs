//! # Extraction Module
//!
//! Turns free prescription text into a [`ClinicalRecord`] of medicines,
//! activities and vitals.
//!
//! ## Components
//! - `span`: entity spans, category labels and tokenization
//! - `recognizer`: entity recognition capability and the built-in lexicon
//! - `semantic`: embedding-based recognizer (feature `semantic`)
//! - `rules`: lexical target rules (bp, weight, yoga, walk)
//! - `router`: routes spans into medicines and activities
//! - `vitals`: regex extraction of blood pressure and weight
//! - `record`: output data structure
//! - `pipeline`: main orchestrator

pub mod pipeline;
pub mod recognizer;
pub mod record;
pub mod router;
pub mod rules;
#[cfg(feature = "semantic")]
pub mod semantic;
pub mod span;
pub mod vitals;

pub use pipeline::{extract_clinical_data, shared_recognizer, ClinicalExtractor};
pub use recognizer::{EntityRecognizer, LayeredRecognizer, LexiconRecognizer};
pub use record::{Activity, ActivityCategory, ClinicalRecord, Medication, Vital};
pub use router::{route_spans, title_case, Route};
pub use rules::{RuleSet, RuleSetBuilder, TargetRule};
#[cfg(feature = "semantic")]
pub use semantic::SemanticRecognizer;
pub use span::{EntityCategory, EntitySpan};
pub use vitals::VitalExtractor;
