//! Clinical Extractor - Main orchestrator for the extraction pipeline.
//!
//! 1. Linguistic pass: recognizer spans plus lexical rule spans, in text order
//! 2. Routing of spans into medicines and activities
//! 3. Numeric vital extraction over the raw text, appended last
//!
//! The recognizer is loaded once per process and shared read-only.

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::recognizer::{EntityRecognizer, LexiconRecognizer};
use super::record::ClinicalRecord;
use super::router::route_spans;
use super::rules::RuleSet;
use super::span::EntitySpan;
use super::vitals::VitalExtractor;
use crate::config::{ExtractorConfig, FailurePolicy};
use crate::error::{AppError, AppResult};

type SharedRecognizer = Arc<dyn EntityRecognizer>;

/// Lazy-initialized recognizer (expensive to create with the semantic backend)
static RECOGNIZER: OnceLock<Result<SharedRecognizer, AppError>> = OnceLock::new();

/// Get or initialize the process-wide recognizer.
///
/// The configuration of the first caller decides how the recognizer is built.
pub fn shared_recognizer(config: &ExtractorConfig) -> Result<SharedRecognizer, AppError> {
    RECOGNIZER
        .get_or_init(|| {
            info!("Initializing entity recognizer...");
            load_recognizer(config)
        })
        .clone()
}

#[cfg(not(feature = "semantic"))]
fn load_recognizer(_config: &ExtractorConfig) -> Result<SharedRecognizer, AppError> {
    Ok(Arc::new(LexiconRecognizer::new()))
}

#[cfg(feature = "semantic")]
fn load_recognizer(config: &ExtractorConfig) -> Result<SharedRecognizer, AppError> {
    use super::recognizer::LayeredRecognizer;
    use super::semantic::SemanticRecognizer;

    let semantic = SemanticRecognizer::new(&config.models_dir, config.semantic_threshold)?;
    Ok(Arc::new(LayeredRecognizer::new(
        Box::new(LexiconRecognizer::new()),
        Box::new(semantic),
    )))
}

/// Main extractor that runs the whole pipeline for one text at a time
pub struct ClinicalExtractor {
    recognizer: Result<SharedRecognizer, AppError>,
    rules: RuleSet,
    vital_extractor: VitalExtractor,
    config: ExtractorConfig,
}

impl ClinicalExtractor {
    /// Create an extractor backed by the process-wide recognizer.
    ///
    /// A recognizer that failed to load is not an error here; it surfaces on
    /// the first extraction according to the failure policy.
    pub fn new(config: ExtractorConfig) -> Self {
        let recognizer = shared_recognizer(&config);
        if let Err(ref e) = recognizer {
            warn!("Entity recognizer failed to initialize: {}", e);
        }
        Self::from_parts(recognizer, RuleSet::clinical(), config)
    }

    /// Create an extractor with an explicit recognizer
    pub fn with_recognizer(recognizer: SharedRecognizer, config: ExtractorConfig) -> Self {
        Self::from_parts(Ok(recognizer), RuleSet::clinical(), config)
    }

    /// Create an extractor from its parts (custom rules, or a recognizer that failed to load)
    pub fn from_parts(
        recognizer: Result<SharedRecognizer, AppError>,
        rules: RuleSet,
        config: ExtractorConfig,
    ) -> Self {
        Self {
            recognizer,
            rules,
            vital_extractor: VitalExtractor::new(),
            config,
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Recognizer spans followed by rule spans, ordered by start offset.
    ///
    /// Overlapping recognizer and rule spans are both kept unless
    /// `dedupe_spans` is set.
    fn linguistic_pass(&self, text: &str) -> AppResult<Vec<EntitySpan>> {
        let recognizer = self.recognizer.as_ref().map_err(|e| e.clone())?;

        let mut spans = recognizer.recognize(text)?;
        let recognized = spans.len();
        spans.extend(self.rules.apply(text));
        // Stable: recognizer spans stay ahead of rule spans at the same offset
        spans.sort_by_key(|s| s.start);

        debug!(
            "Linguistic pass ({}): {} recognized, {} from rules",
            recognizer.name(),
            recognized,
            spans.len() - recognized
        );

        if self.config.dedupe_spans {
            spans = dedupe_spans(spans);
        }

        Ok(spans)
    }

    /// Extract a clinical record from raw text
    pub fn extract(&self, text: &str) -> AppResult<ClinicalRecord> {
        let start = Instant::now();

        if text.trim().is_empty() {
            return Ok(ClinicalRecord::empty());
        }

        // 1. Linguistic pass (recognizer + rules)
        let spans = match self.linguistic_pass(text) {
            Ok(spans) => spans,
            Err(e @ AppError::RecognizerUnavailable(_)) => match self.config.on_recognizer_failure {
                FailurePolicy::Fail => return Err(e),
                FailurePolicy::RegexOnly => {
                    warn!("{}; continuing with numeric vitals only", e);
                    Vec::new()
                }
            },
            Err(e) => return Err(e),
        };

        // 2. Route spans into medicines and activities
        let mut record = route_spans(&spans);

        // 3. Numeric vitals, independent of the spans
        record.vitals.extend(self.vital_extractor.extract(text));

        info!(
            "Extraction finished in {}ms: {}",
            start.elapsed().as_millis(),
            record.summary()
        );

        Ok(record)
    }

    /// Extract and serialize in one step
    pub fn extract_json(&self, text: &str, pretty: bool) -> AppResult<String> {
        let record = self.extract(text)?;
        if pretty {
            record.to_json_pretty()
        } else {
            record.to_json()
        }
    }
}

/// Keep the first span for each (lowercased text, category) pair
fn dedupe_spans(spans: Vec<EntitySpan>) -> Vec<EntitySpan> {
    let mut seen = HashSet::new();
    spans
        .into_iter()
        .filter(|span| seen.insert((span.text.to_lowercase(), span.category.clone())))
        .collect()
}

/// Run the pipeline for an optional input text.
///
/// No text yields the empty record without loading the recognizer.
pub fn extract_clinical_data(
    text: Option<&str>,
    config: ExtractorConfig,
    pretty: bool,
) -> AppResult<String> {
    match text {
        Some(text) => ClinicalExtractor::new(config).extract_json(text, pretty),
        None if pretty => ClinicalRecord::empty().to_json_pretty(),
        None => ClinicalRecord::empty().to_json(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::record::ActivityCategory;
    use crate::extraction::span::EntityCategory;

    fn extractor() -> ClinicalExtractor {
        ClinicalExtractor::with_recognizer(
            Arc::new(LexiconRecognizer::new()),
            ExtractorConfig::default(),
        )
    }

    #[test]
    fn test_basic_extraction() {
        let record = extractor()
            .extract("BP 120/80, Weight 75kg, walk daily")
            .unwrap();

        assert!(record.medicines.is_empty());
        assert_eq!(record.activities.len(), 1);
        assert_eq!(record.activities[0].title, "Walk");
        assert_eq!(record.activities[0].category, ActivityCategory::Exercise);
        assert_eq!(record.vitals.len(), 2);
    }

    #[test]
    fn test_empty_text() {
        assert!(extractor().extract("").unwrap().is_empty());
        assert!(extractor().extract("  \n ").unwrap().is_empty());
    }

    #[test]
    fn test_config_is_kept() {
        let config = ExtractorConfig {
            dedupe_spans: true,
            on_recognizer_failure: FailurePolicy::RegexOnly,
            ..ExtractorConfig::default()
        };
        let extractor =
            ClinicalExtractor::with_recognizer(Arc::new(LexiconRecognizer::new()), config);
        assert!(extractor.config().dedupe_spans);
        assert_eq!(extractor.config().on_recognizer_failure, FailurePolicy::RegexOnly);
    }

    #[test]
    fn test_absent_text() {
        let json = extract_clinical_data(None, ExtractorConfig::default(), false).unwrap();
        assert_eq!(json, r#"{"medicines":[],"activities":[],"vitals":[]}"#);
    }

    #[test]
    fn test_dedupe_spans() {
        let spans = vec![
            EntitySpan::new("Aspirin", EntityCategory::Medication, 0, 7),
            EntitySpan::new("aspirin", EntityCategory::Medication, 12, 19),
            EntitySpan::new("aspirin", EntityCategory::Treatment, 12, 19),
        ];
        let deduped = dedupe_spans(spans);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].text, "Aspirin");
        assert_eq!(deduped[1].category, EntityCategory::Treatment);
    }

    #[cfg(not(feature = "semantic"))]
    #[test]
    fn test_shared_recognizer_loaded_once() {
        let config = ExtractorConfig::default();
        let first = shared_recognizer(&config).unwrap();
        let second = shared_recognizer(&config).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.name(), "lexicon");
    }

    #[test]
    fn test_recognizer_spans_precede_rules_in_text_order() {
        let record = extractor().extract("yoga then metformin then walk").unwrap();
        assert_eq!(record.medicines.len(), 1);
        let titles: Vec<&str> = record.activities.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Yoga", "Walk"]);
    }
}
