//! Entity recognition capability.
//!
//! The pipeline only depends on [`EntityRecognizer`]: given text, produce
//! spans with category labels. [`LexiconRecognizer`] is the built-in backend,
//! a curated clinical vocabulary with longest-match lookup over tokens.

use std::collections::HashMap;
use tracing::debug;

use super::span::{tokenize, EntityCategory, EntitySpan};
use crate::error::AppResult;

/// Given text, produce spans with category labels.
///
/// Implementations are loaded once and shared read-only between calls.
pub trait EntityRecognizer: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &str;

    /// Recognize entity spans in `text`, in text order.
    fn recognize(&self, text: &str) -> AppResult<Vec<EntitySpan>>;
}

/// Common drug names (generic and a few brand names seen on prescriptions)
const MEDICATIONS: &[&str] = &[
    "metformin",
    "glimepiride",
    "gliclazide",
    "sitagliptin",
    "insulin",
    "aspirin",
    "clopidogrel",
    "warfarin",
    "paracetamol",
    "acetaminophen",
    "ibuprofen",
    "diclofenac",
    "tramadol",
    "amoxicillin",
    "azithromycin",
    "ciprofloxacin",
    "doxycycline",
    "atorvastatin",
    "rosuvastatin",
    "simvastatin",
    "lisinopril",
    "losartan",
    "telmisartan",
    "amlodipine",
    "metoprolol",
    "atenolol",
    "furosemide",
    "hydrochlorothiazide",
    "omeprazole",
    "pantoprazole",
    "ranitidine",
    "levothyroxine",
    "thyroxine",
    "cetirizine",
    "montelukast",
    "salbutamol",
    "prednisolone",
    "folic acid",
    "vitamin d",
    "vitamin d3",
    "vitamin b12",
    "calcium carbonate",
    "ferrous sulfate",
];

/// Therapies and ongoing care instructions
const TREATMENTS: &[&str] = &[
    "therapy",
    "physiotherapy",
    "physical therapy",
    "physio",
    "occupational therapy",
    "dialysis",
    "chemotherapy",
    "radiotherapy",
    "counselling",
    "counseling",
    "nebulization",
    "wound dressing",
    "diabetic diet",
    "low salt diet",
];

/// Diagnostic and surgical procedures
const PROCEDURES: &[&str] = &[
    "ecg",
    "ekg",
    "x-ray",
    "chest x-ray",
    "mri",
    "ct scan",
    "ultrasound",
    "echocardiogram",
    "blood test",
    "urine test",
    "lipid profile",
    "hba1c",
    "biopsy",
    "endoscopy",
    "colonoscopy",
    "angiography",
];

/// Lifestyle activities a prescription may recommend
const ACTIVITIES: &[&str] = &[
    "exercise",
    "meditation",
    "swimming",
    "cycling",
    "jogging",
    "stretching",
    "breathing exercises",
];

/// Recognizer backed by a curated clinical vocabulary.
pub struct LexiconRecognizer {
    /// Term (lowercased tokens joined by a space) to category
    terms: HashMap<String, EntityCategory>,
    /// Longest term in tokens
    max_term_tokens: usize,
}

impl Default for LexiconRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconRecognizer {
    /// Create a recognizer with the built-in clinical vocabulary
    pub fn new() -> Self {
        let mut recognizer = Self {
            terms: HashMap::new(),
            max_term_tokens: 0,
        };

        for (terms, category) in [
            (MEDICATIONS, EntityCategory::Medication),
            (TREATMENTS, EntityCategory::Treatment),
            (PROCEDURES, EntityCategory::Procedure),
            (ACTIVITIES, EntityCategory::Activity),
        ] {
            for term in terms {
                recognizer.insert(term, category.clone());
            }
        }

        debug!("Lexicon loaded with {} terms", recognizer.terms.len());
        recognizer
    }

    /// Create an empty recognizer (for custom vocabularies)
    pub fn empty() -> Self {
        Self {
            terms: HashMap::new(),
            max_term_tokens: 0,
        }
    }

    /// Add a term. Later insertions override earlier ones for the same term.
    pub fn with_term(mut self, term: &str, category: EntityCategory) -> Self {
        self.insert(term, category);
        self
    }

    fn insert(&mut self, term: &str, category: EntityCategory) {
        let key = normalize_term(term);
        if key.is_empty() {
            return;
        }
        let token_count = key.split(' ').count();
        self.max_term_tokens = self.max_term_tokens.max(token_count);
        self.terms.insert(key, category);
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Look up a single term
    pub fn category_of(&self, term: &str) -> Option<&EntityCategory> {
        self.terms.get(&normalize_term(term))
    }
}

/// Lowercase and re-join tokens so terms and text are compared the same way.
fn normalize_term(term: &str) -> String {
    tokenize(term)
        .iter()
        .map(|t| t.text.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

impl EntityRecognizer for LexiconRecognizer {
    fn name(&self) -> &str {
        "lexicon"
    }

    fn recognize(&self, text: &str) -> AppResult<Vec<EntitySpan>> {
        let tokens = tokenize(text);
        let lowered: Vec<String> = tokens.iter().map(|t| t.text.to_lowercase()).collect();
        let mut spans = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            let longest = self.max_term_tokens.min(tokens.len() - i);
            let mut matched = 0;

            // Longest match first so "physical therapy" wins over "therapy"
            for n in (1..=longest).rev() {
                let key = lowered[i..i + n].join(" ");
                if let Some(category) = self.terms.get(&key) {
                    spans.push(EntitySpan::from_range(
                        text,
                        tokens[i].start,
                        tokens[i + n - 1].end,
                        category.clone(),
                    ));
                    matched = n;
                    break;
                }
            }

            i += matched.max(1);
        }

        Ok(spans)
    }
}

/// Runs two recognizers and merges their spans.
///
/// Every primary span is kept. Secondary spans are kept only where they do
/// not overlap a primary span. The result is ordered by start offset.
pub struct LayeredRecognizer {
    primary: Box<dyn EntityRecognizer>,
    secondary: Box<dyn EntityRecognizer>,
    name: String,
}

impl LayeredRecognizer {
    pub fn new(primary: Box<dyn EntityRecognizer>, secondary: Box<dyn EntityRecognizer>) -> Self {
        let name = format!("{}+{}", primary.name(), secondary.name());
        Self {
            primary,
            secondary,
            name,
        }
    }
}

impl EntityRecognizer for LayeredRecognizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn recognize(&self, text: &str) -> AppResult<Vec<EntitySpan>> {
        let mut spans = self.primary.recognize(text)?;
        let extra: Vec<EntitySpan> = self
            .secondary
            .recognize(text)?
            .into_iter()
            .filter(|candidate| {
                !spans
                    .iter()
                    .any(|kept| candidate.start < kept.end && kept.start < candidate.end)
            })
            .collect();

        spans.extend(extra);
        spans.sort_by_key(|s| s.start);
        Ok(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_word_medication() {
        let recognizer = LexiconRecognizer::new();
        let spans = recognizer.recognize("Take Metformin 500mg twice daily").unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Metformin");
        assert_eq!(spans[0].category, EntityCategory::Medication);
    }

    #[test]
    fn test_longest_match_wins() {
        let recognizer = LexiconRecognizer::new();
        let spans = recognizer.recognize("start physical therapy next week").unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "physical therapy");
        assert_eq!(spans[0].category, EntityCategory::Treatment);
    }

    #[test]
    fn test_multi_token_span_keeps_original_text() {
        let recognizer = LexiconRecognizer::new();
        let spans = recognizer.recognize("Vitamin B12 weekly, Chest X-Ray").unwrap();
        let texts: Vec<&str> = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Vitamin B12", "Chest X-Ray"]);
    }

    #[test]
    fn test_spans_in_text_order() {
        let recognizer = LexiconRecognizer::new();
        let spans = recognizer.recognize("aspirin, ECG, then aspirin again").unwrap();
        let starts: Vec<usize> = spans.iter().map(|s| s.start).collect();
        let mut sorted = starts.clone();
        sorted.sort();
        assert_eq!(starts, sorted);
        assert_eq!(spans.len(), 3);
    }

    #[test]
    fn test_unknown_text() {
        let recognizer = LexiconRecognizer::new();
        assert!(recognizer.recognize("nothing clinical here").unwrap().is_empty());
        assert!(recognizer.recognize("").unwrap().is_empty());
    }

    #[test]
    fn test_custom_term() {
        let recognizer = LexiconRecognizer::empty().with_term("Zolpidem", EntityCategory::Medication);
        assert_eq!(recognizer.len(), 1);
        assert_eq!(recognizer.category_of("zolpidem"), Some(&EntityCategory::Medication));
    }

    struct Fixed(Vec<EntitySpan>);

    impl EntityRecognizer for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn recognize(&self, _text: &str) -> AppResult<Vec<EntitySpan>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_layered_skips_overlapping_secondary_spans() {
        let primary = Fixed(vec![EntitySpan::new("metformin", EntityCategory::Medication, 10, 19)]);
        let secondary = Fixed(vec![
            EntitySpan::new("metformin", EntityCategory::Treatment, 10, 19),
            EntitySpan::new("stretches", EntityCategory::Activity, 0, 9),
        ]);

        let layered = LayeredRecognizer::new(Box::new(primary), Box::new(secondary));
        let spans = layered.recognize("stretches metformin").unwrap();

        assert_eq!(layered.name(), "fixed+fixed");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "stretches");
        assert_eq!(spans[1].category, EntityCategory::Medication);
    }
}
