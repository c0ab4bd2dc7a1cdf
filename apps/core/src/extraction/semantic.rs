//! Semantic entity recognition using FastEmbed embeddings.
//!
//! Candidate tokens are embedded and compared by cosine similarity with
//! per-category descriptions. Catches drug and therapy names the lexicon does
//! not list. Uses the AllMiniLML6V2 model, cached under the models directory.

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::path::Path;
use tracing::{debug, info, warn};

use super::recognizer::EntityRecognizer;
use super::span::{tokenize, EntityCategory, EntitySpan};
use crate::error::{AppError, AppResult};
use crate::fs_manager::PortablePathManager;

/// Category description for semantic matching
struct CategoryTemplate {
    category: EntityCategory,
    descriptions: &'static [&'static str],
}

const CATEGORY_TEMPLATES: &[CategoryTemplate] = &[
    CategoryTemplate {
        category: EntityCategory::Medication,
        descriptions: &[
            "medication drug medicine",
            "tablet capsule pill syrup injection",
            "antibiotic painkiller statin antihypertensive",
            "prescribed pharmaceutical compound",
        ],
    },
    CategoryTemplate {
        category: EntityCategory::Treatment,
        descriptions: &[
            "medical treatment therapy",
            "rehabilitation physiotherapy dialysis",
            "care regimen counselling",
        ],
    },
    CategoryTemplate {
        category: EntityCategory::Procedure,
        descriptions: &[
            "diagnostic test scan imaging",
            "laboratory blood test examination",
            "surgical procedure operation",
        ],
    },
    CategoryTemplate {
        category: EntityCategory::Activity,
        descriptions: &[
            "physical exercise activity",
            "sport fitness workout",
            "lifestyle habit relaxation",
        ],
    },
];

/// Words that are never entity candidates
const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "from", "after", "before", "daily", "twice", "once", "every",
    "take", "each", "morning", "evening", "night", "days", "week", "weeks", "month", "then",
    "should", "must", "also", "times", "tablet", "tablets", "patient", "dose", "doses",
];

const MIN_CANDIDATE_LEN: usize = 4;

/// Entity recognizer using embeddings
pub struct SemanticRecognizer {
    model: TextEmbedding,
    category_embeddings: Vec<(EntityCategory, Vec<f32>)>,
    threshold: f32,
}

impl SemanticRecognizer {
    /// Load the embedding model and pre-compute category embeddings.
    pub fn new(models_dir: &Path, threshold: f32) -> AppResult<Self> {
        let mut options = InitOptions::new(EmbeddingModel::AllMiniLML6V2);
        options.show_download_progress = false;
        options.cache_dir = PortablePathManager::embeddings_dir(models_dir);

        let model = TextEmbedding::try_new(options).map_err(|e| {
            warn!("Failed to load embedding model for entity recognition: {}", e);
            AppError::RecognizerUnavailable(format!("embedding model: {}", e))
        })?;

        let mut recognizer = Self {
            model,
            category_embeddings: Vec::new(),
            threshold,
        };
        recognizer.precompute_category_embeddings()?;
        Ok(recognizer)
    }

    /// Pre-compute embeddings for all category descriptions
    fn precompute_category_embeddings(&mut self) -> AppResult<()> {
        info!("Pre-computing category embeddings...");

        for template in CATEGORY_TEMPLATES {
            let combined_text = template.descriptions.join(" ");
            let embeddings = self
                .model
                .embed(vec![combined_text], None)
                .map_err(|e| AppError::RecognizerUnavailable(format!("embedding failed: {}", e)))?;

            match embeddings.into_iter().next() {
                Some(embedding) => self
                    .category_embeddings
                    .push((template.category.clone(), embedding)),
                None => warn!("Empty embedding for category {}", template.category),
            }
        }

        if self.category_embeddings.is_empty() {
            return Err(AppError::RecognizerUnavailable(
                "no category embeddings computed".to_string(),
            ));
        }

        info!(
            "Pre-computed {} category embeddings",
            self.category_embeddings.len()
        );
        Ok(())
    }

    /// Best category and similarity for one embedding
    fn best_category(&self, embedding: &[f32]) -> Option<(&EntityCategory, f32)> {
        self.category_embeddings
            .iter()
            .map(|(category, reference)| (category, cosine_similarity(embedding, reference)))
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
    }
}

fn is_candidate(word: &str) -> bool {
    word.chars().count() >= MIN_CANDIDATE_LEN
        && word.chars().all(|c| c.is_alphabetic() || c == '-')
        && !STOPWORDS.contains(&word.to_lowercase().as_str())
}

impl EntityRecognizer for SemanticRecognizer {
    fn name(&self) -> &str {
        "semantic"
    }

    fn recognize(&self, text: &str) -> AppResult<Vec<EntitySpan>> {
        let candidates: Vec<_> = tokenize(text)
            .into_iter()
            .filter(|t| is_candidate(t.text))
            .collect();

        if candidates.is_empty() {
            return Ok(vec![]);
        }

        let inputs: Vec<String> = candidates.iter().map(|t| t.text.to_lowercase()).collect();
        let embeddings = self
            .model
            .embed(inputs, None)
            .map_err(|e| AppError::RecognizerUnavailable(format!("embedding failed: {}", e)))?;

        let mut spans = Vec::new();
        for (token, embedding) in candidates.iter().zip(embeddings.iter()) {
            let Some((category, similarity)) = self.best_category(embedding) else {
                continue;
            };
            if similarity >= self.threshold {
                debug!(
                    "Semantic match '{}' -> {} ({:.2})",
                    token.text, category, similarity
                );
                spans.push(EntitySpan::new(
                    token.text,
                    category.clone(),
                    token.start,
                    token.end,
                ));
            }
        }

        Ok(spans)
    }
}

/// Calculate cosine similarity between two vectors
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c) - 0.0).abs() < 0.001);

        assert_eq!(cosine_similarity(&a, &[]), 0.0);
    }

    #[test]
    fn test_candidates() {
        assert!(is_candidate("Dolo"));
        assert!(is_candidate("nebulizer"));
        assert!(!is_candidate("the"));
        assert!(!is_candidate("daily"));
        assert!(!is_candidate("500"));
    }

    #[test]
    fn test_semantic_recognizer_creation() {
        // Requires the model to be downloadable; skipped when offline
        let dir = PortablePathManager::models_dir();
        if let Ok(recognizer) = SemanticRecognizer::new(&dir, 0.45) {
            assert_eq!(recognizer.category_embeddings.len(), CATEGORY_TEMPLATES.len());
            let spans = recognizer.recognize("").unwrap();
            assert!(spans.is_empty());
        }
    }
}
