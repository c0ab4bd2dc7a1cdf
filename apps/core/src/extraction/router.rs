//! Entity Router - sorts recognized spans into record buckets.
//!
//! Medications and activities come from spans. Vital spans (and any label the
//! router does not know) are dropped here; vitals come from the numeric
//! extractor only.

use tracing::debug;

use super::record::{Activity, ActivityCategory, ClinicalRecord, Medication};
use super::span::{EntityCategory, EntitySpan};

/// Substrings that mark an activity as exercise
const EXERCISE_KEYWORDS: &[&str] = &["walk", "yoga"];

/// Destination bucket for a span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Medication,
    Activity,
    /// Not routed: vitals and unknown labels
    Unhandled,
}

impl Route {
    pub fn for_category(category: &EntityCategory) -> Self {
        match category {
            EntityCategory::Medication => Route::Medication,
            EntityCategory::Treatment | EntityCategory::Activity | EntityCategory::Procedure => {
                Route::Activity
            }
            EntityCategory::Vital | EntityCategory::Other(_) => Route::Unhandled,
        }
    }
}

/// Capitalize the first letter of each word and lowercase the rest.
///
/// A word starts after any non-alphabetic character, so "o'brien" becomes
/// "O'Brien" and "METFORMIN-XR" becomes "Metformin-Xr".
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }

    out
}

/// Exercise if the mention contains an exercise keyword, otherwise Medical
pub fn activity_category(text: &str) -> ActivityCategory {
    let lower = text.to_lowercase();
    if EXERCISE_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        ActivityCategory::Exercise
    } else {
        ActivityCategory::Medical
    }
}

/// Route spans into a partial record. Vitals are left empty.
pub fn route_spans(spans: &[EntitySpan]) -> ClinicalRecord {
    let mut record = ClinicalRecord::empty();

    for span in spans {
        match Route::for_category(&span.category) {
            Route::Medication => record.medicines.push(Medication {
                name: title_case(&span.text),
            }),
            Route::Activity => {
                let activity = Activity {
                    title: title_case(&span.text),
                    category: activity_category(&span.text),
                };
                debug!("Activity '{}' ({})", activity.title, activity.category.as_str());
                record.activities.push(activity);
            }
            Route::Unhandled => {
                debug!("Dropping span '{}' with category {}", span.text, span.category);
            }
        }
    }

    record
}
