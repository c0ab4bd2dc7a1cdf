//! Lexical target rules that extend the recognizer's vocabulary.
//!
//! A rule matches a single token by case-insensitive equality. Rules are
//! collected with [`RuleSetBuilder`] once at startup and frozen into a
//! [`RuleSet`] that every extraction call reads.

use std::collections::HashMap;
use tracing::debug;

use super::span::{tokenize, EntityCategory, EntitySpan, Token};

/// One lexical rule: a display name, the category it assigns and the token it matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRule {
    pub name: String,
    pub category: EntityCategory,
    /// Lowercased token to match
    pub token: String,
}

impl TargetRule {
    pub fn new(name: impl Into<String>, category: EntityCategory, token: &str) -> Self {
        Self {
            name: name.into(),
            category,
            token: token.trim().to_lowercase(),
        }
    }
}

/// Rules registered for clinical prescriptions
const CLINICAL_RULES: &[(&str, &str, &str)] = &[
    ("Blood Pressure", "VITAL", "bp"),
    ("Weight", "VITAL", "weight"),
    ("Yoga", "ACTIVITY", "yoga"),
    ("Walk", "ACTIVITY", "walk"),
];

/// Collects rules before they are frozen.
#[derive(Debug, Default)]
pub struct RuleSetBuilder {
    rules: Vec<TargetRule>,
}

impl RuleSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one rule. Registering an identical rule twice has no effect.
    pub fn add(mut self, rule: TargetRule) -> Self {
        if rule.token.is_empty() {
            return self;
        }
        if !self.rules.contains(&rule) {
            self.rules.push(rule);
        }
        self
    }

    /// Register several rules in order
    pub fn add_all(self, rules: impl IntoIterator<Item = TargetRule>) -> Self {
        rules.into_iter().fold(self, |builder, rule| builder.add(rule))
    }

    pub fn build(self) -> RuleSet {
        let mut by_token: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, rule) in self.rules.iter().enumerate() {
            by_token.entry(rule.token.clone()).or_default().push(idx);
        }
        debug!("Built rule set with {} rules", self.rules.len());
        RuleSet {
            rules: self.rules,
            by_token,
        }
    }
}

/// Immutable set of lexical rules.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<TargetRule>,
    by_token: HashMap<String, Vec<usize>>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::clinical()
    }
}

impl RuleSet {
    pub fn builder() -> RuleSetBuilder {
        RuleSetBuilder::new()
    }

    /// The fixed rule set for prescription text (bp, weight, yoga, walk)
    pub fn clinical() -> Self {
        Self::builder()
            .add_all(
                CLINICAL_RULES
                    .iter()
                    .map(|(name, label, token)| {
                        TargetRule::new(*name, EntityCategory::from_label(label), token)
                    }),
            )
            .build()
    }

    pub fn rules(&self) -> &[TargetRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Find every token of `text` that a rule matches.
    ///
    /// A compound token ("walk-in", "walk's") that no rule matches whole is
    /// matched piece by piece. The span keeps the text as written in the
    /// input, not the rule's display name.
    pub fn apply(&self, text: &str) -> Vec<EntitySpan> {
        let mut spans = Vec::new();
        for token in tokenize(text) {
            if self.match_token(&token, &mut spans) {
                continue;
            }
            let parts = token.parts();
            if parts.len() > 1 {
                for part in &parts {
                    self.match_token(part, &mut spans);
                }
            }
        }
        spans
    }

    fn match_token(&self, token: &Token<'_>, spans: &mut Vec<EntitySpan>) -> bool {
        let Some(indices) = self.by_token.get(&token.text.to_lowercase()) else {
            return false;
        };
        for &idx in indices {
            spans.push(EntitySpan::new(
                token.text,
                self.rules[idx].category.clone(),
                token.start,
                token.end,
            ));
        }
        true
    }
}
