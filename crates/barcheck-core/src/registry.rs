use crate::config::ModelConfig;
use glob::{MatchOptions, Pattern};
use std::collections::HashSet;
use tracing::{debug, error};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Canonical form used for every barcode comparison: trimmed, upper-cased.
pub fn normalize_barcode(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// An accepted barcode identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub name: String,
    pub pattern: String,
}

#[derive(Debug)]
struct RegisteredModel {
    model: Model,
    matcher: Pattern,
}

/// Barcodes already accepted in one scanning session.
///
/// Owned by the caller. Mutation goes through `&mut`, so sharing a session
/// between threads means wrapping it in a `Mutex`.
#[derive(Debug, Default, Clone)]
pub struct ScanSession {
    scanned: HashSet<String>,
}

impl ScanSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.scanned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scanned.is_empty()
    }

    pub fn reset(&mut self) {
        self.scanned.clear();
    }
}

/// The set of models an operator may scan against.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: Vec<RegisteredModel>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(models: &[ModelConfig]) -> Self {
        let mut registry = Self::new();
        for model in models {
            registry.register(&model.name, &model.pattern);
        }
        debug!("Model registry loaded with {} models", registry.len());
        registry
    }

    /// Add a model. `pattern` is a glob (`*`, `?`, `[..]`) compared against
    /// the normalized barcode; invalid patterns are logged and skipped.
    pub fn register(&mut self, name: &str, pattern: &str) -> bool {
        let normalized = normalize_barcode(pattern);
        if normalized.is_empty() {
            error!("Model '{}' has an empty pattern, skipping", name);
            return false;
        }
        match Pattern::new(&normalized) {
            Ok(matcher) => {
                self.models.push(RegisteredModel {
                    model: Model {
                        name: name.to_string(),
                        pattern: pattern.to_string(),
                    },
                    matcher,
                });
                true
            }
            Err(e) => {
                error!("Invalid pattern '{}' for model '{}': {}", pattern, name, e);
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn models(&self) -> impl Iterator<Item = &Model> {
        self.models.iter().map(|m| &m.model)
    }

    /// First registered model matching the barcode.
    pub fn try_match_model(&self, barcode: &str) -> Option<&Model> {
        let normalized = normalize_barcode(barcode);
        if normalized.is_empty() {
            return None;
        }
        self.models
            .iter()
            .find(|m| m.matcher.matches_with(&normalized, MATCH_OPTIONS))
            .map(|m| &m.model)
    }

    pub fn is_barcode_scanned(&self, session: &ScanSession, barcode: &str) -> bool {
        session.scanned.contains(&normalize_barcode(barcode))
    }

    pub fn mark_scanned(&self, session: &mut ScanSession, barcode: &str) {
        session.scanned.insert(normalize_barcode(barcode));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ModelRegistry {
        let mut registry = ModelRegistry::new();
        registry.register("exact", "ABC123");
        registry.register("family", "xyz-*");
        registry
    }

    #[test]
    fn test_normalize_trims_and_uppercases() {
        assert_eq!(normalize_barcode("  abc123\r\n"), "ABC123");
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let registry = registry();
        assert_eq!(registry.try_match_model("abc123").unwrap().name, "exact");
        assert_eq!(registry.try_match_model(" Xyz-0001 ").unwrap().name, "family");
        assert!(registry.try_match_model("ABC1234").is_none());
        assert!(registry.try_match_model("   ").is_none());
    }

    #[test]
    fn test_invalid_pattern_is_skipped() {
        let mut registry = ModelRegistry::new();
        assert!(!registry.register("broken", "[AB"));
        assert!(!registry.register("blank", "  "));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_models_keep_registration_order_and_pattern_text() {
        let registry = registry();
        let models: Vec<&Model> = registry.models().collect();
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].name, "exact");
        assert_eq!(models[1].pattern, "xyz-*");
    }

    #[test]
    fn test_first_registered_model_wins() {
        let mut registry = ModelRegistry::new();
        registry.register("wide", "A*");
        registry.register("narrow", "AB*");
        assert_eq!(registry.try_match_model("ABC").unwrap().name, "wide");
    }

    #[test]
    fn test_mark_scanned_is_idempotent_and_session_scoped() {
        let registry = registry();
        let mut session = ScanSession::new();
        let other = ScanSession::new();

        registry.mark_scanned(&mut session, "abc123");
        registry.mark_scanned(&mut session, " ABC123 ");
        assert_eq!(session.len(), 1);
        assert!(registry.is_barcode_scanned(&session, "Abc123"));
        assert!(!registry.is_barcode_scanned(&other, "ABC123"));

        session.reset();
        assert!(!registry.is_barcode_scanned(&session, "ABC123"));
    }
}
