//! Post-processing of raw suggestion candidates.
//!
//! The walker returns every candidate that is valid at the cursor. A
//! [`SuggestionProcessor`] turns that into what the user sees.

use indexmap::IndexSet;

/// Filters and orders raw candidates for the token being completed.
pub trait SuggestionProcessor: Send + Sync {
    /// Final suggestions for `partial` from `candidates`.
    fn process(&self, partial: &str, candidates: Vec<String>) -> Vec<String>;
}

/// Keeps candidates starting with the partial token (ignoring case),
/// removes duplicates keeping first occurrence, and optionally caps the list.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilteringSuggestionProcessor {
    max: Option<usize>,
}

impl FilteringSuggestionProcessor {
    /// A processor without a cap.
    #[must_use]
    pub const fn new() -> Self {
        Self { max: None }
    }

    /// Keeps at most `max` suggestions.
    #[must_use]
    pub const fn with_max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }
}

impl SuggestionProcessor for FilteringSuggestionProcessor {
    fn process(&self, partial: &str, candidates: Vec<String>) -> Vec<String> {
        let prefix = partial.to_lowercase();
        let unique: IndexSet<String> = candidates
            .into_iter()
            .filter(|candidate| candidate.to_lowercase().starts_with(&prefix))
            .collect();
        let limit = self.max.unwrap_or(usize::MAX);
        unique.into_iter().take(limit).collect()
    }
}
