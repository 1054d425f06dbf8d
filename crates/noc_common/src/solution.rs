//! Solution Resolver - maps solution codes to remediation text
//!
//! Codes in the `FA` family key into the external document store.
//! Anything else is treated as already-resolved text and passed
//! through (the measurement tables occasionally carry literal advice
//! like "无需处理" in the solution slot).

use tracing::warn;

/// Prefix of the remediation-document code family.
pub const SOLUTION_CODE_PREFIX: &str = "FA";

/// External remediation-document store, keyed by solution code.
pub trait SolutionStore: Send + Sync {
    /// `Ok(None)` when no document exists for the code.
    fn fetch_document(&self, code: &str) -> anyhow::Result<Option<String>>;
}

/// Resolve a solution code to document text.
///
/// A missing document yields an empty string, not an error - the
/// diagnosis still returns the code itself even when the narrative
/// text is unavailable.
pub fn resolve_solution(code: &str, store: &dyn SolutionStore) -> String {
    if code.is_empty() {
        return String::new();
    }
    if !code.starts_with(SOLUTION_CODE_PREFIX) {
        // Already-resolved literal text
        return code.to_string();
    }

    match store.fetch_document(code) {
        Ok(Some(text)) => text,
        Ok(None) => String::new(),
        Err(err) => {
            warn!("solution document '{}' unavailable: {:#}", code, err);
            String::new()
        }
    }
}
