//! Placeholder Resolver - binds rule templates to a work order
//!
//! Templates embed bare field codes: a `GJ` or `JT` prefix followed by
//! exactly five digits, with no ASCII letter or digit touching either
//! side (a code inside a longer identifier is not a token). `GJ` codes
//! read the work order; `JT` codes ask the external structured lookup.
//! Unresolvable tokens stay as literal text so the output still shows
//! the code, signaling the data gap.

use crate::work_order::WorkOrder;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::warn;

/// External structured-lookup collaborator, keyed by `JTxxxxx` token.
pub trait StructuredLookup: Send + Sync {
    /// `Ok(None)` when the service knows nothing about the token.
    fn fetch(&self, token: &str) -> anyhow::Result<Option<Value>>;
}

/// Candidate tokens; real boundaries are checked separately because
/// the templates are Chinese text and `\b` treats Han characters as
/// word characters.
static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:GJ|JT)[0-9]{5}").expect("token pattern must compile"));

/// Resolve every placeholder token in `template` against the work
/// order and the structured lookup.
///
/// Single pass: tokens are collected once and replaced in order;
/// substituted values are never rescanned, so resolution cannot
/// recurse and is idempotent for a given (template, order) pair.
pub fn resolve_template(
    template: &str,
    order: &WorkOrder,
    lookup: &dyn StructuredLookup,
) -> String {
    if template.is_empty() {
        return String::new();
    }

    let mut out = String::with_capacity(template.len());
    let mut tail = 0;

    for found in TOKEN.find_iter(template) {
        if !has_token_boundary(template, found.start(), found.end()) {
            continue;
        }

        out.push_str(&template[tail..found.start()]);
        let token = found.as_str();

        let replacement = if token.starts_with("GJ") {
            order.field(token).map(str::to_string)
        } else {
            resolve_lookup(token, lookup)
        };

        // Literal passthrough on any gap
        out.push_str(replacement.as_deref().unwrap_or(token));
        tail = found.end();
    }

    out.push_str(&template[tail..]);
    out
}

/// A token must not touch an ASCII letter or digit on either side;
/// Chinese text and punctuation are valid neighbors.
fn has_token_boundary(template: &str, start: usize, end: usize) -> bool {
    let before = template[..start].chars().next_back();
    let after = template[end..].chars().next();
    !before.is_some_and(|c| c.is_ascii_alphanumeric())
        && !after.is_some_and(|c| c.is_ascii_alphanumeric())
}

/// Ask the structured lookup for a `JT` token; lookup failures are
/// recovered locally (the token stays literal).
fn resolve_lookup(token: &str, lookup: &dyn StructuredLookup) -> Option<String> {
    match lookup.fetch(token) {
        Ok(Some(value)) => Some(stringify(&value)),
        Ok(None) => None,
        Err(err) => {
            warn!("structured lookup for {} failed: {:#}", token, err);
            None
        }
    }
}

/// Stringify a looked-up value into template text: bare strings embed
/// as-is, structured values as compact JSON.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
