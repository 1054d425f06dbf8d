//! Alarm details parsing
//!
//! The `details` blob arrives as line-oriented `key：value` text where
//! the `告警原文` (original alarm) value is usually embedded JSON and
//! its `addInfo` field a semicolon-separated pair list. Each layer is
//! parsed best effort and returns an explicit `Option` - when a layer
//! does not parse, the raw text is kept, never silently dropped.

use serde_json::{Map, Value};

/// Key of the embedded original-alarm JSON inside the details blob.
const ALARM_ORIGINAL_KEY: &str = "告警原文";

/// Keys longer than this are assumed to be continuation text, not keys.
const MAX_KEY_CHARS: usize = 30;

/// Parse the free-form details blob into a key/value map.
///
/// Returns `None` when the blob yields no key/value structure at all;
/// the caller keeps the raw string in that case.
pub fn parse_details(raw: &str) -> Option<Map<String, Value>> {
    let mut parsed: Map<String, Value> = Map::new();
    let mut current_key: Option<String> = None;

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match split_key_value(line) {
            Some((key, value)) => {
                parsed.insert(key.to_string(), Value::String(value.to_string()));
                current_key = Some(key.to_string());
            }
            None => {
                // Continuation of the previous value (broken line)
                if let Some(key) = &current_key {
                    if let Some(Value::String(existing)) = parsed.get_mut(key) {
                        existing.push('\n');
                        existing.push_str(line);
                    }
                }
            }
        }
    }

    if parsed.is_empty() {
        return None;
    }

    // Second layer: the original-alarm value is usually JSON.
    if let Some(Value::String(text)) = parsed.get(ALARM_ORIGINAL_KEY) {
        if let Some(alarm) = parse_alarm_original(text) {
            parsed.insert(ALARM_ORIGINAL_KEY.to_string(), alarm);
        }
    }

    Some(parsed)
}

/// Split one line into a key/value pair, preferring the full-width
/// colon. Returns `None` when the line does not look like a new key.
fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let separator = if line.contains('：') { "：" } else { ":" };
    let (key, value) = line.split_once(separator)?;
    let key = key.trim();

    // Heuristic: a key carries no quotes or braces and stays short.
    if key.contains('"') || key.contains('{') || key.chars().count() >= MAX_KEY_CHARS {
        return None;
    }

    Some((key, value.trim()))
}

/// Parse the original-alarm text as JSON; when it is an object with a
/// string `addInfo`, additionally expand the semicolon pair list.
/// `None` keeps the raw text in place.
fn parse_alarm_original(text: &str) -> Option<Value> {
    let mut alarm: Value = serde_json::from_str(text).ok()?;

    if let Value::Object(fields) = &mut alarm {
        if let Some(Value::String(add_info)) = fields.get(ADD_INFO_KEY) {
            if let Some(pairs) = parse_semicolon_pairs(add_info) {
                fields.insert(ADD_INFO_KEY.to_string(), Value::Object(pairs));
            }
        }
    }

    Some(alarm)
}

/// Key of the semicolon pair list inside the original-alarm JSON.
const ADD_INFO_KEY: &str = "addInfo";

/// Parse a `k1:v1;k2:v2` list, honoring `\;` and `\:` escapes.
/// Returns `None` when no valid pair comes out, keeping the raw text.
fn parse_semicolon_pairs(text: &str) -> Option<Map<String, Value>> {
    if text.is_empty() {
        return None;
    }

    const SEMI: &str = "\u{1}";
    const COLON: &str = "\u{2}";
    let protected = text.replace("\\;", SEMI).replace("\\:", COLON);

    let unescape = |s: &str| s.replace(SEMI, ";").replace(COLON, ":");

    let mut pairs: Map<String, Value> = Map::new();
    for item in protected.split(';') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        match item.split_once(':') {
            Some((key, value)) => {
                pairs.insert(
                    unescape(key.trim()),
                    Value::String(unescape(value.trim())),
                );
            }
            None => {
                // Bare flag without a value, e.g. "deployment-flag"
                pairs.insert(unescape(item), Value::String(String::new()));
            }
        }
    }

    if pairs.is_empty() {
        return None;
    }
    Some(pairs)
}
