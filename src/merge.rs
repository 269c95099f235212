//! Merging of per-language keyset fragments.
//!
//! Fragments are applied strictly in discovery order: later fragments
//! overwrite earlier ones key-by-key, except that a fragment defining a
//! whole keyset as a plain string replaces the keyset outright and freezes
//! its shape — structured fragments applied after that have nowhere to land
//! and change nothing.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::types::{
    ALL_LANGUAGES,
    ConsolidatedKeysets,
    KeysetValue,
};

/// One loaded fragment, paired with its path for diagnostics.
#[derive(Debug, Clone)]
pub struct LoadedFragment {
    /// Source file the payload came from.
    pub path: PathBuf,
    /// Exported value of the fragment module.
    pub payload: Arc<Value>,
}

/// Defines errors that may occur while merging fragments
#[derive(Error, Debug)]
pub enum MergeError {
    /// Error when a fragment does not export a keyset mapping
    #[error("Fragment '{path}' does not export a keyset mapping")]
    FragmentShape {
        /// Source file of the malformed fragment.
        path: String,
    },
}

/// Merges fragments into one consolidated keyset map for `lang`.
///
/// Keyset names come out in insertion order; deterministic ordering is the
/// composer's job.
///
/// # Errors
/// - A concrete-language fragment whose payload is not an object
pub fn merge_keysets(
    fragments: &[LoadedFragment],
    lang: &str,
) -> Result<ConsolidatedKeysets, MergeError> {
    let mut result = ConsolidatedKeysets::new();

    for fragment in fragments {
        let Some(keysets) = fragment_keysets(fragment, lang)? else {
            continue;
        };
        for (keyset_name, keyset) in keysets {
            apply_keyset(&mut result, keyset_name, keyset);
        }
    }

    tracing::debug!(lang, keysets = result.len(), "Merged keyset fragments");
    Ok(result)
}

/// Extracts the keyset mapping a fragment contributes for `lang`.
///
/// Fragments for the `all` pseudo-language nest their payload one level
/// deeper, under an `all` property; that asymmetry is part of the source
/// format and is preserved, not normalized. A fragment without an
/// object-shaped `all` property contributes nothing.
fn fragment_keysets<'a>(
    fragment: &'a LoadedFragment,
    lang: &str,
) -> Result<Option<&'a serde_json::Map<String, Value>>, MergeError> {
    if lang == ALL_LANGUAGES {
        let unwrapped = fragment
            .payload
            .as_object()
            .and_then(|payload| payload.get(ALL_LANGUAGES))
            .and_then(Value::as_object);
        return Ok(unwrapped);
    }

    fragment
        .payload
        .as_object()
        .ok_or_else(|| MergeError::FragmentShape { path: fragment.path.display().to_string() })
        .map(Some)
}

/// Applies one fragment keyset onto the consolidated map.
fn apply_keyset(result: &mut ConsolidatedKeysets, keyset_name: &str, keyset: &Value) {
    match keyset {
        // A plain string replaces the whole keyset and freezes its shape.
        Value::String(text) => {
            result.insert(keyset_name.to_string(), KeysetValue::Opaque(text.clone()));
        }
        Value::Object(keys) => {
            let entry = result
                .entry(keyset_name.to_string())
                .or_insert_with(KeysetValue::empty);
            if let KeysetValue::Structured(existing) = entry {
                for (key, value) in keys {
                    existing.insert(key.clone(), value.clone());
                }
            }
        }
        // Other shapes contribute no keys but still materialize the entry.
        _ => {
            result.entry(keyset_name.to_string()).or_insert_with(KeysetValue::empty);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use googletest::prelude::*;
    use serde_json::json;

    use super::*;

    /// Wraps payloads in discovery-ordered fragments.
    fn fragments(payloads: &[Value]) -> Vec<LoadedFragment> {
        payloads
            .iter()
            .enumerate()
            .map(|(i, payload)| LoadedFragment {
                path: PathBuf::from(format!("dir{i}.i18n/en.js")),
                payload: Arc::new(payload.clone()),
            })
            .collect()
    }

    /// Unwraps a structured keyset from the merged result.
    fn structured(result: &ConsolidatedKeysets, name: &str) -> serde_json::Map<String, Value> {
        match result.get(name) {
            Some(KeysetValue::Structured(keys)) => keys.clone(),
            other => panic!("expected structured keyset '{name}', got {other:?}"),
        }
    }

    #[googletest::test]
    fn test_merge_unions_keys_across_fragments() {
        let result = merge_keysets(
            &fragments(&[
                json!({"greet": {"hi": "Hello"}}),
                json!({"greet": {"bye": "Bye"}}),
            ]),
            "en",
        )
        .unwrap();

        let greet = structured(&result, "greet");
        expect_that!(greet.get("hi"), some(eq(&json!("Hello"))));
        expect_that!(greet.get("bye"), some(eq(&json!("Bye"))));
    }

    #[test]
    fn test_later_fragment_overwrites_same_key() {
        let result = merge_keysets(
            &fragments(&[
                json!({"greet": {"hi": "Hello"}}),
                json!({"greet": {"hi": "Hi there"}}),
            ]),
            "en",
        )
        .unwrap();

        assert_eq!(structured(&result, "greet").get("hi"), Some(&json!("Hi there")));
    }

    #[test]
    fn test_plain_string_replaces_whole_keyset() {
        let result = merge_keysets(
            &fragments(&[
                json!({"greet": {"hi": "Hello"}}),
                json!({"greet": {"bye": "Bye"}}),
                json!({"greet": "RAW"}),
            ]),
            "en",
        )
        .unwrap();

        assert_eq!(result.get("greet"), Some(&KeysetValue::Opaque("RAW".to_string())));
    }

    #[test]
    fn test_structured_after_string_changes_nothing() {
        let result = merge_keysets(
            &fragments(&[
                json!({"greet": "RAW"}),
                json!({"greet": {"hi": "Hello"}}),
            ]),
            "en",
        )
        .unwrap();

        // The string shape already won; later keys have nowhere to land.
        assert_eq!(result.get("greet"), Some(&KeysetValue::Opaque("RAW".to_string())));
    }

    #[test]
    fn test_all_language_unwraps_nested_payload() {
        let result = merge_keysets(
            &fragments(&[
                json!({"all": {"units": {"kg": "kg"}}}),
                json!({"greet": {"hi": "Hello"}}),
            ]),
            "all",
        )
        .unwrap();

        // The second fragment has no `all` property and contributes nothing.
        assert_eq!(result.len(), 1);
        assert_eq!(structured(&result, "units").get("kg"), Some(&json!("kg")));
    }

    #[test]
    fn test_concrete_language_ignores_all_nesting() {
        let result = merge_keysets(&fragments(&[json!({"all": {"units": {"kg": "kg"}}})]), "en")
            .unwrap();

        // For a concrete language, `all` is just a regular keyset name.
        assert!(result.contains_key("all"));
        assert!(!result.contains_key("units"));
    }

    #[test]
    fn test_non_object_payload_fails_for_concrete_language() {
        let result = merge_keysets(&fragments(&[json!("not a mapping")]), "en");
        assert!(matches!(result, Err(MergeError::FragmentShape { .. })));
    }

    #[test]
    fn test_non_object_payload_contributes_nothing_for_all() {
        let result = merge_keysets(&fragments(&[json!("not a mapping")]), "all").unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_scalar_keyset_value_materializes_empty_entry() {
        let result = merge_keysets(&fragments(&[json!({"greet": 42})]), "en").unwrap();
        assert_eq!(result.get("greet"), Some(&KeysetValue::empty()));
    }

    #[test]
    fn test_empty_fragment_list_yields_empty_map() {
        let result = merge_keysets(&[], "en").unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_key_order_follows_merge_order() {
        let result = merge_keysets(
            &fragments(&[
                json!({"greet": {"zz": "1", "aa": "2"}}),
                json!({"greet": {"mm": "3"}}),
            ]),
            "en",
        )
        .unwrap();

        let keys: Vec<_> = structured(&result, "greet").keys().cloned().collect();
        assert_eq!(keys, vec!["zz", "aa", "mm"]);
    }
}
