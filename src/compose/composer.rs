//! Language bundle assembly.
//!
//! Takes a consolidated keyset map, compiles every translation value into a
//! runtime expression, and produces the final bundle text: one registry
//! declaration block per keyset, wrapped in a self-activating guard for
//! concrete languages.

use thiserror::Error;

use super::markup::{
    MarkupError,
    MarkupTranslator,
};
use crate::types::{
    ALL_LANGUAGES,
    ConsolidatedKeysets,
    Keyset,
    KeysetValue,
};

/// Line separator of the generated source.
const NEW_LINE: &str = "\n";

/// Defines errors that may occur while composing a bundle
#[derive(Error, Debug)]
pub enum ComposeError {
    /// Error when a translation value fails to compile
    #[error("Failed to compile key '{key}' in keyset '{keyset}': {source}")]
    Translation {
        /// Keyset the failing key belongs to.
        keyset: String,
        /// The failing key.
        key: String,
        /// Underlying markup error.
        #[source]
        source: MarkupError,
    },
}

/// Assembles final language bundles from consolidated keysets.
#[derive(Debug, Clone)]
pub struct BundleComposer {
    /// Runtime registry global the bundle declares keysets on.
    registry: String,
    /// Per-value markup compiler.
    translator: MarkupTranslator,
}

impl BundleComposer {
    /// Creates a composer targeting the given registry global.
    #[must_use]
    pub fn new(registry: impl Into<String>) -> Self {
        let registry = registry.into();
        Self { translator: MarkupTranslator::new(registry.clone()), registry }
    }

    /// Composes the bundle text for `lang`.
    ///
    /// Keysets are emitted in ascending lexicographic name order — the sole
    /// ordering guarantee of the output. Zero keysets produce the empty
    /// string with no wrapping.
    ///
    /// # Errors
    /// - A translation value fails to compile
    pub fn compose(&self, keysets: &ConsolidatedKeysets, lang: &str) -> Result<String, ComposeError> {
        let mut entries: Vec<(&String, &KeysetValue)> = keysets.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let mut blocks = Vec::with_capacity(entries.len());
        for (name, value) in entries {
            blocks.push(self.compile_keyset(name, value, lang)?);
        }

        if blocks.is_empty() {
            return Ok(String::new());
        }
        Ok(self.wrap(lang, &blocks.join("\n\n")))
    }

    /// Compiles one keyset into its bundle block.
    ///
    /// Opaque values are already rendered content and pass through verbatim;
    /// this subsumes the empty-name sentinel keyset.
    fn compile_keyset(
        &self,
        name: &str,
        value: &KeysetValue,
        lang: &str,
    ) -> Result<String, ComposeError> {
        match value {
            KeysetValue::Opaque(text) => Ok(text.clone()),
            KeysetValue::Structured(keys) => self.compile_declaration(name, keys, lang),
        }
    }

    /// Emits a `decl` block for a structured keyset.
    ///
    /// Keys keep their merged order; only keyset order is sorted.
    fn compile_declaration(
        &self,
        name: &str,
        keys: &Keyset,
        lang: &str,
    ) -> Result<String, ComposeError> {
        let mut lines = Vec::with_capacity(keys.len() + 2);
        lines.push(format!("{}.decl('{name}', {{", self.registry));

        for (i, (key, value)) in keys.iter().enumerate() {
            let expression =
                self.translator.translate(value).map_err(|source| ComposeError::Translation {
                    keyset: name.to_string(),
                    key: key.clone(),
                    source,
                })?;
            let comma = if i + 1 == keys.len() { "" } else { "," };
            lines.push(format!("    {}: {expression}{comma}", quote(key)));
        }

        lines.push(format!("}}, {{\n\"lang\": {}\n}});", quote(lang)));
        Ok(lines.join(NEW_LINE))
    }

    /// Wraps the joined blocks for a concrete language.
    ///
    /// The `all` bundle is meant to be loaded once regardless of the active
    /// language and stays unwrapped; any other language gets a guard that
    /// ends by activating exactly that language.
    fn wrap(&self, lang: &str, text: &str) -> String {
        if lang == ALL_LANGUAGES {
            return text.to_string();
        }

        [
            format!("if (typeof {r} !== 'undefined' && {r}) {{", r = self.registry),
            text.to_string(),
            format!("{}.lang('{lang}');", self.registry),
            "}".to_string(),
        ]
        .join("\n\n")
    }
}

/// JSON string literal for keys and metadata values.
fn quote(text: &str) -> String {
    serde_json::Value::from(text).to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use serde_json::json;

    use super::*;

    /// Composer with the default registry name.
    fn composer() -> BundleComposer {
        BundleComposer::new("I18N")
    }

    /// Builds a consolidated map from (name, value) pairs in given order.
    fn keysets(entries: &[(&str, KeysetValue)]) -> ConsolidatedKeysets {
        entries.iter().map(|(name, value)| ((*name).to_string(), value.clone())).collect()
    }

    /// Structured keyset from JSON object literal.
    fn structured(value: serde_json::Value) -> KeysetValue {
        match value {
            serde_json::Value::Object(keys) => KeysetValue::Structured(keys),
            _ => KeysetValue::Opaque(String::new()),
        }
    }

    #[test]
    fn test_single_keyset_bundle_for_concrete_language() {
        let map = keysets(&[("greet", structured(json!({"hi": "Hello"})))]);

        let bundle = composer().compose(&map, "en").unwrap();

        assert_eq!(
            bundle,
            "if (typeof I18N !== 'undefined' && I18N) {\n\
             \n\
             I18N.decl('greet', {\n    \"hi\": \"Hello\"\n}, {\n\"lang\": \"en\"\n});\n\
             \n\
             I18N.lang('en');\n\
             \n\
             }"
        );
    }

    #[test]
    fn test_keysets_are_sorted_lexicographically() {
        let map = keysets(&[
            ("zz", structured(json!({"x": "1"}))),
            ("aa", structured(json!({"y": "2"}))),
        ]);

        let bundle = composer().compose(&map, "en").unwrap();

        let aa = bundle.find("I18N.decl('aa'").unwrap();
        let zz = bundle.find("I18N.decl('zz'").unwrap();
        assert!(aa < zz);
    }

    #[test]
    fn test_all_language_is_never_wrapped() {
        let map = keysets(&[
            ("zz", structured(json!({"x": "1"}))),
            ("aa", structured(json!({"y": "2"}))),
        ]);

        let bundle = composer().compose(&map, "all").unwrap();

        assert!(!bundle.contains("if (typeof"));
        assert!(!bundle.contains("I18N.lang("));
        // Same block ordering as for a concrete language.
        assert!(bundle.find("I18N.decl('aa'").unwrap() < bundle.find("I18N.decl('zz'").unwrap());
        assert_eq!(bundle, "I18N.decl('aa', {\n    \"y\": \"2\"\n}, {\n\"lang\": \"all\"\n});\n\nI18N.decl('zz', {\n    \"x\": \"1\"\n}, {\n\"lang\": \"all\"\n});");
    }

    #[test]
    fn test_zero_keysets_produce_empty_unwrapped_bundle() {
        let empty = ConsolidatedKeysets::new();
        assert_eq!(composer().compose(&empty, "en").unwrap(), "");
        assert_eq!(composer().compose(&empty, "all").unwrap(), "");
    }

    #[test]
    fn test_opaque_keyset_is_emitted_verbatim() {
        let map = keysets(&[("", KeysetValue::Opaque("/* prerendered */".to_string()))]);

        let bundle = composer().compose(&map, "all").unwrap();

        assert_eq!(bundle, "/* prerendered */");
    }

    #[test]
    fn test_keys_keep_merge_order_and_last_entry_has_no_comma() {
        let map = keysets(&[("greet", structured(json!({"zz": "1", "aa": "2"})))]);

        let bundle = composer().compose(&map, "all").unwrap();

        assert!(bundle.contains("    \"zz\": \"1\",\n    \"aa\": \"2\"\n}"));
    }

    #[test]
    fn test_marked_up_value_is_compiled_per_key() {
        let map = keysets(&[(
            "greet",
            structured(json!({"hello": "Hi, <i18n:param>user</i18n:param>!"})),
        )]);

        let bundle = composer().compose(&map, "all").unwrap();

        assert!(bundle.contains(
            "\"hello\": function (params) { return \"Hi, \" + params[\"user\"] + \"!\"; }"
        ));
    }

    #[test]
    fn test_compile_failure_aborts_whole_bundle() {
        let map = keysets(&[
            ("aa", structured(json!({"ok": "fine"}))),
            ("bb", structured(json!({"bad": "<i18n:param>user"}))),
        ]);

        let result = composer().compose(&map, "en");

        match result {
            Err(ComposeError::Translation { keyset, key, .. }) => {
                assert_eq!(keyset, "bb");
                assert_eq!(key, "bad");
            }
            Ok(_) => panic!("expected compose failure"),
        }
    }

    #[test]
    fn test_activation_names_exactly_the_target_language() {
        let map = keysets(&[("greet", structured(json!({"hi": "Hello"})))]);

        let bundle = composer().compose(&map, "ru").unwrap();

        assert!(bundle.ends_with("I18N.lang('ru');\n\n}"));
    }
}
