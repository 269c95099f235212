//! Core types used throughout the project.

use indexmap::IndexMap;
use serde::{
    Deserialize,
    Serialize,
};
use serde_json::Value;

/// Reserved language identifier meaning "every language, undifferentiated".
///
/// Bundles built for this pseudo-language are safe to load regardless of the
/// active runtime language and are never wrapped in an activation guard.
pub const ALL_LANGUAGES: &str = "all";

/// A keyset: named group of translation keys.
///
/// Key order is the order keys were merged in, not alphabetical.
pub type Keyset = serde_json::Map<String, Value>;

/// One keyset's merged value.
///
/// The shape is decided once per keyset at merge time: a fragment that
/// defines a keyset as a plain string turns the whole keyset into opaque
/// pre-rendered content, while object-shaped fragments contribute
/// key-by-key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeysetValue {
    /// Pre-rendered content, emitted verbatim into the bundle.
    Opaque(String),
    /// Key → translation-value map, compiled into a declaration block.
    Structured(Keyset),
}

impl KeysetValue {
    /// An empty structured keyset, the initial shape of a merged entry.
    #[must_use]
    pub fn empty() -> Self {
        Self::Structured(Keyset::new())
    }
}

/// Merged result across all fragments for one language.
///
/// Keyset names keep insertion order here; deterministic ordering is
/// enforced by the composer, not the merger.
pub type ConsolidatedKeysets = IndexMap<String, KeysetValue>;
