//! Build steps and output targets.

mod lang_bundle;
mod merge_keysets;
mod target;
mod types;

pub use lang_bundle::LangBundleTech;
pub use merge_keysets::MergeKeysetsTech;
pub use target::{
    BuildContext,
    KEYSETS_TARGET,
    LANG_TARGET,
    expand_target,
};
pub use types::{
    BuildError,
    LangBundleOptions,
    MergeKeysetsOptions,
};
