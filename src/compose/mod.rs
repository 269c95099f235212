//! Bundle composition: markup compilation and declaration assembly.

mod composer;
mod markup;

pub use composer::{
    BundleComposer,
    ComposeError,
};
pub use markup::{
    MarkupError,
    MarkupTranslator,
};
