//! Fragment discovery and module loading.

pub mod discovery;
pub mod loader;
pub mod types;

pub use discovery::find_fragment_dirs;
pub use loader::ModuleLoader;
pub use types::{
    DirListing,
    FragmentFile,
    LoadError,
};
