//! 設定の型定義と読み込み
mod loader;
mod types;

pub use loader::load_or_default;
pub use types::{
    BundlerSettings,
    ConfigError,
    ValidationError,
};
