//! js-i18n-bundler
//!
//! JavaScript プロジェクト向けの i18n バンドル生成パイプライン。
//! `*.i18n` ディレクトリの言語別フラグメントをマージし、ランタイム
//! レジストリに登録する言語バンドルを生成する。

pub mod build;
pub mod cache;
pub mod compose;
pub mod config;
pub mod input;
pub mod merge;
pub mod types;

// ビルドステップを再エクスポート
pub use build::{
    BuildContext,
    BuildError,
    LangBundleTech,
    MergeKeysetsTech,
};
