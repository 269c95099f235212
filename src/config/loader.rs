//! 設定ファイルの読み込み関数

use std::path::Path;

use super::{
    BundlerSettings,
    ConfigError,
};

/// ワークスペース直下の設定ファイル名
const CONFIG_FILE_NAME: &str = ".js-i18n-bundle.json";

/// ワークスペースから設定を読み込む
///
/// `.js-i18n-bundle.json` ファイルを探して読み込む
///
/// # Arguments
/// * `workspace_root` - ワークスペースのルートパス
///
/// # Returns
/// - `Ok(Some(settings))`: 設定ファイルが見つかり、読み込みに成功
/// - `Ok(None)`: 設定ファイルが見つからない
/// - `Err(ConfigError)`: ファイル読み込みまたはパースエラー
///
/// # Errors
/// - ファイル読み込みエラー
/// - JSON パースエラー
pub(super) fn load_from_workspace(
    workspace_root: &Path,
) -> Result<Option<BundlerSettings>, ConfigError> {
    let config_path = workspace_root.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!("Configuration file not found: {:?}", config_path);
        return Ok(None);
    }

    tracing::debug!("Loading configuration from: {:?}", config_path);

    let content = std::fs::read_to_string(&config_path)?;
    let settings: BundlerSettings = serde_json::from_str(&content)?;

    Ok(Some(settings))
}

/// 設定を読み込んでバリデーションする
///
/// 設定ファイルがない場合はデフォルト設定を使う
///
/// # Errors
/// - ファイル読み込みエラー
/// - JSON パースエラー
/// - バリデーションエラー
pub fn load_or_default(workspace_root: Option<&Path>) -> Result<BundlerSettings, ConfigError> {
    let settings = if let Some(root) = workspace_root {
        load_from_workspace(root)?.map_or_else(BundlerSettings::default, |ws| {
            tracing::debug!("Loaded workspace settings: {:?}", ws);
            ws
        })
    } else {
        BundlerSettings::default()
    };

    settings.validate().map_err(ConfigError::ValidationErrors)?;
    Ok(settings)
}
