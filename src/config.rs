use std::path::{Path, PathBuf};

use anyhow::Result;
use config::{Config as config_config, File as config_file};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::logging;

const CONFIG_PATH: &str = "app.json";

/// 後端開發環境的預設位址（Flask 預設 port）
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct App {
    #[serde(default)]
    pub api: Api,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Api {
    /// 所有 `/api/...` 端點的來源位址
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for Api {
    fn default() -> Self {
        Api {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

pub static SETTINGS: Lazy<App> = Lazy::new(App::new);

impl App {
    /// 讀取 app.json，檔案不存在或格式錯誤時回傳預設值
    pub fn new() -> Self {
        let path = config_path();
        if !path.exists() {
            return Default::default();
        }

        match Self::from_file(&path) {
            Ok(app) => app,
            Err(why) => {
                logging::error_file_async(format!(
                    "I can't read the config context because {:?}",
                    why
                ));
                Default::default()
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let app: App = config_config::builder()
            .add_source(config_file::from(path))
            .build()?
            .try_deserialize()?;

        Ok(app)
    }
}

/// 回傳設定檔的路徑
fn config_path() -> PathBuf {
    PathBuf::from(CONFIG_PATH)
}
