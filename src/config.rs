use crate::error::{AnnotatorError, Result};
use crate::tracker::TrackerConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const ENV_BASE_URL: &str = "JIRA_BASE_URL";
const ENV_USERNAME: &str = "JIRA_USERNAME";
const ENV_API_TOKEN: &str = "JIRA_API_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 課題トラッカーのURL（例: https://example.atlassian.net）
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub api_token: Option<String>,
    /// 課題複製時のプロジェクトキー
    pub project_key: Option<String>,
    /// 検索1回あたりの最大取得件数
    pub max_results: u32,
    pub timeout_seconds: u64,
    /// サークル表未指定時に使う既知サークル
    pub known_circles: Vec<String>,
    pub circle_default: String,
    pub category_default: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            username: None,
            api_token: None,
            project_key: None,
            max_results: 1000,
            timeout_seconds: 60,
            known_circles: vec![
                "CircleA".into(),
                "CircleB".into(),
                "CircleC".into(),
                "CircleD".into(),
            ],
            circle_default: "Unknown".into(),
            category_default: "Uncategorized".into(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| AnnotatorError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("sprint-annotator").join("config.json"))
    }

    /// 課題トラッカー接続設定を組み立てる
    ///
    /// 環境変数（JIRA_BASE_URL / JIRA_USERNAME / JIRA_API_TOKEN）を優先する。
    pub fn tracker(&self) -> Result<TrackerConfig> {
        let base_url = env_or(ENV_BASE_URL, &self.base_url).ok_or_else(|| {
            AnnotatorError::Config(
                "URLが未設定です。`config --set-base-url` か JIRA_BASE_URL で設定してください".into(),
            )
        })?;
        let api_token = env_or(ENV_API_TOKEN, &self.api_token).ok_or(AnnotatorError::MissingApiToken)?;

        Ok(TrackerConfig {
            base_url,
            username: env_or(ENV_USERNAME, &self.username),
            api_token,
            max_results: self.max_results,
            timeout_seconds: self.timeout_seconds,
        })
    }

    pub fn set_base_url(&mut self, url: String) -> Result<()> {
        self.base_url = Some(url.trim_end_matches('/').to_string());
        self.save()
    }

    pub fn set_username(&mut self, username: String) -> Result<()> {
        self.username = Some(username);
        self.save()
    }

    pub fn set_api_token(&mut self, token: String) -> Result<()> {
        self.api_token = Some(token);
        self.save()
    }

    pub fn set_project_key(&mut self, key: String) -> Result<()> {
        self.project_key = Some(key);
        self.save()
    }
}

fn env_or(var: &str, fallback: &Option<String>) -> Option<String> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| fallback.clone())
}
