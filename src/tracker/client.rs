//! 課題トラッカーHTTPクライアント

use super::types::{CreatedIssue, Issue, SearchResponse};
use super::TrackerConfig;
use crate::error::{AnnotatorError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;

const SEARCH_FIELDS: &str = "summary,status,parent";

pub struct TrackerClient {
    http: Client,
    config: TrackerConfig,
}

impl TrackerClient {
    pub fn new(config: TrackerConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AnnotatorError::Config(format!("HTTPクライアント初期化エラー: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Authorizationヘッダー値
    ///
    /// ユーザー名があれば `username:token` をBase64化、
    /// なければトークンをエンコード済みの値としてそのまま使う。
    pub fn auth_header(&self) -> String {
        match &self.config.username {
            Some(user) => {
                let credentials = format!("{}:{}", user, self.config.api_token);
                format!("Basic {}", STANDARD.encode(credentials))
            }
            None => format!("Basic {}", self.config.api_token),
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// スプリントレポート（xlsx）を取得
    pub async fn fetch_sprint_report(&self, board_id: &str, sprint_id: &str) -> Result<Vec<u8>> {
        let url = self.url(&format!(
            "rest/api/2/board/{}/sprint/{}/report",
            board_id, sprint_id
        ));
        tracing::debug!(%url, "スプリントレポート取得");

        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, self.auth_header())
            .send()
            .await?;
        let response = check_status(response).await?;

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }

    /// JQLで課題を検索（最大件数で打ち切り、ページングしない）
    pub async fn search_issues(&self, jql: &str) -> Result<Vec<Issue>> {
        let url = self.url("rest/api/2/search");
        tracing::debug!(%url, jql, max_results = self.config.max_results, "課題検索");

        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, self.auth_header())
            .header(ACCEPT, "application/json")
            .query(&[
                ("jql", jql.to_string()),
                ("maxResults", self.config.max_results.to_string()),
                ("fields", SEARCH_FIELDS.to_string()),
            ])
            .send()
            .await?;
        let response = check_status(response).await?;

        let result: SearchResponse = response.json().await?;
        if let Some(total) = result.total {
            if total > result.issues.len() as u64 {
                tracing::warn!(
                    total,
                    fetched = result.issues.len(),
                    "検索結果が上限を超えたため一部のみ取得しました"
                );
            }
        }
        Ok(result.issues)
    }

    /// 課題を1件取得（生のJSON）
    pub async fn get_issue(&self, key: &str) -> Result<Value> {
        let url = self.url(&format!("rest/api/3/issue/{}", key));
        tracing::debug!(%url, "課題取得");

        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, self.auth_header())
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let response = check_status(response).await?;

        Ok(response.json().await?)
    }

    /// 課題を作成
    pub async fn create_issue(&self, payload: &Value) -> Result<CreatedIssue> {
        let url = self.url("rest/api/3/issue");
        tracing::debug!(%url, "課題作成");

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, self.auth_header())
            .header(ACCEPT, "application/json")
            .json(payload)
            .send()
            .await?;
        let response = check_status(response).await?;

        Ok(response.json().await?)
    }
}

/// 2xx以外をエラーに変換（本文を含める）
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    Err(AnnotatorError::Fetch(format!(
        "{} {}: {}",
        status,
        url,
        body.trim()
    )))
}
