//! 課題トラッカー連携モジュール
//!
//! 認証付きの単発GET/POSTのみ。リトライ・ページングは行わない。

mod client;
mod types;

pub use client::TrackerClient;
pub use types::{CreatedIssue, Issue, IssueFields, NewIssue, ParentIssue, SearchResponse, StatusField};

/// 接続設定
///
/// 呼び出し時にクライアントへ明示的に渡す。
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// インスタンスのURL（`/rest/...` は含めない）
    pub base_url: String,
    /// 設定されていれば `username:token` をBase64化して送る
    pub username: Option<String>,
    pub api_token: String,
    pub max_results: u32,
    pub timeout_seconds: u64,
}
