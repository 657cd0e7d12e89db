//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    /// パターン表・入力ファイルの読み込み失敗（LoadFailure）
    #[error("Load error: {0}")]
    Load(String),

    /// 必須列が存在しない（SchemaFailure）
    #[error("Schema error: missing columns [{}]", .0.join(", "))]
    Schema(Vec<String>),

    #[error("CSV error: {0}")]
    Csv(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
