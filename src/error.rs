use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnnotatorError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIトークンが設定されていません。`sprint-annotator config --set-api-token TOKEN` か環境変数 JIRA_API_TOKEN で設定してください")]
    MissingApiToken,

    #[error("引数が不正です: {0}")]
    InvalidArgument(String),

    /// パターン表・入力ファイルの読み込み失敗
    #[error("読み込みエラー: {0}")]
    Load(String),

    /// 通信エラー・2xx以外の応答
    #[error("取得エラー: {0}")]
    Fetch(String),

    /// 必須列の欠落
    #[error("必須列がありません: {}", .0.join(", "))]
    Schema(Vec<String>),

    #[error("テンプレート課題が不正: {0}")]
    InvalidTemplate(String),

    #[error("Excel読み込みエラー: {0}")]
    ExcelRead(#[from] calamine::Error),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(sprint_annotator_common::Error),
}

impl From<sprint_annotator_common::Error> for AnnotatorError {
    fn from(err: sprint_annotator_common::Error) -> Self {
        use sprint_annotator_common::Error as CommonError;

        // 分類上意味のあるエラーは同じ種別に揃える
        match err {
            CommonError::Load(msg) => AnnotatorError::Load(msg),
            CommonError::Schema(missing) => AnnotatorError::Schema(missing),
            other => AnnotatorError::Common(other),
        }
    }
}

impl From<reqwest::Error> for AnnotatorError {
    fn from(err: reqwest::Error) -> Self {
        AnnotatorError::Fetch(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnnotatorError>;
