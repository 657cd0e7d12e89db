use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sprint-annotator")]
#[command(about = "スプリント課題データにサークル・タスク分類を付与するツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ボード別スプリントレポートを取得して分類（出力: processed_sprint_data）
    Report {
        /// ボードとスプリントの組（例: Board1:Sprint10,Board2:Sprint15）
        #[arg(required = true)]
        boards: String,

        /// サークルのパターン表（Pattern, MappedValue）
        #[arg(required = true)]
        circle_map: PathBuf,

        /// タスク分類のパターン表（Pattern, MappedValue）
        #[arg(required = true)]
        task_map: PathBuf,

        /// 出力形式 (excel/csv)
        #[arg(short, long, default_value = "excel")]
        format: ExportFormat,
    },

    /// スプリント名で課題を検索して分類（出力: sprint_issues_annotated）
    Search {
        /// スプリント名（カンマ区切り）
        #[arg(required = true)]
        sprints: String,

        /// サークルのパターン表（親課題の要約と照合）
        #[arg(required = true)]
        circle_map: PathBuf,

        /// カテゴリのパターン表（課題の要約と照合）
        #[arg(required = true)]
        category_map: PathBuf,

        /// 出力形式 (excel/csv)
        #[arg(short, long, default_value = "excel")]
        format: ExportFormat,
    },

    /// スプレッドシート/CSVに分類列を追加（出力: transformed_output）
    Annotate {
        /// 入力ファイル（xlsx/xls/ods/csv）
        #[arg(required = true)]
        input: PathBuf,

        /// サークルのパターン表（省略時は既知サークル一覧を使用）
        #[arg(long)]
        circle_map: Option<PathBuf>,

        /// カテゴリのパターン表（省略時はカテゴリ列を追加しない）
        #[arg(long)]
        category_map: Option<PathBuf>,

        /// サークル判定に使う列
        #[arg(long, default_value = "Sprint Name")]
        circle_column: String,

        /// カテゴリ判定に使う列
        #[arg(long, default_value = "Task Name")]
        category_column: String,

        /// 出力形式 (excel/csv)
        #[arg(short, long, default_value = "excel")]
        format: ExportFormat,
    },

    /// テンプレート課題を複製して新しい課題を作成
    Clone {
        /// テンプレート課題キー（例: PROJ-123）
        #[arg(required = true)]
        template: String,

        /// 新しい課題の要約
        #[arg(required = true)]
        summary: String,

        /// {{ENV}} の置換値
        #[arg(long, default_value = "STAGING")]
        env: String,

        /// {{CIRCLE}} の置換値
        #[arg(long, default_value = "PAYMENTS")]
        circle: String,

        /// 追加の置換変数（NAME=VALUE、複数指定可）
        #[arg(long = "var")]
        vars: Vec<String>,

        /// プロジェクトキー（省略時は設定値）
        #[arg(short, long)]
        project: Option<String>,

        /// 課題タイプ
        #[arg(long, default_value = "Story")]
        issue_type: String,

        /// 担当者
        #[arg(long)]
        assignee: Option<String>,

        /// 優先度ID（1=最高, 3=中, 5=最低）
        #[arg(long)]
        priority: Option<String>,

        /// 確認なしで作成
        #[arg(short, long)]
        yes: bool,
    },

    /// テキストを1件分類（パターン表の確認用）
    Classify {
        /// 分類するテキスト
        #[arg(required = true)]
        text: String,

        /// パターン表
        #[arg(required = true)]
        table: PathBuf,

        /// 一致しなかった場合のラベル
        #[arg(short, long, default_value = "Unknown")]
        default: String,
    },

    /// 設定を表示/編集
    Config {
        /// 課題トラッカーのURLを設定
        #[arg(long)]
        set_base_url: Option<String>,

        /// ユーザー名を設定
        #[arg(long)]
        set_username: Option<String>,

        /// APIトークンを設定
        #[arg(long)]
        set_api_token: Option<String>,

        /// 課題複製先のプロジェクトキーを設定
        #[arg(long)]
        set_project: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Excel,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Excel => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use excel or csv", s)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Excel => write!(f, "excel"),
            ExportFormat::Csv => write!(f, "csv"),
        }
    }
}
