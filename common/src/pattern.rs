//! パターン表モジュール
//!
//! 「パターン → ラベル」の対応表。先頭から順に照合して最初に一致した
//! ラベルを採用するため、行の順序そのものが意味を持つ。
//! そのためハッシュマップではなく順序付きの `Vec` で保持する。

use crate::error::{Error, Result};
use crate::sheet::Sheet;

/// パターン列名
pub const PATTERN_COLUMN: &str = "Pattern";
/// ラベル列名
pub const LABEL_COLUMN: &str = "MappedValue";
/// 旧形式（キーワード表）の列名
const LEGACY_COLUMNS: (&str, &str) = ("Keyword", "Category");

/// パターン表の1行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternEntry {
    pub pattern: String,
    pub label: String,
}

/// 順序付きパターン表
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternTable {
    entries: Vec<PatternEntry>,
}

impl PatternTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// (パターン, ラベル) の組から作成
    ///
    /// 空白のみのパターンは取り込まない。
    pub fn from_pairs<I, P, L>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (P, L)>,
        P: Into<String>,
        L: Into<String>,
    {
        let mut table = Self::new();
        for (pattern, label) in pairs {
            table.push(pattern, label);
        }
        table
    }

    /// 既知ラベルの一覧から「ラベル自身をパターンとする」表を作成
    pub fn identity<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_pairs(
            labels
                .into_iter()
                .map(|l| (l.as_ref().to_string(), l.as_ref().to_string())),
        )
    }

    pub fn push(&mut self, pattern: impl Into<String>, label: impl Into<String>) {
        let pattern = pattern.into().trim().to_string();
        if pattern.is_empty() {
            return;
        }
        self.entries.push(PatternEntry {
            pattern,
            label: label.into(),
        });
    }

    pub fn entries(&self) -> &[PatternEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatternEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// シートから読み込み
    ///
    /// `Pattern` / `MappedValue` 列を使用し、無ければ旧形式の
    /// `Keyword` / `Category` 列を使用する。どちらも無ければ [`Error::Load`]。
    pub fn from_sheet(sheet: &Sheet) -> Result<Self> {
        let (pattern_idx, label_idx) = match (
            sheet.column_index(PATTERN_COLUMN),
            sheet.column_index(LABEL_COLUMN),
        ) {
            (Some(p), Some(l)) => (p, l),
            _ => match (
                sheet.column_index(LEGACY_COLUMNS.0),
                sheet.column_index(LEGACY_COLUMNS.1),
            ) {
                (Some(p), Some(l)) => (p, l),
                _ => {
                    return Err(Error::Load(format!(
                        "列 '{}' と '{}' が必要です（検出: {}）",
                        PATTERN_COLUMN,
                        LABEL_COLUMN,
                        sheet.columns().join(", ")
                    )))
                }
            },
        };

        Ok(Self::from_pairs(sheet.rows().iter().map(|row| {
            (row[pattern_idx].to_string(), row[label_idx].to_string())
        })))
    }
}
