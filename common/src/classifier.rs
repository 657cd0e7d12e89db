//! パターン分類モジュール
//!
//! テキストをパターン表と照合してラベルを決定する。
//!
//! ## 照合ルール
//! - パターンは正規表現ではなくリテラル文字列（メタ文字はエスケープ）
//! - 大文字・小文字を区別しない
//! - 単語単位: 一致箇所の直前・直後が単語文字（英数字・`_`）であってはならない
//! - 表の先頭から順に照合し、最初に一致したラベルを採用
//! - どれにも一致しなければデフォルトラベル

use crate::pattern::PatternTable;
use regex::{Regex, RegexBuilder};
use std::fmt;

/// デフォルトラベル
pub const DEFAULT_LABEL: &str = "Unknown";

/// パターン1件分のマッチャー
#[derive(Debug, Clone)]
struct Rule {
    matcher: Regex,
    label: String,
}

/// コンパイル済みの分類器
///
/// パターン表を一度だけ正規表現に変換して保持する。
/// 分類結果そのものはキャッシュしない。
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<Rule>,
    default_label: String,
}

impl Classifier {
    pub fn new(table: &PatternTable, default_label: impl Into<String>) -> Self {
        let rules = table
            .iter()
            .filter_map(|entry| {
                build_matcher(&entry.pattern).map(|matcher| Rule {
                    matcher,
                    label: entry.label.clone(),
                })
            })
            .collect();

        Self {
            rules,
            default_label: default_label.into(),
        }
    }

    pub fn default_label(&self) -> &str {
        &self.default_label
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// テキストを分類してラベルを返す
    pub fn classify<T: fmt::Display + ?Sized>(&self, text: &T) -> &str {
        let text = text.to_string();
        self.rules
            .iter()
            .find(|rule| rule.matcher.is_match(&text))
            .map(|rule| rule.label.as_str())
            .unwrap_or(self.default_label.as_str())
    }
}

/// パターン表でテキストを分類（単発呼び出し用）
///
/// 同じ表で多数のレコードを分類する場合は [`Classifier`] を使うこと。
pub fn classify<T: fmt::Display + ?Sized>(text: &T, table: &PatternTable, default_label: &str) -> String {
    Classifier::new(table, default_label).classify(text).to_string()
}

/// リテラルパターンから単語単位・大小無視のマッチャーを生成
fn build_matcher(pattern: &str) -> Option<Regex> {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return None;
    }

    // 前後を「非単語文字 or 文字列端」で挟む
    let source = format!(r"(?:^|\W){}(?:\W|$)", regex::escape(pattern));
    RegexBuilder::new(&source).case_insensitive(true).build().ok()
}
