//! 分類列の付与
//!
//! シートの元列（スプリント名・タスク名など）を分類器にかけ、
//! 結果を新しい列として末尾に追加する。

use crate::classifier::Classifier;
use crate::error::Result;
use crate::sheet::Sheet;
use crate::value::CellValue;

/// 1列分の付与ルール
#[derive(Debug, Clone)]
pub struct AnnotationRule {
    /// 分類対象の列
    pub source_column: String,
    /// 追加する列
    pub target_column: String,
    pub classifier: Classifier,
}

impl AnnotationRule {
    pub fn new(
        source_column: impl Into<String>,
        target_column: impl Into<String>,
        classifier: Classifier,
    ) -> Self {
        Self {
            source_column: source_column.into(),
            target_column: target_column.into(),
            classifier,
        }
    }
}

/// ルールを順に適用して分類列を追加
///
/// 元列が1つでも欠けていればシートを変更せずに `Schema` エラーを返す。
pub fn annotate(sheet: &mut Sheet, rules: &[AnnotationRule]) -> Result<()> {
    let sources: Vec<&str> = rules.iter().map(|r| r.source_column.as_str()).collect();
    sheet.require_columns(&sources)?;

    for rule in rules {
        let labels: Vec<CellValue> = sheet
            .column_values(&rule.source_column)
            .map(|values| {
                values
                    .map(|value| CellValue::Text(rule.classifier.classify(value).to_string()))
                    .collect()
            })
            .unwrap_or_default();

        sheet.set_column(&rule.target_column, labels);
    }

    Ok(())
}
