//! 入力ファイル読み込み
//!
//! 拡張子で形式を判定する:
//! - `.csv` → CSV
//! - `.xlsx` / `.xlsm` / `.xls` / `.ods` → calamine

pub mod excel;

use crate::error::{AnnotatorError, Result};
use sprint_annotator_common::{PatternTable, Sheet};
use std::path::Path;

const EXCEL_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// 入力ファイル形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Csv,
    Excel,
}

impl InputKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        if ext == "csv" {
            Some(InputKind::Csv)
        } else if EXCEL_EXTENSIONS.contains(&ext.as_str()) {
            Some(InputKind::Excel)
        } else {
            None
        }
    }
}

/// 表形式ファイルを読み込む
pub fn load_sheet(path: &Path) -> Result<Sheet> {
    if !path.exists() {
        return Err(AnnotatorError::Load(format!(
            "ファイルが見つかりません: {}",
            path.display()
        )));
    }

    match InputKind::from_path(path) {
        Some(InputKind::Csv) => {
            let content = std::fs::read_to_string(path)?;
            Ok(Sheet::from_csv_str(&content)?)
        }
        Some(InputKind::Excel) => excel::read_workbook(path),
        None => Err(AnnotatorError::Load(format!(
            "未対応の形式です（csv/xlsx/xls/ods）: {}",
            path.display()
        ))),
    }
}

/// パターン表を読み込む
///
/// 失敗はすべて `Load` エラーとして返す。
pub fn load_pattern_table(path: &Path) -> Result<PatternTable> {
    let sheet = load_sheet(path).map_err(|e| match e {
        AnnotatorError::Load(msg) => AnnotatorError::Load(msg),
        other => AnnotatorError::Load(format!("{}: {}", path.display(), other)),
    })?;

    let table = PatternTable::from_sheet(&sheet).map_err(|e| {
        AnnotatorError::Load(format!("{}: {}", path.display(), e))
    })?;

    tracing::debug!(path = %path.display(), patterns = table.len(), "パターン表を読み込みました");
    Ok(table)
}

/// パターン表を読み込み、失敗したら空の表で続行する
///
/// 空の表ではすべてのレコードがデフォルトラベルになる。
pub fn load_pattern_table_or_empty(path: &Path) -> PatternTable {
    match load_pattern_table(path) {
        Ok(table) => table,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "パターン表を読み込めないため空の表で続行");
            println!("⚠ {}（すべてデフォルトラベルで分類します）", e);
            PatternTable::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_input_kind_from_path() {
        assert_eq!(InputKind::from_path(Path::new("a.CSV")), Some(InputKind::Csv));
        assert_eq!(InputKind::from_path(Path::new("report.xlsx")), Some(InputKind::Excel));
        assert_eq!(InputKind::from_path(Path::new("notes.txt")), None);
        assert_eq!(InputKind::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_load_pattern_table_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("circle_mapping.csv");
        std::fs::write(&path, "Pattern,MappedValue\ncircleA,CircleA\npay,Payments\n").unwrap();

        let table = load_pattern_table(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.entries()[1].label, "Payments");
    }

    #[test]
    fn test_load_pattern_table_errors_are_load_failures() {
        let dir = tempdir().unwrap();

        let missing = dir.path().join("missing.csv");
        assert!(matches!(load_pattern_table(&missing), Err(AnnotatorError::Load(_))));

        let wrong_columns = dir.path().join("wrong.csv");
        std::fs::write(&wrong_columns, "Name,Value\nx,y\n").unwrap();
        assert!(matches!(load_pattern_table(&wrong_columns), Err(AnnotatorError::Load(_))));

        let broken_xlsx = dir.path().join("broken.xlsx");
        std::fs::write(&broken_xlsx, b"not a zip").unwrap();
        assert!(matches!(load_pattern_table(&broken_xlsx), Err(AnnotatorError::Load(_))));
    }

    #[test]
    fn test_load_pattern_table_or_empty_falls_back() {
        let dir = tempdir().unwrap();

        let missing = dir.path().join("missing.csv");
        assert!(load_pattern_table_or_empty(&missing).is_empty());

        let wrong_columns = dir.path().join("wrong.csv");
        std::fs::write(&wrong_columns, "Name,Value\nx,y\n").unwrap();
        assert!(load_pattern_table_or_empty(&wrong_columns).is_empty());

        let valid = dir.path().join("task_mapping.csv");
        std::fs::write(&valid, "Pattern,MappedValue\nbug,Defect\n").unwrap();
        assert_eq!(load_pattern_table_or_empty(&valid).len(), 1);
    }
}
