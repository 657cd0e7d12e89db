//! 表形式データ
//!
//! 入力（スプリントレポート・CSV・検索結果）はすべて [`Sheet`] に変換し、
//! 分類列を追加したうえで同じ [`Sheet`] から出力する。

use crate::csv;
use crate::error::{Error, Result};
use crate::value::CellValue;
use std::collections::{HashMap, HashSet};

/// ヘッダー行 + データ行
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    /// 列名を指定して空のシートを作成
    ///
    /// 重複した列名は `.1`, `.2` … を付けて一意にする。
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: unique_column_names(columns.into_iter().map(Into::into)),
            rows: Vec::new(),
        }
    }

    /// 行を追加（列数に満たない分は空セルで埋め、超過分は切り捨てる）
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// 指定列の値を行順に返す
    pub fn column_values(&self, name: &str) -> Option<impl Iterator<Item = &CellValue>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// 必須列の存在チェック
    ///
    /// 欠けている列をすべて列挙して [`Error::Schema`] を返す。
    pub fn require_columns(&self, names: &[&str]) -> Result<()> {
        let missing: Vec<String> = names
            .iter()
            .filter(|name| self.column_index(name).is_none())
            .map(|name| name.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Schema(missing))
        }
    }

    /// 列を末尾に追加（同名の列がある場合は値を置き換える）
    pub fn set_column(&mut self, name: &str, values: Vec<CellValue>) {
        let idx = match self.column_index(name) {
            Some(idx) => idx,
            None => {
                self.columns.push(name.to_string());
                for row in &mut self.rows {
                    row.push(CellValue::Empty);
                }
                self.columns.len() - 1
            }
        };

        let mut values = values.into_iter();
        for row in &mut self.rows {
            row[idx] = values.next().unwrap_or_default();
        }
    }

    /// 全行に同じ値の列を追加
    pub fn fill_column(&mut self, name: &str, value: CellValue) {
        let values = vec![value; self.rows.len()];
        self.set_column(name, values);
    }

    /// 複数シートを縦に連結
    ///
    /// 列は最初に現れた順で和集合を取り、存在しない列のセルは空になる。
    pub fn concat(sheets: impl IntoIterator<Item = Sheet>) -> Sheet {
        let mut merged = Sheet::default();

        for sheet in sheets {
            let mapping: Vec<usize> = sheet
                .columns
                .iter()
                .map(|name| match merged.column_index(name) {
                    Some(idx) => idx,
                    None => {
                        merged.columns.push(name.clone());
                        for row in &mut merged.rows {
                            row.push(CellValue::Empty);
                        }
                        merged.columns.len() - 1
                    }
                })
                .collect();

            for row in sheet.rows {
                let mut merged_row = vec![CellValue::Empty; merged.columns.len()];
                for (value, &target) in row.into_iter().zip(&mapping) {
                    merged_row[target] = value;
                }
                merged.rows.push(merged_row);
            }
        }

        merged
    }

    /// CSV文字列から読み込み（1行目をヘッダーとする）
    pub fn from_csv_str(content: &str) -> Result<Self> {
        let mut records = csv::parse_csv(content)?.into_iter();
        let header = match records.next() {
            Some(header) => header,
            None => return Ok(Sheet::default()),
        };

        let mut sheet = Sheet::new(header.into_iter().map(|h| h.trim().to_string()));
        for record in records {
            sheet.push_row(record.into_iter().map(text_cell).collect());
        }
        Ok(sheet)
    }

    /// CSV文字列に変換
    pub fn to_csv_string(&self) -> String {
        let mut out = String::new();
        csv::write_record(&mut out, &self.columns);
        for row in &self.rows {
            csv::write_record(&mut out, row.iter().map(|v| v.to_string()));
        }
        out
    }
}

/// 重複する列名に連番の接尾辞を付ける（`Task Name`, `Task Name.1`, …）
pub fn unique_column_names(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut counters: HashMap<String, usize> = HashMap::new();
    let mut result = Vec::new();

    for name in names {
        let mut unique = name.clone();
        if used.contains(&unique) {
            let counter = counters.entry(name.clone()).or_insert(0);
            loop {
                *counter += 1;
                unique = format!("{}.{}", name, counter);
                if !used.contains(&unique) {
                    break;
                }
            }
        }
        used.insert(unique.clone());
        result.push(unique);
    }

    result
}

fn text_cell(field: String) -> CellValue {
    if field.is_empty() {
        CellValue::Empty
    } else {
        CellValue::Text(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Sheet {
        let mut sheet = Sheet::new(["Sprint Name", "Task Name"]);
        sheet.push_row(vec!["CircleA Sprint 1".into(), "Fix bug".into()]);
        sheet.push_row(vec!["CircleB Sprint 1".into()]);
        sheet
    }

    #[test]
    fn test_push_row_pads_missing_cells() {
        let sheet = sample();
        assert_eq!(sheet.rows()[1], vec!["CircleB Sprint 1".into(), CellValue::Empty]);
    }

    #[test]
    fn test_require_columns() {
        let sheet = sample();
        assert!(sheet.require_columns(&["Sprint Name", "Task Name"]).is_ok());

        match sheet.require_columns(&["Sprint Name", "Summary", "Parent Summary"]) {
            Err(Error::Schema(missing)) => assert_eq!(missing, vec!["Summary", "Parent Summary"]),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_set_and_fill_column() {
        let mut sheet = sample();
        sheet.fill_column("Board ID", "B1".into());
        sheet.set_column("Circle Name", vec!["CircleA".into(), "CircleB".into()]);

        assert_eq!(sheet.columns(), &["Sprint Name", "Task Name", "Board ID", "Circle Name"]);
        assert_eq!(sheet.rows()[1][2], CellValue::from("B1"));
        assert_eq!(sheet.rows()[1][3], CellValue::from("CircleB"));
    }

    #[test]
    fn test_concat_unions_columns() {
        let mut a = Sheet::new(["Key", "Summary"]);
        a.push_row(vec!["P-1".into(), "one".into()]);
        let mut b = Sheet::new(["Summary", "Status"]);
        b.push_row(vec!["two".into(), "Done".into()]);

        let merged = Sheet::concat(vec![a, b]);
        assert_eq!(merged.columns(), &["Key", "Summary", "Status"]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.rows()[0][2], CellValue::Empty);
        assert_eq!(merged.rows()[1], vec![CellValue::Empty, "two".into(), "Done".into()]);
    }

    #[test]
    fn test_csv_roundtrip_preserves_cells() {
        let csv = "Sprint Name,Task Name\n\"Circle, A\",\n";
        let sheet = Sheet::from_csv_str(csv).unwrap();
        assert_eq!(sheet.rows()[0], vec!["Circle, A".into(), CellValue::Empty]);
        assert_eq!(sheet.to_csv_string(), csv);
    }

    #[test]
    fn test_duplicate_headers_are_renamed() {
        let sheet = Sheet::from_csv_str("Task Name,Task Name,Task Name\nfirst,second,third\n").unwrap();
        assert_eq!(sheet.columns(), &["Task Name", "Task Name.1", "Task Name.2"]);

        let merged = Sheet::concat(vec![sheet]);
        assert_eq!(merged.columns().len(), 3);
        assert_eq!(merged.rows()[0], vec!["first".into(), "second".into(), "third".into()]);
    }

    #[test]
    fn test_unique_column_names_skips_existing_suffix() {
        let names = unique_column_names(["A", "A.1", "A"].map(String::from));
        assert_eq!(names, vec!["A", "A.1", "A.2"]);
    }

    #[test]
    fn test_from_empty_csv() {
        let sheet = Sheet::from_csv_str("").unwrap();
        assert!(sheet.columns().is_empty());
        assert!(sheet.is_empty());
    }
}
