//! Excel読み込み（calamine）
//!
//! 先頭シートの使用範囲を読み、1行目をヘッダーとして [`Sheet`] に変換する。

use crate::error::{AnnotatorError, Result};
use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, DataType, Range, Reader};
use chrono::Timelike;
use sprint_annotator_common::{CellValue, Sheet};
use std::io::Cursor;
use std::path::Path;

/// ファイルから読み込み（xlsx / xlsm / xls / ods）
pub fn read_workbook(path: &Path) -> Result<Sheet> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AnnotatorError::Load(format!("{}: シートがありません", path.display())))??;
    Ok(range_to_sheet(&range))
}

/// バイト列から読み込み（APIレスポンスなど）
pub fn read_workbook_bytes(bytes: &[u8]) -> Result<Sheet> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AnnotatorError::Load("シートがありません".into()))??;
    Ok(range_to_sheet(&range))
}

fn range_to_sheet(range: &Range<Data>) -> Sheet {
    let mut rows = range.rows();

    let header = match rows.next() {
        Some(header) => header,
        None => return Sheet::default(),
    };

    let columns = header.iter().enumerate().map(|(i, cell)| {
        let name = cell_value(cell).to_string().trim().to_string();
        if name.is_empty() {
            format!("Unnamed: {}", i)
        } else {
            name
        }
    });
    let mut sheet = Sheet::new(columns);

    for row in rows {
        let values: Vec<CellValue> = row.iter().map(cell_value).collect();
        // 完全な空行は読み飛ばす
        if values.iter().all(CellValue::is_empty) {
            continue;
        }
        sheet.push_row(values);
    }

    sheet
}

/// calamineのセル値を変換
pub fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Int(*i),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(_) => match cell.as_datetime() {
            Some(dt) if dt.hour() == 0 && dt.minute() == 0 && dt.second() == 0 => {
                CellValue::DateTime(dt.format("%Y-%m-%d").to_string())
            }
            Some(dt) => CellValue::DateTime(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => CellValue::Empty,
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::DateTime(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}
