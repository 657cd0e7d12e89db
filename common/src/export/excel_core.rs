//! Excel生成（共通ライブラリ）
//!
//! [`Sheet`] をヘッダー行付きの1シートのxlsxとしてバッファに書き出す。

use crate::sheet::Sheet;
use crate::value::CellValue;
use rust_xlsxwriter::*;

/// シート名に使えない文字
const INVALID_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];
/// シート名の最大長
const MAX_SHEET_NAME_LEN: usize = 31;

/// Excelで使用可能なシート名に整形
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if INVALID_SHEET_CHARS.contains(&c) { '_' } else { c })
        .take(MAX_SHEET_NAME_LEN)
        .collect();
    let cleaned = cleaned.trim_matches('\'').trim().to_string();

    if cleaned.is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned
    }
}

/// Excelをバッファに生成
///
/// # Arguments
/// * `sheet` - 出力するデータ
/// * `sheet_name` - ワークシート名（不正文字は置換）
pub fn generate_sheet_buffer(sheet: &Sheet, sheet_name: &str) -> Result<Vec<u8>, String> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA));

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(sanitize_sheet_name(sheet_name))
        .map_err(|e| format!("シート名設定エラー: {}", e))?;

    for (col, name) in sheet.columns().iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, name, &header_format)
            .map_err(|e| format!("ヘッダー書き込みエラー: {}", e))?;
    }

    for (i, row) in sheet.rows().iter().enumerate() {
        let row_num = (i + 1) as u32;
        for (col, value) in row.iter().enumerate() {
            let col = col as u16;
            let written = match value {
                CellValue::Empty => continue,
                CellValue::Text(s) | CellValue::DateTime(s) => worksheet.write_string(row_num, col, s),
                CellValue::Number(n) => worksheet.write_number(row_num, col, *n),
                CellValue::Int(i) => worksheet.write_number(row_num, col, *i as f64),
                CellValue::Bool(b) => worksheet.write_boolean(row_num, col, *b),
            };
            written.map_err(|e| format!("セル書き込みエラー ({}, {}): {}", row_num, col, e))?;
        }
    }

    worksheet
        .set_freeze_panes(1, 0)
        .map_err(|e| format!("ウィンドウ枠固定エラー: {}", e))?;
    worksheet.autofit();

    workbook
        .save_to_buffer()
        .map_err(|e| format!("Excel保存エラー: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_sheet_name() {
        assert_eq!(sanitize_sheet_name("Sprint [1/2]"), "Sprint _1_2_");
        assert_eq!(sanitize_sheet_name(""), "Sheet1");
        assert_eq!(sanitize_sheet_name(&"x".repeat(40)).len(), 31);
    }

    #[test]
    fn test_generate_sheet_buffer() {
        let mut sheet = Sheet::new(["Key", "Points", "Done", "Note"]);
        sheet.push_row(vec!["P-1".into(), CellValue::Number(3.0), CellValue::Bool(true), CellValue::Empty]);

        let buffer = generate_sheet_buffer(&sheet, "Issues").unwrap();
        // xlsx は ZIP 形式
        assert!(buffer.starts_with(b"PK"));
    }

    #[test]
    fn test_generate_empty_sheet() {
        let buffer = generate_sheet_buffer(&Sheet::default(), "Empty").unwrap();
        assert!(!buffer.is_empty());
    }
}
