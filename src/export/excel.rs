//! Excel出力（CLI版）
//!
//! 共通ライブラリでバッファを生成してファイルに書き出す

use crate::error::{AnnotatorError, Result};
use sprint_annotator_common::export::excel_core;
use sprint_annotator_common::Sheet;
use std::path::Path;

pub fn generate_excel(sheet: &Sheet, output_path: &Path, sheet_name: &str) -> Result<()> {
    let buffer = excel_core::generate_sheet_buffer(sheet, sheet_name)
        .map_err(AnnotatorError::ExcelGeneration)?;
    std::fs::write(output_path, buffer)?;
    Ok(())
}
