pub mod csv;
pub mod excel;

use crate::cli::ExportFormat;
use crate::error::Result;
use sprint_annotator_common::Sheet;
use std::path::{Path, PathBuf};

/// 固定ファイル名（拡張子なし）から出力パスを決定
pub fn output_path_for_format(stem: &Path, format: &ExportFormat) -> PathBuf {
    stem.with_extension(format.extension())
}

/// シートを指定形式で書き出し、書き出したパスを返す
pub fn export_sheet(
    sheet: &Sheet,
    format: &ExportFormat,
    output_stem: &Path,
    sheet_name: &str,
) -> Result<PathBuf> {
    let output_path = output_path_for_format(output_stem, format);

    match format {
        ExportFormat::Excel => {
            println!("- Excelを生成中...");
            excel::generate_excel(sheet, &output_path, sheet_name)?;
        }
        ExportFormat::Csv => {
            println!("- CSVを生成中...");
            csv::generate_csv(sheet, &output_path)?;
        }
    }

    tracing::info!(path = %output_path.display(), rows = sheet.len(), "出力しました");
    Ok(output_path)
}
