//! CSV出力

use crate::error::Result;
use sprint_annotator_common::Sheet;
use std::path::Path;

pub fn generate_csv(sheet: &Sheet, output_path: &Path) -> Result<()> {
    std::fs::write(output_path, sheet.to_csv_string())?;
    Ok(())
}
