//! Sprint Annotator Common Library
//!
//! CLIから使用される分類エンジンと表データの型

pub mod annotate;
pub mod classifier;
pub mod csv;
pub mod error;
pub mod export;
pub mod pattern;
pub mod sheet;
pub mod template;
pub mod value;

pub use annotate::{annotate, AnnotationRule};
pub use classifier::{classify, Classifier, DEFAULT_LABEL};
pub use error::{Error, Result};
pub use pattern::{PatternEntry, PatternTable};
pub use sheet::Sheet;
pub use template::{render_value, TemplateVars};
pub use value::CellValue;
