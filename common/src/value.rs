//! セル値の型定義
//!
//! スプレッドシート・CSV・APIレスポンスのどれから来た値も
//! 同じ型で扱い、分類前に文字列化できるようにする。

use std::fmt;

/// 1セル分の値
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Int(i64),
    Bool(bool),
    /// 日時（表示用に整形済み）
    DateTime(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) | CellValue::DateTime(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) | CellValue::DateTime(s) => f.write_str(s),
            CellValue::Number(n) => {
                // 整数値の浮動小数点はスプレッドシート表示と同じく小数部を付けない
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<Option<String>> for CellValue {
    fn from(s: Option<String>) -> Self {
        s.map(CellValue::Text).unwrap_or_default()
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_number() {
        assert_eq!(CellValue::Number(3.0).to_string(), "3");
        assert_eq!(CellValue::Number(-12.0).to_string(), "-12");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Int(42).to_string(), "42");
    }

    #[test]
    fn test_display_empty_and_bool() {
        assert_eq!(CellValue::Empty.to_string(), "");
        assert_eq!(CellValue::Bool(true).to_string(), "true");
    }

    #[test]
    fn test_is_empty() {
        assert!(CellValue::Empty.is_empty());
        assert!(CellValue::Text(String::new()).is_empty());
        assert!(!CellValue::Int(0).is_empty());
    }

    #[test]
    fn test_from_option() {
        assert_eq!(CellValue::from(None::<String>), CellValue::Empty);
        assert_eq!(CellValue::from(Some("x".to_string())), CellValue::Text("x".into()));
    }
}
