//! CSVの読み書き
//!
//! 引用符で囲まれたフィールド（カンマ・改行・`""` エスケープを含む）に対応する。

use crate::error::{Error, Result};

/// CSV文字列をレコード単位に分割
///
/// - 先頭のBOMは除去
/// - 空行はスキップ
/// - `\r\n` と `\n` のどちらの改行にも対応
pub fn parse_csv(content: &str) -> Result<Vec<Vec<String>>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    // エスケープされた引用符
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                record.push(std::mem::take(&mut field));
                push_record(&mut records, std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(Error::Csv("引用符が閉じられていません".into()));
    }

    // 最後のレコード（末尾改行なし）
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        push_record(&mut records, record);
    }

    Ok(records)
}

fn push_record(records: &mut Vec<Vec<String>>, record: Vec<String>) {
    let blank = record.len() == 1 && record[0].is_empty();
    if !blank {
        records.push(record);
    }
}

/// 1フィールドを必要に応じて引用符で囲んで書き出す
pub fn write_field(out: &mut String, field: &str) {
    let needs_quotes = field.contains([',', '"', '\n', '\r']);
    if needs_quotes {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}

/// 1レコードを書き出す（改行付き）
pub fn write_record<I, S>(out: &mut String, fields: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_field(out, field.as_ref());
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let records = parse_csv("Pattern,MappedValue\nbug,Defect\nfeature,Story\n").unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], vec!["Pattern", "MappedValue"]);
        assert_eq!(records[2], vec!["feature", "Story"]);
    }

    #[test]
    fn test_parse_quoted_fields() {
        let records = parse_csv("a,b\n\"x, y\",\"say \"\"hi\"\"\"\n").unwrap();
        assert_eq!(records[1], vec!["x, y", "say \"hi\""]);
    }

    #[test]
    fn test_parse_embedded_newline_and_crlf() {
        let records = parse_csv("a,b\r\n\"line1\nline2\",z\r\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], vec!["line1\nline2", "z"]);
    }

    #[test]
    fn test_parse_skips_blank_lines_and_bom() {
        let records = parse_csv("\u{feff}a,b\n\n1,2").unwrap();
        assert_eq!(records, vec![vec!["a", "b"], vec!["1", "2"]]);
    }

    #[test]
    fn test_parse_empty_trailing_field() {
        let records = parse_csv("a,b\n1,\n").unwrap();
        assert_eq!(records[1], vec!["1", ""]);
    }

    #[test]
    fn test_parse_unterminated_quote() {
        assert!(matches!(parse_csv("a\n\"open"), Err(Error::Csv(_))));
    }

    #[test]
    fn test_write_record_quotes_when_needed() {
        let mut out = String::new();
        write_record(&mut out, ["plain", "with,comma", "q\"uote"]);
        assert_eq!(out, "plain,\"with,comma\",\"q\"\"uote\"\n");

        let reparsed = parse_csv(&out).unwrap();
        assert_eq!(reparsed[0], vec!["plain", "with,comma", "q\"uote"]);
    }
}
