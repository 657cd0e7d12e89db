//! テンプレート置換
//!
//! 課題の説明（JSONドキュメント）に含まれる `{{NAME}}` を変数値で置き換える。
//! JSON全体を文字列化して置換するのではなく、文字列ノードだけを辿って置換する。

use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::BTreeMap;

lazy_static::lazy_static! {
    static ref PLACEHOLDER_RE: Regex = Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").unwrap();
}

/// 置換変数（キー → 値）
pub type TemplateVars = BTreeMap<String, String>;

/// 文字列中のプレースホルダを置換（未定義のものはそのまま残す）
pub fn render_str(text: &str, vars: &TemplateVars) -> String {
    PLACEHOLDER_RE
        .replace_all(text, |caps: &Captures| match vars.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// JSON値の全文字列ノードを置換
pub fn render_value(value: &Value, vars: &TemplateVars) -> Value {
    match value {
        Value::String(s) => Value::String(render_str(s, vars)),
        Value::Array(items) => Value::Array(items.iter().map(|v| render_value(v, vars)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), render_value(v, vars)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// `NAME=VALUE` 形式の文字列を変数に変換
pub fn parse_var(spec: &str) -> Option<(String, String)> {
    let (name, value) = spec.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.to_string()))
}
