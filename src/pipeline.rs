//! 処理パイプライン
//!
//! 入力ごとの処理単位（ボード/スプリント、スプリント名）を順に処理し、
//! 失敗した単位はログに残してスキップする。成功した結果だけを連結する。

use crate::error::{AnnotatorError, Result};
use crate::loader;
use crate::tracker::{CreatedIssue, Issue, NewIssue, TrackerClient};
use indicatif::{ProgressBar, ProgressStyle};
use sprint_annotator_common::template::{render_value, TemplateVars};
use sprint_annotator_common::{annotate, AnnotationRule, CellValue, Classifier, Sheet};
use std::io::{self, Write};
use std::path::Path;

/// 出力ファイル名（拡張子は出力形式で決まる）
pub const REPORT_OUTPUT: &str = "processed_sprint_data";
pub const SEARCH_OUTPUT: &str = "sprint_issues_annotated";
pub const ANNOTATE_OUTPUT: &str = "transformed_output";

pub const COL_SPRINT_NAME: &str = "Sprint Name";
pub const COL_TASK_NAME: &str = "Task Name";
pub const COL_BOARD_ID: &str = "Board ID";
pub const COL_CIRCLE_NAME: &str = "Circle Name";
pub const COL_TASK_CATEGORY: &str = "Task Category";

pub const COL_KEY: &str = "Key";
pub const COL_SUMMARY: &str = "Summary";
pub const COL_PARENT_SUMMARY: &str = "Parent Summary";
pub const COL_STATUS: &str = "Status";
pub const COL_SPRINT: &str = "Sprint";
pub const COL_CIRCLE: &str = "Circle";
pub const COL_CATEGORY: &str = "Category";

/// ボードとスプリントの組
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSprint {
    pub board_id: String,
    pub sprint_id: String,
}

impl std::fmt::Display for BoardSprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Board {} / Sprint {}", self.board_id, self.sprint_id)
    }
}

/// スキップした処理単位
#[derive(Debug, Clone)]
pub struct SkippedUnit {
    pub unit: String,
    pub reason: String,
}

/// 複数単位の処理結果
#[derive(Debug, Default)]
pub struct RunSummary {
    /// 成功した単位を連結したシート（1件も成功しなければ None）
    pub sheet: Option<Sheet>,
    pub processed: usize,
    pub skipped: Vec<SkippedUnit>,
}

impl RunSummary {
    fn finish(sheets: Vec<Sheet>, skipped: Vec<SkippedUnit>) -> Self {
        let processed = sheets.len();
        let sheet = if sheets.is_empty() {
            None
        } else {
            Some(Sheet::concat(sheets))
        };
        Self {
            sheet,
            processed,
            skipped,
        }
    }
}

/// `Board1:Sprint10,Board2:Sprint15` を分解
pub fn parse_board_sprints(spec: &str) -> Result<Vec<BoardSprint>> {
    let mut units = Vec::new();

    for item in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (board, sprint) = item.split_once(':').ok_or_else(|| {
            AnnotatorError::InvalidArgument(format!("'{}' は BOARD:SPRINT 形式ではありません", item))
        })?;
        let (board, sprint) = (board.trim(), sprint.trim());
        if board.is_empty() || sprint.is_empty() {
            return Err(AnnotatorError::InvalidArgument(format!(
                "'{}' のボードIDまたはスプリントIDが空です",
                item
            )));
        }
        units.push(BoardSprint {
            board_id: board.to_string(),
            sprint_id: sprint.to_string(),
        });
    }

    if units.is_empty() {
        return Err(AnnotatorError::InvalidArgument("ボード/スプリントが指定されていません".into()));
    }
    Ok(units)
}

/// カンマ区切りリストを分解（空要素は除外）
pub fn parse_list(spec: &str) -> Vec<String> {
    spec.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// スプリント名からJQLを生成
pub fn sprint_jql(sprint_name: &str) -> String {
    let escaped = sprint_name.replace('\\', "\\\\").replace('"', "\\\"");
    format!("sprint = \"{}\"", escaped)
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    let style = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style.progress_chars("=> "));
    pb
}

/// 進捗バーを退避して1行出力
///
/// バーが非表示（端末でない場合など）でも行は必ず書き出す。
fn emit<W: Write>(pb: &ProgressBar, out: &mut W, line: &str) {
    pb.suspend(|| {
        if let Err(e) = writeln!(out, "{}", line) {
            tracing::debug!(error = %e, "進捗行の出力に失敗");
        }
    });
}

fn skip(pb: &ProgressBar, skipped: &mut Vec<SkippedUnit>, unit: String, reason: String) {
    tracing::warn!(%unit, %reason, "処理単位をスキップ");
    emit(pb, &mut io::stdout(), &format!("⚠ {} をスキップ: {}", unit, reason));
    skipped.push(SkippedUnit { unit, reason });
}

// =============================================
// スプリントレポート
// =============================================

/// 取得したレポートにボードIDと分類列を付与
///
/// データが空なら `Ok(None)`。
pub fn enrich_report(
    mut sheet: Sheet,
    unit: &BoardSprint,
    circle: &Classifier,
    task: &Classifier,
) -> Result<Option<Sheet>> {
    if sheet.is_empty() {
        return Ok(None);
    }

    sheet.fill_column(COL_BOARD_ID, CellValue::Text(unit.board_id.clone()));
    annotate(
        &mut sheet,
        &[
            AnnotationRule::new(COL_SPRINT_NAME, COL_CIRCLE_NAME, circle.clone()),
            AnnotationRule::new(COL_TASK_NAME, COL_TASK_CATEGORY, task.clone()),
        ],
    )?;
    Ok(Some(sheet))
}

/// ボードごとにレポートを取得・分類して連結
pub async fn run_board_reports(
    client: &TrackerClient,
    units: &[BoardSprint],
    circle: &Classifier,
    task: &Classifier,
) -> RunSummary {
    let pb = progress_bar(units.len());
    let mut sheets = Vec::new();
    let mut skipped = Vec::new();

    for unit in units {
        pb.set_message(unit.to_string());

        let result = match client.fetch_sprint_report(&unit.board_id, &unit.sprint_id).await {
            Ok(bytes) => loader::excel::read_workbook_bytes(&bytes)
                .and_then(|sheet| enrich_report(sheet, unit, circle, task)),
            Err(e) => Err(e),
        };

        match result {
            Ok(Some(sheet)) => {
                emit(&pb, &mut io::stdout(), &format!("✔ {}: {}件", unit, sheet.len()));
                sheets.push(sheet);
            }
            Ok(None) => skip(&pb, &mut skipped, unit.to_string(), "データが空です".into()),
            Err(e) => skip(&pb, &mut skipped, unit.to_string(), e.to_string()),
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    RunSummary::finish(sheets, skipped)
}

// =============================================
// スプリント検索
// =============================================

/// 検索結果の課題をシートに変換
pub fn issues_to_sheet(issues: &[Issue], sprint_name: &str) -> Sheet {
    let mut sheet = Sheet::new([COL_KEY, COL_SUMMARY, COL_PARENT_SUMMARY, COL_STATUS, COL_SPRINT]);

    for issue in issues {
        sheet.push_row(vec![
            CellValue::Text(issue.key.clone()),
            CellValue::from(issue.summary().map(String::from)),
            CellValue::from(issue.parent_summary().map(String::from)),
            CellValue::from(issue.status().map(String::from)),
            CellValue::Text(sprint_name.to_string()),
        ]);
    }

    sheet
}

/// 課題シートにサークル・カテゴリ列を付与
pub fn enrich_issues(mut sheet: Sheet, circle: &Classifier, category: &Classifier) -> Result<Sheet> {
    annotate(
        &mut sheet,
        &[
            AnnotationRule::new(COL_PARENT_SUMMARY, COL_CIRCLE, circle.clone()),
            AnnotationRule::new(COL_SUMMARY, COL_CATEGORY, category.clone()),
        ],
    )?;
    Ok(sheet)
}

/// スプリント名ごとに検索・分類して連結
pub async fn run_sprint_search(
    client: &TrackerClient,
    sprints: &[String],
    circle: &Classifier,
    category: &Classifier,
) -> RunSummary {
    let pb = progress_bar(sprints.len());
    let mut sheets = Vec::new();
    let mut skipped = Vec::new();

    for sprint in sprints {
        pb.set_message(sprint.clone());
        let unit = format!("Sprint {}", sprint);

        match client.search_issues(&sprint_jql(sprint)).await {
            Ok(issues) if issues.is_empty() => {
                skip(&pb, &mut skipped, unit, "課題がありません".into());
            }
            Ok(issues) => match enrich_issues(issues_to_sheet(&issues, sprint), circle, category) {
                Ok(sheet) => {
                    emit(&pb, &mut io::stdout(), &format!("✔ {}: {}件", unit, sheet.len()));
                    sheets.push(sheet);
                }
                Err(e) => skip(&pb, &mut skipped, unit, e.to_string()),
            },
            Err(e) => skip(&pb, &mut skipped, unit, e.to_string()),
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    RunSummary::finish(sheets, skipped)
}

// =============================================
// ファイル分類
// =============================================

/// ファイルを読み込み、ルールに従って分類列を追加
pub fn annotate_file(input: &Path, rules: &[AnnotationRule]) -> Result<Sheet> {
    let mut sheet = loader::load_sheet(input)?;
    annotate(&mut sheet, rules)?;
    Ok(sheet)
}

// =============================================
// 課題複製
// =============================================

/// テンプレート課題から作成内容を組み立てる
///
/// テンプレートの説明中のプレースホルダを置換する。説明が無ければエラー。
pub fn build_clone(
    template: &serde_json::Value,
    vars: &TemplateVars,
    mut new_issue: NewIssue,
) -> Result<NewIssue> {
    let description = template
        .get("fields")
        .and_then(|fields| fields.get("description"))
        .filter(|d| !d.is_null())
        .ok_or_else(|| AnnotatorError::InvalidTemplate("テンプレート課題に説明がありません".into()))?;

    new_issue.description = render_value(description, vars);
    Ok(new_issue)
}

/// テンプレート課題を取得して複製内容を組み立てる
pub async fn prepare_clone(
    client: &TrackerClient,
    template_key: &str,
    vars: &TemplateVars,
    new_issue: NewIssue,
) -> Result<NewIssue> {
    let template = client.get_issue(template_key).await?;
    build_clone(&template, vars, new_issue)
}

/// 課題を作成
pub async fn create_clone(client: &TrackerClient, new_issue: &NewIssue) -> Result<CreatedIssue> {
    client.create_issue(&new_issue.to_payload()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sprint_annotator_common::PatternTable;

    #[test]
    fn test_parse_board_sprints() {
        let units = parse_board_sprints("Board1:Sprint10, Board2:Sprint15,").unwrap();
        assert_eq!(
            units,
            vec![
                BoardSprint { board_id: "Board1".into(), sprint_id: "Sprint10".into() },
                BoardSprint { board_id: "Board2".into(), sprint_id: "Sprint15".into() },
            ]
        );
    }

    #[test]
    fn test_parse_board_sprints_invalid() {
        assert!(matches!(parse_board_sprints("Board1"), Err(AnnotatorError::InvalidArgument(_))));
        assert!(matches!(parse_board_sprints("Board1:"), Err(AnnotatorError::InvalidArgument(_))));
        assert!(matches!(parse_board_sprints(" , "), Err(AnnotatorError::InvalidArgument(_))));
    }

    #[test]
    fn test_emit_writes_when_bar_hidden() {
        let pb = ProgressBar::hidden();
        let mut out = Vec::new();
        emit(&pb, &mut out, "⚠ Board B2 / Sprint S15 をスキップ: 500");
        emit(&pb, &mut out, "✔ Board B1 / Sprint S10: 2件");

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "⚠ Board B2 / Sprint S15 をスキップ: 500\n✔ Board B1 / Sprint S10: 2件\n"
        );
    }

    #[test]
    fn test_emit_writes_with_visible_bar() {
        let pb = progress_bar(2);
        let mut out = Vec::new();
        emit(&pb, &mut out, "line");
        pb.finish_and_clear();
        assert_eq!(out, b"line\n");
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("Sprint 1, Sprint 2,,"), vec!["Sprint 1", "Sprint 2"]);
    }

    #[test]
    fn test_sprint_jql_escapes_quotes() {
        assert_eq!(sprint_jql("Sprint 1"), "sprint = \"Sprint 1\"");
        assert_eq!(sprint_jql("a \"b\""), "sprint = \"a \\\"b\\\"\"");
    }

    #[test]
    fn test_enrich_report() {
        let mut sheet = Sheet::new([COL_SPRINT_NAME, COL_TASK_NAME]);
        sheet.push_row(vec!["CircleA - Sprint 10".into(), "Fix login bug".into()]);

        let unit = BoardSprint { board_id: "B1".into(), sprint_id: "S10".into() };
        let circle = Classifier::new(&PatternTable::identity(["CircleA"]), "Unknown");
        let task = Classifier::new(&PatternTable::from_pairs([("bug", "Defect")]), "Unknown");

        let enriched = enrich_report(sheet, &unit, &circle, &task).unwrap().unwrap();
        assert_eq!(
            enriched.columns(),
            &[COL_SPRINT_NAME, COL_TASK_NAME, COL_BOARD_ID, COL_CIRCLE_NAME, COL_TASK_CATEGORY]
        );
        assert_eq!(enriched.rows()[0][2..], [
            CellValue::from("B1"),
            CellValue::from("CircleA"),
            CellValue::from("Defect"),
        ]);
    }

    #[test]
    fn test_enrich_report_empty_and_missing_columns() {
        let unit = BoardSprint { board_id: "B1".into(), sprint_id: "S1".into() };
        let c = Classifier::new(&PatternTable::new(), "Unknown");

        let empty = Sheet::new([COL_SPRINT_NAME, COL_TASK_NAME]);
        assert!(enrich_report(empty, &unit, &c, &c).unwrap().is_none());

        let mut no_task = Sheet::new([COL_SPRINT_NAME]);
        no_task.push_row(vec!["x".into()]);
        assert!(matches!(
            enrich_report(no_task, &unit, &c, &c),
            Err(AnnotatorError::Schema(missing)) if missing == vec![COL_TASK_NAME.to_string()]
        ));
    }

    #[test]
    fn test_issues_to_sheet_and_enrich() {
        let issues: Vec<Issue> = serde_json::from_value(json!([
            { "key": "PAY-1", "fields": { "summary": "Fix refund bug",
              "parent": { "key": "PAY-0", "fields": { "summary": "CircleB epic" } },
              "status": { "name": "In Progress" } } },
            { "key": "PAY-2", "fields": { "summary": "Write docs" } }
        ]))
        .unwrap();

        let sheet = issues_to_sheet(&issues, "Sprint 7");
        let circle = Classifier::new(&PatternTable::identity(["CircleB"]), "Unknown");
        let category = Classifier::new(&PatternTable::from_pairs([("bug", "Defect")]), "Uncategorized");
        let enriched = enrich_issues(sheet, &circle, &category).unwrap();

        assert_eq!(enriched.column_index(COL_CIRCLE), Some(5));
        assert_eq!(enriched.rows()[0][5..], [CellValue::from("CircleB"), CellValue::from("Defect")]);
        assert_eq!(enriched.rows()[1][2], CellValue::Empty);
        assert_eq!(enriched.rows()[1][5..], [CellValue::from("Unknown"), CellValue::from("Uncategorized")]);
        assert_eq!(enriched.rows()[1][4], CellValue::from("Sprint 7"));
    }

    fn new_issue() -> NewIssue {
        NewIssue {
            project_key: "PROJ".into(),
            summary: "Cloned Story - Sprint 24".into(),
            issue_type: "Story".into(),
            description: serde_json::Value::Null,
            assignee: Some("jdoe".into()),
            priority_id: None,
        }
    }

    #[test]
    fn test_build_clone_substitutes_description() {
        let template = json!({
            "key": "PROJ-123",
            "fields": { "description": { "type": "doc", "content": [
                { "type": "text", "text": "Deploy {{ENV}} for {{CIRCLE}}" }
            ] } }
        });
        let mut vars = TemplateVars::new();
        vars.insert("ENV".into(), "PROD".into());
        vars.insert("CIRCLE".into(), "PAYMENTS".into());

        let cloned = build_clone(&template, &vars, new_issue()).unwrap();
        assert_eq!(cloned.description["content"][0]["text"], "Deploy PROD for PAYMENTS");
        assert_eq!(cloned.summary, "Cloned Story - Sprint 24");
    }

    #[test]
    fn test_build_clone_requires_description() {
        let vars = TemplateVars::new();
        let no_description = json!({ "fields": { "description": null } });
        assert!(matches!(
            build_clone(&no_description, &vars, new_issue()),
            Err(AnnotatorError::InvalidTemplate(_))
        ));
        assert!(matches!(
            build_clone(&json!({}), &vars, new_issue()),
            Err(AnnotatorError::InvalidTemplate(_))
        ));
    }
}
