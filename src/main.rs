use anyhow::Context;
use clap::Parser;
use dialoguer::Confirm;
use sprint_annotator::{cli, config, error, export, loader, pipeline, tracker};
use sprint_annotator_common::template::parse_var;
use sprint_annotator_common::{classify, AnnotationRule, Classifier, PatternTable, TemplateVars};
use cli::{Cli, Commands};
use config::Config;
use error::AnnotatorError;
use std::path::Path;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;

    match cli.command {
        Commands::Report { boards, circle_map, task_map, format } => {
            println!("📊 sprint-annotator - スプリントレポート\n");

            let units = pipeline::parse_board_sprints(&boards)?;

            // 1. パターン表
            println!("[1/3] パターン表を読み込み中...");
            let circle = Classifier::new(&loader::load_pattern_table_or_empty(&circle_map), &config.circle_default);
            let task = Classifier::new(&loader::load_pattern_table_or_empty(&task_map), &config.category_default);
            println!("✔ サークル {}件 / タスク {}件\n", circle.len(), task.len());

            // 2. レポート取得
            println!("[2/3] {}件のレポートを取得中...", units.len());
            let client = tracker::TrackerClient::new(config.tracker()?)?;
            let summary = pipeline::run_board_reports(&client, &units, &circle, &task).await;
            report_summary(&summary);

            // 3. 出力
            println!("[3/3] 結果を保存中...");
            write_summary(summary, &format, pipeline::REPORT_OUTPUT, "Sprint Data")?;
        }

        Commands::Search { sprints, circle_map, category_map, format } => {
            println!("🔎 sprint-annotator - スプリント検索\n");

            let sprints = pipeline::parse_list(&sprints);
            if sprints.is_empty() {
                return Err(AnnotatorError::InvalidArgument("スプリント名が指定されていません".into()).into());
            }

            println!("[1/3] パターン表を読み込み中...");
            let circle = Classifier::new(&loader::load_pattern_table_or_empty(&circle_map), &config.circle_default);
            let category = Classifier::new(&loader::load_pattern_table_or_empty(&category_map), &config.category_default);
            println!("✔ サークル {}件 / カテゴリ {}件\n", circle.len(), category.len());

            println!("[2/3] {}件のスプリントを検索中...", sprints.len());
            let client = tracker::TrackerClient::new(config.tracker()?)?;
            let summary = pipeline::run_sprint_search(&client, &sprints, &circle, &category).await;
            report_summary(&summary);

            println!("[3/3] 結果を保存中...");
            write_summary(summary, &format, pipeline::SEARCH_OUTPUT, "Sprint Issues")?;
        }

        Commands::Annotate {
            input,
            circle_map,
            category_map,
            circle_column,
            category_column,
            format,
        } => {
            println!("🏷  sprint-annotator - 分類付与\n");

            println!("[1/3] パターン表を読み込み中...");
            let circle_table = match &circle_map {
                Some(path) => loader::load_pattern_table_or_empty(path),
                None => PatternTable::identity(&config.known_circles),
            };
            let mut rules = vec![AnnotationRule::new(
                circle_column,
                pipeline::COL_CIRCLE_NAME,
                Classifier::new(&circle_table, &config.circle_default),
            )];
            if let Some(path) = &category_map {
                let table = loader::load_pattern_table_or_empty(path);
                rules.push(AnnotationRule::new(
                    category_column,
                    pipeline::COL_CATEGORY,
                    Classifier::new(&table, &config.category_default),
                ));
            }
            println!("✔ {}列を追加します\n", rules.len());

            println!("[2/3] {} を分類中...", input.display());
            let sheet = pipeline::annotate_file(&input, &rules)?;
            println!("✔ {}行を分類\n", sheet.len());

            println!("[3/3] 結果を保存中...");
            let path = export::export_sheet(&sheet, &format, Path::new(pipeline::ANNOTATE_OUTPUT), "Annotated")?;
            println!("✔ 保存: {}", path.display());

            println!("\n✅ 完了");
        }

        Commands::Clone {
            template,
            summary,
            env,
            circle,
            vars,
            project,
            issue_type,
            assignee,
            priority,
            yes,
        } => {
            println!("📝 sprint-annotator - 課題複製\n");

            let mut template_vars = TemplateVars::new();
            template_vars.insert("ENV".into(), env);
            template_vars.insert("CIRCLE".into(), circle);
            for spec in &vars {
                let (name, value) = parse_var(spec).ok_or_else(|| {
                    AnnotatorError::InvalidArgument(format!("'{}' は NAME=VALUE 形式ではありません", spec))
                })?;
                template_vars.insert(name, value);
            }

            let project_key = project.or_else(|| config.project_key.clone()).ok_or_else(|| {
                AnnotatorError::Config(
                    "プロジェクトキーが未設定です。--project か `config --set-project` で指定してください".into(),
                )
            })?;

            let new_issue = tracker::NewIssue {
                project_key,
                summary,
                issue_type,
                description: serde_json::Value::Null,
                assignee,
                priority_id: priority,
            };

            println!("[1/2] テンプレート課題 {} を取得中...", template);
            let client = tracker::TrackerClient::new(config.tracker()?)?;
            let new_issue = pipeline::prepare_clone(&client, &template, &template_vars, new_issue).await?;
            println!("✔ 説明を置換しました\n");

            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!(
                        "{} に課題「{}」({}) を作成しますか?",
                        new_issue.project_key, new_issue.summary, new_issue.issue_type
                    ))
                    .default(false)
                    .interact()
                    .context("確認入力に失敗しました")?;
                if !confirmed {
                    println!("中止しました");
                    return Ok(());
                }
            }

            println!("[2/2] 課題を作成中...");
            let created = pipeline::create_clone(&client, &new_issue).await?;
            println!("✔ 作成: {}", created.key);

            println!("\n✅ 完了");
        }

        Commands::Classify { text, table, default } => {
            let table = loader::load_pattern_table(&table)?;
            println!("{}", classify(text.as_str(), &table, &default));
        }

        Commands::Config {
            set_base_url,
            set_username,
            set_api_token,
            set_project,
            show,
        } => {
            let mut config = config;

            if let Some(url) = set_base_url {
                config.set_base_url(url)?;
                println!("✔ URLを設定しました");
            }
            if let Some(username) = set_username {
                config.set_username(username)?;
                println!("✔ ユーザー名を設定しました");
            }
            if let Some(token) = set_api_token {
                config.set_api_token(token)?;
                println!("✔ APIトークンを設定しました");
            }
            if let Some(key) = set_project {
                config.set_project_key(key)?;
                println!("✔ プロジェクトキーを設定しました");
            }

            if show {
                println!("設定: {}", Config::config_path()?.display());
                println!("  URL: {}", config.base_url.as_deref().unwrap_or("未設定"));
                println!("  ユーザー名: {}", config.username.as_deref().unwrap_or("未設定"));
                println!("  APIトークン: {}", if config.api_token.is_some() { "設定済み" } else { "未設定" });
                println!("  プロジェクト: {}", config.project_key.as_deref().unwrap_or("未設定"));
                println!("  最大取得件数: {}", config.max_results);
                println!("  既知サークル: {}", config.known_circles.join(", "));
            }
        }
    }

    Ok(())
}

fn report_summary(summary: &pipeline::RunSummary) {
    println!("✔ 成功 {}件 / スキップ {}件\n", summary.processed, summary.skipped.len());
}

/// 成功分があれば書き出す。1件もなければ何も書かない
fn write_summary(
    summary: pipeline::RunSummary,
    format: &cli::ExportFormat,
    stem: &str,
    sheet_name: &str,
) -> anyhow::Result<()> {
    match summary.sheet {
        Some(sheet) => {
            let path = export::export_sheet(&sheet, format, Path::new(stem), sheet_name)?;
            println!("✔ 保存: {} ({}行)", path.display(), sheet.len());
            println!("\n✅ 完了");
        }
        None => {
            tracing::warn!("処理できたデータがないため出力しません");
            println!("⚠ 処理できたデータがありません。ファイルは出力しません");
        }
    }
    Ok(())
}
