//! Ranking commands: analyze, prioritize, strategies

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use super::output::Output;
use crate::api::{self, AnalyzeOptions, AnalyzeResponse};
use crate::domain::{DependencyGraph, NoIndex, ScoredResult, Scorer, Strategy};
use crate::storage::{Config, Project};

/// Reads a request body from a file, or stdin for `-` / no path
fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .with_context(|| format!("Failed to read input: {}", path.display())),
        _ => {
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .context("Failed to read request from stdin")?;
            Ok(body)
        }
    }
}

/// Ranks a transient batch of tasks given as a JSON request
pub fn analyze(
    output: &Output,
    input: Option<&Path>,
    strategy: Option<Strategy>,
    today: NaiveDate,
    explain: bool,
) -> Result<()> {
    let config = Config::load()?;
    let body = read_input(input)?;
    output.verbose_ctx("analyze", &format!("Read {} bytes of request", body.len()));

    let mut options = AnalyzeOptions::new(today)
        .with_default_strategy(config.default_strategy().name());
    if let Some(strategy) = strategy {
        options = options.with_strategy_override(strategy.name());
    }

    // Inline tasks carry their own counts; there is no persisted index to ask
    let reply = api::handle_analyze(&body, &options, &NoIndex);
    output.verbose_ctx("analyze", &format!("Reply status {}", reply.status_code));

    match &reply.body {
        AnalyzeResponse::Success {
            strategy_used,
            tasks,
        } => {
            let resolved = Strategy::resolve(strategy_used);
            if resolved.name() != strategy_used {
                output.verbose_ctx(
                    "analyze",
                    &format!("Unknown strategy '{}', using {}", strategy_used, resolved),
                );
            }
            render(output, strategy_used, tasks, explain);
            Ok(())
        }
        AnalyzeResponse::Error { message } => {
            if output.is_json() {
                output.data(&reply);
            }
            anyhow::bail!("{} (status {})", message, reply.status_code)
        }
    }
}

/// Ranks the project's stored tasks using live dependency counts
pub fn prioritize(
    output: &Output,
    strategy: Option<Strategy>,
    today: NaiveDate,
    limit: Option<usize>,
    explain: bool,
) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.task_store();
    let strategy = strategy.unwrap_or_else(|| project.config().default_strategy());

    let tasks = store.read_sorted()?;
    output.verbose_ctx(
        "prioritize",
        &format!("Loaded {} tasks from {}", tasks.len(), store.path().display()),
    );

    let graph = DependencyGraph::from_tasks(&tasks);
    output.verbose_ctx(
        "prioritize",
        &format!("Dependency index: {} tasks, {} edges", graph.len(), graph.edge_count()),
    );

    let counts = graph.dependent_counts();
    let inputs: Vec<_> = tasks.iter().map(|t| t.to_input()).collect();
    let scorer = Scorer::new(strategy, today);
    output.verbose_ctx(
        "prioritize",
        &format!("Scoring with {} as of {}", scorer.strategy(), scorer.today()),
    );
    let mut ranked = scorer.analyze(&inputs, &counts);
    api::ensure_finite(&ranked)
        .with_context(|| format!("Failed to rank tasks in {}", store.path().display()))?;

    if let Some(limit) = limit.or(project.config().project.default_limit) {
        ranked.truncate(limit);
    }

    render(output, scorer.strategy().name(), &ranked, explain);
    Ok(())
}

/// Lists the available strategies and their weights
pub fn strategies(output: &Output) -> Result<()> {
    if output.is_json() {
        let items: Vec<_> = Strategy::ALL
            .iter()
            .map(|s| {
                serde_json::json!({
                    "name": s.name(),
                    "description": s.description(),
                    "weights": s.weights(),
                })
            })
            .collect();
        output.data(&items);
    } else {
        println!(
            "{:<10} {:>7} {:>10} {:>6} {:>10}  DESCRIPTION",
            "STRATEGY", "URGENCY", "IMPORTANCE", "EFFORT", "DEPENDENCY"
        );
        println!("{}", "-".repeat(90));

        for strategy in Strategy::ALL {
            let w = strategy.weights();
            println!(
                "{:<10} {:>7} {:>10} {:>6} {:>10}  {}",
                strategy.name(),
                w.urgency,
                w.importance,
                w.effort,
                w.dependency,
                strategy.description()
            );
        }
    }

    Ok(())
}

fn render(output: &Output, strategy_used: &str, tasks: &[ScoredResult], explain: bool) {
    if output.is_json() {
        if explain {
            let items: Vec<_> = tasks
                .iter()
                .map(|t| {
                    let mut item = serde_json::json!(t);
                    item["breakdown"] = serde_json::json!(t.breakdown);
                    item
                })
                .collect();
            output.data(&serde_json::json!({
                "status": "success",
                "strategy_used": strategy_used,
                "tasks": items,
            }));
        } else {
            output.data(&AnalyzeResponse::Success {
                strategy_used: strategy_used.to_string(),
                tasks: tasks.to_vec(),
            });
        }
        return;
    }

    if tasks.is_empty() {
        println!("No tasks to rank");
        return;
    }

    println!("Strategy: {}", strategy_used);
    println!();

    if explain {
        println!(
            "{:>4} {:>8} {:>8} {:>8} {:>8} {:>8}  {:<12} TITLE",
            "#", "SCORE", "URGENCY", "IMPORT", "EFFORT", "DEPEND", "ID"
        );
        println!("{}", "-".repeat(90));
    } else {
        println!(
            "{:>4} {:>8}  {:<12} {:<10} {:>3} {:>6} {:>6}  TITLE",
            "#", "SCORE", "ID", "DUE", "IMP", "HOURS", "BLOCKS"
        );
        println!("{}", "-".repeat(80));
    }

    for (rank, task) in tasks.iter().enumerate() {
        let id = task
            .id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());

        if explain {
            let b = &task.breakdown;
            println!(
                "{:>4} {:>8.2} {:>8.2} {:>8.2} {:>8.2} {:>8.2}  {:<12} {}",
                rank + 1,
                task.score,
                b.urgency,
                b.importance,
                b.effort,
                b.dependency,
                id,
                task.title
            );
        } else {
            let due = task
                .due_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:>4} {:>8.2}  {:<12} {:<10} {:>3} {:>6} {:>6}  {}",
                rank + 1,
                task.score,
                id,
                due,
                task.importance,
                task.estimated_hours,
                task.blocking_count,
                task.title
            );
        }
    }
}
