//! Task CLI commands

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Subcommand;

use super::output::Output;
use super::parse_date;
use crate::domain::{DependencyGraph, Task, TaskId};
use crate::storage::Project;

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a task
    ///
    /// Examples:
    ///   rank task add "Fix typo"
    ///   rank task add "Ship API" --due 2024-07-01 --importance 8 --hours 6
    ///   rank task add "Write docs" --depends-on t-9d3e5f2
    Add {
        /// Task title
        title: String,

        /// Due date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        due: Option<NaiveDate>,

        /// Importance from 1 (low) to 10 (high)
        #[arg(long, short, default_value = "1", value_parser = clap::value_parser!(i64).range(1..=10))]
        importance: i64,

        /// Estimated hours of work
        #[arg(long, default_value = "1.0")]
        hours: f64,

        /// Task this one depends on (repeatable)
        #[arg(long = "depends-on", short = 'd')]
        depends_on: Vec<String>,
    },

    /// List tasks
    List,

    /// Show task details
    Show {
        /// Task ID
        id: String,
    },

    /// Add a dependency between tasks
    Dep {
        /// Task that will be blocked
        task: String,

        /// Task that must be completed first
        depends_on: String,
    },

    /// Remove a dependency
    Undep {
        /// Task to unblock
        task: String,

        /// Dependency to remove
        depends_on: String,
    },

    /// Delete a task
    Remove {
        /// Task ID
        id: String,
    },
}

pub fn run(cmd: TaskCommands, output: &Output) -> Result<()> {
    match cmd {
        TaskCommands::Add {
            title,
            due,
            importance,
            hours,
            depends_on,
        } => add_task(output, &title, due, importance, hours, &depends_on),
        TaskCommands::List => list_tasks(output),
        TaskCommands::Show { id } => show_task(output, &id),
        TaskCommands::Dep { task, depends_on } => add_dependency(output, &task, &depends_on),
        TaskCommands::Undep { task, depends_on } => remove_dependency(output, &task, &depends_on),
        TaskCommands::Remove { id } => remove_task(output, &id),
    }
}

fn task_json(task: &Task) -> serde_json::Value {
    serde_json::json!({
        "id": task.id,
        "title": task.title,
        "due_date": task.due_date,
        "importance": task.importance,
        "estimated_hours": task.estimated_hours,
        "depends_on": task.depends_on,
    })
}

fn add_task(
    output: &Output,
    title: &str,
    due: Option<NaiveDate>,
    importance: i64,
    hours: f64,
    depends_on: &[String],
) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.task_store();

    let mut task = Task::new(TaskId::generate(title, Utc::now()), title);
    task.due_date = due;
    task.set_importance(importance)?;
    task.set_estimated_hours(hours)?;

    if !depends_on.is_empty() {
        let tasks = store.read_all()?;
        for dep in depends_on {
            let dep_id: TaskId = dep.parse()?;
            if !tasks.contains_key(&dep_id) {
                anyhow::bail!("Dependency task not found: {}", dep_id);
            }
            task.add_dependency(dep_id);
        }
    }

    output.verbose_ctx("task", &format!("Appending {} to {}", task.id, store.path().display()));
    store.append(&task)?;

    if output.is_json() {
        output.data(&task_json(&task));
    } else {
        output.success(&format!("Created task: {} - {}", task.id, task.title));
    }

    Ok(())
}

fn list_tasks(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let tasks = project.task_store().read_sorted()?;

    if output.is_json() {
        let items: Vec<_> = tasks.iter().map(task_json).collect();
        output.data(&items);
    } else if tasks.is_empty() {
        println!("No tasks");
    } else {
        println!("{:<12} {:<10} {:>3} {:>6} TITLE", "ID", "DUE", "IMP", "HOURS");
        println!("{}", "-".repeat(60));

        for task in &tasks {
            let due = task
                .due_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:<12} {:<10} {:>3} {:>6} {}",
                task.id.to_string(),
                due,
                task.importance,
                task.estimated_hours,
                task.title
            );
        }
    }

    Ok(())
}

fn show_task(output: &Output, id_str: &str) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.task_store();

    let id: TaskId = id_str.parse()?;
    let tasks = store.read_all()?;

    let task = tasks
        .get(&id)
        .ok_or_else(|| anyhow::anyhow!("Task not found: {}", id))?;

    let graph = DependencyGraph::from_tasks(tasks.values());
    let mut blocks = graph.dependents(&id);
    blocks.sort();

    if output.is_json() {
        let mut json = task_json(task);
        json["created_at"] = serde_json::json!(task.created_at);
        json["blocks"] = serde_json::json!(blocks);
        json["blocking_count"] = serde_json::json!(blocks.len());
        output.data(&json);
    } else {
        println!("Task: {}", task.id);
        println!("Title: {}", task.title);
        if let Some(due) = task.due_date {
            println!("Due: {}", due);
        }
        println!("Importance: {}", task.importance);
        println!("Estimated hours: {}", task.estimated_hours);
        println!("Created: {}", task.created_at.format("%Y-%m-%d %H:%M"));

        if !task.depends_on.is_empty() {
            println!("\nDepends on:");
            for dep in &task.depends_on {
                let title = tasks.get(dep).map(|t| t.title.as_str()).unwrap_or("?");
                println!("  {} ({})", dep, title);
            }
        }

        if !blocks.is_empty() {
            println!("\nBlocks {} task(s):", blocks.len());
            for dependent in &blocks {
                let title = tasks.get(dependent).map(|t| t.title.as_str()).unwrap_or("?");
                println!("  {} ({})", dependent, title);
            }
        }
    }

    Ok(())
}

fn add_dependency(output: &Output, task_str: &str, depends_on_str: &str) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.task_store();

    let task_id: TaskId = task_str.parse()?;
    let depends_on_id: TaskId = depends_on_str.parse()?;

    let mut tasks = store.read_all()?;

    // Rejects unknown tasks and self-dependencies
    let mut graph = DependencyGraph::from_tasks(tasks.values());
    graph.add_dependency(&task_id, &depends_on_id)?;

    let task = tasks
        .get_mut(&task_id)
        .with_context(|| format!("Task not found: {}", task_id))?;
    task.add_dependency(depends_on_id.clone());
    store.update(task)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "task": task_id,
            "depends_on": depends_on_id,
        }));
    } else {
        output.success(&format!("{} now depends on {}", task_id, depends_on_id));
    }

    Ok(())
}

fn remove_dependency(output: &Output, task_str: &str, depends_on_str: &str) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.task_store();

    let task_id: TaskId = task_str.parse()?;
    let depends_on_id: TaskId = depends_on_str.parse()?;

    let mut tasks = store.read_all()?;

    let task = tasks
        .get_mut(&task_id)
        .ok_or_else(|| anyhow::anyhow!("Task not found: {}", task_id))?;

    if !task.remove_dependency(&depends_on_id) {
        anyhow::bail!("{} does not depend on {}", task_id, depends_on_id);
    }
    store.update(task)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "task": task_id,
            "removed_dependency": depends_on_id,
        }));
    } else {
        output.success(&format!(
            "Removed dependency: {} no longer depends on {}",
            task_id, depends_on_id
        ));
    }

    Ok(())
}

fn remove_task(output: &Output, id_str: &str) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.task_store();

    let id: TaskId = id_str.parse()?;
    if !store.remove(&id)? {
        anyhow::bail!("Task not found: {}", id);
    }

    if output.is_json() {
        output.data(&serde_json::json!({ "removed": id }));
    } else {
        output.success(&format!("Removed task: {}", id));
    }

    Ok(())
}
