//! Command implementations
//!
//! Every mutating command loads the persisted list, applies one store
//! operation, and saves the result back; a process invocation is one
//! session against the data file.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use super::output::Output;
use crate::domain::{Priority, Status, Todo, TodoList};
use crate::storage::{binary, export};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

fn load_list(output: &Output, file: &Path) -> Result<TodoList> {
    let list = binary::load(file)
        .with_context(|| format!("Failed to load todo list from {}", file.display()))?;
    output.verbose(&format!("Loaded {} todos", list.len()));
    Ok(list)
}

fn save_list(output: &Output, file: &Path, list: &TodoList) -> Result<()> {
    binary::save(file, list)
        .with_context(|| format!("Failed to save todo list to {}", file.display()))?;
    output.verbose(&format!("Saved {} todos", list.len()));
    Ok(())
}

pub fn add(
    output: &Output,
    file: &Path,
    title: &str,
    description: &str,
    priority: Priority,
) -> Result<()> {
    let mut list = load_list(output, file)?;
    let id = list.create(title, description, priority)?;
    save_list(output, file, &list)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id,
            "title": title,
            "priority": priority,
            "status": Status::Pending,
        }));
    } else {
        output.success(&format!("Created todo {}: {}", id, title));
    }
    Ok(())
}

pub fn list(output: &Output, file: &Path) -> Result<()> {
    let list = load_list(output, file)?;

    if output.is_json() {
        let todos: Vec<&Todo> = list.iter().collect();
        output.data(&todos);
        return Ok(());
    }

    if list.is_empty() {
        println!("No todos found.");
        return Ok(());
    }

    println!(
        "{:<5} {:<22} {:<9} {:<10} {}",
        "ID", "TITLE", "PRIORITY", "STATUS", "UPDATED"
    );
    println!("{}", "-".repeat(66));
    for todo in list.iter() {
        println!(
            "{:<5} {:<22} {:<9} {:<10} {}",
            todo.id,
            truncate(&todo.title, 20),
            todo.priority.label(),
            todo.status.label(),
            todo.updated_at.format(TIMESTAMP_FORMAT)
        );
    }
    println!();
    println!("Total todos: {}", list.len());
    Ok(())
}

pub fn show(output: &Output, file: &Path, id: u32) -> Result<()> {
    let list = load_list(output, file)?;
    let todo = list
        .find(id)
        .ok_or_else(|| anyhow::anyhow!("Todo with id {} not found", id))?;

    if output.is_json() {
        output.data(todo);
        return Ok(());
    }

    println!("Todo #{}", todo.id);
    println!("  Title:       {}", todo.title);
    let description = if todo.has_description() {
        todo.description.as_str()
    } else {
        "(no description)"
    };
    println!("  Description: {}", description);
    println!("  Priority:    {}", todo.priority.label());
    println!("  Status:      {}", todo.status.label());
    println!("  Created:     {}", format_ts(todo.created_at));
    println!("  Updated:     {}", format_ts(todo.updated_at));
    Ok(())
}

pub fn update(
    output: &Output,
    file: &Path,
    id: u32,
    title: Option<&str>,
    description: Option<&str>,
    priority: Option<Priority>,
) -> Result<()> {
    let mut list = load_list(output, file)?;
    list.update(id, title, description, priority)?;
    save_list(output, file, &list)?;
    output.success(&format!("Updated todo {}", id));
    Ok(())
}

pub fn delete(output: &Output, file: &Path, id: u32, force: bool) -> Result<()> {
    let mut list = load_list(output, file)?;
    if list.find(id).is_none() {
        anyhow::bail!("Todo with id {} not found", id);
    }
    if !force {
        anyhow::bail!("Refusing to delete todo {} (pass --force to confirm)", id);
    }
    list.delete(id)?;
    save_list(output, file, &list)?;
    output.success(&format!("Deleted todo {}", id));
    Ok(())
}

pub fn set_status(output: &Output, file: &Path, id: u32, status: Status) -> Result<()> {
    let mut list = load_list(output, file)?;
    let todo = list
        .find(id)
        .ok_or_else(|| anyhow::anyhow!("Todo with id {} not found", id))?;

    let label = status.label().to_lowercase();
    if todo.status == status {
        output.success(&format!("Todo {} is already {}", id, label));
        return Ok(());
    }

    list.set_status(id, status)?;
    save_list(output, file, &list)?;
    output.success(&format!("Marked todo {} as {}", id, label));
    Ok(())
}

pub fn save(output: &Output, file: &Path) -> Result<()> {
    let list = load_list(output, file)?;
    save_list(output, file, &list)?;
    output.success(&format!(
        "Saved {} todos to {}",
        list.len(),
        file.display()
    ));
    Ok(())
}

pub fn export(output: &Output, file: &Path, destination: &Path) -> Result<()> {
    let list = load_list(output, file)?;
    export::export_to_path(&list, destination)?;
    output.success(&format!(
        "Exported {} todos to {}",
        list.len(),
        destination.display()
    ));
    Ok(())
}

fn format_ts(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max_chars - 1).collect();
        out.push('…');
        out
    }
}
