//! Human-readable text export
//!
//! Renders the todo list as a plain-text report: a header with the export
//! timestamp and record count, then one block per todo in sequence order.
//! Read-only with respect to the store.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::domain::TodoList;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Writes the report to any destination
pub fn export<W: Write>(list: &TodoList, writer: &mut W) -> Result<()> {
    writeln!(writer, "=== TODO LIST EXPORT ===")?;
    writeln!(
        writer,
        "Export date: {}",
        Utc::now().format(TIMESTAMP_FORMAT)
    )?;
    writeln!(writer, "Total todos: {}", list.len())?;
    writeln!(writer)?;

    if list.is_empty() {
        writeln!(writer, "No todos found.")?;
        return Ok(());
    }

    for todo in list.iter() {
        writeln!(writer, "--- Todo #{} ---", todo.id)?;
        writeln!(writer, "Title: {}", todo.title)?;
        let description = if todo.has_description() {
            todo.description.as_str()
        } else {
            "(no description)"
        };
        writeln!(writer, "Description: {}", description)?;
        writeln!(writer, "Priority: {}", todo.priority.label())?;
        writeln!(writer, "Status: {}", todo.status.label())?;
        writeln!(writer, "Created: {}", todo.created_at.format(TIMESTAMP_FORMAT))?;
        writeln!(writer, "Updated: {}", todo.updated_at.format(TIMESTAMP_FORMAT))?;
        writeln!(writer)?;
    }
    Ok(())
}

/// Writes the report to a file, creating parent directories when needed
pub fn export_to_path(list: &TodoList, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    export(list, &mut writer)?;
    writer
        .flush()
        .with_context(|| format!("Failed to write export file: {}", path.display()))?;
    Ok(())
}
