//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::commands;
use super::output::{Output, OutputFormat};
use crate::domain::{Priority, Status};
use crate::storage::binary;

#[derive(Parser)]
#[command(name = "todo")]
#[command(author, version, about = "Single-user todo-list manager")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data file holding the todo list
    #[arg(long, global = true, env = "TODO_FILE", default_value = binary::DEFAULT_DATA_FILE)]
    pub file: PathBuf,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new todo
    Add {
        /// Todo title
        title: String,

        /// Optional description
        #[arg(long, short = 'd', default_value = "")]
        description: String,

        /// Priority (low, medium, high)
        #[arg(long, short = 'p', default_value = "medium")]
        priority: Priority,
    },

    /// List all todos
    List,

    /// Show one todo in full
    Show {
        /// Todo id
        id: u32,
    },

    /// Update title, description, or priority of a todo
    Update {
        /// Todo id
        id: u32,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// New priority (low, medium, high)
        #[arg(long)]
        priority: Option<Priority>,
    },

    /// Delete a todo
    Delete {
        /// Todo id
        id: u32,

        /// Delete without confirmation
        #[arg(long)]
        force: bool,
    },

    /// Mark a todo as completed
    Done {
        /// Todo id
        id: u32,
    },

    /// Mark a todo as pending again
    Reopen {
        /// Todo id
        id: u32,
    },

    /// Rewrite the data file (refreshes the backup)
    Save,

    /// Export the todo list to a human-readable text file
    Export {
        /// Destination path
        path: PathBuf,
    },
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(cli.format, cli.verbose);

    output.verbose(&format!("Data file: {}", cli.file.display()));

    match cli.command {
        Commands::Add {
            title,
            description,
            priority,
        } => commands::add(&output, &cli.file, &title, &description, priority),
        Commands::List => commands::list(&output, &cli.file),
        Commands::Show { id } => commands::show(&output, &cli.file, id),
        Commands::Update {
            id,
            title,
            description,
            priority,
        } => commands::update(
            &output,
            &cli.file,
            id,
            title.as_deref(),
            description.as_deref(),
            priority,
        ),
        Commands::Delete { id, force } => commands::delete(&output, &cli.file, id, force),
        Commands::Done { id } => commands::set_status(&output, &cli.file, id, Status::Completed),
        Commands::Reopen { id } => commands::set_status(&output, &cli.file, id, Status::Pending),
        Commands::Save => commands::save(&output, &cli.file),
        Commands::Export { path } => commands::export(&output, &cli.file, &path),
    }
}
