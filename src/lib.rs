//! Todo CLI - a single-user todo-list manager
//!
//! Keeps an ordered in-memory list of todos, persists it to a versioned
//! binary data file between runs, and renders a human-readable text
//! export on demand.

pub mod cli;
pub mod domain;
pub mod storage;

pub use domain::{Priority, Status, Todo, TodoList};
