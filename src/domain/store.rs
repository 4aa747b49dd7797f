//! In-memory record store
//!
//! [`TodoList`] owns the ordered collection of todos and the id counter.
//! Ids are assigned sequentially and never reused; deletion closes the gap
//! so the sequence stays packed in insertion order. All mutations are
//! atomic: a validation failure leaves the store untouched.

use thiserror::Error;

use super::todo::{Priority, Status, Todo, MAX_DESC_BYTES, MAX_TITLE_BYTES};

/// Upper bound on simultaneous records. The backing vector grows on
/// demand; this caps how many records a list may hold at once.
pub const MAX_TODOS: usize = 1000;

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("todo with id {0} not found")]
    NotFound(u32),

    #[error("todo list is full ({MAX_TODOS} records)")]
    CapacityExceeded,
}

fn validate_title(title: &str) -> Result<(), StoreError> {
    if title.is_empty() {
        return Err(StoreError::InvalidInput("title must not be empty".into()));
    }
    if title.len() > MAX_TITLE_BYTES {
        return Err(StoreError::InvalidInput(format!(
            "title too long ({} bytes, max {})",
            title.len(),
            MAX_TITLE_BYTES
        )));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), StoreError> {
    if description.len() > MAX_DESC_BYTES {
        return Err(StoreError::InvalidInput(format!(
            "description too long ({} bytes, max {})",
            description.len(),
            MAX_DESC_BYTES
        )));
    }
    Ok(())
}

/// The ordered todo collection plus id-allocation state
#[derive(Debug, Clone, PartialEq)]
pub struct TodoList {
    todos: Vec<Todo>,
    next_id: u32,
}

impl Default for TodoList {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoList {
    /// Creates an empty list; the first created todo gets id 1
    pub fn new() -> Self {
        Self {
            todos: Vec::new(),
            next_id: 1,
        }
    }

    /// Rebuilds a list from persisted state
    pub fn from_parts(todos: Vec<Todo>, next_id: u32) -> Self {
        Self { todos, next_id }
    }

    /// The id the next created todo will receive
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    /// Number of todos currently in the list
    pub fn len(&self) -> usize {
        self.todos.len()
    }

    /// Returns true if the list holds no todos
    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    /// All todos in sequence order
    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    /// Iterates over todos in sequence order
    pub fn iter(&self) -> impl Iterator<Item = &Todo> {
        self.todos.iter()
    }

    /// Creates a new pending todo and returns its id.
    ///
    /// Fails with [`StoreError::CapacityExceeded`] when the list is full and
    /// [`StoreError::InvalidInput`] when the title is empty or a field
    /// exceeds its byte bound. On failure nothing changes, including the id
    /// counter.
    pub fn create(
        &mut self,
        title: &str,
        description: &str,
        priority: Priority,
    ) -> Result<u32, StoreError> {
        if self.todos.len() >= MAX_TODOS {
            return Err(StoreError::CapacityExceeded);
        }
        validate_title(title)?;
        validate_description(description)?;

        let id = self.next_id;
        self.next_id += 1;
        self.todos.push(Todo::new(id, title, description, priority));
        Ok(id)
    }

    /// Finds a todo by id (linear scan)
    pub fn find(&self, id: u32) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    fn find_mut(&mut self, id: u32) -> Option<&mut Todo> {
        self.todos.iter_mut().find(|t| t.id == id)
    }

    /// Applies the provided fields to an existing todo.
    ///
    /// Fields left as `None` are untouched. Validation happens before any
    /// field is written, so an invalid title or description leaves the todo
    /// unchanged. `updated_at` is refreshed only when at least one field is
    /// applied; a call with all fields omitted is a no-op.
    pub fn update(
        &mut self,
        id: u32,
        title: Option<&str>,
        description: Option<&str>,
        priority: Option<Priority>,
    ) -> Result<(), StoreError> {
        let todo = self.find_mut(id).ok_or(StoreError::NotFound(id))?;

        if let Some(title) = title {
            validate_title(title)?;
        }
        if let Some(description) = description {
            validate_description(description)?;
        }

        let mut changed = false;
        if let Some(title) = title {
            todo.title = title.to_string();
            changed = true;
        }
        if let Some(description) = description {
            todo.description = description.to_string();
            changed = true;
        }
        if let Some(priority) = priority {
            todo.priority = priority;
            changed = true;
        }
        if changed {
            todo.touch();
        }
        Ok(())
    }

    /// Removes a todo, shifting later todos one position earlier.
    ///
    /// The id counter is unaffected; ids are never reassigned.
    pub fn delete(&mut self, id: u32) -> Result<(), StoreError> {
        let index = self
            .todos
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::NotFound(id))?;
        self.todos.remove(index);
        Ok(())
    }

    /// Sets the completion status of a todo.
    ///
    /// Setting the status a todo already has is an idempotent success that
    /// leaves `updated_at` untouched.
    pub fn set_status(&mut self, id: u32, status: Status) -> Result<(), StoreError> {
        let todo = self.find_mut(id).ok_or(StoreError::NotFound(id))?;
        if todo.status == status {
            return Ok(());
        }
        todo.status = status;
        todo.touch();
        Ok(())
    }
}
