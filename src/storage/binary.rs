//! Binary persistence for the todo list
//!
//! The data file holds the full store state in a fixed little-endian
//! layout so a file written on one platform reads back on any other:
//!
//! ```text
//! magic    4 bytes   "TODO"
//! version  u16       format version (currently 1)
//! count    u32       number of records
//! next_id  u32       id counter
//! records  count x 628-byte blocks, in sequence order
//! ```
//!
//! Each record block: id (u32), title (100-byte NUL-terminated field),
//! description (500-byte field), priority (u32), status (u32),
//! created_at and updated_at (i64 Unix seconds). Text fields are
//! zero-padded past the terminator.
//!
//! Saving backs up any existing file to `<path>.backup` and then writes
//! through a temp file with an atomic rename.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::DateTime;
use thiserror::Error;

use crate::domain::{Priority, Status, Todo, TodoList, MAX_TODOS};

/// Default location of the data file, relative to the working directory
pub const DEFAULT_DATA_FILE: &str = "data/todos.dat";

/// Magic number identifying a todo data file: "TODO"
pub const MAGIC: [u8; 4] = *b"TODO";

/// Current binary format version
pub const VERSION: u16 = 1;

/// Title field width: 99 usable bytes plus a NUL terminator
const TITLE_FIELD: usize = 100;

/// Description field width: 499 usable bytes plus a NUL terminator
const DESC_FIELD: usize = 500;

const HEADER_SIZE: usize = 4 + 2 + 4 + 4;
const RECORD_SIZE: usize = 4 + TITLE_FIELD + DESC_FIELD + 4 + 4 + 8 + 8;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("corrupt data file: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

fn corrupt(message: impl Into<String>) -> CodecError {
    CodecError::Corrupt(message.into())
}

/// Serializes the full store state
pub fn encode(list: &TodoList) -> Vec<u8> {
    let todos = list.todos();
    let mut buf = Vec::with_capacity(HEADER_SIZE + todos.len() * RECORD_SIZE);

    buf.extend_from_slice(&MAGIC);
    buf.extend_from_slice(&VERSION.to_le_bytes());
    buf.extend_from_slice(&(todos.len() as u32).to_le_bytes());
    buf.extend_from_slice(&list.next_id().to_le_bytes());

    for todo in todos {
        encode_record(&mut buf, todo);
    }
    buf
}

fn encode_record(buf: &mut Vec<u8>, todo: &Todo) {
    buf.extend_from_slice(&todo.id.to_le_bytes());
    encode_text(buf, &todo.title, TITLE_FIELD);
    encode_text(buf, &todo.description, DESC_FIELD);
    buf.extend_from_slice(&todo.priority.wire().to_le_bytes());
    buf.extend_from_slice(&todo.status.wire().to_le_bytes());
    buf.extend_from_slice(&todo.created_at.timestamp().to_le_bytes());
    buf.extend_from_slice(&todo.updated_at.timestamp().to_le_bytes());
}

fn encode_text(buf: &mut Vec<u8>, text: &str, width: usize) {
    // The store bounds text below the field width, terminator included
    let bytes = text.as_bytes();
    debug_assert!(bytes.len() < width);
    buf.extend_from_slice(bytes);
    buf.resize(buf.len() + (width - bytes.len()), 0);
}

/// Deserializes a full store state, validating the header and every record
pub fn decode(bytes: &[u8]) -> Result<TodoList, CodecError> {
    let mut reader = Reader { bytes, pos: 0 };

    let magic = reader.take(4)?;
    if magic != MAGIC {
        return Err(corrupt("not a todo data file (bad magic)"));
    }
    let version = reader.u16()?;
    if version != VERSION {
        return Err(corrupt(format!("unsupported format version {}", version)));
    }

    let count = reader.u32()? as usize;
    let next_id = reader.u32()?;
    if count > MAX_TODOS {
        return Err(corrupt(format!("record count {} out of range", count)));
    }

    let mut todos = Vec::with_capacity(count);
    for _ in 0..count {
        todos.push(decode_record(&mut reader)?);
    }
    Ok(TodoList::from_parts(todos, next_id))
}

fn decode_record(reader: &mut Reader<'_>) -> Result<Todo, CodecError> {
    let id = reader.u32()?;
    let title = decode_text(reader, TITLE_FIELD)?;
    let description = decode_text(reader, DESC_FIELD)?;

    let priority = Priority::from_wire(reader.u32()?)
        .ok_or_else(|| corrupt(format!("unknown priority in record {}", id)))?;
    let status = Status::from_wire(reader.u32()?)
        .ok_or_else(|| corrupt(format!("unknown status in record {}", id)))?;

    let created_at = decode_timestamp(reader, id)?;
    let updated_at = decode_timestamp(reader, id)?;

    Ok(Todo {
        id,
        title,
        description,
        priority,
        status,
        created_at,
        updated_at,
    })
}

fn decode_text(reader: &mut Reader<'_>, width: usize) -> Result<String, CodecError> {
    let field = reader.take(width)?;
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    let text = std::str::from_utf8(&field[..end])
        .map_err(|_| corrupt("text field is not valid UTF-8"))?;
    Ok(text.to_string())
}

fn decode_timestamp(reader: &mut Reader<'_>, id: u32) -> Result<chrono::DateTime<chrono::Utc>, CodecError> {
    let secs = reader.i64()?;
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| corrupt(format!("timestamp out of range in record {}", id)))
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| corrupt("unexpected end of file"))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u16(&mut self) -> Result<u16, CodecError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, CodecError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn i64(&mut self) -> Result<i64, CodecError> {
        let b = self.take(8)?;
        Ok(i64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }
}

/// Sibling path the previous file contents are copied to before a save
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".backup");
    PathBuf::from(name)
}

/// Loads the store from a data file.
///
/// A missing file is not an error: it yields an empty list with the id
/// counter at 1, matching a first run.
pub fn load(path: &Path) -> Result<TodoList, CodecError> {
    match fs::read(path) {
        Ok(bytes) => decode(&bytes),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(TodoList::new()),
        Err(err) => Err(CodecError::Io(err)),
    }
}

/// Saves the store to a data file.
///
/// Creates the parent directory when needed, copies any existing file to
/// its backup sibling (best-effort: a failed backup never blocks the
/// save), and writes through a temp file with an atomic rename.
pub fn save(path: &Path, list: &TodoList) -> Result<(), CodecError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    if path.exists() {
        if let Err(err) = fs::copy(path, backup_path(path)) {
            eprintln!(
                "warning: could not back up {}: {}",
                path.display(),
                err
            );
        }
    }

    let temp_path = path.with_extension("dat.tmp");
    fs::write(&temp_path, encode(list))?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_list() -> TodoList {
        let mut list = TodoList::new();
        list.create("Buy milk", "", Priority::Medium).unwrap();
        list.create("Pay bills", "Due Friday", Priority::High).unwrap();
        list.create("Call dentist", "Ask about Monday", Priority::Low)
            .unwrap();
        list.set_status(2, Status::Completed).unwrap();
        list
    }

    #[test]
    fn roundtrip_reproduces_store() {
        let list = sample_list();

        let decoded = decode(&encode(&list)).unwrap();

        assert_eq!(decoded, list);
        assert_eq!(decoded.next_id(), list.next_id());
    }

    #[test]
    fn roundtrip_of_empty_store() {
        let list = TodoList::new();

        let decoded = decode(&encode(&list)).unwrap();

        assert!(decoded.is_empty());
        assert_eq!(decoded.next_id(), 1);
    }

    #[test]
    fn encoded_size_is_fixed() {
        let list = sample_list();

        assert_eq!(encode(&list).len(), HEADER_SIZE + 3 * RECORD_SIZE);
    }

    #[test]
    fn decode_rejects_truncated_header() {
        assert!(matches!(decode(b"TOD"), Err(CodecError::Corrupt(_))));
    }

    #[test]
    fn decode_rejects_bad_magic() {
        let mut bytes = encode(&sample_list());
        bytes[0] = b'X';

        assert!(matches!(decode(&bytes), Err(CodecError::Corrupt(_))));
    }

    #[test]
    fn decode_rejects_unknown_version() {
        let mut bytes = encode(&sample_list());
        bytes[4] = 0xFF;

        assert!(matches!(decode(&bytes), Err(CodecError::Corrupt(_))));
    }

    #[test]
    fn decode_rejects_negative_count() {
        let mut bytes = encode(&sample_list());
        // A count of -1 written as a signed integer reads back as u32::MAX
        bytes[6..10].copy_from_slice(&(-1i32).to_le_bytes());

        assert!(matches!(decode(&bytes), Err(CodecError::Corrupt(_))));
    }

    #[test]
    fn decode_rejects_count_beyond_capacity() {
        let mut bytes = encode(&TodoList::new());
        bytes[6..10].copy_from_slice(&(MAX_TODOS as u32 + 1).to_le_bytes());

        assert!(matches!(decode(&bytes), Err(CodecError::Corrupt(_))));
    }

    #[test]
    fn decode_rejects_truncated_body() {
        let mut bytes = encode(&sample_list());
        bytes.truncate(HEADER_SIZE + 2 * RECORD_SIZE + 17);

        assert!(matches!(decode(&bytes), Err(CodecError::Corrupt(_))));
    }

    #[test]
    fn decode_rejects_unknown_priority() {
        let mut bytes = encode(&sample_list());
        let offset = HEADER_SIZE + 4 + TITLE_FIELD + DESC_FIELD;
        bytes[offset..offset + 4].copy_from_slice(&9u32.to_le_bytes());

        assert!(matches!(decode(&bytes), Err(CodecError::Corrupt(_))));
    }

    #[test]
    fn decode_rejects_invalid_utf8_title() {
        let mut bytes = encode(&sample_list());
        bytes[HEADER_SIZE + 4] = 0xFF;

        assert!(matches!(decode(&bytes), Err(CodecError::Corrupt(_))));
    }

    #[test]
    fn load_missing_file_yields_empty_store() {
        let dir = TempDir::new().unwrap();

        let list = load(&dir.path().join("absent.dat")).unwrap();

        assert!(list.is_empty());
        assert_eq!(list.next_id(), 1);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("todos.dat");
        let list = sample_list();

        save(&path, &list).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded, list);
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("todos.dat");

        save(&path, &TodoList::new()).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("todos.dat");

        save(&path, &sample_list()).unwrap();

        assert!(!path.with_extension("dat.tmp").exists());
    }

    #[test]
    fn first_save_makes_no_backup() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("todos.dat");

        save(&path, &sample_list()).unwrap();

        assert!(!backup_path(&path).exists());
    }

    #[test]
    fn second_save_backs_up_prior_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("todos.dat");

        let first = sample_list();
        save(&path, &first).unwrap();

        let mut second = first.clone();
        second.create("New task", "", Priority::Low).unwrap();
        save(&path, &second).unwrap();

        let backup = load(&backup_path(&path)).unwrap();
        assert_eq!(backup, first);
        assert_eq!(load(&path).unwrap(), second);
    }

    #[test]
    fn backup_path_appends_suffix() {
        assert_eq!(
            backup_path(Path::new("data/todos.dat")),
            PathBuf::from("data/todos.dat.backup")
        );
    }
}
