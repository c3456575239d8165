use std::time::Duration;

use chrono::prelude::Utc;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension, Row, TransactionBehavior};

use crate::error::ApiError;
use crate::model::Todo;
use crate::validation::TodoInput;

pub type DbPool = Pool<SqliteConnectionManager>;

pub const MEMORY: &str = ":memory:";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SELECT_TODO: &str =
  "SELECT id, title, description, created, complete, important FROM todo";

pub fn connect(database: &str, pool_size: u32) -> Result<DbPool, r2d2::Error> {
  if database == MEMORY {
    // every in-memory connection opens a separate database
    Pool::builder()
      .max_size(1)
      .build(SqliteConnectionManager::memory())
  } else {
    // writers wait for the lock instead of failing with SQLITE_BUSY
    let manager = SqliteConnectionManager::file(database)
      .with_init(|conn| conn.busy_timeout(BUSY_TIMEOUT));
    Pool::builder().max_size(pool_size).build(manager)
  }
}

#[derive(Clone)]
pub struct TodoStore {
  pool: DbPool,
}

impl TodoStore {
  pub fn new(pool: DbPool) -> Self {
    Self { pool }
  }

  pub fn init(&self) -> Result<(), ApiError> {
    let conn = self.pool.get()?;
    conn.execute(
      "CREATE TABLE IF NOT EXISTS todo (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        title       TEXT NOT NULL,
        description TEXT,
        created     TEXT NOT NULL,
        complete    INTEGER NOT NULL DEFAULT 0,
        important   INTEGER NOT NULL DEFAULT 0
      )",
      [],
    )?;
    Ok(())
  }

  pub fn filter_by_complete(&self, complete: bool) -> Result<Vec<Todo>, ApiError> {
    let conn = self.pool.get()?;
    let mut stmt = conn.prepare(&format!("{SELECT_TODO} WHERE complete = ?1 ORDER BY id"))?;
    let todos = stmt
      .query_map(params![complete], todo_from_row)?
      .collect::<Result<Vec<_>, _>>()?;
    Ok(todos)
  }

  pub fn get(&self, id: i64) -> Result<Todo, ApiError> {
    let conn = self.pool.get()?;
    conn
      .query_row(&format!("{SELECT_TODO} WHERE id = ?1"), params![id], todo_from_row)
      .optional()?
      .ok_or(ApiError::NotFound)
  }

  pub fn insert(&self, input: TodoInput) -> Result<Todo, ApiError> {
    let conn = self.pool.get()?;
    let created = Utc::now();
    let description = input.description.flatten();
    let important = input.important.unwrap_or(false);
    conn.execute(
      "INSERT INTO todo (title, description, created, complete, important)
       VALUES (?1, ?2, ?3, 0, ?4)",
      params![input.title, description, created, important],
    )?;
    let todo = Todo {
      id: conn.last_insert_rowid(),
      title: input.title,
      description,
      created,
      complete: false,
      important,
    };
    tracing::info!(id = todo.id, "todo created");
    Ok(todo)
  }

  /// Reads, validates and rewrites one record inside an immediate transaction.
  /// `input` runs only once the record is known to exist, so a missing id is
  /// reported before a bad body.
  pub fn update<F>(&self, id: i64, input: F) -> Result<Todo, ApiError>
  where
    F: FnOnce() -> Result<TodoInput, ApiError>,
  {
    let mut conn = self.pool.get()?;
    // take the write lock up front; a deferred read-then-write can deadlock
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let mut todo = tx
      .query_row(&format!("{SELECT_TODO} WHERE id = ?1"), params![id], todo_from_row)
      .optional()?
      .ok_or(ApiError::NotFound)?;
    input()?.apply(&mut todo);
    tx.execute(
      "UPDATE todo SET title = ?1, description = ?2, important = ?3 WHERE id = ?4",
      params![todo.title, todo.description, todo.important, id],
    )?;
    tx.commit()?;
    tracing::info!(id, "todo updated");
    Ok(todo)
  }

  pub fn mark_complete(&self, id: i64) -> Result<(), ApiError> {
    let conn = self.pool.get()?;
    let changed = conn.execute("UPDATE todo SET complete = 1 WHERE id = ?1", params![id])?;
    if changed == 0 {
      return Err(ApiError::NotFound);
    }
    tracing::info!(id, "todo completed");
    Ok(())
  }
}

fn todo_from_row(row: &Row) -> rusqlite::Result<Todo> {
  Ok(Todo {
    id: row.get(0)?,
    title: row.get(1)?,
    description: row.get(2)?,
    created: row.get(3)?,
    complete: row.get(4)?,
    important: row.get(5)?,
  })
}
