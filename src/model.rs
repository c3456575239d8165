use chrono::prelude::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
  pub id: i64,
  pub title: String,
  pub description: Option<String>,
  pub created: DateTime<Utc>,
  pub complete: bool,
  pub important: bool,
}

/// List entry returned by `/todo/` and `/done/`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TodoSummary {
  pub id: i64,
  pub title: String,
  pub complete: bool,
  pub important: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodoDetail {
  pub id: i64,
  pub title: String,
  pub description: Option<String>,
  pub created: DateTime<Utc>,
  pub complete: bool,
  pub important: bool,
}

/// Fields accepted on create/update, echoed back after the write.
#[derive(Debug, Serialize, Deserialize)]
pub struct TodoWrite {
  pub title: String,
  pub description: Option<String>,
  pub important: bool,
}

impl From<&Todo> for TodoSummary {
  fn from(todo: &Todo) -> Self {
    Self {
      id: todo.id,
      title: todo.title.clone(),
      complete: todo.complete,
      important: todo.important,
    }
  }
}

impl From<&Todo> for TodoDetail {
  fn from(todo: &Todo) -> Self {
    Self {
      id: todo.id,
      title: todo.title.clone(),
      description: todo.description.clone(),
      created: todo.created,
      complete: todo.complete,
      important: todo.important,
    }
  }
}

impl From<&Todo> for TodoWrite {
  fn from(todo: &Todo) -> Self {
    Self {
      title: todo.title.clone(),
      description: todo.description.clone(),
      important: todo.important,
    }
  }
}
