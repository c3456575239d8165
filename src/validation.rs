use serde_json::{Map, Value};

use crate::error::{ApiError, FieldErrors};
use crate::model::Todo;

pub const TITLE_MAX_LENGTH: usize = 100;

const NON_FIELD_ERRORS: &str = "non_field_errors";
const REQUIRED: &str = "This field is required.";
const NULL: &str = "This field may not be null.";
const BLANK: &str = "This field may not be blank.";
const NOT_A_STRING: &str = "Not a valid string.";
const NOT_A_BOOLEAN: &str = "Must be a valid boolean.";
const NULL_CHARACTER: &str = "Null characters are not allowed.";

/// A validated create/update body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoInput {
  pub title: String,
  /// `None` when the field was absent, `Some(None)` when it was sent as null.
  pub description: Option<Option<String>>,
  pub important: Option<bool>,
}

impl TodoInput {
  pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
      return Self::from_value(Value::Object(Map::new()));
    }
    let value: Value = serde_json::from_slice(body)
      .map_err(|e| ApiError::BadRequest(format!("JSON parse error - {e}")))?;
    Self::from_value(value)
  }

  pub fn from_value(value: Value) -> Result<Self, ApiError> {
    let mut errors = FieldErrors::default();
    let fields = match value {
      Value::Object(fields) => fields,
      other => {
        errors.add(
          NON_FIELD_ERRORS,
          format!(
            "Invalid data. Expected a dictionary, but got {}.",
            type_name(&other)
          ),
        );
        return Err(ApiError::Validation(errors));
      }
    };

    let title = match fields.get("title").map(text) {
      None => {
        errors.add("title", REQUIRED);
        None
      }
      Some(Err(msg)) => {
        errors.add("title", msg);
        None
      }
      Some(Ok(title)) if title.is_empty() => {
        errors.add("title", BLANK);
        None
      }
      Some(Ok(title)) if title.chars().count() > TITLE_MAX_LENGTH => {
        errors.add(
          "title",
          format!("Ensure this field has no more than {TITLE_MAX_LENGTH} characters."),
        );
        None
      }
      Some(Ok(title)) => Some(title),
    };

    let description = match fields.get("description") {
      None => None,
      Some(Value::Null) => Some(None),
      Some(value) => match text(value) {
        Ok(description) => Some(Some(description)),
        Err(msg) => {
          errors.add("description", msg);
          None
        }
      },
    };

    let important = match fields.get("important").map(boolean) {
      None => None,
      Some(Ok(important)) => Some(important),
      Some(Err(msg)) => {
        errors.add("important", msg);
        None
      }
    };

    match title {
      Some(title) if errors.is_empty() => Ok(Self {
        title,
        description,
        important,
      }),
      _ => Err(ApiError::Validation(errors)),
    }
  }

  /// Overwrites the writable fields of `todo`; absent optional fields are kept.
  pub fn apply(self, todo: &mut Todo) {
    todo.title = self.title;
    if let Some(description) = self.description {
      todo.description = description;
    }
    if let Some(important) = self.important {
      todo.important = important;
    }
  }
}

fn text(value: &Value) -> Result<String, &'static str> {
  match value {
    Value::String(s) if s.contains('\0') => Err(NULL_CHARACTER),
    Value::String(s) => Ok(s.trim().to_string()),
    Value::Number(n) => Ok(n.to_string()),
    Value::Null => Err(NULL),
    _ => Err(NOT_A_STRING),
  }
}

fn boolean(value: &Value) -> Result<bool, &'static str> {
  match value {
    Value::Bool(b) => Ok(*b),
    Value::Number(n) => match n.as_f64() {
      Some(v) if v == 1.0 => Ok(true),
      Some(v) if v == 0.0 => Ok(false),
      _ => Err(NOT_A_BOOLEAN),
    },
    Value::String(s) => match s.to_ascii_lowercase().as_str() {
      "true" | "t" | "yes" | "y" | "on" | "1" => Ok(true),
      "false" | "f" | "no" | "n" | "off" | "0" => Ok(false),
      _ => Err(NOT_A_BOOLEAN),
    },
    Value::Null => Err(NULL),
    _ => Err(NOT_A_BOOLEAN),
  }
}

fn type_name(value: &Value) -> &'static str {
  match value {
    Value::Null => "NoneType",
    Value::Bool(_) => "bool",
    Value::Number(n) if n.is_f64() => "float",
    Value::Number(_) => "int",
    Value::String(_) => "str",
    Value::Array(_) => "list",
    Value::Object(_) => "dict",
  }
}
