use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::repo::Entity;

/// Key reported when a failure cannot be pinned to a single field.
pub const ROOT_KEY: &str = "__root__";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub key: String,
    pub message: String,
}

impl FieldError {
    pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{0} is not found")]
    NotFound(&'static str),
    #[error("uniqueness violation: {message}")]
    Uniqueness { message: String },
    #[error("foreign key violation on {key}: {message}")]
    ForeignKey { message: String, key: String },
    #[error("invalid input: {}", describe(.0))]
    Validation(Vec<FieldError>),
    #[error("storage error: {0}")]
    Storage(&'static str),
}

fn describe(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.key, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl CoreError {
    pub fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Validation(vec![FieldError::new(key, message)])
    }

    /// Builds a uniqueness error for `E`. `hint` is whatever the engine
    /// reported about the violated constraint (name or message).
    pub fn unique_violation<E: Entity>(hint: Option<&str>) -> Self {
        let message = match resolve_column(E::COLUMNS, hint) {
            Some(column) => format!("{} with this {} already exists", E::LABEL, column),
            None => format!("{} already exists", E::LABEL),
        };
        CoreError::Uniqueness { message }
    }

    pub fn foreign_key_violation<E: Entity>(hint: Option<&str>) -> Self {
        let key = resolve_column(E::FOREIGN_KEYS, hint)
            .or(match E::FOREIGN_KEYS {
                [only] => Some(*only),
                _ => None,
            })
            .unwrap_or(ROOT_KEY);
        CoreError::ForeignKey {
            message: "referenced row does not exist".to_string(),
            key: key.to_string(),
        }
    }
}

/// Picks the longest column name mentioned in `hint`.
pub fn resolve_column(columns: &[&'static str], hint: Option<&str>) -> Option<&'static str> {
    let hint = hint?;
    columns
        .iter()
        .copied()
        .filter(|c| hint.contains(c))
        .max_by_key(|c| c.len())
}
