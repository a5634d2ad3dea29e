use async_trait::async_trait;

use crate::{Card, CoreError, Deck};

/// A column value handed to a storage backend for binding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Int(Option<i64>),
    Text(Option<String>),
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(Some(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(Some(v.to_string()))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(Some(v))
    }
}

impl From<Option<String>> for Value {
    fn from(v: Option<String>) -> Self {
        Value::Text(v)
    }
}

/// Equality predicate on one column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Predicate {
    pub column: &'static str,
    pub value: Value,
}

impl Predicate {
    pub fn eq(column: &'static str, value: impl Into<Value>) -> Self {
        Self {
            column,
            value: value.into(),
        }
    }

    pub fn id(id: i64) -> Self {
        Self::eq("id", id)
    }

    /// Rejects columns `E` does not declare; keeps backends from ever
    /// interpolating an unknown identifier into SQL.
    pub fn check<E: Entity>(&self) -> Result<(), CoreError> {
        if self.column == "id" || E::COLUMNS.contains(&self.column) {
            Ok(())
        } else {
            Err(CoreError::invalid(
                self.column,
                format!("not a column of {}", E::TABLE),
            ))
        }
    }
}

/// Insert-or-update envelope: `id` present and existing means update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Upsert<T> {
    pub id: Option<i64>,
    pub data: T,
}

impl<T> Upsert<T> {
    pub fn insert(data: T) -> Self {
        Self { id: None, data }
    }

    pub fn update(id: i64, data: T) -> Self {
        Self { id: Some(id), data }
    }
}

/// Table mapping shared by every backend. `COLUMNS` lists the writable
/// columns (everything but `id`) in the order `values` produces them.
pub trait Entity: Clone + Send + Sync + 'static {
    type Create: Clone + Send + Sync + 'static;

    const TABLE: &'static str;
    const LABEL: &'static str;
    const COLUMNS: &'static [&'static str];
    const FOREIGN_KEYS: &'static [&'static str] = &[];

    fn id(&self) -> i64;
    fn values(data: &Self::Create) -> Vec<Value>;

    fn check(_data: &Self::Create) -> Result<(), CoreError> {
        Ok(())
    }
}

#[async_trait]
pub trait Repository<E: Entity>: Send {
    async fn list(&mut self, filter: Option<Predicate>) -> Result<Vec<E>, CoreError>;

    async fn get_one_or_none(
        &mut self,
        predicate: Predicate,
        eager_load: bool,
    ) -> Result<Option<E>, CoreError>;

    async fn create(&mut self, data: E::Create) -> Result<E, CoreError>;

    /// All rows or none.
    async fn create_many(&mut self, data: Vec<E::Create>) -> Result<Vec<E>, CoreError>;

    async fn update(&mut self, data: E::Create, id: i64) -> Result<E, CoreError>;

    /// Results come back in input order. All rows or none.
    async fn upsert_many(&mut self, items: Vec<Upsert<E::Create>>) -> Result<Vec<E>, CoreError>;
}

/// One transaction. Dropping it without `commit` rolls everything back.
#[async_trait]
pub trait UnitOfWork: Send {
    fn decks(&mut self) -> &mut dyn Repository<Deck>;
    fn cards(&mut self) -> &mut dyn Repository<Card>;
    async fn commit(self: Box<Self>) -> Result<(), CoreError>;
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, CoreError>;
}
