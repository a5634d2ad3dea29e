use async_trait::async_trait;
use cardbox_core::{
    Card, CoreError, Deck, NewCard, NewDeck, Predicate, Repository, Store, UnitOfWork,
    Upsert,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::path::Path;
use std::str::FromStr;

mod base;

use base::storage;

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn open_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| storage(e, "sqlite connect"))?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Private in-memory database. It lives as long as its single pooled
    /// connection, so that connection is never reaped.
    pub async fn open_memory() -> Result<Self, CoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| storage(e, "sqlite options"))?
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| storage(e, "sqlite connect"))?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Opens a unit of work without boxing it.
    pub async fn session(&self) -> Result<SqliteSession, CoreError> {
        let tx = self.pool.begin().await.map_err(|e| storage(e, "begin"))?;
        Ok(SqliteSession { tx })
    }

    async fn ensure_schema(&self) -> Result<(), CoreError> {
        const STMT: &str = r#"
        CREATE TABLE IF NOT EXISTS decks (
          id           INTEGER PRIMARY KEY AUTOINCREMENT,
          name         TEXT NOT NULL,
          description  TEXT
        );

        CREATE TABLE IF NOT EXISTS cards (
          id       INTEGER PRIMARY KEY AUTOINCREMENT,
          front    TEXT NOT NULL,
          back     TEXT,
          hint     TEXT,
          deck_id  INTEGER NOT NULL,
          FOREIGN KEY(deck_id) REFERENCES decks(id)
        );

        CREATE INDEX IF NOT EXISTS idx_cards_deck ON cards (deck_id);
        "#;

        // Execute statements one by one for compatibility.
        for chunk in STMT.split(';') {
            let sql = chunk.trim();
            if sql.is_empty() {
                continue;
            }
            sqlx::query(sql)
                .execute(&self.pool)
                .await
                .map_err(|e| storage(e, "sqlite schema"))?;
        }
        Ok(())
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, CoreError> {
        Ok(Box::new(self.session().await?))
    }
}

/// A transaction on one pooled connection. Dropping it rolls back.
pub struct SqliteSession {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl UnitOfWork for SqliteSession {
    fn decks(&mut self) -> &mut dyn Repository<Deck> {
        self
    }

    fn cards(&mut self) -> &mut dyn Repository<Card> {
        self
    }

    async fn commit(self: Box<Self>) -> Result<(), CoreError> {
        self.tx.commit().await.map_err(|e| storage(e, "commit"))
    }
}

// ===== Decks =====
#[async_trait]
impl Repository<Deck> for SqliteSession {
    async fn list(&mut self, filter: Option<Predicate>) -> Result<Vec<Deck>, CoreError> {
        base::list(&mut *self.tx, filter.as_ref()).await
    }

    async fn get_one_or_none(
        &mut self,
        predicate: Predicate,
        eager_load: bool,
    ) -> Result<Option<Deck>, CoreError> {
        let Some(mut deck) = base::get_one_or_none::<Deck>(&mut *self.tx, &predicate).await? else {
            return Ok(None);
        };
        if eager_load {
            let by_deck = Predicate::eq("deck_id", deck.id);
            deck.cards = Some(base::list::<Card>(&mut *self.tx, Some(&by_deck)).await?);
        }
        Ok(Some(deck))
    }

    async fn create(&mut self, data: NewDeck) -> Result<Deck, CoreError> {
        base::insert(&mut *self.tx, &data).await
    }

    async fn create_many(&mut self, data: Vec<NewDeck>) -> Result<Vec<Deck>, CoreError> {
        base::insert_many(&mut *self.tx, &data).await
    }

    async fn update(&mut self, data: NewDeck, id: i64) -> Result<Deck, CoreError> {
        base::update(&mut *self.tx, &data, id).await
    }

    async fn upsert_many(&mut self, items: Vec<Upsert<NewDeck>>) -> Result<Vec<Deck>, CoreError> {
        base::upsert_many(&mut *self.tx, &items).await
    }
}

// ===== Cards =====
#[async_trait]
impl Repository<Card> for SqliteSession {
    async fn list(&mut self, filter: Option<Predicate>) -> Result<Vec<Card>, CoreError> {
        base::list(&mut *self.tx, filter.as_ref()).await
    }

    async fn get_one_or_none(
        &mut self,
        predicate: Predicate,
        _eager_load: bool,
    ) -> Result<Option<Card>, CoreError> {
        base::get_one_or_none(&mut *self.tx, &predicate).await
    }

    async fn create(&mut self, data: NewCard) -> Result<Card, CoreError> {
        base::insert(&mut *self.tx, &data).await
    }

    async fn create_many(&mut self, data: Vec<NewCard>) -> Result<Vec<Card>, CoreError> {
        base::insert_many(&mut *self.tx, &data).await
    }

    async fn update(&mut self, data: NewCard, id: i64) -> Result<Card, CoreError> {
        base::update(&mut *self.tx, &data, id).await
    }

    async fn upsert_many(&mut self, items: Vec<Upsert<NewCard>>) -> Result<Vec<Card>, CoreError> {
        base::upsert_many(&mut *self.tx, &items).await
    }
}
