use async_trait::async_trait;
use cardbox_core::{
    Card, CoreError, Deck, NewCard, NewDeck, Predicate, Repository, Store, UnitOfWork,
    Upsert,
};
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Transaction};

mod base;

use base::storage;

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(url: &str) -> Result<Self, CoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await
            .map_err(|e| storage(e, "pg connect"))?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn session(&self) -> Result<PostgresSession, CoreError> {
        let tx = self.pool.begin().await.map_err(|e| storage(e, "pg begin"))?;
        Ok(PostgresSession { tx })
    }

    async fn ensure_schema(&self) -> Result<(), CoreError> {
        const STMT: &str = r#"
        CREATE TABLE IF NOT EXISTS decks (
          id           bigserial PRIMARY KEY,
          name         text NOT NULL,
          description  text
        );

        CREATE TABLE IF NOT EXISTS cards (
          id       bigserial PRIMARY KEY,
          front    text NOT NULL,
          back     text,
          hint     text,
          deck_id  bigint NOT NULL REFERENCES decks(id)
        );

        CREATE INDEX IF NOT EXISTS idx_cards_deck ON cards (deck_id);
        "#;

        for chunk in STMT.split(';') {
            let sql = chunk.trim();
            if sql.is_empty() {
                continue;
            }
            sqlx::query(sql)
                .execute(&self.pool)
                .await
                .map_err(|e| storage(e, "pg schema"))?;
        }
        Ok(())
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, CoreError> {
        Ok(Box::new(self.session().await?))
    }
}

pub struct PostgresSession {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PostgresSession {
    fn decks(&mut self) -> &mut dyn Repository<Deck> {
        self
    }

    fn cards(&mut self) -> &mut dyn Repository<Card> {
        self
    }

    async fn commit(self: Box<Self>) -> Result<(), CoreError> {
        self.tx.commit().await.map_err(|e| storage(e, "pg commit"))
    }
}

// ===== Decks =====
#[async_trait]
impl Repository<Deck> for PostgresSession {
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
impl Repository<Card> for PostgresSession {
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
