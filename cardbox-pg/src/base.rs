use cardbox_core::{Card, CoreError, Deck, Entity, Predicate, Upsert, Value};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Connection, PgConnection, Postgres, Row};

type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

pub(crate) trait PgTable: Entity {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error>;
}

impl PgTable for Deck {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Deck {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            cards: None,
        })
    }
}

impl PgTable for Card {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Card {
            id: row.try_get("id")?,
            front: row.try_get("front")?,
            back: row.try_get("back")?,
            hint: row.try_get("hint")?,
            deck_id: row.try_get("deck_id")?,
        })
    }
}

pub(crate) async fn list<E: PgTable>(
    conn: &mut PgConnection,
    filter: Option<&Predicate>,
) -> Result<Vec<E>, CoreError> {
    let mut sql = select_sql::<E>();
    if let Some(p) = filter {
        p.check::<E>()?;
        sql.push_str(&format!(" WHERE {}=$1", p.column));
    }
    sql.push_str(" ORDER BY id ASC");

    let mut query = sqlx::query(&sql);
    if let Some(p) = filter {
        query = bind_value(query, &p.value);
    }
    tracing::debug!(table = E::TABLE, filtered = filter.is_some(), "list");
    let rows = query
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| storage(e, "pg list"))?;
    rows.iter().map(decode::<E>).collect()
}

pub(crate) async fn get_one_or_none<E: PgTable>(
    conn: &mut PgConnection,
    predicate: &Predicate,
) -> Result<Option<E>, CoreError> {
    predicate.check::<E>()?;
    let sql = format!("{} WHERE {}=$1 LIMIT 1", select_sql::<E>(), predicate.column);
    let query = bind_value(sqlx::query(&sql), &predicate.value);
    tracing::debug!(table = E::TABLE, column = predicate.column, "get");
    let row = query
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| storage(e, "pg get"))?;
    row.as_ref().map(decode::<E>).transpose()
}

pub(crate) async fn insert<E: PgTable>(
    conn: &mut PgConnection,
    data: &E::Create,
) -> Result<E, CoreError> {
    E::check(data)?;
    let cols = E::COLUMNS.join(", ");
    let sql = format!(
        "INSERT INTO {} ({cols}) VALUES ({}) RETURNING id, {cols}",
        E::TABLE,
        placeholders(1, E::COLUMNS.len())
    );

    let mut query = sqlx::query(&sql);
    for value in E::values(data) {
        query = bind_value(query, &value);
    }
    let row = query
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| translate::<E>(e, "pg insert"))?;
    let entity = decode::<E>(&row)?;
    tracing::debug!(table = E::TABLE, id = entity.id(), "inserted");
    Ok(entity)
}

pub(crate) async fn update<E: PgTable>(
    conn: &mut PgConnection,
    data: &E::Create,
    id: i64,
) -> Result<E, CoreError> {
    E::check(data)?;
    let assignments = E::COLUMNS
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{c}=${}", i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE {} SET {assignments} WHERE id=${} RETURNING id, {}",
        E::TABLE,
        E::COLUMNS.len() + 1,
        E::COLUMNS.join(", ")
    );

    let mut query = sqlx::query(&sql);
    for value in E::values(data) {
        query = bind_value(query, &value);
    }
    let row = query
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| translate::<E>(e, "pg update"))?
        .ok_or(CoreError::NotFound(E::LABEL))?;
    tracing::debug!(table = E::TABLE, id, "updated");
    decode::<E>(&row)
}

pub(crate) async fn insert_many<E: PgTable>(
    conn: &mut PgConnection,
    data: &[E::Create],
) -> Result<Vec<E>, CoreError> {
    let mut savepoint = conn.begin().await.map_err(|e| storage(e, "pg savepoint"))?;
    let mut out = Vec::with_capacity(data.len());
    for item in data {
        out.push(insert::<E>(&mut *savepoint, item).await?);
    }
    savepoint
        .commit()
        .await
        .map_err(|e| storage(e, "pg release savepoint"))?;
    Ok(out)
}

pub(crate) async fn upsert_many<E: PgTable>(
    conn: &mut PgConnection,
    items: &[Upsert<E::Create>],
) -> Result<Vec<E>, CoreError> {
    let mut savepoint = conn.begin().await.map_err(|e| storage(e, "pg savepoint"))?;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let entity = match item.id {
            Some(id) => match update::<E>(&mut *savepoint, &item.data, id).await {
                Err(CoreError::NotFound(_)) => insert::<E>(&mut *savepoint, &item.data).await?,
                other => other?,
            },
            None => insert::<E>(&mut *savepoint, &item.data).await?,
        };
        out.push(entity);
    }
    savepoint
        .commit()
        .await
        .map_err(|e| storage(e, "pg release savepoint"))?;
    Ok(out)
}

// ===== helpers =====
fn select_sql<E: Entity>() -> String {
    format!("SELECT id, {} FROM {}", E::COLUMNS.join(", "), E::TABLE)
}

fn placeholders(first: usize, count: usize) -> String {
    (first..first + count)
        .map(|i| format!("${i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn bind_value<'q>(query: PgQuery<'q>, value: &Value) -> PgQuery<'q> {
    match value {
        Value::Int(v) => query.bind(*v),
        Value::Text(v) => query.bind(v.clone()),
    }
}

fn decode<E: PgTable>(row: &PgRow) -> Result<E, CoreError> {
    E::from_row(row).map_err(|e| storage(e, "pg decode row"))
}

fn translate<E: Entity>(err: sqlx::Error, context: &'static str) -> CoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return CoreError::unique_violation::<E>(db.constraint());
        }
        if db.is_foreign_key_violation() {
            return CoreError::foreign_key_violation::<E>(db.constraint());
        }
    }
    storage(err, context)
}

pub(crate) fn storage(err: sqlx::Error, context: &'static str) -> CoreError {
    tracing::error!(error = %err, context, "postgres failure");
    CoreError::Storage(context)
}
