use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use cardbox_core::{
    Card, CardId, CoreError, Deck, DeckId, Entity, NewCard, Predicate, Store, Upsert,
};

use crate::api::dto::{CardIn, CardOut, CardUpsertIn, DeckIn, DeckOut, Items};
use crate::api::error::ApiError;
use crate::api::extract::{ApiPath, ValidJson, ValidJsonList};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
}

type ApiResult<T> = Result<T, ApiError>;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// ===== Decks =====
pub async fn list_decks(State(st): State<Arc<AppState>>) -> ApiResult<Json<Items<DeckOut>>> {
    let mut uow = st.store.begin().await?;
    let decks = uow.decks().list(None).await?;
    uow.commit().await?;
    Ok(Json(Items::from_models(decks)))
}

pub async fn get_deck(
    State(st): State<Arc<AppState>>,
    ApiPath(deck_id): ApiPath<DeckId>,
) -> ApiResult<Json<DeckOut>> {
    let mut uow = st.store.begin().await?;
    let deck = uow
        .decks()
        .get_one_or_none(Predicate::id(deck_id), true)
        .await?
        .ok_or(CoreError::NotFound(Deck::LABEL))?;
    uow.commit().await?;
    Ok(Json(deck.into()))
}

pub async fn create_deck(
    State(st): State<Arc<AppState>>,
    ValidJson(body): ValidJson<DeckIn>,
) -> ApiResult<(StatusCode, Json<DeckOut>)> {
    let mut uow = st.store.begin().await?;
    let deck = uow.decks().create(body.into_new()).await?;
    uow.commit().await?;
    tracing::info!(deck_id = deck.id, "deck created");
    Ok((StatusCode::CREATED, Json(deck.into())))
}

pub async fn update_deck(
    State(st): State<Arc<AppState>>,
    ApiPath(deck_id): ApiPath<DeckId>,
    ValidJson(body): ValidJson<DeckIn>,
) -> ApiResult<Json<DeckOut>> {
    let mut uow = st.store.begin().await?;
    let deck = uow.decks().update(body.into_new(), deck_id).await?;
    uow.commit().await?;
    tracing::info!(deck_id, "deck updated");
    Ok(Json(deck.into()))
}

// ===== Cards =====
pub async fn list_cards(
    State(st): State<Arc<AppState>>,
    ApiPath(deck_id): ApiPath<DeckId>,
) -> ApiResult<Json<Items<CardOut>>> {
    let mut uow = st.store.begin().await?;
    let cards = uow
        .cards()
        .list(Some(Predicate::eq("deck_id", deck_id)))
        .await?;
    uow.commit().await?;
    Ok(Json(Items::from_models(cards)))
}

pub async fn get_card(
    State(st): State<Arc<AppState>>,
    ApiPath(card_id): ApiPath<CardId>,
) -> ApiResult<Json<CardOut>> {
    let mut uow = st.store.begin().await?;
    let card = uow
        .cards()
        .get_one_or_none(Predicate::id(card_id), false)
        .await?
        .ok_or(CoreError::NotFound(Card::LABEL))?;
    uow.commit().await?;
    Ok(Json(card.into()))
}

pub async fn create_cards(
    State(st): State<Arc<AppState>>,
    ApiPath(deck_id): ApiPath<DeckId>,
    ValidJsonList(body): ValidJsonList<CardIn>,
) -> ApiResult<(StatusCode, Json<Items<CardOut>>)> {
    let data: Vec<NewCard> = body.into_iter().map(|c| c.into_new(deck_id)).collect();
    let mut uow = st.store.begin().await?;
    let cards = uow.cards().create_many(data).await?;
    uow.commit().await?;
    tracing::info!(deck_id, count = cards.len(), "cards created");
    Ok((StatusCode::CREATED, Json(Items::from_models(cards))))
}

pub async fn update_cards(
    State(st): State<Arc<AppState>>,
    ApiPath(deck_id): ApiPath<DeckId>,
    ValidJsonList(body): ValidJsonList<CardUpsertIn>,
) -> ApiResult<Json<Items<CardOut>>> {
    let items: Vec<Upsert<NewCard>> = body.into_iter().map(|c| c.into_upsert(deck_id)).collect();
    let mut uow = st.store.begin().await?;
    let cards = uow.cards().upsert_many(items).await?;
    uow.commit().await?;
    tracing::info!(deck_id, count = cards.len(), "cards upserted");
    Ok(Json(Items::from_models(cards)))
}
