use cardbox_core::{CoreError, NewCard, NewDeck, Predicate, Store, UnitOfWork, Upsert};
use cardbox_sqlite::SqliteStore;

async fn store() -> SqliteStore {
    SqliteStore::open_memory().await.unwrap()
}

#[tokio::test]
async fn empty_store_lists_nothing() {
    let store = store().await;
    let mut uow = store.begin().await.unwrap();
    assert!(uow.decks().list(None).await.unwrap().is_empty());
    assert!(uow.cards().list(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn create_assigns_ids_and_is_retrievable() {
    let store = store().await;
    let mut uow = store.begin().await.unwrap();
    let deck = uow
        .decks()
        .create(NewDeck::new("Spanish").with_description("basics"))
        .await
        .unwrap();
    assert!(deck.id > 0);
    uow.commit().await.unwrap();

    let mut uow = store.begin().await.unwrap();
    let fetched = uow
        .decks()
        .get_one_or_none(Predicate::id(deck.id), false)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched.name, "Spanish");
    assert_eq!(fetched.description.as_deref(), Some("basics"));
    assert_eq!(fetched.cards, None);
}

#[tokio::test]
async fn missing_rows_are_absent_not_errors() {
    let store = store().await;
    let mut uow = store.begin().await.unwrap();
    assert!(uow
        .decks()
        .get_one_or_none(Predicate::id(0), true)
        .await
        .unwrap()
        .is_none());
    assert!(uow
        .cards()
        .get_one_or_none(Predicate::id(999), false)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn eager_load_returns_cards_in_insertion_order() {
    let store = store().await;
    let mut uow = store.begin().await.unwrap();
    let deck = uow.decks().create(NewDeck::new("Lang")).await.unwrap();
    let other = uow.decks().create(NewDeck::new("Other")).await.unwrap();
    uow.cards()
        .create_many(vec![
            NewCard::new(deck.id, "hola").with_back("hello"),
            NewCard::new(other.id, "elsewhere"),
            NewCard::new(deck.id, "adios").with_hint("bye"),
        ])
        .await
        .unwrap();

    let loaded = uow
        .decks()
        .get_one_or_none(Predicate::id(deck.id), true)
        .await
        .unwrap()
        .unwrap();
    let fronts: Vec<_> = loaded
        .cards
        .unwrap()
        .into_iter()
        .map(|c| c.front)
        .collect();
    assert_eq!(fronts, vec!["hola", "adios"]);

    let filtered = uow
        .cards()
        .list(Some(Predicate::eq("deck_id", other.id)))
        .await
        .unwrap();
    assert_eq!(filtered.len(), 1);
}

#[tokio::test]
async fn update_missing_id_is_not_found() {
    let store = store().await;
    let mut uow = store.begin().await.unwrap();
    let err = uow
        .decks()
        .update(NewDeck::new("some"), 999)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound("Deck")));
}

#[tokio::test]
async fn update_replaces_fields() {
    let store = store().await;
    let mut uow = store.begin().await.unwrap();
    let deck = uow
        .decks()
        .create(NewDeck::new("old").with_description("d"))
        .await
        .unwrap();
    let updated = uow
        .decks()
        .update(NewDeck::new("new"), deck.id)
        .await
        .unwrap();
    assert_eq!(updated.id, deck.id);
    assert_eq!(updated.name, "new");
    assert_eq!(updated.description, None);
}

#[tokio::test]
async fn decks_with_the_same_name_are_distinct_rows() {
    let store = store().await;
    let mut uow = store.begin().await.unwrap();
    let first = uow.decks().create(NewDeck::new("Spanish")).await.unwrap();
    let second = uow.decks().create(NewDeck::new("Spanish")).await.unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(uow.decks().list(None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn bulk_create_with_missing_deck_persists_nothing() {
    let store = store().await;
    let mut uow = store.begin().await.unwrap();
    let deck = uow.decks().create(NewDeck::new("real")).await.unwrap();
    let err = uow
        .cards()
        .create_many(vec![
            NewCard::new(deck.id, "fine"),
            NewCard::new(deck.id + 100, "orphan"),
        ])
        .await
        .unwrap_err();
    match err {
        CoreError::ForeignKey { key, .. } => assert_eq!(key, "deck_id"),
        other => panic!("unexpected {other:?}"),
    }
    // Even committing the outer unit of work keeps none of the batch.
    uow.commit().await.unwrap();

    let mut uow = store.begin().await.unwrap();
    assert!(uow.cards().list(None).await.unwrap().is_empty());
    assert_eq!(uow.decks().list(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn upsert_updates_existing_and_inserts_the_rest_in_order() {
    let store = store().await;
    let mut uow = store.begin().await.unwrap();
    let deck = uow.decks().create(NewDeck::new("d")).await.unwrap();
    let card = uow
        .cards()
        .create(NewCard::new(deck.id, "before"))
        .await
        .unwrap();

    let out = uow
        .cards()
        .upsert_many(vec![
            Upsert::insert(NewCard::new(deck.id, "fresh")),
            Upsert::update(card.id, NewCard::new(deck.id, "after").with_back("b")),
            Upsert::update(12345, NewCard::new(deck.id, "unknown id")),
        ])
        .await
        .unwrap();

    assert_eq!(out.len(), 3);
    assert_eq!(out[0].front, "fresh");
    assert_eq!(out[1].id, card.id);
    assert_eq!(out[1].front, "after");
    assert_eq!(out[1].back.as_deref(), Some("b"));
    assert_ne!(out[2].id, 12345);
    assert_eq!(uow.cards().list(None).await.unwrap().len(), 3);
}

#[tokio::test]
async fn dropped_unit_of_work_rolls_back() {
    let store = store().await;
    {
        let mut uow = store.begin().await.unwrap();
        uow.decks().create(NewDeck::new("gone")).await.unwrap();
    }
    let mut uow = store.begin().await.unwrap();
    assert!(uow.decks().list(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn committed_session_is_visible_to_the_next_unit_of_work() {
    let store = store().await;
    let mut session = Box::new(store.session().await.unwrap());
    let deck = session.decks().create(NewDeck::new("kept")).await.unwrap();
    session.commit().await.unwrap();

    let mut uow = store.begin().await.unwrap();
    let found = uow
        .decks()
        .get_one_or_none(Predicate::id(deck.id), false)
        .await
        .unwrap();
    assert_eq!(found.map(|d| d.name), Some("kept".to_string()));
}

#[tokio::test]
async fn blank_front_is_rejected_before_insert() {
    let store = store().await;
    let mut uow = store.begin().await.unwrap();
    let deck = uow.decks().create(NewDeck::new("d")).await.unwrap();
    let err = uow
        .cards()
        .create(NewCard::new(deck.id, " "))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
}

#[tokio::test]
async fn unknown_filter_column_is_rejected() {
    let store = store().await;
    let mut uow = store.begin().await.unwrap();
    let err = uow
        .decks()
        .list(Some(Predicate::eq("deck_id", 1)))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
}
