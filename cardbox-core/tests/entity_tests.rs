use cardbox_core::{Card, CoreError, Deck, Entity, NewCard, NewDeck, Predicate, Upsert, Value};

#[test]
fn deck_values_follow_columns() {
    let data = NewDeck::new("Spanish").with_description("verbs");
    let values = Deck::values(&data);
    assert_eq!(values.len(), Deck::COLUMNS.len());
    assert_eq!(values[0], Value::Text(Some("Spanish".into())));
    assert_eq!(values[1], Value::Text(Some("verbs".into())));
}

#[test]
fn card_values_carry_deck_id() {
    let data = NewCard::new(7, "hola").with_back("hello");
    let values = Card::values(&data);
    assert_eq!(values.len(), Card::COLUMNS.len());
    assert_eq!(values[2], Value::Text(None));
    assert_eq!(values[3], Value::Int(Some(7)));
}

#[test]
fn blank_required_fields_are_rejected() {
    match Deck::check(&NewDeck::new("   ")) {
        Err(CoreError::Validation(errors)) => assert_eq!(errors[0].key, "name"),
        other => panic!("unexpected {other:?}"),
    }
    match Card::check(&NewCard::new(1, "")) {
        Err(CoreError::Validation(errors)) => assert_eq!(errors[0].key, "front"),
        other => panic!("unexpected {other:?}"),
    }
    assert!(Deck::check(&NewDeck::new("ok")).is_ok());
}

#[test]
fn predicates_only_accept_declared_columns() {
    assert!(Predicate::id(1).check::<Deck>().is_ok());
    assert!(Predicate::eq("deck_id", 1).check::<Card>().is_ok());
    assert!(Predicate::eq("deck_id", 1).check::<Deck>().is_err());
    assert!(Predicate::eq("name; DROP TABLE decks", "x").check::<Deck>().is_err());
}

#[test]
fn upsert_envelopes() {
    let data = NewDeck::new("a");
    assert_eq!(Upsert::insert(data.clone()).id, None);
    assert_eq!(Upsert::update(3, data).id, Some(3));
}

#[test]
fn decks_serialize_without_loaded_cards_as_null() {
    let deck = Deck {
        id: 1,
        name: "a".into(),
        description: None,
        cards: None,
    };
    let v = serde_json::to_value(&deck).unwrap();
    assert!(v["cards"].is_null());
    assert!(v["description"].is_null());
}
