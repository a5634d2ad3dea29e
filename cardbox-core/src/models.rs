use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, FieldError};
use crate::repo::{Entity, Value};

pub type DeckId = i64;
pub type CardId = i64;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Deck {
    pub id: DeckId,
    pub name: String,
    pub description: Option<String>,
    /// Populated only when the deck was fetched with eager loading.
    pub cards: Option<Vec<Card>>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    pub id: CardId,
    pub front: String,
    pub back: Option<String>,
    pub hint: Option<String>,
    pub deck_id: DeckId,
}

/// Write model for a deck: everything but the system-assigned id.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewDeck {
    pub name: String,
    pub description: Option<String>,
}

impl NewDeck {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewCard {
    pub front: String,
    pub back: Option<String>,
    pub hint: Option<String>,
    pub deck_id: DeckId,
}

impl NewCard {
    pub fn new(deck_id: DeckId, front: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: None,
            hint: None,
            deck_id,
        }
    }

    pub fn with_back(mut self, back: impl Into<String>) -> Self {
        self.back = Some(back.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn require_text(key: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(vec![FieldError::new(
            key,
            "must not be empty",
        )]));
    }
    Ok(())
}

impl Entity for Deck {
    type Create = NewDeck;

    const TABLE: &'static str = "decks";
    const LABEL: &'static str = "Deck";
    const COLUMNS: &'static [&'static str] = &["name", "description"];

    fn id(&self) -> i64 {
        self.id
    }

    fn values(data: &NewDeck) -> Vec<Value> {
        vec![
            Value::Text(Some(data.name.clone())),
            Value::Text(data.description.clone()),
        ]
    }

    fn check(data: &NewDeck) -> Result<(), CoreError> {
        require_text("name", &data.name)
    }
}

impl Entity for Card {
    type Create = NewCard;

    const TABLE: &'static str = "cards";
    const LABEL: &'static str = "Card";
    const COLUMNS: &'static [&'static str] = &["front", "back", "hint", "deck_id"];
    const FOREIGN_KEYS: &'static [&'static str] = &["deck_id"];

    fn id(&self) -> i64 {
        self.id
    }

    fn values(data: &NewCard) -> Vec<Value> {
        vec![
            Value::Text(Some(data.front.clone())),
            Value::Text(data.back.clone()),
            Value::Text(data.hint.clone()),
            Value::Int(Some(data.deck_id)),
        ]
    }

    fn check(data: &NewCard) -> Result<(), CoreError> {
        require_text("front", &data.front)
    }
}
