use cardbox_core::{Card, CardId, Deck, DeckId, NewCard, NewDeck, Upsert};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize)]
pub struct Items<T> {
    pub items: Vec<T>,
}

impl<T> Items<T> {
    pub fn from_models<M>(models: Vec<M>) -> Self
    where
        T: From<M>,
    {
        Self {
            items: models.into_iter().map(T::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeckOut {
    pub id: DeckId,
    pub name: String,
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cards: Option<Vec<CardOut>>,
}

impl From<Deck> for DeckOut {
    fn from(d: Deck) -> Self {
        Self {
            id: d.id,
            name: d.name,
            description: d.description,
            cards: d
                .cards
                .map(|cards| cards.into_iter().map(CardOut::from).collect()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CardOut {
    pub id: CardId,
    pub front: String,
    pub back: Option<String>,
    pub hint: Option<String>,
    pub deck_id: Option<DeckId>,
}

impl From<Card> for CardOut {
    fn from(c: Card) -> Self {
        Self {
            id: c.id,
            front: c.front,
            back: c.back,
            hint: c.hint,
            deck_id: Some(c.deck_id),
        }
    }
}

// Required fields are Options so that `null` and absent both reach
// validation and come back as field errors instead of parse failures.

#[derive(Debug, Deserialize, Validate)]
pub struct DeckIn {
    #[validate(
        required(message = "field required"),
        length(min = 1, message = "must not be empty")
    )]
    pub name: Option<String>,
    pub description: Option<String>,
}

impl DeckIn {
    pub fn into_new(self) -> NewDeck {
        NewDeck {
            name: self.name.unwrap_or_default(),
            description: self.description,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CardIn {
    #[validate(
        required(message = "field required"),
        length(min = 1, message = "must not be empty")
    )]
    pub front: Option<String>,
    pub back: Option<String>,
    pub hint: Option<String>,
}

impl CardIn {
    pub fn into_new(self, deck_id: DeckId) -> NewCard {
        NewCard {
            front: self.front.unwrap_or_default(),
            back: self.back,
            hint: self.hint,
            deck_id,
        }
    }
}

/// Body item for the bulk card PUT. A `deck_id` in the body is ignored;
/// the deck comes from the path.
#[derive(Debug, Deserialize, Validate)]
pub struct CardUpsertIn {
    #[validate(range(min = 1, message = "must be a positive integer"))]
    pub id: Option<CardId>,
    #[validate(
        required(message = "field required"),
        length(min = 1, message = "must not be empty")
    )]
    pub front: Option<String>,
    pub back: Option<String>,
    pub hint: Option<String>,
}

impl CardUpsertIn {
    pub fn into_upsert(self, deck_id: DeckId) -> Upsert<NewCard> {
        Upsert {
            id: self.id,
            data: NewCard {
                front: self.front.unwrap_or_default(),
                back: self.back,
                hint: self.hint,
                deck_id,
            },
        }
    }
}
