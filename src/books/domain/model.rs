use serde::{Deserialize, Serialize};
use crate::core::domain::Identifiable;

// BookEntity is the persisted shape of a book; its id is allocated by the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookEntity {
    #[serde(rename = "book_id")]
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: f64,
}

impl BookEntity {
    pub fn new(id: i64, title: &str, description: &str, price: f64) -> Self {
        Self {
            id,
            title: title.to_string(),
            description: description.to_string(),
            price,
        }
    }
}

impl Identifiable for BookEntity {
    fn id(&self) -> i64 {
        self.id
    }
}
