use serde::{Deserialize, Serialize};
use crate::books::domain::model::BookEntity;
use crate::core::domain::Identifiable;

// BookDto is a data transfer object for Catalog service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDto {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: f64,
}

impl BookDto {
    pub fn new(id: i64, title: &str, description: &str, price: f64) -> BookDto {
        BookDto {
            id,
            title: title.to_string(),
            description: description.to_string(),
            price,
        }
    }
}

impl Identifiable for BookDto {
    fn id(&self) -> i64 {
        self.id
    }
}

// AddBookRequest carries the fields of a new book, identity is assigned on add.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddBookRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
}

impl AddBookRequest {
    pub fn new(title: &str, description: &str, price: f64) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateBookRequest {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
}

impl UpdateBookRequest {
    pub fn new(id: i64, title: &str, description: &str, price: f64) -> Self {
        Self {
            id,
            title: title.to_string(),
            description: description.to_string(),
            price,
        }
    }
}

impl From<&BookEntity> for BookDto {
    fn from(other: &BookEntity) -> Self {
        Self {
            id: other.id,
            title: other.title.to_string(),
            description: other.description.to_string(),
            price: other.price,
        }
    }
}

impl From<&BookDto> for BookEntity {
    fn from(other: &BookDto) -> Self {
        Self {
            id: other.id,
            title: other.title.to_string(),
            description: other.description.to_string(),
            price: other.price,
        }
    }
}

// id stays 0 until the repository allocates one
impl From<&AddBookRequest> for BookEntity {
    fn from(other: &AddBookRequest) -> Self {
        Self {
            id: 0,
            title: other.title.to_string(),
            description: other.description.to_string(),
            price: other.price,
        }
    }
}

impl From<&UpdateBookRequest> for BookEntity {
    fn from(other: &UpdateBookRequest) -> Self {
        Self {
            id: other.id,
            title: other.title.to_string(),
            description: other.description.to_string(),
            price: other.price,
        }
    }
}
