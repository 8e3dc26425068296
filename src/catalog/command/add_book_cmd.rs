use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use crate::books::dto::{AddBookRequest, BookDto};
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};

pub struct AddBookCommand {
    catalog_service: Box<dyn CatalogService>,
    token: CancellationToken,
}

impl AddBookCommand {
    pub fn new(catalog_service: Box<dyn CatalogService>, token: CancellationToken) -> Self {
        Self {
            catalog_service,
            token,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddBookCommandRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
}

impl AddBookCommandRequest {
    pub fn new(title: &str, description: &str, price: f64) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            price,
        }
    }

    pub fn build_request(&self) -> AddBookRequest {
        AddBookRequest::new(self.title.as_str(), self.description.as_str(), self.price)
    }
}

#[derive(Debug, Serialize)]
pub struct AddBookCommandResponse {
    pub book: BookDto,
}

impl AddBookCommandResponse {
    pub fn new(book: BookDto) -> Self {
        Self {
            book,
        }
    }
}

#[async_trait]
impl Command<AddBookCommandRequest, AddBookCommandResponse> for AddBookCommand {
    async fn execute(&self, req: AddBookCommandRequest) -> Result<AddBookCommandResponse, CommandError> {
        self.catalog_service.add_book(&req.build_request(), &self.token)
            .await.map_err(CommandError::from).map(AddBookCommandResponse::new)
    }
}
