use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use crate::books::dto::{BookDto, UpdateBookRequest};
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};

pub struct UpdateBookCommand {
    catalog_service: Box<dyn CatalogService>,
    token: CancellationToken,
}

impl UpdateBookCommand {
    pub fn new(catalog_service: Box<dyn CatalogService>, token: CancellationToken) -> Self {
        Self {
            catalog_service,
            token,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookCommandRequest {
    pub book_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
}

impl UpdateBookCommandRequest {
    pub fn new(book_id: i64, title: &str, description: &str, price: f64) -> Self {
        Self {
            book_id,
            title: title.to_string(),
            description: description.to_string(),
            price,
        }
    }

    pub fn build_request(&self) -> UpdateBookRequest {
        UpdateBookRequest::new(self.book_id, self.title.as_str(), self.description.as_str(), self.price)
    }
}

#[derive(Debug, Serialize)]
pub struct UpdateBookCommandResponse {
    pub book: BookDto,
}

impl UpdateBookCommandResponse {
    pub fn new(book: BookDto) -> Self {
        Self {
            book,
        }
    }
}

#[async_trait]
impl Command<UpdateBookCommandRequest, UpdateBookCommandResponse> for UpdateBookCommand {
    async fn execute(&self, req: UpdateBookCommandRequest) -> Result<UpdateBookCommandResponse, CommandError> {
        self.catalog_service.update_book(&req.build_request(), &self.token)
            .await.map_err(CommandError::from).map(UpdateBookCommandResponse::new)
    }
}
