use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::books::dto::BookDto;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};
use crate::core::library::Pagination;

pub struct GetBooksCommand {
    catalog_service: Box<dyn CatalogService>,
}

impl GetBooksCommand {
    pub fn new(catalog_service: Box<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GetBooksCommandRequest {
    pub page_index: usize,
    pub page_size: usize,
}

impl GetBooksCommandRequest {
    pub fn new(page_index: usize, page_size: usize) -> Self {
        Self {
            page_index,
            page_size,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GetBooksCommandResponse {
    pub books: Pagination<BookDto>,
}

impl GetBooksCommandResponse {
    pub fn new(books: Pagination<BookDto>) -> Self {
        Self {
            books,
        }
    }
}

#[async_trait]
impl Command<GetBooksCommandRequest, GetBooksCommandResponse> for GetBooksCommand {
    async fn execute(&self, req: GetBooksCommandRequest) -> Result<GetBooksCommandResponse, CommandError> {
        self.catalog_service.find_books(req.page_index, req.page_size)
            .await.map_err(CommandError::from).map(GetBooksCommandResponse::new)
    }
}
