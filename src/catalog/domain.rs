pub mod service;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use crate::books::dto::{AddBookRequest, BookDto, UpdateBookRequest};
use crate::core::library::{LibraryResult, Pagination};

#[async_trait]
pub trait CatalogService: Sync + Send {
    // page of books ordered by title, out of range pages come back empty
    async fn find_books(&self, page_index: usize, page_size: usize) -> LibraryResult<Pagination<BookDto>>;
    async fn find_book_by_id(&self, id: i64) -> LibraryResult<Option<BookDto>>;
    async fn add_book(&self, request: &AddBookRequest, token: &CancellationToken) -> LibraryResult<BookDto>;
    async fn update_book(&self, request: &UpdateBookRequest, token: &CancellationToken) -> LibraryResult<BookDto>;
    async fn remove_book(&self, id: i64, token: &CancellationToken) -> LibraryResult<BookDto>;
}
