use std::collections::HashMap;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use crate::books::domain::model::BookEntity;
use crate::books::domain::{validate_price, validate_title};
use crate::books::dto::{AddBookRequest, BookDto, UpdateBookRequest};
use crate::catalog::domain::CatalogService;
use crate::core::domain::Configuration;
use crate::core::library::{LibraryError, LibraryResult, PageRequest, Pagination};
use crate::core::repository::{execute_transaction, Repository};

pub struct CatalogServiceImpl {
    book_repository: Box<dyn Repository<BookEntity>>,
}

impl CatalogServiceImpl {
    pub fn new(_config: &Configuration, book_repository: Box<dyn Repository<BookEntity>>) -> Self {
        Self {
            book_repository,
        }
    }
}

#[async_trait]
impl CatalogService for CatalogServiceImpl {
    async fn find_books(&self, page_index: usize, page_size: usize) -> LibraryResult<Pagination<BookDto>> {
        let page = PageRequest::new(page_index, page_size, "title", true);
        let res = self.book_repository.query(&HashMap::new(), &page).await?;
        debug!(page_index, page_size, total = res.total_count, "found books");
        Ok(res.map(BookDto::from))
    }

    async fn find_book_by_id(&self, id: i64) -> LibraryResult<Option<BookDto>> {
        let book = self.book_repository.get(id).await?;
        Ok(book.as_ref().map(BookDto::from))
    }

    async fn add_book(&self, request: &AddBookRequest, token: &CancellationToken) -> LibraryResult<BookDto> {
        validate_title(request.title.as_str())?;
        validate_price(request.price)?;

        let mut book = BookEntity::from(request);
        book.id = self.book_repository.next_id().await?;
        let staged = book.clone();
        execute_transaction(self.book_repository.as_ref(), token, move |scope| {
            scope.add(staged);
            Ok(())
        }).await?;
        info!(book_id = book.id, "book added");
        Ok(BookDto::from(&book))
    }

    async fn update_book(&self, request: &UpdateBookRequest, token: &CancellationToken) -> LibraryResult<BookDto> {
        validate_title(request.title.as_str())?;
        validate_price(request.price)?;

        if !self.book_repository.exists(request.id).await? {
            return Err(LibraryError::not_found(format!("book {} not found", request.id).as_str()));
        }
        let book = BookEntity::from(request);
        let staged = book.clone();
        execute_transaction(self.book_repository.as_ref(), token, move |scope| {
            scope.update(staged);
            Ok(())
        }).await?;
        info!(book_id = book.id, "book updated");
        Ok(BookDto::from(&book))
    }

    async fn remove_book(&self, id: i64, token: &CancellationToken) -> LibraryResult<BookDto> {
        let existing = self.book_repository.get(id).await?
            .ok_or_else(|| LibraryError::not_found(format!("book {} not found", id).as_str()))?;
        let staged = existing.clone();
        execute_transaction(self.book_repository.as_ref(), token, move |scope| {
            scope.delete(staged);
            Ok(())
        }).await?;
        info!(book_id = id, "book removed");
        Ok(BookDto::from(&existing))
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;
    use tokio_util::sync::CancellationToken;
    use crate::books::domain::model::BookEntity;
    use crate::books::dto::{AddBookRequest, UpdateBookRequest};
    use crate::books::repository::memory_book_repository::MemoryBookRepository;
    use crate::catalog::domain::CatalogService;
    use crate::catalog::domain::service::CatalogServiceImpl;
    use crate::core::domain::Configuration;
    use crate::core::library::{LibraryError, Pagination};
    use crate::core::repository::{MockRepository, WriteOp};

    fn service(repo: MockRepository<BookEntity>) -> CatalogServiceImpl {
        CatalogServiceImpl::new(&Configuration::default(), Box::new(repo))
    }

    fn memory_service(repo: &MemoryBookRepository) -> CatalogServiceImpl {
        CatalogServiceImpl::new(&Configuration::default(), Box::new(repo.clone()))
    }

    #[tokio::test]
    async fn test_should_find_book_by_id() {
        let expect = BookEntity::new(1, "C# Programming", "A comprehensive guide to C# programming.", 29.99);
        let stored = expect.clone();
        let mut repo = MockRepository::<BookEntity>::new();
        repo.expect_get().with(eq(1)).times(1).returning(move |_| Ok(Some(stored.clone())));

        let actual = service(repo).find_book_by_id(1).await.expect("should find book").expect("should exist");
        assert_eq!(expect.id, actual.id);
        assert_eq!(expect.title, actual.title);
        assert_eq!(expect.description, actual.description);
        assert_eq!(expect.price, actual.price);
    }

    #[tokio::test]
    async fn test_should_return_none_for_missing_ids() {
        for id in [-1, 0] {
            let mut repo = MockRepository::<BookEntity>::new();
            repo.expect_get().with(eq(id)).times(1).returning(|_| Ok(None));
            let actual = service(repo).find_book_by_id(id).await.expect("should not fail");
            assert!(actual.is_none());
        }
    }

    #[tokio::test]
    async fn test_should_find_books_ordered_by_title() {
        let mut repo = MockRepository::<BookEntity>::new();
        repo.expect_query()
            .withf(|predicate, page| predicate.is_empty() && page.order_by == "title" && page.ascending
                && page.page_index == 0 && page.page_size == 2)
            .times(1)
            .returning(|_, page| Ok(Pagination::new(vec![
                BookEntity::new(2, "ASP.NET Core Development", "Learn how to build web applications using ASP.NET Core.", 35.50),
                BookEntity::new(1, "C# Programming", "A comprehensive guide to C# programming.", 29.99),
            ], 2, page.page_index, page.page_size)));

        let actual = service(repo).find_books(0, 2).await.expect("should find books");
        assert_eq!(2, actual.items.len());
        assert_eq!(0, actual.current_page);
        assert_eq!(2, actual.page_size);
        assert_eq!(2, actual.total_count);
        assert_eq!(1, actual.total_pages);
        assert!(!actual.has_previous);
        assert!(!actual.has_next);
        assert_eq!(2, actual.items[0].id);
        assert_eq!("ASP.NET Core Development", actual.items[0].title.as_str());
        assert_eq!(1, actual.items[1].id);
        assert_eq!(29.99, actual.items[1].price);
    }

    #[tokio::test]
    async fn test_should_add_book() {
        let mut repo = MockRepository::<BookEntity>::new();
        repo.expect_next_id().times(1).returning(|| Ok(1));
        repo.expect_commit()
            .withf(|writes, _| writes == &vec![WriteOp::Add(BookEntity::new(1, "New Book", "A new book description.", 19.99))])
            .times(1)
            .returning(|writes, _| Ok(writes.len()));

        let result = service(repo).add_book(&AddBookRequest::new("New Book", "A new book description.", 19.99),
                                            &CancellationToken::new()).await.expect("should add book");
        assert_eq!(1, result.id);
        assert_eq!("New Book", result.title.as_str());
        assert_eq!(19.99, result.price);
    }

    #[tokio::test]
    async fn test_should_add_book_with_long_title() {
        let title = "C".repeat(4000);
        let expected_title = title.clone();
        let mut repo = MockRepository::<BookEntity>::new();
        repo.expect_next_id().times(1).returning(|| Ok(5));
        repo.expect_commit()
            .withf(move |writes, _| matches!(writes.as_slice(),
                [WriteOp::Add(b)] if b.title == expected_title && b.description == "Valid Description" && b.price == 50.0))
            .times(1)
            .returning(|_, _| Ok(1));

        let result = service(repo).add_book(&AddBookRequest::new(title.as_str(), "Valid Description", 50.0),
                                            &CancellationToken::new()).await.expect("should add book");
        assert_eq!(4000, result.title.len());
    }

    #[tokio::test]
    async fn test_should_reject_invalid_add_without_persistence() {
        let requests = vec![
            AddBookRequest::new("", &"A".repeat(10000), -10.0),
            AddBookRequest::new("   ", "blank title", 10.0),
            AddBookRequest::new("Negative", "negative price", -0.5),
            AddBookRequest::new("Infinite", "unbounded price", f64::INFINITY),
        ];
        for req in requests {
            // no expectations: any repository call fails the test
            let repo = MockRepository::<BookEntity>::new();
            let res = service(repo).add_book(&req, &CancellationToken::new()).await;
            assert!(matches!(res, Err(LibraryError::InvalidArgument { .. })));
        }
    }

    #[tokio::test]
    async fn test_should_update_book() {
        let mut repo = MockRepository::<BookEntity>::new();
        repo.expect_exists().with(eq(1)).times(1).returning(|_| Ok(true));
        repo.expect_commit()
            .withf(|writes, _| writes == &vec![WriteOp::Update(BookEntity::new(1, "Updated Book", "An updated book description.", 30.0))])
            .times(1)
            .returning(|_, _| Ok(1));

        let req = UpdateBookRequest::new(1, "Updated Book", "An updated book description.", 30.0);
        let result = service(repo).update_book(&req, &CancellationToken::new()).await.expect("should update book");
        assert_eq!(1, result.id);
        assert_eq!("Updated Book", result.title.as_str());
    }

    #[tokio::test]
    async fn test_should_not_update_missing_book() {
        let mut repo = MockRepository::<BookEntity>::new();
        repo.expect_exists().with(eq(9999)).times(1).returning(|_| Ok(false));
        repo.expect_commit().times(0);

        let req = UpdateBookRequest::new(9999, "X", &"B".repeat(10000), 25.0);
        let res = service(repo).update_book(&req, &CancellationToken::new()).await;
        assert!(matches!(res, Err(LibraryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_should_reject_invalid_update_without_persistence() {
        let requests = vec![
            UpdateBookRequest::new(1, "", "Valid Description", 30.0),
            UpdateBookRequest::new(1, "\t", "Valid Description", 30.0),
            UpdateBookRequest::new(1, "Title", "Valid Description", -30.0),
        ];
        for req in requests {
            let repo = MockRepository::<BookEntity>::new();
            let res = service(repo).update_book(&req, &CancellationToken::new()).await;
            assert!(matches!(res, Err(LibraryError::InvalidArgument { .. })));
        }
    }

    #[tokio::test]
    async fn test_should_remove_book() {
        let existing = BookEntity::new(1, "Book to Delete", "A book to delete", 20.0);
        let stored = existing.clone();
        let expected_write = vec![WriteOp::Delete(existing.clone())];
        let mut repo = MockRepository::<BookEntity>::new();
        repo.expect_get().with(eq(1)).times(1).returning(move |_| Ok(Some(stored.clone())));
        repo.expect_commit()
            .withf(move |writes, _| writes == &expected_write)
            .times(1)
            .returning(|_, _| Ok(1));

        let result = service(repo).remove_book(1, &CancellationToken::new()).await.expect("should remove book");
        assert_eq!(existing.id, result.id);
        assert_eq!(existing.title, result.title);
    }

    #[tokio::test]
    async fn test_should_not_remove_missing_book() {
        let mut repo = MockRepository::<BookEntity>::new();
        repo.expect_get().with(eq(9999)).times(1).returning(|_| Ok(None));
        repo.expect_commit().times(0);

        let res = service(repo).remove_book(9999, &CancellationToken::new()).await;
        assert!(matches!(res, Err(LibraryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_should_propagate_repository_failure() {
        let mut repo = MockRepository::<BookEntity>::new();
        repo.expect_exists().returning(|_| Err(LibraryError::database("connection refused", None, true)));
        repo.expect_commit().times(0);

        let req = UpdateBookRequest::new(1, "Title", "", 1.0);
        let res = service(repo).update_book(&req, &CancellationToken::new()).await;
        assert!(matches!(res, Err(LibraryError::Database { retryable: true, .. })));
    }

    #[tokio::test]
    async fn test_should_manage_books_in_memory() {
        let repo = MemoryBookRepository::new();
        let catalog_svc = memory_service(&repo);
        let token = CancellationToken::new();

        let zen = catalog_svc.add_book(&AddBookRequest::new("Zen", "motorcycles", 12.0), &token)
            .await.expect("should add book");
        let art = catalog_svc.add_book(&AddBookRequest::new("Art", "of war", 8.0), &token)
            .await.expect("should add book");
        assert_ne!(zen.id, art.id);

        let page = catalog_svc.find_books(0, 2).await.expect("should find books");
        assert_eq!(2, page.items.len());
        assert_eq!(0, page.current_page);
        assert_eq!(2, page.total_count);
        assert_eq!(vec![art.clone(), zen.clone()], page.items);

        let loaded = catalog_svc.find_book_by_id(zen.id).await.expect("should find book");
        assert_eq!(Some(zen.clone()), loaded);

        let updated = catalog_svc.update_book(&UpdateBookRequest::new(zen.id, "Zen and Art", "motorcycles", 14.0), &token)
            .await.expect("should update book");
        assert_eq!(Some(updated), catalog_svc.find_book_by_id(zen.id).await.expect("should find book"));

        let removed = catalog_svc.remove_book(art.id, &token).await.expect("should remove book");
        assert_eq!(art, removed);
        assert_eq!(None, catalog_svc.find_book_by_id(art.id).await.expect("should query book"));
        assert_eq!(1, repo.len().await);
    }

    #[tokio::test]
    async fn test_should_return_empty_page_beyond_range() {
        let repo = MemoryBookRepository::with_books(vec![BookEntity::new(1, "Only", "", 1.0)]);
        let page = memory_service(&repo).find_books(5, 10).await.expect("should find books");
        assert!(page.items.is_empty());
        assert_eq!(1, page.total_count);
        assert_eq!(5, page.current_page);
        assert!(page.has_previous);
        assert!(!page.has_next);
    }

    #[tokio::test]
    async fn test_should_not_add_with_cancelled_token() {
        let repo = MemoryBookRepository::new();
        let token = CancellationToken::new();
        token.cancel();

        let res = memory_service(&repo).add_book(&AddBookRequest::new("Late", "", 1.0), &token).await;
        assert!(matches!(res, Err(LibraryError::Cancelled { .. })));
        assert!(repo.is_empty().await);
    }
}
