use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use crate::books::domain::model::BookEntity;
use crate::books::repository::{matches_predicate, sort_books};
use crate::core::library::{LibraryError, LibraryResult, PageRequest, Pagination};
use crate::core::repository::{Repository, WriteOp};

#[derive(Debug, Default)]
struct MemoryStore {
    books: BTreeMap<i64, BookEntity>,
    sequence: i64,
}

// MemoryBookRepository keeps books in process memory. Clones share the same store.
#[derive(Debug, Clone, Default)]
pub struct MemoryBookRepository {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_books(books: Vec<BookEntity>) -> Self {
        let sequence = books.iter().map(|b| b.id).max().unwrap_or(0);
        let books = books.into_iter().map(|b| (b.id, b)).collect();
        Self {
            store: Arc::new(RwLock::new(MemoryStore { books, sequence })),
        }
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.books.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn apply(books: &mut BTreeMap<i64, BookEntity>, write: WriteOp<BookEntity>) -> LibraryResult<()> {
    match write {
        WriteOp::Add(book) => {
            if books.contains_key(&book.id) {
                return Err(LibraryError::conflict(format!("book {} already exists", book.id).as_str()));
            }
            books.insert(book.id, book);
        }
        WriteOp::Update(book) => {
            if !books.contains_key(&book.id) {
                return Err(LibraryError::conflict(format!("book {} no longer exists", book.id).as_str()));
            }
            books.insert(book.id, book);
        }
        WriteOp::Delete(book) => {
            if books.remove(&book.id).is_none() {
                return Err(LibraryError::conflict(format!("book {} no longer exists", book.id).as_str()));
            }
        }
    }
    Ok(())
}

#[async_trait]
impl Repository<BookEntity> for MemoryBookRepository {
    async fn get(&self, id: i64) -> LibraryResult<Option<BookEntity>> {
        Ok(self.store.read().await.books.get(&id).cloned())
    }

    async fn exists(&self, id: i64) -> LibraryResult<bool> {
        Ok(self.store.read().await.books.contains_key(&id))
    }

    async fn next_id(&self) -> LibraryResult<i64> {
        let mut store = self.store.write().await;
        store.sequence += 1;
        Ok(store.sequence)
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: &PageRequest) -> LibraryResult<Pagination<BookEntity>> {
        let mut records: Vec<BookEntity> = self.store.read().await.books.values()
            .filter(|b| matches_predicate(b, predicate))
            .cloned()
            .collect();
        sort_books(&mut records, page)?;
        Ok(Pagination::from_sorted(records, page))
    }

    async fn commit(&self, writes: Vec<WriteOp<BookEntity>>, token: &CancellationToken) -> LibraryResult<usize> {
        let mut store = self.store.write().await;
        if token.is_cancelled() {
            return Err(LibraryError::cancelled("commit cancelled"));
        }
        // apply to a scratch copy so a failing write leaves the store untouched
        let mut books = store.books.clone();
        let size = writes.len();
        for write in writes {
            apply(&mut books, write)?;
        }
        let max_id = books.keys().next_back().copied().unwrap_or(0);
        store.sequence = store.sequence.max(max_id);
        store.books = books;
        debug!(size, "memory commit applied");
        Ok(size)
    }
}
