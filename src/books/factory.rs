use crate::books::domain::model::BookEntity;
use crate::books::repository::ddb_book_repository::DDBBookRepository;
use crate::books::repository::memory_book_repository::MemoryBookRepository;
use crate::core::domain::Configuration;
use crate::core::repository::{Repository, RepositoryStore};
use crate::utils::ddb::{build_db_client, create_table};

pub async fn create_book_repository(config: &Configuration, store: RepositoryStore) -> Box<dyn Repository<BookEntity>> {
    match store {
        RepositoryStore::Memory => {
            Box::new(MemoryBookRepository::new())
        }
        RepositoryStore::DynamoDB => {
            let client = build_db_client(None).await;
            Box::new(DDBBookRepository::new(client, config.table_name.as_str()))
        }
        RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(Some(config.local_endpoint.as_str())).await;
            let _ = create_table(&client, config.table_name.as_str(), "book_id").await;
            Box::new(DDBBookRepository::new(client, config.table_name.as_str()))
        }
    }
}
