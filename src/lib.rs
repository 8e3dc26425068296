//! Book catalog service layer: validated CRUD over a transactional book repository,
//! backed by process memory or DynamoDB.

pub mod books;
pub mod catalog;
pub mod core;
pub mod utils;
