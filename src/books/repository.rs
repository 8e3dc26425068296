pub mod ddb_book_repository;
pub mod memory_book_repository;

use std::cmp::Ordering;
use std::collections::HashMap;
use crate::books::domain::model::BookEntity;
use crate::core::library::{LibraryError, LibraryResult, PageRequest};

// attribute names accepted in predicates and as sort keys
pub const BOOK_ATTRIBUTES: [&str; 4] = ["book_id", "title", "description", "price"];

fn canonical_attribute(name: &str) -> &str {
    match name {
        "id" => "book_id",
        other => other,
    }
}

pub(crate) fn attribute_value(book: &BookEntity, name: &str) -> Option<String> {
    match canonical_attribute(name) {
        "book_id" => Some(book.id.to_string()),
        "title" => Some(book.title.to_string()),
        "description" => Some(book.description.to_string()),
        "price" => Some(book.price.to_string()),
        _ => None,
    }
}

// true when every predicate attribute equals the book's attribute
pub(crate) fn matches_predicate(book: &BookEntity, predicate: &HashMap<String, String>) -> bool {
    predicate.iter().all(|(k, v)| attribute_value(book, k).as_deref() == Some(v.as_str()))
}

// Sorts by the requested attribute; ties are broken by id so pages are stable.
pub(crate) fn sort_books(books: &mut [BookEntity], page: &PageRequest) -> LibraryResult<()> {
    let order_by = canonical_attribute(page.order_by.as_str());
    if !BOOK_ATTRIBUTES.contains(&order_by) {
        return Err(LibraryError::invalid_argument(
            format!("cannot order books by {}", page.order_by).as_str(), Some("order_by".to_string())));
    }
    books.sort_by(|a, b| {
        let ord = match order_by {
            "title" => a.title.cmp(&b.title),
            "description" => a.description.cmp(&b.description),
            "price" => a.price.total_cmp(&b.price),
            _ => Ordering::Equal,
        };
        let ord = ord.then(a.id.cmp(&b.id));
        if page.ascending { ord } else { ord.reverse() }
    });
    Ok(())
}
