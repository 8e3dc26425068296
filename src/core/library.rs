use std::fmt;
use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq)]
pub enum LibraryError {
    InvalidArgument {
        message: String,
        reason_code: Option<String>,
    },
    NotFound {
        message: String,
    },
    // A conditional write was rejected by the store, e.g. adding an id that already
    // exists or updating/deleting a row that vanished after it was checked.
    Conflict {
        message: String,
    },
    Database {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    CurrentlyUnavailable {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    Serialization {
        message: String,
    },
    Cancelled {
        message: String,
    },
    Runtime {
        message: String,
        reason_code: Option<String>,
    },
}

impl LibraryError {
    pub fn invalid_argument(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::InvalidArgument { message: message.to_string(), reason_code }
    }

    pub fn not_found(message: &str) -> LibraryError {
        LibraryError::NotFound { message: message.to_string() }
    }

    pub fn conflict(message: &str) -> LibraryError {
        LibraryError::Conflict { message: message.to_string() }
    }

    pub fn database(message: &str, reason_code: Option<String>, retryable: bool) -> LibraryError {
        LibraryError::Database { message: message.to_string(), reason_code, retryable }
    }

    pub fn unavailable(message: &str, reason_code: Option<String>, retryable: bool) -> LibraryError {
        LibraryError::CurrentlyUnavailable { message: message.to_string(), reason_code, retryable }
    }

    pub fn database_or_unavailable(message: &str, reason: Option<String>, retryable: bool) -> LibraryError {
        if retryable {
            LibraryError::unavailable(
                format!("ddb database unavailable error {:?} {:?}", message, reason).as_str(), reason, true)
        } else if let Some(ref reason_val) = reason {
            if reason_val.as_str().contains("404") {
                LibraryError::not_found(
                    format!("not found error {:?} {:?}", message, reason).as_str())
            } else if reason_val.as_str().contains("400") && is_conditional_failure(message) {
                LibraryError::conflict(
                    format!("conditional write error {:?} {:?}", message, reason).as_str())
            } else {
                LibraryError::database(
                    format!("ddb database error {:?} {:?}", message, reason).as_str(), reason, false)
            }
        } else {
            LibraryError::database(
                format!("ddb database error {:?} {:?}", message, reason).as_str(), reason, false)
        }
    }

    pub fn serialization(message: &str) -> LibraryError {
        LibraryError::Serialization { message: message.to_string() }
    }

    pub fn cancelled(message: &str) -> LibraryError {
        LibraryError::Cancelled { message: message.to_string() }
    }

    pub fn runtime(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::Runtime { message: message.to_string(), reason_code }
    }

    pub fn retryable(&self) -> bool {
        match self {
            LibraryError::InvalidArgument { .. } => { false }
            LibraryError::NotFound { .. } => { false }
            LibraryError::Conflict { .. } => { false }
            LibraryError::Database { retryable, .. } => { *retryable }
            LibraryError::CurrentlyUnavailable { retryable, .. } => { *retryable }
            LibraryError::Serialization { .. } => { false }
            LibraryError::Cancelled { .. } => { false }
            LibraryError::Runtime { .. } => { false }
        }
    }
}

// DynamoDB answers 400 for rejected condition checks and cancelled transactions, but also
// for missing tables and malformed requests. Only the former are write conflicts.
fn is_conditional_failure(message: &str) -> bool {
    message.contains("ConditionalCheckFailed") || message.contains("TransactionCanceled")
}

impl From<std::io::Error> for LibraryError {
    fn from(err: std::io::Error) -> Self {
        LibraryError::runtime(
            format!("serde io {:?}", err).as_str(), None)
    }
}

impl From<serde_json::Error> for LibraryError {
    fn from(err: serde_json::Error) -> Self {
        LibraryError::serialization(
            format!("serde json parsing {:?}", err).as_str())
    }
}

impl From<String> for LibraryError {
    fn from(err: String) -> Self {
        LibraryError::serialization(
            format!("serde parsing {:?}", err).as_str())
    }
}

impl Display for LibraryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LibraryError::InvalidArgument { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
            LibraryError::NotFound { message } => {
                write!(f, "{}", message)
            }
            LibraryError::Conflict { message } => {
                write!(f, "{}", message)
            }
            LibraryError::Database { message, reason_code, retryable } => {
                write!(f, "{} {:?} {}", message, reason_code, retryable)
            }
            LibraryError::CurrentlyUnavailable { message, reason_code, retryable } => {
                write!(f, "{} {:?} {}", message, reason_code, retryable)
            }
            LibraryError::Serialization { message } => {
                write!(f, "{}", message)
            }
            LibraryError::Cancelled { message } => {
                write!(f, "{}", message)
            }
            LibraryError::Runtime { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
        }
    }
}

impl std::error::Error for LibraryError {}

/// A specialized Result type for repositories and services.
pub type LibraryResult<T> = Result<T, LibraryError>;

// PageRequest describes which slice of a sorted collection a caller wants.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    // zero-based page index
    pub page_index: usize,
    pub page_size: usize,
    // attribute name used for ordering
    pub order_by: String,
    pub ascending: bool,
}

impl PageRequest {
    pub fn new(page_index: usize, page_size: usize, order_by: &str, ascending: bool) -> Self {
        Self {
            page_index,
            page_size,
            order_by: order_by.to_string(),
            ascending,
        }
    }

    // offset of the first record of this page, saturating for absurd indexes
    pub fn offset(&self) -> usize {
        self.page_index.saturating_mul(self.page_size)
    }
}

// Pagination is a read-only view of one page of a sorted collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pagination<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub page_size: usize,
    pub total_count: usize,
    pub total_pages: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

impl<T> Pagination<T> {
    pub fn new(items: Vec<T>, total_count: usize, current_page: usize, page_size: usize) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            total_count.div_ceil(page_size)
        };
        Pagination {
            items,
            current_page,
            page_size,
            total_count,
            total_pages,
            has_previous: current_page > 0,
            has_next: current_page.saturating_add(1) < total_pages,
        }
    }

    // Builds the page described by `page` out of the full, already sorted record set.
    pub fn from_sorted(records: Vec<T>, page: &PageRequest) -> Self {
        let total_count = records.len();
        let items = records.into_iter()
            .skip(page.offset())
            .take(page.page_size)
            .collect();
        Pagination::new(items, total_count, page.page_index, page.page_size)
    }

    pub fn map<'a, U, F: FnMut(&'a T) -> U>(&'a self, f: F) -> Pagination<U> {
        Pagination {
            items: self.items.iter().map(f).collect(),
            current_page: self.current_page,
            page_size: self.page_size,
            total_count: self.total_count,
            total_pages: self.total_pages,
            has_previous: self.has_previous,
            has_next: self.has_next,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::library::{LibraryError, PageRequest, Pagination};

    #[tokio::test]
    async fn test_should_create_invalid_argument_error() {
        assert!(matches!(LibraryError::invalid_argument("test", None), LibraryError::InvalidArgument{ message: _, reason_code: _ }));
    }

    #[tokio::test]
    async fn test_should_create_not_found_error() {
        assert!(matches!(LibraryError::not_found("test"), LibraryError::NotFound{ message: _ }));
    }

    #[tokio::test]
    async fn test_should_create_cancelled_error() {
        assert!(matches!(LibraryError::cancelled("test"), LibraryError::Cancelled{ message: _ }));
    }

    #[tokio::test]
    async fn test_should_create_database_or_unavailable_error() {
        assert!(matches!(LibraryError::database_or_unavailable("test", None, true), LibraryError::CurrentlyUnavailable{ message: _, reason_code: _, retryable: _ }));
        assert!(matches!(LibraryError::database_or_unavailable("test", Some("404".to_string()), false), LibraryError::NotFound{ message: _ }));
        assert!(matches!(LibraryError::database_or_unavailable("ConditionalCheckFailedException", Some("400".to_string()), false), LibraryError::Conflict{ message: _ }));
        assert!(matches!(LibraryError::database_or_unavailable("TransactionCanceledException", Some("400 Bad Request".to_string()), false), LibraryError::Conflict{ message: _ }));
        assert!(matches!(LibraryError::database_or_unavailable("test", Some("500".to_string()), false), LibraryError::Database{ message: _, reason_code: _, retryable: _ }));
        assert!(matches!(LibraryError::database_or_unavailable("test", None, false), LibraryError::Database{ message: _, reason_code: _, retryable: _ }));
    }

    #[tokio::test]
    async fn test_should_not_treat_other_bad_requests_as_conflicts() {
        let missing_table = LibraryError::database_or_unavailable(
            "ResourceNotFoundException: Requested resource not found", Some("400 Bad Request".to_string()), false);
        assert!(matches!(missing_table, LibraryError::Database{ retryable: false, .. }));
        let invalid = LibraryError::database_or_unavailable(
            "ValidationException: One or more parameter values were invalid", Some("400 Bad Request".to_string()), false);
        assert!(matches!(invalid, LibraryError::Database{ .. }));
    }

    #[tokio::test]
    async fn test_should_create_retryable_error() {
        assert!(!LibraryError::invalid_argument("test", None).retryable());
        assert!(!LibraryError::not_found("test").retryable());
        assert!(!LibraryError::conflict("test").retryable());
        assert!(!LibraryError::database("test", None, false).retryable());
        assert!(LibraryError::database("test", None, true).retryable());
        assert!(!LibraryError::unavailable("test", None, false).retryable());
        assert!(LibraryError::unavailable("test", None, true).retryable());
        assert!(!LibraryError::serialization("test").retryable());
        assert!(!LibraryError::cancelled("test").retryable());
        assert!(!LibraryError::runtime("test", None).retryable());
    }

    #[tokio::test]
    async fn test_should_compute_page_metadata() {
        let page = Pagination::new(vec![1, 2], 5, 0, 2);
        assert_eq!(3, page.total_pages);
        assert!(!page.has_previous);
        assert!(page.has_next);

        let last = Pagination::new(vec![5], 5, 2, 2);
        assert!(last.has_previous);
        assert!(!last.has_next);

        let empty = Pagination::<i32>::new(vec![], 0, 0, 0);
        assert_eq!(0, empty.total_pages);
        assert!(!empty.has_next);
    }

    #[tokio::test]
    async fn test_should_slice_sorted_records() {
        let records = vec!["a", "b", "c", "d", "e"];
        let page = Pagination::from_sorted(records.clone(), &PageRequest::new(1, 2, "title", true));
        assert_eq!(vec!["c", "d"], page.items);
        assert_eq!(5, page.total_count);
        assert_eq!(1, page.current_page);

        let beyond = Pagination::from_sorted(records, &PageRequest::new(9, 2, "title", true));
        assert!(beyond.items.is_empty());
        assert_eq!(5, beyond.total_count);
        assert_eq!(3, beyond.total_pages);
    }

    #[tokio::test]
    async fn test_should_map_page_items() {
        let page = Pagination::new(vec![1, 2], 4, 0, 2).map(|n| n * 10);
        assert_eq!(vec![10, 20], page.items);
        assert_eq!(4, page.total_count);
        assert_eq!(2, page.total_pages);
    }
}
