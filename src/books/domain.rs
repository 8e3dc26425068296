use crate::core::library::{LibraryError, LibraryResult};

pub mod model;

// Title must carry at least one non-whitespace character.
pub fn validate_title(title: &str) -> LibraryResult<()> {
    if title.trim().is_empty() {
        return Err(LibraryError::invalid_argument(
            "title cannot be empty or whitespace", Some("title".to_string())));
    }
    Ok(())
}

// Price must be a finite, non-negative number.
pub fn validate_price(price: f64) -> LibraryResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(LibraryError::invalid_argument(
            format!("price must be finite and not negative: {}", price).as_str(), Some("price".to_string())));
    }
    Ok(())
}
