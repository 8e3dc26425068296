use std::env;
use serde::{Deserialize, Serialize};

// Identifiable defines common traits that can be shared by persistent objects
pub trait Identifiable: Sync + Send {
    fn id(&self) -> i64;
}

pub const DEFAULT_TABLE_NAME: &str = "books";
pub const DEFAULT_LOCAL_ENDPOINT: &str = "http://localhost:8000";

// Configuration abstracts config options for the catalog
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Configuration {
    pub table_name: String,
    // endpoint of DynamoDB local, only used by RepositoryStore::LocalDynamoDB
    pub local_endpoint: String,
}

impl Configuration {
    pub fn new(table_name: &str) -> Self {
        Configuration {
            table_name: table_name.to_string(),
            local_endpoint: DEFAULT_LOCAL_ENDPOINT.to_string(),
        }
    }

    // Reads CATALOG_TABLE_NAME and CATALOG_DYNAMODB_ENDPOINT, falling back to defaults.
    pub fn from_env() -> Self {
        Configuration {
            table_name: env::var("CATALOG_TABLE_NAME").unwrap_or_else(|_| DEFAULT_TABLE_NAME.to_string()),
            local_endpoint: env::var("CATALOG_DYNAMODB_ENDPOINT").unwrap_or_else(|_| DEFAULT_LOCAL_ENDPOINT.to_string()),
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration::new(DEFAULT_TABLE_NAME)
    }
}
