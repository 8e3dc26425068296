use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::{AttributeValue, Delete, Put, ReturnValue, TransactWriteItem, Update};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::books::domain::model::BookEntity;
use crate::books::repository::{BOOK_ATTRIBUTES, sort_books};
use crate::core::library::{LibraryError, LibraryResult, PageRequest, Pagination};
use crate::core::repository::{Repository, WriteOp};
use crate::utils::ddb::{add_filter_expr, parse_float_attribute, parse_item, parse_number_attribute, parse_string_attribute};

// row holding the id sequence, never a book
const SEQUENCE_KEY: i64 = 0;
const SCAN_PAGE_SIZE: i32 = 500;
// DynamoDB rejects transactions with more items
const MAX_TRANSACTION_ITEMS: usize = 100;

#[derive(Debug)]
pub struct DDBBookRepository {
    client: Client,
    table_name: String,
}

impl DDBBookRepository {
    pub(crate) fn new(client: Client, table_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
        }
    }

    fn to_transact_item(&self, write: &WriteOp<BookEntity>) -> LibraryResult<TransactWriteItem> {
        let table_name: &str = self.table_name.as_ref();
        let item = match write {
            WriteOp::Add(book) => {
                let val = serde_json::to_value(book)?;
                let put = Put::builder()
                    .table_name(table_name)
                    .set_item(Some(parse_item(val)?))
                    .condition_expression("attribute_not_exists(book_id)")
                    .build();
                TransactWriteItem::builder().put(put).build()
            }
            WriteOp::Update(book) => {
                let update = Update::builder()
                    .table_name(table_name)
                    .key("book_id", book_key(book.id))
                    .update_expression("SET #title = :title, #description = :description, #price = :price")
                    .expression_attribute_names("#title", "title")
                    .expression_attribute_names("#description", "description")
                    .expression_attribute_names("#price", "price")
                    .expression_attribute_values(":title", AttributeValue::S(book.title.to_string()))
                    .expression_attribute_values(":description", AttributeValue::S(book.description.to_string()))
                    .expression_attribute_values(":price", AttributeValue::N(book.price.to_string()))
                    .condition_expression("attribute_exists(book_id)")
                    .build();
                TransactWriteItem::builder().update(update).build()
            }
            WriteOp::Delete(book) => {
                let delete = Delete::builder()
                    .table_name(table_name)
                    .key("book_id", book_key(book.id))
                    .condition_expression("attribute_exists(book_id)")
                    .build();
                TransactWriteItem::builder().delete(delete).build()
            }
        };
        Ok(item)
    }

    // DynamoDB has no ordered scan, so all matching rows are read and sorted here.
    async fn scan_all(&self, predicate: &HashMap<String, String>) -> LibraryResult<Vec<BookEntity>> {
        let table_name: &str = self.table_name.as_ref();
        let mut filter_expr = String::from("book_id > :sequence_key");
        let mut names = HashMap::new();
        let mut values = HashMap::from([(":sequence_key".to_string(), book_key(SEQUENCE_KEY))]);
        for (k, v) in predicate {
            let attr = if k == "id" { "book_id" } else { k.as_str() };
            if !BOOK_ATTRIBUTES.contains(&attr) {
                return Err(LibraryError::invalid_argument(
                    format!("cannot filter books by {}", k).as_str(), Some("predicate".to_string())));
            }
            let ks = add_filter_expr(attr, &mut filter_expr);
            names.insert(format!("#{}", ks), ks.to_string());
            let value = match ks.as_str() {
                "book_id" | "price" => AttributeValue::N(v.to_string()),
                _ => AttributeValue::S(v.to_string()),
            };
            values.insert(format!(":{}", ks), value);
        }

        let mut records = vec![];
        let mut exclusive_start_key: Option<HashMap<String, AttributeValue>> = None;
        loop {
            let mut request = self.client
                .scan()
                .table_name(table_name)
                .consistent_read(true)
                .limit(SCAN_PAGE_SIZE)
                .set_exclusive_start_key(exclusive_start_key.take())
                .filter_expression(filter_expr.as_str());
            for (k, v) in &names {
                request = request.expression_attribute_names(k.as_str(), v.as_str());
            }
            for (k, v) in &values {
                request = request.expression_attribute_values(k.as_str(), v.clone());
            }
            let res = request.send().await?;
            if let Some(items) = res.items() {
                records.extend(items.iter().map(map_to_book));
            }
            match res.last_evaluated_key() {
                Some(key) => exclusive_start_key = Some(key.clone()),
                None => break,
            }
        }
        debug!(table = table_name, count = records.len(), "scanned books");
        Ok(records)
    }
}

#[async_trait]
impl Repository<BookEntity> for DDBBookRepository {
    async fn get(&self, id: i64) -> LibraryResult<Option<BookEntity>> {
        let table_name: &str = self.table_name.as_ref();
        let res = self.client
            .get_item()
            .table_name(table_name)
            .key("book_id", book_key(id))
            .consistent_read(true)
            .send()
            .await?;
        Ok(res.item().filter(|_| id != SEQUENCE_KEY).map(map_to_book))
    }

    async fn exists(&self, id: i64) -> LibraryResult<bool> {
        if id == SEQUENCE_KEY {
            return Ok(false);
        }
        let table_name: &str = self.table_name.as_ref();
        let res = self.client
            .get_item()
            .table_name(table_name)
            .key("book_id", book_key(id))
            .projection_expression("book_id")
            .consistent_read(true)
            .send()
            .await?;
        Ok(res.item().is_some())
    }

    async fn next_id(&self) -> LibraryResult<i64> {
        let table_name: &str = self.table_name.as_ref();
        let res = self.client
            .update_item()
            .table_name(table_name)
            .key("book_id", book_key(SEQUENCE_KEY))
            .update_expression("ADD #sequence :one")
            .expression_attribute_names("#sequence", "sequence")
            .expression_attribute_values(":one", AttributeValue::N("1".to_string()))
            .return_values(ReturnValue::UpdatedNew)
            .send()
            .await?;
        res.attributes()
            .map(|attrs| parse_number_attribute("sequence", attrs))
            .filter(|id| *id > SEQUENCE_KEY)
            .ok_or_else(|| LibraryError::database(
                format!("failed to allocate book id in {}", table_name).as_str(), None, false))
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: &PageRequest) -> LibraryResult<Pagination<BookEntity>> {
        let mut records = self.scan_all(predicate).await?;
        sort_books(&mut records, page)?;
        Ok(Pagination::from_sorted(records, page))
    }

    async fn commit(&self, writes: Vec<WriteOp<BookEntity>>, token: &CancellationToken) -> LibraryResult<usize> {
        let size = writes.len();
        if size > MAX_TRANSACTION_ITEMS {
            return Err(LibraryError::invalid_argument(
                format!("transaction of {} writes exceeds {}", size, MAX_TRANSACTION_ITEMS).as_str(), None));
        }
        let items = writes.iter()
            .map(|w| self.to_transact_item(w))
            .collect::<LibraryResult<Vec<TransactWriteItem>>>()?;
        // cancellation is only honored before the request is sent
        if token.is_cancelled() {
            return Err(LibraryError::cancelled("dynamodb commit cancelled"));
        }
        let _ = self.client
            .transact_write_items()
            .set_transact_items(Some(items))
            .send()
            .await?;
        debug!(table = self.table_name.as_str(), size, "transaction written");
        Ok(size)
    }
}

fn book_key(id: i64) -> AttributeValue {
    AttributeValue::N(id.to_string())
}

fn map_to_book(map: &HashMap<String, AttributeValue>) -> BookEntity {
    BookEntity {
        id: parse_number_attribute("book_id", map),
        title: parse_string_attribute("title", map).unwrap_or_default(),
        description: parse_string_attribute("description", map).unwrap_or_default(),
        price: parse_float_attribute("price", map),
    }
}
