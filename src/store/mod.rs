pub mod handle;
pub mod memory;
pub mod supabase;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

pub use handle::{StoreBackend, StoreHandle};
pub use memory::MemoryStore;
pub use supabase::{PostgrestConfig, PostgrestStore};

/// A stored record. Every document returned by a store carries a string `id`.
pub type Document = Map<String, Value>;

pub const ID_FIELD: &str = "id";
pub const CREATED_AT_FIELD: &str = "createdAt";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("malformed store response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("store returned no rows for {0}")]
    NoRows(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals the value exactly.
    Eq(String, Value),
    /// Field equals the value, or is absent or null.
    EqOrMissing(String, Value),
    /// Field is a list containing the string.
    Contains(String, String),
    /// Field is a timestamp within `[start, end]`, inclusive.
    Between(String, DateTime<Utc>, DateTime<Utc>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions
            .push(Condition::Eq(field.to_string(), value.into()));
        self
    }

    pub fn eq_or_missing(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions
            .push(Condition::EqOrMissing(field.to_string(), value.into()));
        self
    }

    pub fn contains(mut self, field: &str, item: &str) -> Self {
        self.conditions
            .push(Condition::Contains(field.to_string(), item.to_string()));
        self
    }

    pub fn between(mut self, field: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.conditions
            .push(Condition::Between(field.to_string(), start, end));
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    /// Field to sort by, newest first.
    pub sort_desc: Option<String>,
    pub limit: Option<usize>,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>>;

    /// Distinct non-null string values of `field`, ascending.
    async fn distinct(&self, collection: &str, field: &str) -> Result<Vec<String>>;

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>>;

    async fn insert(&self, collection: &str, document: Document) -> Result<Document>;

    /// Applies `patch` to the document and returns the updated document,
    /// or `None` if no document has that id.
    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        patch: Document,
    ) -> Result<Option<Document>>;

    /// Returns `false` if no document has that id.
    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<bool>;

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64>;

    /// Atomically updates the document matching every equality in `key` with
    /// `set`, or creates one from `key` and `set` if none matches.
    async fn upsert(&self, collection: &str, key: &Filter, set: Document) -> Result<Document>;
}
