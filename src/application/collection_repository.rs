// Repository trait for the external CRUD data API
use crate::domain::records::Collection;
use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RepositoryError {
    #[error("data API unreachable: {0}")]
    Transport(String),

    #[error("data API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("data API returned an unexpected payload: {0}")]
    Malformed(String),

    #[error("{collection} record {id} not found")]
    NotFound { collection: Collection, id: String },
}

/// Raw access to the data API. Records travel as JSON; typed decoding
/// happens in the collection fetcher.
#[async_trait]
pub trait CollectionRepository: Send + Sync {
    /// Every record in a collection
    async fn fetch_all(&self, collection: Collection) -> Result<Vec<Value>, RepositoryError>;

    /// Create a record, returning it as stored
    async fn create(&self, collection: Collection, record: Value) -> Result<Value, RepositoryError>;

    /// Apply a partial update to one record
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<Value, RepositoryError>;

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), RepositoryError>;
}
