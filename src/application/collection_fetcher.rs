// Collection fetcher - Typed loading of whole collections
use crate::application::collection_repository::CollectionRepository;
use crate::domain::outcome::Outcome;
use crate::domain::records::{Collection, Record};
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct CollectionFetcher {
    repository: Arc<dyn CollectionRepository>,
}

impl CollectionFetcher {
    pub fn new(repository: Arc<dyn CollectionRepository>) -> Self {
        Self { repository }
    }

    /// Load a collection. Records that fail to decode are skipped and
    /// logged; if none of a non-empty payload decodes, the fetch counts
    /// as failed rather than empty.
    pub async fn fetch<T: Record>(&self) -> Outcome<Vec<T>> {
        let collection = T::COLLECTION;
        match self.repository.fetch_all(collection).await {
            Ok(values) => {
                let received = values.len();
                let records = decode_records::<T>(collection, values);
                if received > 0 && records.is_empty() {
                    return Outcome::failed(format!(
                        "none of the {} {} records could be decoded",
                        received,
                        collection.noun()
                    ));
                }
                tracing::debug!("Fetched {} of {} {} records", records.len(), received, collection);
                Outcome::from_records(records)
            }
            Err(e) => {
                tracing::error!("Error fetching {}: {}", collection, e);
                Outcome::failed(e.to_string())
            }
        }
    }
}

fn decode_records<T: Record>(collection: Collection, values: Vec<Value>) -> Vec<T> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<T>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping malformed {} record at index {}: {}", collection, index, e);
                None
            }
        })
        .collect()
}
