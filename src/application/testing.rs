// In-memory data API for service tests
use crate::application::collection_repository::{CollectionRepository, RepositoryError};
use crate::domain::records::Collection;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Default)]
pub struct InMemoryRepository {
    records: Mutex<HashMap<Collection, Vec<Value>>>,
    failing: Mutex<HashSet<Collection>>,
    fetches: AtomicUsize,
    next_id: AtomicUsize,
    omit_ids: AtomicBool,
}

fn record_id(value: &Value) -> Option<String> {
    match value.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, collection: Collection, values: Vec<Value>) {
        self.records.lock().unwrap().insert(collection, values);
    }

    /// Make every call against `collection` fail.
    pub fn fail(&self, collection: Collection) {
        self.failing.lock().unwrap().insert(collection);
    }

    /// Answer creates with the stored record minus its id, like APIs that
    /// only echo the submitted fields.
    pub fn omit_created_ids(&self) {
        self.omit_ids.store(true, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn get(&self, collection: Collection, id: &str) -> Option<Value> {
        self.records
            .lock()
            .unwrap()
            .get(&collection)?
            .iter()
            .find(|v| record_id(v).as_deref() == Some(id))
            .cloned()
    }

    fn check(&self, collection: Collection) -> Result<(), RepositoryError> {
        if self.failing.lock().unwrap().contains(&collection) {
            return Err(RepositoryError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CollectionRepository for InMemoryRepository {
    async fn fetch_all(&self, collection: Collection) -> Result<Vec<Value>, RepositoryError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.check(collection)?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(&collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn create(&self, collection: Collection, mut record: Value) -> Result<Value, RepositoryError> {
        self.check(collection)?;
        if record_id(&record).is_none() {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            record["id"] = Value::String(format!("mem-{}", id));
        }
        self.records
            .lock()
            .unwrap()
            .entry(collection)
            .or_default()
            .push(record.clone());
        if self.omit_ids.load(Ordering::SeqCst) {
            if let Some(fields) = record.as_object_mut() {
                fields.remove("id");
            }
        }
        Ok(record)
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<Value, RepositoryError> {
        self.check(collection)?;
        let mut records = self.records.lock().unwrap();
        let existing = records
            .get_mut(&collection)
            .and_then(|values| values.iter_mut().find(|v| record_id(v).as_deref() == Some(id)))
            .ok_or_else(|| RepositoryError::NotFound {
                collection,
                id: id.to_string(),
            })?;

        if let (Some(target), Value::Object(fields)) = (existing.as_object_mut(), patch) {
            for (key, value) in fields {
                target.insert(key, value);
            }
        }
        Ok(existing.clone())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), RepositoryError> {
        self.check(collection)?;
        let mut records = self.records.lock().unwrap();
        let values = records.entry(collection).or_default();
        let before = values.len();
        values.retain(|v| record_id(v).as_deref() != Some(id));
        if values.len() == before {
            return Err(RepositoryError::NotFound {
                collection,
                id: id.to_string(),
            });
        }
        Ok(())
    }
}
