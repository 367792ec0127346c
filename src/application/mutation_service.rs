// Mutation service - Pass-through writes with audit log and change events
use crate::application::change_feed::{ChangeEvent, ChangeKind, ChangeNotifier};
use crate::application::collection_repository::{CollectionRepository, RepositoryError};
use crate::domain::records::Collection;
use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkFailure {
    pub id: String,
    pub reason: String,
}

/// Result of a bulk action, with the notification text shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkOutcome {
    pub succeeded: Vec<String>,
    pub failed: Vec<BulkFailure>,
    pub message: String,
}

fn record_id(value: &Value) -> Option<String> {
    match value.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn audit(collection: Collection, action: &str, id: &str) {
    tracing::info!(
        target: "audit",
        collection = %collection,
        action,
        id,
        "{} {} {}",
        action,
        collection,
        id
    );
}

#[derive(Clone)]
pub struct MutationService {
    repository: Arc<dyn CollectionRepository>,
    notifier: ChangeNotifier,
}

impl MutationService {
    pub fn new(repository: Arc<dyn CollectionRepository>, notifier: ChangeNotifier) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    pub async fn create(
        &self,
        collection: Collection,
        record: Value,
    ) -> Result<Value, RepositoryError> {
        let created = self.repository.create(collection, record).await?;
        let id = record_id(&created);
        match &id {
            Some(id) => audit(collection, "create", id),
            None => tracing::warn!(
                target: "audit",
                collection = %collection,
                "create {} returned a record without an id",
                collection
            ),
        }
        self.notifier.publish(ChangeEvent {
            collection: Some(collection),
            kind: ChangeKind::Created,
            id,
        });
        Ok(created)
    }

    pub async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<Value, RepositoryError> {
        let updated = self.repository.update(collection, id, patch).await?;
        audit(collection, "update", id);
        self.notifier
            .publish(ChangeEvent::record(collection, ChangeKind::Updated, id));
        Ok(updated)
    }

    pub async fn delete(&self, collection: Collection, id: &str) -> Result<(), RepositoryError> {
        self.repository.delete(collection, id).await?;
        audit(collection, "delete", id);
        self.notifier
            .publish(ChangeEvent::record(collection, ChangeKind::Deleted, id));
        Ok(())
    }

    /// Apply one patch to many records concurrently. Individual failures
    /// are reported, not propagated. Duplicate ids are applied once.
    pub async fn bulk_update(
        &self,
        collection: Collection,
        ids: Vec<String>,
        patch: Value,
    ) -> BulkOutcome {
        let mut seen = HashSet::new();
        let ids: Vec<String> = ids.into_iter().filter(|id| seen.insert(id.clone())).collect();

        if ids.is_empty() {
            return BulkOutcome {
                succeeded: Vec::new(),
                failed: Vec::new(),
                message: format!("No {} selected", collection.noun()),
            };
        }

        let results = join_all(ids.iter().map(|id| {
            let patch = patch.clone();
            async move { (id.clone(), self.update(collection, id, patch).await) }
        }))
        .await;

        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        for (id, result) in results {
            match result {
                Ok(_) => succeeded.push(id),
                Err(e) => {
                    tracing::warn!("Bulk update of {} {} failed: {}", collection, id, e);
                    failed.push(BulkFailure {
                        id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let message = format!(
            "Updated {} of {} {}",
            succeeded.len(),
            ids.len(),
            collection.noun()
        );
        tracing::info!(target: "audit", collection = %collection, "{}", message);

        BulkOutcome {
            succeeded,
            failed,
            message,
        }
    }
}
