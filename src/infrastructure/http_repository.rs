// REST data API repository implementation
use crate::application::collection_repository::{CollectionRepository, RepositoryError};
use crate::domain::records::Collection;
use crate::infrastructure::config::ApiSettings;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpRepository {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpRepository {
    pub fn new(settings: &ApiSettings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            token: settings.token.clone().filter(|t| !t.is_empty()),
        })
    }

    fn collection_url(&self, collection: Collection) -> String {
        format!("{}/{}", self.base_url, collection.path())
    }

    fn record_url(&self, collection: Collection, id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            collection.path(),
            urlencoding::encode(id)
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header("Accept", "application/json");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Option<Value>, RepositoryError> {
        let response = builder
            .send()
            .await
            .map_err(|e| RepositoryError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RepositoryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RepositoryError::Transport(e.to_string()))?;
        if bytes.is_empty() {
            return Ok(None);
        }

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| RepositoryError::Malformed(e.to_string()))
    }
}

/// Collections come back either as a bare array or wrapped in `{"data": [...]}`.
fn records_from_body(body: Value) -> Result<Vec<Value>, RepositoryError> {
    match body {
        Value::Array(records) => Ok(records),
        Value::Object(mut envelope) => match envelope.remove("data") {
            Some(Value::Array(records)) => Ok(records),
            _ => Err(RepositoryError::Malformed(
                "expected an array of records".to_string(),
            )),
        },
        _ => Err(RepositoryError::Malformed(
            "expected an array of records".to_string(),
        )),
    }
}

/// Single records may also be wrapped, or returned as a one-element array.
fn record_from_body(body: Value) -> Result<Value, RepositoryError> {
    match body {
        Value::Array(mut records) if records.len() == 1 => Ok(records.remove(0)),
        Value::Object(mut envelope) if envelope.contains_key("data") => {
            record_from_body(envelope.remove("data").unwrap_or(Value::Null))
        }
        record @ Value::Object(_) => Ok(record),
        _ => Err(RepositoryError::Malformed("expected a single record".to_string())),
    }
}

fn not_found_or(
    error: RepositoryError,
    collection: Collection,
    id: &str,
) -> RepositoryError {
    match error {
        RepositoryError::Status { status, .. } if status == StatusCode::NOT_FOUND.as_u16() => {
            RepositoryError::NotFound {
                collection,
                id: id.to_string(),
            }
        }
        other => other,
    }
}

#[async_trait]
impl CollectionRepository for HttpRepository {
    async fn fetch_all(&self, collection: Collection) -> Result<Vec<Value>, RepositoryError> {
        let url = self.collection_url(collection);
        tracing::debug!("Fetching {}", url);

        match self.execute(self.request(Method::GET, &url)).await? {
            Some(body) => records_from_body(body),
            None => Ok(Vec::new()),
        }
    }

    async fn create(&self, collection: Collection, record: Value) -> Result<Value, RepositoryError> {
        let url = self.collection_url(collection);
        let body = self
            .execute(self.request(Method::POST, &url).json(&record))
            .await?;

        match body {
            Some(body) => record_from_body(body),
            // Some APIs answer 201 with no body; echo what was sent
            None => Ok(record),
        }
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<Value, RepositoryError> {
        let url = self.record_url(collection, id);
        let body = self
            .execute(self.request(Method::PATCH, &url).json(&patch))
            .await
            .map_err(|e| not_found_or(e, collection, id))?;

        match body {
            Some(body) => record_from_body(body),
            None => Ok(patch),
        }
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), RepositoryError> {
        let url = self.record_url(collection, id);
        self.execute(self.request(Method::DELETE, &url))
            .await
            .map_err(|e| not_found_or(e, collection, id))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn repository(base_url: &str) -> HttpRepository {
        HttpRepository::new(&ApiSettings {
            base_url: base_url.to_string(),
            token: Some(String::new()),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_urls() {
        let repo = repository("http://api.local/rest/v1/");

        assert_eq!(repo.collection_url(Collection::AirtimeBundles), "http://api.local/rest/v1/airtime_bundles");
        assert_eq!(repo.record_url(Collection::Assets, "a 1/2"), "http://api.local/rest/v1/assets/a%201%2F2");
        assert_eq!(repo.token, None);
    }

    #[test]
    fn test_records_from_body() {
        assert_eq!(records_from_body(json!([{"id": 1}])).unwrap().len(), 1);
        assert_eq!(records_from_body(json!({"data": [{"id": 1}, {"id": 2}]})).unwrap().len(), 2);
        assert!(matches!(
            records_from_body(json!({"error": "nope"})),
            Err(RepositoryError::Malformed(_))
        ));
    }

    #[test]
    fn test_record_from_body() {
        assert_eq!(record_from_body(json!([{"id": 1}])).unwrap(), json!({"id": 1}));
        assert_eq!(record_from_body(json!({"data": {"id": 2}})).unwrap(), json!({"id": 2}));
        assert_eq!(record_from_body(json!({"id": 3})).unwrap(), json!({"id": 3}));
        assert!(record_from_body(json!([])).is_err());
    }

    #[test]
    fn test_not_found_mapping() {
        let mapped = not_found_or(
            RepositoryError::Status { status: 404, body: String::new() },
            Collection::Users,
            "7",
        );
        assert_eq!(
            mapped,
            RepositoryError::NotFound { collection: Collection::Users, id: "7".to_string() }
        );

        let passthrough = RepositoryError::Status { status: 500, body: "boom".to_string() };
        assert_eq!(not_found_or(passthrough.clone(), Collection::Users, "7"), passthrough);
    }

    #[tokio::test]
    async fn test_unreachable_api_is_a_transport_error() {
        // Port 9 (discard) on localhost is closed in test environments
        let repo = repository("http://127.0.0.1:9");
        let result = repo.fetch_all(Collection::Users).await;
        assert!(matches!(result, Err(RepositoryError::Transport(_))));
    }
}
