// HTTP request handlers
use crate::application::mutation_service::BulkOutcome;
use crate::domain::dashboard::DashboardOverview;
use crate::domain::records::Collection;
use crate::infrastructure::config::MAX_WINDOW_DAYS;
use crate::presentation::app_state::AppState;
use crate::presentation::error::{AppError, outcome_response};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use chrono::Utc;
use futures::stream::Stream;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

type Params = Query<HashMap<String, String>>;

#[derive(Deserialize)]
pub struct WindowQuery {
    pub window_days: Option<i64>,
}

#[derive(Deserialize)]
pub struct BulkUpdateRequest {
    pub ids: Vec<String>,
    pub patch: Value,
}

fn parse_collection(raw: &str) -> Result<Collection, AppError> {
    raw.parse()
        .map_err(|_| AppError::UnknownCollection(raw.to_string()))
}

fn require_object(value: &Value, what: &str) -> Result<(), AppError> {
    if value.is_object() {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("{} must be a JSON object", what)))
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Overview of every collection; each section carries its own outcome
pub async fn dashboard_overview(State(state): State<Arc<AppState>>) -> Json<DashboardOverview> {
    Json(state.dashboard_service.overview(Utc::now()).await)
}

/// Server-sent overview updates, refreshed after each burst of changes
pub async fn stream_dashboard(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let mut rx = state.streaming_service.stream_overview();

    let stream = async_stream::stream! {
        while let Some(overview) = rx.recv().await {
            yield Event::default().event("overview").json_data(&overview);
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

pub async fn list_users(Query(params): Params, State(state): State<Arc<AppState>>) -> Response {
    outcome_response(state.dashboard_service.users_page(&params).await)
}

/// Devices, inventory, printers and network equipment are all this list
/// with a `type` filter.
pub async fn list_assets(Query(params): Params, State(state): State<Arc<AppState>>) -> Response {
    outcome_response(state.dashboard_service.assets_page(&params, Utc::now()).await)
}

pub async fn list_incidents(Query(params): Params, State(state): State<Arc<AppState>>) -> Response {
    outcome_response(state.dashboard_service.incidents_page(&params, Utc::now()).await)
}

pub async fn list_requests(Query(params): Params, State(state): State<Arc<AppState>>) -> Response {
    outcome_response(state.dashboard_service.requests_page(&params, Utc::now()).await)
}

pub async fn list_airtime(Query(params): Params, State(state): State<Arc<AppState>>) -> Response {
    outcome_response(state.dashboard_service.airtime_page(&params, Utc::now()).await)
}

pub async fn warranty_report(
    Query(query): Query<WindowQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    if let Some(days) = query.window_days {
        if !(1..=MAX_WINDOW_DAYS).contains(&days) {
            return Err(AppError::BadRequest(format!(
                "window_days must be between 1 and {}",
                MAX_WINDOW_DAYS
            )));
        }
    }

    let report = state
        .dashboard_service
        .warranty_report(query.window_days, Utc::now())
        .await;
    Ok(outcome_response(report))
}

pub async fn departments(State(state): State<Arc<AppState>>) -> Response {
    outcome_response(state.dashboard_service.departments().await)
}

pub async fn technicians(State(state): State<Arc<AppState>>) -> Response {
    outcome_response(state.dashboard_service.technicians().await)
}

pub async fn create_record(
    Path(collection): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(record): Json<Value>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let collection = parse_collection(&collection)?;
    require_object(&record, "record")?;

    let created = state.mutation_service.create(collection, record).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_record(
    Path((collection, id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    Json(patch): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let collection = parse_collection(&collection)?;
    require_object(&patch, "patch")?;

    let updated = state.mutation_service.update(collection, &id, patch).await?;
    Ok(Json(updated))
}

pub async fn delete_record(
    Path((collection, id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, AppError> {
    let collection = parse_collection(&collection)?;
    state.mutation_service.delete(collection, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn bulk_update(
    Path(collection): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<BulkUpdateRequest>,
) -> Result<Json<BulkOutcome>, AppError> {
    let collection = parse_collection(&collection)?;
    require_object(&request.patch, "patch")?;

    let outcome = state
        .mutation_service
        .bulk_update(collection, request.ids, request.patch)
        .await;
    Ok(Json(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::change_feed::ChangeNotifier;
    use crate::application::dashboard_service::DashboardService;
    use crate::application::mutation_service::MutationService;
    use crate::application::streaming_service::StreamingDashboardService;
    use crate::application::testing::InMemoryRepository;
    use crate::infrastructure::config::WindowSettings;
    use axum::response::IntoResponse;
    use serde_json::json;
    use std::time::Duration;

    fn state(repository: Arc<InMemoryRepository>) -> State<Arc<AppState>> {
        let notifier = ChangeNotifier::new();
        let dashboard_service = DashboardService::new(repository.clone(), WindowSettings::default());
        State(Arc::new(AppState {
            streaming_service: StreamingDashboardService::new(
                dashboard_service.clone(),
                notifier.clone(),
                Duration::from_millis(100),
            ),
            mutation_service: MutationService::new(repository, notifier),
            dashboard_service,
        }))
    }

    #[tokio::test]
    async fn test_failed_list_is_bad_gateway() {
        let repository = Arc::new(InMemoryRepository::new());
        repository.fail(Collection::Incidents);

        let response = list_incidents(Query(HashMap::new()), state(repository)).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_empty_list_is_ok() {
        let repository = Arc::new(InMemoryRepository::new());
        let response = list_requests(Query(HashMap::new()), state(repository)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_warranty_window_is_validated() {
        let repository = Arc::new(InMemoryRepository::new());
        let result = warranty_report(
            Query(WindowQuery {
                window_days: Some(0),
            }),
            state(repository),
        )
        .await;

        assert_eq!(result.unwrap_err().into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_and_delete() {
        let repository = Arc::new(InMemoryRepository::new());
        let state = state(repository.clone());

        let (status, Json(created)) = create_record(
            Path("devices".to_string()),
            state.clone(),
            Json(json!({"name": "Switch", "status": "Available"})),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let id = created["id"].as_str().unwrap().to_string();
        assert!(repository.get(Collection::Assets, &id).is_some());

        let status = delete_record(Path(("assets".to_string(), id.clone())), state.clone())
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let missing = delete_record(Path(("assets".to_string(), id)), state).await;
        assert_eq!(missing.unwrap_err().into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_mutations_reject_bad_input() {
        let repository = Arc::new(InMemoryRepository::new());
        let state = state(repository);

        let unknown = create_record(Path("printers".to_string()), state.clone(), Json(json!({}))).await;
        assert!(matches!(unknown, Err(AppError::UnknownCollection(_))));

        let not_object = update_record(
            Path(("users".to_string(), "1".to_string())),
            state,
            Json(json!(["status", "inactive"])),
        )
        .await;
        assert!(matches!(not_object, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_bulk_update_message() {
        let repository = Arc::new(InMemoryRepository::new());
        repository.seed(
            Collection::Requests,
            vec![
                json!({"id": "r1", "title": "Monitor", "status": "Pending"}),
                json!({"id": "r2", "title": "Headset", "status": "Pending"}),
            ],
        );

        let Json(outcome) = bulk_update(
            Path("requests".to_string()),
            state(repository),
            Json(BulkUpdateRequest {
                ids: vec!["r1".to_string(), "r2".to_string()],
                patch: json!({"status": "Approved"}),
            }),
        )
        .await
        .unwrap();

        assert_eq!(outcome.message, "Updated 2 of 2 requests");
    }
}
