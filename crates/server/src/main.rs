use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{ws::Message, Path, Query, State, WebSocketUpgrade},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use server_api::{
    bulk_delete, check_delete, columns::parse_column_list, create_record, dashboard_summary,
    delete_record, entity_stats, export_records, get_record, launch_quick_action,
    lookup_entity, quick_actions, record_page, update_record, ApiContext, ApiSettings,
};
use shared::{
    domain::UserRef,
    error::{ApiError, ErrorCode},
    metadata::{catalog, EntityMetadata},
    protocol::{
        BulkDeleteOutcome, BulkDeleteRequest, DashboardSummary, DeleteCheck, DeleteOutcome,
        EntityStats, ExportRequest, QuickAction, QuickActionLaunch, RecordPage, ServerEvent,
    },
    record::{FieldMap, Record},
};
use storage::Storage;
use tokio::sync::broadcast;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{info, warn};

mod app_state;
mod config;
mod pages;

use app_state::AppState;
use config::{load_settings, Settings};

type HttpError = (StatusCode, Json<ApiError>);

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    #[serde(default)]
    search: String,
    #[serde(default)]
    columns: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = load_settings();
    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .init();

    let storage = if settings.seed_demo_data {
        Storage::seeded()
    } else {
        Storage::empty()
    };
    storage.health_check().await?;
    let counts = storage.counts().await;
    info!(
        records = counts.values().sum::<usize>(),
        seeded = settings.seed_demo_data,
        "record store ready"
    );

    let addr: SocketAddr = settings.server_bind.parse()?;
    let app = build_router(app_state(storage, &settings)?, settings.max_body_bytes);

    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn app_state(storage: Storage, settings: &Settings) -> anyhow::Result<Arc<AppState>> {
    let api = ApiContext::new(
        storage,
        ApiSettings {
            creation_user_id: UserRef::from(settings.creation_user_id.as_str()),
            default_visible_columns: settings.default_visible_columns,
            ..ApiSettings::default()
        },
    );
    let (events, _) = broadcast::channel(256);
    Ok(Arc::new(AppState {
        api,
        events,
        templates: pages::templates()?,
    }))
}

fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/entities", get(http_list_entities))
        .route("/api/entities/:entity", get(http_entity_metadata))
        .route("/api/dashboard", get(http_dashboard))
        .route(
            "/api/records/:entity",
            get(http_list_records).post(http_create_record),
        )
        .route("/api/records/:entity/stats", get(http_entity_stats))
        .route("/api/records/:entity/bulk-delete", post(http_bulk_delete))
        .route("/api/records/:entity/export", post(http_export))
        .route(
            "/api/records/:entity/:id",
            get(http_get_record)
                .put(http_update_record)
                .delete(http_delete_record),
        )
        .route(
            "/api/records/:entity/:id/dependencies",
            get(http_dependencies),
        )
        .route("/api/quick-actions/:entity", get(http_quick_actions))
        .route(
            "/api/quick-actions/:entity/:id/:target",
            post(http_launch_quick_action),
        )
        .route("/ws", get(ws_handler))
        .merge(pages::routes())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub(crate) fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reject(error: ApiError) -> HttpError {
    let status = status_for(error.code);
    if status.is_server_error() {
        warn!(message = %error.message, "request failed");
    }
    (status, Json(error))
}

async fn healthz(State(state): State<Arc<AppState>>) -> Result<&'static str, HttpError> {
    state.api.storage.health_check().await.map_err(|e| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiError::new(ErrorCode::Internal, e.to_string())),
        )
    })?;
    Ok("ok")
}

async fn http_list_entities() -> Json<&'static [EntityMetadata]> {
    Json(catalog())
}

async fn http_entity_metadata(
    Path(entity): Path<String>,
) -> Result<Json<&'static EntityMetadata>, HttpError> {
    lookup_entity(&entity).map(Json).map_err(reject)
}

async fn http_dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardSummary>, HttpError> {
    let summary = dashboard_summary(&state.api).await.map_err(reject)?;
    Ok(Json(summary))
}

async fn http_list_records(
    State(state): State<Arc<AppState>>,
    Path(entity): Path<String>,
    Query(q): Query<ListQuery>,
) -> Result<Json<RecordPage>, HttpError> {
    let columns = parse_column_list(&q.columns);
    let page = record_page(&state.api, &entity, &q.search, &columns)
        .await
        .map_err(reject)?;
    Ok(Json(page))
}

async fn http_create_record(
    State(state): State<Arc<AppState>>,
    Path(entity): Path<String>,
    Json(input): Json<FieldMap>,
) -> Result<(StatusCode, Json<Record>), HttpError> {
    let record = create_record(&state.api, &entity, input)
        .await
        .map_err(reject)?;
    state.publish(ServerEvent::RecordCreated {
        entity,
        record: record.clone(),
    });
    Ok((StatusCode::CREATED, Json(record)))
}

async fn http_get_record(
    State(state): State<Arc<AppState>>,
    Path((entity, id)): Path<(String, String)>,
) -> Result<Json<Record>, HttpError> {
    let record = get_record(&state.api, &entity, &id).await.map_err(reject)?;
    Ok(Json(record))
}

async fn http_update_record(
    State(state): State<Arc<AppState>>,
    Path((entity, id)): Path<(String, String)>,
    Json(patch): Json<FieldMap>,
) -> Result<Json<Record>, HttpError> {
    let record = update_record(&state.api, &entity, &id, patch)
        .await
        .map_err(reject)?;
    state.publish(ServerEvent::RecordUpdated {
        entity,
        record: record.clone(),
    });
    Ok(Json(record))
}

/// 200 with the outcome when deleted; 409 with the dependency check when
/// other records still point at it.
async fn http_delete_record(
    State(state): State<Arc<AppState>>,
    Path((entity, id)): Path<(String, String)>,
) -> Result<Response, HttpError> {
    let outcome = delete_record(&state.api, &entity, &id)
        .await
        .map_err(reject)?;
    match outcome {
        DeleteOutcome::Deleted { id, name } => {
            state.publish(ServerEvent::RecordDeleted {
                entity,
                id: id.clone(),
            });
            Ok(Json(DeleteOutcome::Deleted { id, name }).into_response())
        }
        DeleteOutcome::Blocked { check } => {
            Ok((status_for(ErrorCode::Conflict), Json(check)).into_response())
        }
    }
}

async fn http_dependencies(
    State(state): State<Arc<AppState>>,
    Path((entity, id)): Path<(String, String)>,
) -> Result<Json<DeleteCheck>, HttpError> {
    let check = check_delete(&state.api, &entity, &id)
        .await
        .map_err(reject)?;
    Ok(Json(check))
}

async fn http_bulk_delete(
    State(state): State<Arc<AppState>>,
    Path(entity): Path<String>,
    Json(req): Json<BulkDeleteRequest>,
) -> Result<Json<BulkDeleteOutcome>, HttpError> {
    let outcome = bulk_delete(&state.api, &entity, &req.ids)
        .await
        .map_err(reject)?;
    if !outcome.deleted.is_empty() {
        state.publish(ServerEvent::RecordsDeleted {
            entity,
            ids: outcome.deleted.clone(),
        });
    }
    Ok(Json(outcome))
}

async fn http_export(
    State(state): State<Arc<AppState>>,
    Path(entity): Path<String>,
    Json(req): Json<ExportRequest>,
) -> Result<Response, HttpError> {
    let export = export_records(&state.api, &entity, &req.ids, &req.columns, req.format)
        .await
        .map_err(reject)?;
    Ok(download(export))
}

pub(crate) fn download(export: server_api::Export) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(export.format.content_type()),
    );
    if let Ok(value) =
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", export.file_name))
    {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    (StatusCode::OK, headers, export.body).into_response()
}

async fn http_entity_stats(
    State(state): State<Arc<AppState>>,
    Path(entity): Path<String>,
) -> Result<Json<EntityStats>, HttpError> {
    let stats = entity_stats(&state.api, &entity).await.map_err(reject)?;
    Ok(Json(stats))
}

async fn http_quick_actions(
    Path(entity): Path<String>,
) -> Result<Json<&'static [QuickAction]>, HttpError> {
    let meta = lookup_entity(&entity).map_err(reject)?;
    Ok(Json(quick_actions(meta.name)))
}

async fn http_launch_quick_action(
    State(state): State<Arc<AppState>>,
    Path((entity, id, target)): Path<(String, String, String)>,
) -> Result<Json<QuickActionLaunch>, HttpError> {
    let launch = launch_quick_action(&state.api, &entity, &id, &target)
        .await
        .map_err(reject)?;
    Ok(Json(launch))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| ws_connection(state, socket))
}

/// Text frame carrying one change event as JSON.
fn event_message(event: &ServerEvent) -> Option<Message> {
    match serde_json::to_string(event) {
        Ok(text) => Some(Message::Text(text)),
        Err(error) => {
            warn!(%error, "change event could not be encoded");
            None
        }
    }
}

async fn ws_connection(state: Arc<AppState>, socket: axum::extract::ws::WebSocket) {
    use futures::{SinkExt, StreamExt};

    let (mut sender, mut receiver) = socket.split();
    let mut events_rx = state.events.subscribe();

    let send_task = tokio::spawn(async move {
        loop {
            let event = match events_rx.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "websocket subscriber lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };
            let Some(message) = event_message(&event) else {
                continue;
            };
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(_msg)) = receiver.next().await {}

    send_task.abort();
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
