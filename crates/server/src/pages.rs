//! Server-rendered HTML pages over the same operations as the JSON API.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use minijinja::{context, Environment, HtmlEscape};
use serde::{Deserialize, Serialize};
use server_api::{
    bulk_delete, check_delete, columns::parse_column_list, create_record, dashboard_summary,
    delete_record, export_records, get_record, launch_quick_action, lookup_entity,
    render::{
        delete_view, load_form, parse_form, table_view, view_record, FormMode, FormView,
    },
    toggle_column, update_record,
};
use shared::{
    domain::{ExportFormat, RecordId},
    error::{ApiError, ErrorCode},
    protocol::{DeleteOutcome, QuickAction, ServerEvent},
    record::FieldMap,
};
use tracing::warn;
use url::form_urlencoded;

use crate::{app_state::AppState, download, status_for};

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("macros.html", include_str!("../templates/macros.html")),
    ("dashboard.html", include_str!("../templates/dashboard.html")),
    ("list.html", include_str!("../templates/list.html")),
    ("form.html", include_str!("../templates/form.html")),
    ("detail.html", include_str!("../templates/detail.html")),
    ("delete.html", include_str!("../templates/delete.html")),
    ("bulk.html", include_str!("../templates/bulk.html")),
];

pub(crate) fn templates() -> anyhow::Result<Environment<'static>> {
    let mut env = Environment::new();
    for (name, source) in TEMPLATES {
        env.add_template(name, source)?;
    }
    Ok(env)
}

pub(crate) fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(dashboard_page))
        .route("/dashboard/:entity", get(list_page))
        .route("/dashboard/:entity/new", get(new_page).post(create_page))
        .route("/dashboard/:entity/bulk", post(bulk_page))
        .route("/dashboard/:entity/:id", get(detail_page))
        .route("/dashboard/:entity/:id/edit", get(edit_page).post(update_page))
        .route(
            "/dashboard/:entity/:id/delete",
            get(delete_page).post(delete_submit),
        )
}

#[derive(Debug)]
pub(crate) struct PageError {
    status: StatusCode,
    message: String,
}

impl From<ApiError> for PageError {
    fn from(error: ApiError) -> Self {
        Self {
            status: status_for(error.code),
            message: error.message,
        }
    }
}

impl From<minijinja::Error> for PageError {
    fn from(error: minijinja::Error) -> Self {
        warn!(%error, "template rendering failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "page could not be rendered".to_string(),
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let body = format!(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{status}</title></head>\
             <body><h1>{status}</h1><p>{message}</p><p><a href=\"/\">Back to dashboard</a></p></body></html>",
            status = self.status,
            message = HtmlEscape(&self.message),
        );
        (self.status, Html(body)).into_response()
    }
}

type PageResult = Result<Response, PageError>;

/// Renders `name` with the navigation sidebar added to `ctx`.
async fn render(state: &AppState, name: &str, ctx: minijinja::Value) -> Result<Html<String>, PageError> {
    let nav = dashboard_summary(&state.api).await?.sections;
    let html = state
        .templates
        .get_template(name)?
        .render(context! { nav => nav, ..ctx })?;
    Ok(Html(html))
}

fn form_pairs(body: &[u8]) -> Vec<(String, String)> {
    form_urlencoded::parse(body).into_owned().collect()
}

fn list_href(entity: &str, search: &str, columns: &[String]) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    if !search.is_empty() {
        query.append_pair("search", search);
    }
    if !columns.is_empty() {
        query.append_pair("columns", &columns.join(","));
    }
    let query = query.finish();
    if query.is_empty() {
        format!("/dashboard/{entity}")
    } else {
        format!("/dashboard/{entity}?{query}")
    }
}

fn record_href(entity: &str, id: &str) -> String {
    let id: String = form_urlencoded::byte_serialize(id.as_bytes()).collect();
    format!("/dashboard/{entity}/{id}")
}

#[derive(Debug, Serialize)]
struct QuickLink {
    label: &'static str,
    description: &'static str,
    icon: shared::protocol::ActionIcon,
    href: String,
}

fn quick_links(entity: &str, source: Option<&str>, actions: &[QuickAction]) -> Vec<QuickLink> {
    let Some(source) = source else {
        return Vec::new();
    };
    actions
        .iter()
        .map(|action| {
            let query = form_urlencoded::Serializer::new(String::new())
                .append_pair("from", entity)
                .append_pair("record", source)
                .finish();
            QuickLink {
                label: action.label,
                description: action.description,
                icon: action.icon,
                href: format!("/dashboard/{}/new?{query}", action.target_entity),
            }
        })
        .collect()
}

#[derive(Debug, Serialize)]
struct ToggleLink {
    label: &'static str,
    visible: bool,
    href: String,
}

async fn dashboard_page(State(state): State<Arc<AppState>>) -> PageResult {
    let summary = dashboard_summary(&state.api).await?;
    let html = render(&state, "dashboard.html", context! { cards => summary.cards }).await?;
    Ok(html.into_response())
}

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    #[serde(default)]
    search: String,
    #[serde(default)]
    columns: String,
}

async fn list_page(
    State(state): State<Arc<AppState>>,
    Path(entity): Path<String>,
    Query(params): Query<ListParams>,
) -> PageResult {
    let requested = parse_column_list(&params.columns);
    let view = table_view(&state.api, &entity, &params.search, &requested).await?;
    let visible: Vec<String> = view.columns.iter().map(|c| c.name.to_string()).collect();
    let toggles: Vec<ToggleLink> = view
        .toggles
        .iter()
        .map(|toggle| ToggleLink {
            label: toggle.label,
            visible: toggle.visible,
            href: list_href(view.entity, &params.search, &toggle_column(&visible, toggle.name)),
        })
        .collect();
    let rows: Vec<_> = view
        .rows
        .iter()
        .map(|row| {
            context! {
                id => row.id,
                name => row.name,
                cells => row.cells,
                href => record_href(view.entity, &row.id),
                quick_links => quick_links(view.entity, Some(row.id.as_str()), &view.quick_actions),
            }
        })
        .collect();
    let links = quick_links(
        view.entity,
        view.quick_action_source.as_deref(),
        &view.quick_actions,
    );
    let html = render(
        &state,
        "list.html",
        context! {
            view => view,
            rows => rows,
            toggles => toggles,
            quick_links => links,
            columns_param => visible.join(","),
        },
    )
    .await?;
    Ok(html.into_response())
}

#[derive(Debug, Default, Deserialize)]
struct NewParams {
    from: Option<String>,
    record: Option<String>,
}

async fn new_page(
    State(state): State<Arc<AppState>>,
    Path(entity): Path<String>,
    Query(params): Query<NewParams>,
) -> PageResult {
    let prefill = match (params.from.as_deref(), params.record.as_deref()) {
        (Some(from), Some(record)) => {
            launch_quick_action(&state.api, from, record, &entity)
                .await?
                .prefill
        }
        _ => FieldMap::new(),
    };
    let form = load_form(&state.api, &entity, &prefill, FormMode::Create, None).await?;
    form_page(&state, StatusCode::OK, form).await
}

async fn form_page(state: &AppState, status: StatusCode, form: FormView) -> PageResult {
    let cancel = match &form.record_id {
        Some(id) => record_href(form.entity, id),
        None => format!("/dashboard/{}", form.entity),
    };
    let action = match &form.record_id {
        Some(id) => format!("{}/edit", record_href(form.entity, id)),
        None => format!("/dashboard/{}/new", form.entity),
    };
    let html = render(
        state,
        "form.html",
        context! { form => form, action => action, cancel => cancel },
    )
    .await?;
    Ok((status, html).into_response())
}

async fn create_page(
    State(state): State<Arc<AppState>>,
    Path(entity): Path<String>,
    body: Bytes,
) -> PageResult {
    let meta = lookup_entity(&entity)?;
    let submitted = parse_form(meta, &form_pairs(&body));
    match create_record(&state.api, meta.name, submitted.clone()).await {
        Ok(record) => {
            let href = record_href(meta.name, record.id.as_str());
            state.publish(ServerEvent::RecordCreated {
                entity: meta.name.to_string(),
                record,
            });
            Ok(Redirect::to(&href).into_response())
        }
        Err(error) if error.code == ErrorCode::Validation => {
            let form = load_form(&state.api, meta.name, &submitted, FormMode::Create, None)
                .await?
                .with_error(&error);
            form_page(&state, StatusCode::UNPROCESSABLE_ENTITY, form).await
        }
        Err(error) => Err(error.into()),
    }
}

async fn detail_page(
    State(state): State<Arc<AppState>>,
    Path((entity, id)): Path<(String, String)>,
) -> PageResult {
    let view = view_record(&state.api, &entity, &id).await?;
    let links = quick_links(view.entity, Some(view.record_id.as_str()), &view.quick_actions);
    let href = record_href(view.entity, &view.record_id);
    let html = render(
        &state,
        "detail.html",
        context! { view => view, quick_links => links, href => href },
    )
    .await?;
    Ok(html.into_response())
}

async fn edit_page(
    State(state): State<Arc<AppState>>,
    Path((entity, id)): Path<(String, String)>,
) -> PageResult {
    let record = get_record(&state.api, &entity, &id).await?;
    let form = load_form(
        &state.api,
        &entity,
        &record.fields,
        FormMode::Edit,
        Some(record.id.to_string()),
    )
    .await?;
    form_page(&state, StatusCode::OK, form).await
}

async fn update_page(
    State(state): State<Arc<AppState>>,
    Path((entity, id)): Path<(String, String)>,
    body: Bytes,
) -> PageResult {
    let meta = lookup_entity(&entity)?;
    let patch = parse_form(meta, &form_pairs(&body));
    match update_record(&state.api, meta.name, &id, patch.clone()).await {
        Ok(record) => {
            let href = record_href(meta.name, record.id.as_str());
            state.publish(ServerEvent::RecordUpdated {
                entity: meta.name.to_string(),
                record,
            });
            Ok(Redirect::to(&href).into_response())
        }
        Err(error) if error.code == ErrorCode::Validation => {
            let mut values = get_record(&state.api, meta.name, &id).await?.fields;
            values.extend(patch);
            let form = load_form(&state.api, meta.name, &values, FormMode::Edit, Some(id))
                .await?
                .with_error(&error);
            form_page(&state, StatusCode::UNPROCESSABLE_ENTITY, form).await
        }
        Err(error) => Err(error.into()),
    }
}

async fn delete_page(
    State(state): State<Arc<AppState>>,
    Path((entity, id)): Path<(String, String)>,
) -> PageResult {
    let check = check_delete(&state.api, &entity, &id).await?;
    let html = render(&state, "delete.html", context! { view => delete_view(&check) }).await?;
    Ok(html.into_response())
}

async fn delete_submit(
    State(state): State<Arc<AppState>>,
    Path((entity, id)): Path<(String, String)>,
) -> PageResult {
    let meta = lookup_entity(&entity)?;
    match delete_record(&state.api, meta.name, &id).await? {
        DeleteOutcome::Deleted { id, .. } => {
            state.publish(ServerEvent::RecordDeleted {
                entity: meta.name.to_string(),
                id,
            });
            Ok(Redirect::to(&format!("/dashboard/{}", meta.name)).into_response())
        }
        DeleteOutcome::Blocked { check } => {
            let html =
                render(&state, "delete.html", context! { view => delete_view(&check) }).await?;
            Ok((status_for(ErrorCode::Conflict), html).into_response())
        }
    }
}

/// Bulk actions over the rows checked on a list page: `action=delete` or
/// `action=export` (with `format` and the visible `columns`).
async fn bulk_page(
    State(state): State<Arc<AppState>>,
    Path(entity): Path<String>,
    body: Bytes,
) -> PageResult {
    let meta = lookup_entity(&entity)?;
    let pairs = form_pairs(&body);
    let value_of = |name: &str| {
        pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .unwrap_or_default()
    };
    let ids: Vec<RecordId> = pairs
        .iter()
        .filter(|(key, _)| key == "ids")
        .map(|(_, value)| RecordId::from(value.as_str()))
        .collect();

    match value_of("action") {
        "export" => {
            let format = match value_of("format") {
                "json" => ExportFormat::Json,
                _ => ExportFormat::Csv,
            };
            let columns = parse_column_list(value_of("columns"));
            let export = export_records(&state.api, meta.name, &ids, &columns, format).await?;
            Ok(download(export))
        }
        "delete" => {
            if ids.is_empty() {
                return Ok(Redirect::to(&format!("/dashboard/{}", meta.name)).into_response());
            }
            let outcome = bulk_delete(&state.api, meta.name, &ids).await?;
            if !outcome.deleted.is_empty() {
                state.publish(ServerEvent::RecordsDeleted {
                    entity: meta.name.to_string(),
                    ids: outcome.deleted.clone(),
                });
            }
            let blocked: Vec<_> = outcome.blocked.iter().map(delete_view).collect();
            let html = render(
                &state,
                "bulk.html",
                context! {
                    entity => meta.name,
                    label => meta.label,
                    deleted => outcome.deleted,
                    blocked => blocked,
                },
            )
            .await?;
            Ok(html.into_response())
        }
        other => Err(ApiError::new(
            ErrorCode::Validation,
            format!("unknown bulk action '{other}'"),
        )
        .into()),
    }
}
