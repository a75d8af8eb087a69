//! HTTP route handlers for the report API.
//!
//! Reports:
//!   GET    /reports                  summaries, newest first (`?loan=` filters)
//!   POST   /reports                  submit a form
//!   GET    /reports/{id}             stored form plus formatted amounts
//!   PUT    /reports/{id}             replace the stored form
//!   DELETE /reports/{id}
//!   GET    /reports/{id}/document    rendered report (`?format=json`)
//!   GET    /preview                  sample report, flagged as a preview
//!
//! Wizard sessions:
//!   POST   /sessions                 open, optionally seeded with a form
//!   GET    /sessions/{id}
//!   DELETE /sessions/{id}            discard
//!   POST   /sessions/{id}/actions    apply reducer actions
//!   POST   /sessions/{id}/next
//!   POST   /sessions/{id}/previous
//!   POST   /sessions/{id}/jump
//!   GET    /sessions/{id}/review     derived totals

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use chrono::{DateTime, Utc};
use loan_core::calculations::DerivedTotals;
use loan_core::models::{FormAggregate, LoanCategory, LoanReport, NewLoanReport, ReportSummary};
use loan_core::report::{JsonRenderer, ReportData, ReportFields, ReportRenderer, TextRenderer};
use loan_core::wizard::{FormAction, validate_all};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::sessions::{SessionView, StepOutcome};
use crate::state::AppState;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/preview", get(preview))
        .route("/reports", get(list_reports).post(create_report))
        .route(
            "/reports/{id}",
            get(get_report).put(update_report).delete(delete_report),
        )
        .route("/reports/{id}/document", get(report_document))
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", get(get_session).delete(discard_session))
        .route("/sessions/{id}/actions", post(dispatch_actions))
        .route("/sessions/{id}/next", post(next_step))
        .route("/sessions/{id}/previous", post(previous_step))
        .route("/sessions/{id}/jump", post(jump_to_step))
        .route("/sessions/{id}/review", get(review_session))
}

async fn health() -> &'static str {
    "ok"
}

// --- Reports ---

#[derive(Debug, Serialize)]
struct CreatedResponse {
    id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportResponse {
    id: i64,
    form: FormAggregate,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    fields: ReportFields,
}

impl From<LoanReport> for ReportResponse {
    fn from(report: LoanReport) -> Self {
        Self {
            fields: ReportFields::from_form(&report.form),
            id: report.id,
            form: report.form,
            created_at: report.created_at,
            updated_at: report.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    loan: Option<LoanCategory>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum DocumentFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Deserialize)]
struct DocumentQuery {
    #[serde(default)]
    format: DocumentFormat,
}

fn check_form(form: &FormAggregate) -> Result<(), ApiError> {
    let errors = validate_all(form);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

fn render(
    data: &ReportData,
    format: DocumentFormat,
) -> Result<Response, ApiError> {
    let renderer: &dyn ReportRenderer = match format {
        DocumentFormat::Text => &TextRenderer,
        DocumentFormat::Json => &JsonRenderer,
    };
    let body = renderer.render(data)?;
    Ok(([(header::CONTENT_TYPE, renderer.content_type())], body).into_response())
}

/// GET /api/reports - summaries of stored reports.
async fn list_reports(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ReportSummary>>, ApiError> {
    let summaries = match query.loan {
        Some(loan) => state
            .repo
            .list_reports(Some(loan))
            .await?
            .iter()
            .map(ReportSummary::of)
            .collect(),
        None => state.repo.list_summaries().await?,
    };
    Ok(Json(summaries))
}

/// POST /api/reports - validate and store a complete form.
async fn create_report(
    State(state): State<AppState>,
    Json(form): Json<FormAggregate>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    check_form(&form)?;
    let report = state.repo.create_report(NewLoanReport::from(form)).await?;
    info!(id = report.id, "report created");
    Ok((StatusCode::CREATED, Json(CreatedResponse { id: report.id })))
}

async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ReportResponse>, ApiError> {
    let report = state
        .repo
        .get_report(id)
        .await
        .map_err(ApiError::for_report(id))?;
    Ok(Json(report.into()))
}

async fn update_report(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(form): Json<FormAggregate>,
) -> Result<Json<ReportResponse>, ApiError> {
    check_form(&form)?;
    let mut report = state
        .repo
        .get_report(id)
        .await
        .map_err(ApiError::for_report(id))?;
    report.form = form;
    state
        .repo
        .update_report(&report)
        .await
        .map_err(ApiError::for_report(id))?;

    let updated = state
        .repo
        .get_report(id)
        .await
        .map_err(ApiError::for_report(id))?;
    info!(id, "report updated");
    Ok(Json(updated.into()))
}

async fn delete_report(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .repo
        .delete_report(id)
        .await
        .map_err(ApiError::for_report(id))?;
    info!(id, "report deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn report_document(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<DocumentQuery>,
) -> Result<Response, ApiError> {
    let report = state
        .repo
        .get_report(id)
        .await
        .map_err(ApiError::for_report(id))?;
    render(&ReportData::from_form(&report.form), query.format)
}

async fn preview(Query(query): Query<DocumentQuery>) -> Result<Response, ApiError> {
    render(&ReportData::preview(), query.format)
}

// --- Wizard sessions ---

#[derive(Debug, Default, Deserialize)]
struct CreateSessionRequest {
    #[serde(default)]
    form: Option<FormAggregate>,
}

#[derive(Debug, Deserialize)]
struct DispatchRequest {
    actions: Vec<FormAction>,
}

#[derive(Debug, Deserialize)]
struct JumpRequest {
    index: usize,
}

fn step_response(outcome: StepOutcome) -> (StatusCode, Json<StepOutcome>) {
    let status = match &outcome {
        StepOutcome::Submitted { .. } => StatusCode::CREATED,
        other if other.is_rejection() => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::OK,
    };
    (status, Json(outcome))
}

async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> (StatusCode, Json<SessionView>) {
    let view = state.sessions.create(request.form).await;
    (StatusCode::CREATED, Json(view))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(state.sessions.get(id).await?))
}

async fn discard_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.sessions.discard(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn dispatch_actions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<DispatchRequest>,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(state.sessions.dispatch(id, request.actions).await?))
}

async fn next_step(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<StepOutcome>), ApiError> {
    let outcome = state.sessions.next(id, state.repo.as_ref()).await?;
    Ok(step_response(outcome))
}

async fn previous_step(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(state.sessions.previous(id).await?))
}

async fn jump_to_step(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<JumpRequest>,
) -> Result<(StatusCode, Json<StepOutcome>), ApiError> {
    let outcome = state.sessions.jump(id, request.index).await?;
    Ok(step_response(outcome))
}

async fn review_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DerivedTotals>, ApiError> {
    Ok(Json(state.sessions.review(id).await?))
}
