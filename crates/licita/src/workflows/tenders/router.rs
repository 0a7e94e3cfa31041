use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{Datelike, Local, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use super::domain::{optional_date, Tender, TenderDraft, TenderId, TenderStatus};
use super::lifecycle::{LifecycleError, LotPatch};
use super::lists::ListKind;
use super::repository::TenderStore;
use super::service::{DeleteConfirmation, TenderDesk, TenderDeskError};

/// Router builder exposing the tender desk over HTTP.
pub fn tender_router<S>(desk: Arc<TenderDesk<S>>) -> Router
where
    S: TenderStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/tenders",
            get(list_handler::<S>).post(create_handler::<S>),
        )
        .route(
            "/api/v1/tenders/:tender_id",
            get(get_handler::<S>)
                .put(update_handler::<S>)
                .delete(delete_handler::<S>),
        )
        .route(
            "/api/v1/tenders/:tender_id/finalize-dispute",
            post(finalize_handler::<S>),
        )
        .route("/api/v1/tenders/:tender_id/status", put(status_handler::<S>))
        .route(
            "/api/v1/tenders/:tender_id/position",
            put(position_handler::<S>),
        )
        .route("/api/v1/tenders/:tender_id/lots", post(add_lot_handler::<S>))
        .route(
            "/api/v1/tenders/:tender_id/lots/:lot_id",
            put(update_lot_handler::<S>).delete(remove_lot_handler::<S>),
        )
        .route("/api/v1/dashboard", get(dashboard_handler::<S>))
        .route("/api/v1/calendar", get(calendar_handler::<S>))
        .route("/api/v1/lists", get(lists_handler::<S>))
        .route("/api/v1/lists/:kind", post(add_option_handler::<S>))
        .route(
            "/api/v1/lists/:kind/:index",
            axum::routing::delete(remove_option_handler::<S>),
        )
        .with_state(desk)
}

type DeskState<S> = State<Arc<TenderDesk<S>>>;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DeleteParams {
    #[serde(default)]
    pub(crate) confirm: bool,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TodayParams {
    #[serde(default)]
    pub(crate) today: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CalendarParams {
    #[serde(default)]
    pub(crate) year: Option<i32>,
    #[serde(default)]
    pub(crate) month: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusChange {
    pub(crate) status: TenderStatus,
    #[serde(default)]
    pub(crate) fase: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PositionChange {
    pub(crate) posicao: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NewOption {
    pub(crate) value: String,
}

fn error_payload(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

pub(crate) fn desk_error_response(error: TenderDeskError) -> Response {
    let status = match &error {
        TenderDeskError::NotFound(_)
        | TenderDeskError::OptionNotFound { .. }
        | TenderDeskError::Lifecycle(LifecycleError::LotNotFound(_)) => StatusCode::NOT_FOUND,
        TenderDeskError::Conflict(_)
        | TenderDeskError::Lifecycle(LifecycleError::DisputeAlreadyClosed { .. }) => {
            StatusCode::CONFLICT
        }
        TenderDeskError::ConfirmationRequired(_) => StatusCode::PRECONDITION_REQUIRED,
        TenderDeskError::BlankOption(_) => StatusCode::UNPROCESSABLE_ENTITY,
        TenderDeskError::Calendar(_) => StatusCode::BAD_REQUEST,
        TenderDeskError::StatePoisoned | TenderDeskError::Store(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    error_payload(status, error.to_string())
}

fn respond<T: serde::Serialize>(status: StatusCode, result: Result<T, TenderDeskError>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => desk_error_response(error),
    }
}

fn resolve_today(params: &TodayParams) -> Result<NaiveDate, Response> {
    optional_date::parse(params.today.as_deref())
        .map(|date| date.unwrap_or_else(|| Local::now().date_naive()))
        .map_err(|message| error_payload(StatusCode::BAD_REQUEST, message))
}

pub(crate) async fn list_handler<S>(State(desk): DeskState<S>) -> Response
where
    S: TenderStore + 'static,
{
    respond(StatusCode::OK, desk.tenders())
}

pub(crate) async fn create_handler<S>(
    State(desk): DeskState<S>,
    Json(draft): Json<TenderDraft>,
) -> Response
where
    S: TenderStore + 'static,
{
    respond(StatusCode::CREATED, desk.register(draft, Utc::now()))
}

pub(crate) async fn get_handler<S>(
    State(desk): DeskState<S>,
    Path(tender_id): Path<String>,
) -> Response
where
    S: TenderStore + 'static,
{
    respond(StatusCode::OK, desk.get(&TenderId(tender_id)))
}

pub(crate) async fn update_handler<S>(
    State(desk): DeskState<S>,
    Path(tender_id): Path<String>,
    Json(mut tender): Json<Tender>,
) -> Response
where
    S: TenderStore + 'static,
{
    tender.id = TenderId(tender_id);
    respond(StatusCode::OK, desk.upsert_tender(tender))
}

pub(crate) async fn delete_handler<S>(
    State(desk): DeskState<S>,
    Path(tender_id): Path<String>,
    Query(params): Query<DeleteParams>,
) -> Response
where
    S: TenderStore + 'static,
{
    let confirmation = DeleteConfirmation::from(params.confirm);
    respond(
        StatusCode::OK,
        desk.delete_tender(&TenderId(tender_id), confirmation),
    )
}

pub(crate) async fn finalize_handler<S>(
    State(desk): DeskState<S>,
    Path(tender_id): Path<String>,
    Query(params): Query<TodayParams>,
) -> Response
where
    S: TenderStore + 'static,
{
    match resolve_today(&params) {
        Ok(today) => respond(
            StatusCode::OK,
            desk.finalize_dispute(&TenderId(tender_id), today),
        ),
        Err(response) => response,
    }
}

pub(crate) async fn status_handler<S>(
    State(desk): DeskState<S>,
    Path(tender_id): Path<String>,
    Json(change): Json<StatusChange>,
) -> Response
where
    S: TenderStore + 'static,
{
    respond(
        StatusCode::OK,
        desk.set_status(&TenderId(tender_id), change.status, change.fase),
    )
}

pub(crate) async fn position_handler<S>(
    State(desk): DeskState<S>,
    Path(tender_id): Path<String>,
    Json(change): Json<PositionChange>,
) -> Response
where
    S: TenderStore + 'static,
{
    respond(
        StatusCode::OK,
        desk.set_position(&TenderId(tender_id), change.posicao),
    )
}

pub(crate) async fn add_lot_handler<S>(
    State(desk): DeskState<S>,
    Path(tender_id): Path<String>,
) -> Response
where
    S: TenderStore + 'static,
{
    respond(StatusCode::CREATED, desk.add_lot(&TenderId(tender_id)))
}

pub(crate) async fn update_lot_handler<S>(
    State(desk): DeskState<S>,
    Path((tender_id, lot_id)): Path<(String, String)>,
    Json(patch): Json<LotPatch>,
) -> Response
where
    S: TenderStore + 'static,
{
    respond(
        StatusCode::OK,
        desk.update_lot(&TenderId(tender_id), &lot_id, patch),
    )
}

pub(crate) async fn remove_lot_handler<S>(
    State(desk): DeskState<S>,
    Path((tender_id, lot_id)): Path<(String, String)>,
) -> Response
where
    S: TenderStore + 'static,
{
    respond(
        StatusCode::OK,
        desk.remove_lot(&TenderId(tender_id), &lot_id),
    )
}

pub(crate) async fn dashboard_handler<S>(
    State(desk): DeskState<S>,
    Query(params): Query<TodayParams>,
) -> Response
where
    S: TenderStore + 'static,
{
    match resolve_today(&params) {
        Ok(today) => respond(StatusCode::OK, desk.dashboard(today)),
        Err(response) => response,
    }
}

pub(crate) async fn calendar_handler<S>(
    State(desk): DeskState<S>,
    Query(params): Query<CalendarParams>,
) -> Response
where
    S: TenderStore + 'static,
{
    let today = Local::now().date_naive();
    let year = params.year.unwrap_or_else(|| today.year());
    let month = params.month.unwrap_or_else(|| today.month());
    respond(StatusCode::OK, desk.calendar(year, month))
}

pub(crate) async fn lists_handler<S>(State(desk): DeskState<S>) -> Response
where
    S: TenderStore + 'static,
{
    respond(StatusCode::OK, desk.lists())
}

pub(crate) async fn add_option_handler<S>(
    State(desk): DeskState<S>,
    Path(kind): Path<String>,
    Json(option): Json<NewOption>,
) -> Response
where
    S: TenderStore + 'static,
{
    match kind.parse::<ListKind>() {
        Ok(kind) => respond(
            StatusCode::CREATED,
            desk.add_list_option(kind, &option.value),
        ),
        Err(error) => error_payload(StatusCode::NOT_FOUND, error.to_string()),
    }
}

pub(crate) async fn remove_option_handler<S>(
    State(desk): DeskState<S>,
    Path((kind, index)): Path<(String, usize)>,
) -> Response
where
    S: TenderStore + 'static,
{
    match kind.parse::<ListKind>() {
        Ok(kind) => respond(StatusCode::OK, desk.remove_list_option(kind, index)),
        Err(error) => error_payload(StatusCode::NOT_FOUND, error.to_string()),
    }
}
