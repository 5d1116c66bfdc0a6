//! API route handlers

use crate::api::error::ApiError;
use crate::api::payloads::{
    Ack, CreateDivisionRequest, CreateDriverRequest, DivisionQuery, ImportQuery, RaceRequest,
    RankingsQuery,
};
use crate::exchange::{ImportOptions, ImportReport};
use crate::race::RecordRaceCommand;
use crate::service::AppState;
use crate::store::Snapshot;
use crate::types::{
    Division, DriverStanding, DriverSummary, DriverUpdate, Race, RaceResult, TournamentStats,
};
use crate::utils::export_filename;
use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

type ApiResult<T> = Result<T, ApiError>;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Service information
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "service": state.config().service.name,
        "version": crate::VERSION,
        "endpoints": [
            "/api/drivers",
            "/api/divisions",
            "/api/active-drivers/{division}",
            "/api/race",
            "/api/races",
            "/api/rankings",
            "/api/stats",
            "/api/export",
            "/api/export-excel",
            "/api/snapshot",
            "/api/save",
            "/api/load",
            "/api/import",
            "/health",
            "/ready",
            "/alive",
            "/metrics"
        ]
    }))
}

// Drivers

pub async fn list_drivers(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DivisionQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<DriverSummary>>> {
    let Query(query) = query?;
    let drivers = state.list_drivers(query.division()).await;
    Ok(Json(drivers.iter().map(DriverSummary::from).collect()))
}

pub async fn add_driver(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateDriverRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<DriverSummary>)> {
    let Json(request) = payload?;
    let driver = state.add_driver(&request.name, &request.division).await?;
    Ok((StatusCode::CREATED, Json(driver.summary())))
}

pub async fn get_driver(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<DriverSummary>> {
    let driver = state.get_driver(&name).await?;
    Ok(Json(driver.summary()))
}

pub async fn update_driver(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    payload: Result<Json<DriverUpdate>, JsonRejection>,
) -> ApiResult<Json<DriverSummary>> {
    let Json(update) = payload?;
    if update.is_empty() {
        return Err(ApiError::bad_request(
            "Nothing to update: provide name, division or inactive",
        ));
    }
    let driver = state.update_driver(&name, update).await?;
    Ok(Json(driver.summary()))
}

pub async fn remove_driver(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<Ack>> {
    let driver = state.remove_driver(&name).await?;
    Ok(Json(Ack::new(format!(
        "Driver {} deleted successfully",
        driver.name()
    ))))
}

// Divisions

pub async fn list_divisions(State(state): State<Arc<AppState>>) -> Json<Vec<Division>> {
    Json(state.list_divisions().await)
}

pub async fn create_division(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateDivisionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Division>)> {
    let Json(request) = payload?;
    let division = state.create_division(&request.name).await?;
    Ok((StatusCode::CREATED, Json(division)))
}

pub async fn active_drivers(
    State(state): State<Arc<AppState>>,
    Path(division): Path<String>,
) -> Json<Vec<String>> {
    Json(state.active_drivers(&division).await)
}

// Races

pub async fn record_race(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RaceRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RaceResult>)> {
    let Json(request) = payload?;
    let command = RecordRaceCommand::try_from(request)?;
    let result = state.record_race(command).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

pub async fn list_races(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DivisionQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Race>>> {
    let Query(query) = query?;
    Ok(Json(state.races(query.division()).await))
}

// Results

pub async fn rankings(
    State(state): State<Arc<AppState>>,
    query: Result<Query<RankingsQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<DriverStanding>>> {
    let Query(query) = query?;
    Ok(Json(state.rankings(query.division(), query.filter).await))
}

pub async fn stats(State(state): State<Arc<AppState>>) -> Json<TournamentStats> {
    Json(state.stats().await)
}

pub async fn export_csv(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let data = state.export_csv().await?;
    Ok(attachment("text/csv; charset=utf-8", &export_filename("csv"), data))
}

pub async fn export_excel(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let data = state.export_xlsx().await?;
    Ok(attachment(XLSX_CONTENT_TYPE, &export_filename("xlsx"), data))
}

fn attachment(content_type: &str, filename: &str, data: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        data,
    )
        .into_response()
}

// Persistence

pub async fn snapshot(State(state): State<Arc<AppState>>) -> Json<Snapshot> {
    Json(state.snapshot().await)
}

pub async fn save(State(state): State<Arc<AppState>>) -> ApiResult<Json<Snapshot>> {
    Ok(Json(state.save_snapshot().await?))
}

pub async fn load(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Snapshot>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let Json(snapshot) = payload?;
    let stats = state.replace_from_snapshot(snapshot).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Tournament loaded successfully",
        "stats": stats
    })))
}

pub async fn import(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ImportQuery>, QueryRejection>,
    body: Bytes,
) -> ApiResult<Json<ImportReport>> {
    let Query(query) = query?;
    let options = ImportOptions {
        header: query.header,
    };
    Ok(Json(state.import(&body, options).await?))
}
