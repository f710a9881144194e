use axum::extract::State;
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use super::{ok_page, render_page};
use crate::core::dashboard;
use crate::web::render::page;
use crate::web::{AppState, WebResult};

pub async fn index() -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, "/dashboards/daily-meeting")],
    )
        .into_response()
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn daily_meeting(State(state): State<AppState>) -> WebResult<Response> {
    let mut store = state.store()?;
    let board = dashboard::daily_meeting(&mut store)?;

    let mut context = page("Daily Meeting");
    context.insert("board", &board);
    ok_page(&state, "daily_meeting.html", &context)
}

pub async fn project_control(State(state): State<AppState>) -> WebResult<Response> {
    let mut store = state.store()?;
    let board = dashboard::project_control(&mut store)?;

    let mut context = page("Project Control");
    context.insert("board", &board);
    ok_page(&state, "project_control.html", &context)
}

pub async fn not_found(State(state): State<AppState>, uri: Uri) -> WebResult<Response> {
    let mut context = page("Not found");
    context.insert("detail", &format!("No page at {}", uri.path()));
    render_page(&state, "not_found.html", &context, StatusCode::NOT_FOUND)
}
