//! Route handlers, one module per page group

pub mod activities;
pub mod dashboards;
mod links;
pub mod members;
pub mod projects;
pub mod releases;

use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use chrono::Utc;
use tera::Context;

use super::{AppState, WebResult};
use crate::core::export::{export_filename, ExportEntity};
use crate::core::store::RepoError;

/// Render a page with the given status
fn render_page(state: &AppState, template: &str, context: &Context, status: StatusCode) -> WebResult<Response> {
    let body = state.views().render(template, context)?;
    Ok((status, Html(body)).into_response())
}

fn ok_page(state: &AppState, template: &str, context: &Context) -> WebResult<Response> {
    render_page(state, template, context, StatusCode::OK)
}

/// 303 redirect after a successful mutation
fn see_other(target: &str) -> Response {
    Redirect::to(target).into_response()
}

/// Split a repository result into a form error to show back, or a hard failure
fn form_error<T>(result: Result<T, RepoError>) -> WebResult<Result<T, String>> {
    match result {
        Ok(value) => Ok(Ok(value)),
        Err(e) if e.is_invalid_input() => Ok(Err(e.to_string())),
        Err(e) => Err(e.into()),
    }
}

fn csv_attachment(entity: ExportEntity, body: String) -> Response {
    let filename = export_filename(entity, Utc::now());
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}
