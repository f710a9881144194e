//! HTTP front end
//!
//! Server-rendered pages over the same [`Store`] the CLI uses. Each request
//! opens its own short-lived store on the configured database file.

mod forms;
mod handlers;
mod render;

pub use render::{page, RenderError, Views};

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::NaiveDate;
use miette::Diagnostic;
use thiserror::Error;
use tower_http::trace::TraceLayer;

use crate::core::export::ExportError;
use crate::core::store::{RepoError, Store};

#[derive(Debug, Error, Diagnostic)]
pub enum WebError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Repo(#[from] RepoError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Export(#[from] ExportError),

    #[error("failed to bind {addr}: {source}")]
    #[diagnostic(code(epm::web::bind), help("is another server already listening there?"))]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    #[diagnostic(code(epm::web::io))]
    Io(#[from] std::io::Error),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, title) = match &self {
            WebError::Repo(e) if e.is_not_found() => (StatusCode::NOT_FOUND, "Not found"),
            WebError::Repo(e) if e.is_invalid_input() => (StatusCode::BAD_REQUEST, "Invalid input"),
            _ => {
                tracing::error!(error = %self, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error")
            }
        };
        let body = format!(
            "<!doctype html><html><head><title>{title}</title></head>\
             <body><h1>{title}</h1><p>{detail}</p><p><a href=\"/\">Back to dashboard</a></p></body></html>",
            title = title,
            detail = tera::escape_html(&self.to_string()),
        );
        (status, Html(body)).into_response()
    }
}

pub type WebResult<T> = Result<T, WebError>;

/// Shared, cheaply cloned handler state
#[derive(Clone)]
pub struct AppState {
    db_path: PathBuf,
    today: Option<NaiveDate>,
    views: Arc<Views>,
}

impl AppState {
    pub fn new(db_path: PathBuf) -> Result<Self, RenderError> {
        Ok(Self {
            db_path,
            today: None,
            views: Arc::new(Views::new()?),
        })
    }

    /// Pin the date used for status derivation
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn views(&self) -> &Views {
        &self.views
    }

    /// Open a store for the current request
    pub fn store(&self) -> Result<Store, RepoError> {
        let store = Store::open(&self.db_path)?;
        Ok(match self.today {
            Some(today) => store.with_today(today),
            None => store,
        })
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    use handlers::{activities, dashboards, members, projects, releases};

    Router::new()
        .route("/", get(dashboards::index))
        .route("/health", get(dashboards::health))
        .route("/dashboards/daily-meeting", get(dashboards::daily_meeting))
        .route("/dashboards/project-control", get(dashboards::project_control))
        // members
        .route("/members", get(members::list).post(members::create))
        .route("/members/export", get(members::export))
        .route("/members/{id}/edit", get(members::edit).post(members::update))
        .route("/members/{id}/delete", post(members::delete))
        // releases
        .route("/releases", get(releases::list).post(releases::create))
        .route("/releases/export", get(releases::export))
        .route("/releases/{id}/edit", get(releases::edit).post(releases::update))
        .route("/releases/{id}/delete", post(releases::delete))
        .route("/releases/{id}/links", post(releases::add_link))
        .route("/releases/{id}/links/{link_id}/delete", post(releases::delete_link))
        // projects
        .route("/projects", get(projects::list).post(projects::create))
        .route("/projects/export", get(projects::export))
        .route("/projects/{id}/edit", get(projects::edit).post(projects::update))
        .route("/projects/{id}/delete", post(projects::delete))
        // activities
        .route("/activities", get(activities::list).post(activities::create))
        .route("/activities/export", get(activities::export))
        .route("/activities/{id}/edit", get(activities::edit).post(activities::update))
        .route("/activities/{id}/delete", post(activities::delete))
        .route("/activities/{id}/links", post(activities::add_link))
        .route(
            "/activities/{id}/links/{link_id}/delete",
            post(activities::delete_link),
        )
        .fallback(dashboards::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl-C
pub async fn serve(state: AppState, bind: &str) -> Result<(), WebError> {
    // Bring release statuses up to date before the first request
    let changed = state.store()?.refresh_release_statuses()?;
    if changed > 0 {
        tracing::info!(changed, "release statuses refreshed at startup");
    }

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|source| WebError::Bind {
            addr: bind.to_string(),
            source,
        })?;
    let addr: SocketAddr = listener.local_addr()?;
    tracing::info!(%addr, "eagle pm listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
