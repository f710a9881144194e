use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Form;
use serde_json::json;

use super::{csv_attachment, form_error, ok_page, render_page, see_other};
use crate::core::export::{self, ExportEntity};
use crate::core::index::IndexTable;
use crate::core::store::{RepoError, Store};
use crate::web::forms::{with_msg, FlashQuery, ProjectForm, ProjectQuery};
use crate::web::render::{flash_message, page};
use crate::web::{AppState, WebResult};

fn insert_options(context: &mut tera::Context, store: &Store) -> Result<(), RepoError> {
    context.insert("status_options", &store.index_options(IndexTable::ProjectStatus)?);
    context.insert("release_options", &store.release_options()?);
    Ok(())
}

fn list_context(
    store: &mut Store,
    query: &ProjectQuery,
    form: &ProjectForm,
) -> Result<tera::Context, RepoError> {
    store.refresh_release_statuses()?;
    let mut context = page("Projects");
    context.insert("projects", &store.list_projects(&query.filter()?)?);
    context.insert(
        "filters",
        &json!({
            "q": query.q.clone().unwrap_or_default(),
            "status": query.status.clone().unwrap_or_default(),
            "target_release_id": query.target_release_id.clone().unwrap_or_default(),
        }),
    );
    insert_options(&mut context, store)?;
    context.insert("form", form);
    context.insert("message", &flash_message(query.msg.as_deref()));
    Ok(context)
}

fn edit_context(store: &Store, id: i64, form: &ProjectForm) -> Result<tera::Context, RepoError> {
    let project = store.get_project(id)?;
    let mut context = page("Edit Project");
    context.insert("project", &project);
    context.insert("form", form);
    insert_options(&mut context, store)?;
    Ok(context)
}

pub async fn list(State(state): State<AppState>, Query(query): Query<ProjectQuery>) -> WebResult<Response> {
    let mut store = state.store()?;
    let context = list_context(&mut store, &query, &ProjectForm::default())?;
    ok_page(&state, "projects.html", &context)
}

pub async fn export(State(state): State<AppState>, Query(query): Query<ProjectQuery>) -> WebResult<Response> {
    let mut store = state.store()?;
    store.refresh_release_statuses()?;
    let projects = store.list_projects(&query.filter()?)?;
    Ok(csv_attachment(ExportEntity::Projects, export::projects_csv(&projects)?))
}

pub async fn create(State(state): State<AppState>, Form(form): Form<ProjectForm>) -> WebResult<Response> {
    let mut store = state.store()?;
    store.refresh_release_statuses()?;
    let result = form
        .to_input()
        .and_then(|input| store.create_project(&form.project_code, &input));
    match form_error(result)? {
        Ok(_) => Ok(see_other("/projects?msg=created")),
        Err(message) => {
            let mut context = list_context(&mut store, &ProjectQuery::default(), &form)?;
            context.insert("error", &message);
            render_page(&state, "projects.html", &context, StatusCode::BAD_REQUEST)
        }
    }
}

pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<FlashQuery>,
) -> WebResult<Response> {
    let mut store = state.store()?;
    store.refresh_release_statuses()?;
    let project = store.get_project(id)?;
    let mut context = edit_context(&store, id, &ProjectForm::from(&project))?;
    context.insert("message", &flash_message(query.msg.as_deref()));
    ok_page(&state, "project_edit.html", &context)
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<ProjectForm>,
) -> WebResult<Response> {
    let mut store = state.store()?;
    store.refresh_release_statuses()?;
    let result = form
        .to_input()
        .and_then(|input| store.update_project(id, &input));
    match form_error(result)? {
        Ok(_) => Ok(see_other(&with_msg("/projects", "updated"))),
        Err(message) => {
            let mut context = edit_context(&store, id, &form)?;
            context.insert("error", &message);
            render_page(&state, "project_edit.html", &context, StatusCode::BAD_REQUEST)
        }
    }
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> WebResult<Response> {
    let mut store = state.store()?;
    store.delete_project(id)?;
    Ok(see_other("/projects?msg=deleted"))
}
