use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Form;
use serde_json::json;

use super::links;
use super::{csv_attachment, form_error, ok_page, render_page, see_other};
use crate::core::export::{self, ExportEntity};
use crate::core::index::IndexTable;
use crate::core::store::{RepoError, Store};
use crate::entities::LinkOwner;
use crate::web::forms::{with_msg, FlashQuery, LinkForm, ReleaseForm, ReleaseQuery};
use crate::web::render::{flash_message, page};
use crate::web::{AppState, WebResult};

fn list_context(
    store: &mut Store,
    query: &ReleaseQuery,
    form: &ReleaseForm,
) -> Result<tera::Context, RepoError> {
    store.refresh_release_statuses()?;
    let mut context = page("Releases");
    context.insert("releases", &store.list_releases(&query.filter())?);
    context.insert(
        "filters",
        &json!({
            "q": query.q.clone().unwrap_or_default(),
            "status": query.status.clone().unwrap_or_default(),
        }),
    );
    context.insert("status_options", &store.index_options(IndexTable::ReleaseStatus)?);
    context.insert("form", form);
    context.insert("message", &flash_message(query.msg.as_deref()));
    Ok(context)
}

fn edit_context(
    store: &Store,
    id: i64,
    form: &ReleaseForm,
    link_form: &LinkForm,
) -> Result<tera::Context, RepoError> {
    let release = store.get_release(id)?;
    let mut context = page("Edit Release");
    context.insert("release", &release);
    context.insert("form", form);
    links::insert_links(&mut context, store, LinkOwner::Release, id, link_form)?;
    Ok(context)
}

pub async fn list(State(state): State<AppState>, Query(query): Query<ReleaseQuery>) -> WebResult<Response> {
    let mut store = state.store()?;
    let context = list_context(&mut store, &query, &ReleaseForm::default())?;
    ok_page(&state, "releases.html", &context)
}

pub async fn export(State(state): State<AppState>, Query(query): Query<ReleaseQuery>) -> WebResult<Response> {
    let mut store = state.store()?;
    store.refresh_release_statuses()?;
    let releases = store.list_releases(&query.filter())?;
    Ok(csv_attachment(ExportEntity::Releases, export::releases_csv(&releases)?))
}

pub async fn create(State(state): State<AppState>, Form(form): Form<ReleaseForm>) -> WebResult<Response> {
    let mut store = state.store()?;
    let result = form
        .to_dates()
        .and_then(|dates| store.create_release(&form.release_code, &dates));
    match form_error(result)? {
        Ok(_) => Ok(see_other("/releases?msg=created")),
        Err(message) => {
            let mut context = list_context(&mut store, &ReleaseQuery::default(), &form)?;
            context.insert("error", &message);
            render_page(&state, "releases.html", &context, StatusCode::BAD_REQUEST)
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
    let release = store.get_release(id)?;
    let mut context = edit_context(&store, id, &ReleaseForm::from(&release), &LinkForm::default())?;
    context.insert("message", &flash_message(query.msg.as_deref()));
    ok_page(&state, "release_edit.html", &context)
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<ReleaseForm>,
) -> WebResult<Response> {
    let mut store = state.store()?;
    let result = form
        .to_dates()
        .and_then(|dates| store.update_release(id, &dates));
    match form_error(result)? {
        Ok(_) => Ok(see_other(&with_msg("/releases", "updated"))),
        Err(message) => {
            let mut context = edit_context(&store, id, &form, &LinkForm::default())?;
            context.insert("error", &message);
            render_page(&state, "release_edit.html", &context, StatusCode::BAD_REQUEST)
        }
    }
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> WebResult<Response> {
    let mut store = state.store()?;
    store.delete_release(id)?;
    Ok(see_other("/releases?msg=deleted"))
}

pub async fn add_link(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(link_form): Form<LinkForm>,
) -> WebResult<Response> {
    let mut store = state.store()?;
    match links::add(&mut store, LinkOwner::Release, id, &link_form)? {
        Ok(()) => Ok(see_other(&with_msg(&links::edit_path(LinkOwner::Release, id), "created"))),
        Err(message) => {
            let release = store.get_release(id)?;
            let mut context = edit_context(&store, id, &ReleaseForm::from(&release), &link_form)?;
            context.insert("error", &message);
            render_page(&state, "release_edit.html", &context, StatusCode::BAD_REQUEST)
        }
    }
}

pub async fn delete_link(
    State(state): State<AppState>,
    Path((id, link_id)): Path<(i64, i64)>,
) -> WebResult<Response> {
    let mut store = state.store()?;
    store.delete_link(LinkOwner::Release, id, link_id)?;
    Ok(see_other(&with_msg(&links::edit_path(LinkOwner::Release, id), "deleted")))
}
