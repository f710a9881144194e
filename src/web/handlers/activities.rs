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
use crate::web::forms::{safe_next, with_msg, ActivityForm, ActivityQuery, FlashQuery, LinkForm};
use crate::web::render::{flash_message, page};
use crate::web::{AppState, WebResult};

const LIST_PATH: &str = "/activities";

fn insert_options(context: &mut tera::Context, store: &Store) -> Result<(), RepoError> {
    context.insert("type_options", &store.index_options(IndexTable::ActivityType)?);
    context.insert("subtype_options", &store.index_options(IndexTable::ActivitySubtype)?);
    context.insert("status_options", &store.index_options(IndexTable::ActivityStatus)?);
    context.insert("member_options", &store.member_options()?);
    context.insert("project_options", &store.project_options()?);
    context.insert("release_options", &store.release_options()?);
    Ok(())
}

fn list_context(
    store: &mut Store,
    query: &ActivityQuery,
    form: &ActivityForm,
) -> Result<tera::Context, RepoError> {
    store.refresh_release_statuses()?;
    let mut context = page("Activities");
    context.insert("activities", &store.list_activities(&query.filter()?)?);
    context.insert(
        "filters",
        &json!({
            "q": query.q.clone().unwrap_or_default(),
            "status": query.status.clone().unwrap_or_default(),
            "project_id": query.project_id.clone().unwrap_or_default(),
            "assigned_member_id": query.assigned_member_id.clone().unwrap_or_default(),
            "open": query.open.clone().unwrap_or_default(),
        }),
    );
    insert_options(&mut context, store)?;
    context.insert("form", form);
    context.insert("message", &flash_message(query.msg.as_deref()));
    Ok(context)
}

fn edit_context(
    store: &Store,
    id: i64,
    form: &ActivityForm,
    link_form: &LinkForm,
) -> Result<tera::Context, RepoError> {
    let activity = store.get_activity(id)?;
    let mut context = page("Edit Activity");
    context.insert("activity", &activity);
    context.insert("form", form);
    insert_options(&mut context, store)?;
    links::insert_links(&mut context, store, LinkOwner::Activity, id, link_form)?;
    Ok(context)
}

pub async fn list(State(state): State<AppState>, Query(query): Query<ActivityQuery>) -> WebResult<Response> {
    let mut store = state.store()?;
    let form = ActivityForm {
        next: safe_next(query.next.as_deref(), LIST_PATH),
        ..Default::default()
    };
    let context = list_context(&mut store, &query, &form)?;
    ok_page(&state, "activities.html", &context)
}

pub async fn export(State(state): State<AppState>, Query(query): Query<ActivityQuery>) -> WebResult<Response> {
    let mut store = state.store()?;
    store.refresh_release_statuses()?;
    let activities = store.list_activities(&query.filter()?)?;
    Ok(csv_attachment(ExportEntity::Activities, export::activities_csv(&activities)?))
}

pub async fn create(
    State(state): State<AppState>,
    Query(query): Query<FlashQuery>,
    Form(form): Form<ActivityForm>,
) -> WebResult<Response> {
    let target = safe_next(
        Some(form.next.as_str()).filter(|n| !n.is_empty()).or(query.next.as_deref()),
        LIST_PATH,
    );
    let mut store = state.store()?;
    store.refresh_release_statuses()?;
    let result = form.to_input().and_then(|input| store.create_activity(&input));
    match form_error(result)? {
        Ok(_) => Ok(see_other(&with_msg(&target, "created"))),
        Err(message) => {
            let form = ActivityForm {
                next: target,
                ..form
            };
            let mut context = list_context(&mut store, &ActivityQuery::default(), &form)?;
            context.insert("error", &message);
            render_page(&state, "activities.html", &context, StatusCode::BAD_REQUEST)
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
    let activity = store.get_activity(id)?;
    let form = ActivityForm {
        next: safe_next(query.next.as_deref(), LIST_PATH),
        ..ActivityForm::from(&activity)
    };
    let mut context = edit_context(&store, id, &form, &LinkForm::default())?;
    context.insert("message", &flash_message(query.msg.as_deref()));
    ok_page(&state, "activity_edit.html", &context)
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<FlashQuery>,
    Form(form): Form<ActivityForm>,
) -> WebResult<Response> {
    let target = safe_next(
        Some(form.next.as_str()).filter(|n| !n.is_empty()).or(query.next.as_deref()),
        LIST_PATH,
    );
    let mut store = state.store()?;
    store.refresh_release_statuses()?;
    let result = form
        .to_input()
        .and_then(|input| store.update_activity(id, &input));
    match form_error(result)? {
        Ok(_) => Ok(see_other(&with_msg(&target, "updated"))),
        Err(message) => {
            let form = ActivityForm {
                next: target,
                ..form
            };
            let mut context = edit_context(&store, id, &form, &LinkForm::default())?;
            context.insert("error", &message);
            render_page(&state, "activity_edit.html", &context, StatusCode::BAD_REQUEST)
        }
    }
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<FlashQuery>,
) -> WebResult<Response> {
    let mut store = state.store()?;
    store.delete_activity(id)?;
    let target = safe_next(query.next.as_deref(), LIST_PATH);
    Ok(see_other(&with_msg(&target, "deleted")))
}

pub async fn add_link(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(link_form): Form<LinkForm>,
) -> WebResult<Response> {
    let mut store = state.store()?;
    match links::add(&mut store, LinkOwner::Activity, id, &link_form)? {
        Ok(()) => Ok(see_other(&with_msg(
            &links::edit_path(LinkOwner::Activity, id),
            "created",
        ))),
        Err(message) => {
            let activity = store.get_activity(id)?;
            let form = ActivityForm::from(&activity);
            let mut context = edit_context(&store, id, &form, &link_form)?;
            context.insert("error", &message);
            render_page(&state, "activity_edit.html", &context, StatusCode::BAD_REQUEST)
        }
    }
}

pub async fn delete_link(
    State(state): State<AppState>,
    Path((id, link_id)): Path<(i64, i64)>,
) -> WebResult<Response> {
    let mut store = state.store()?;
    store.delete_link(LinkOwner::Activity, id, link_id)?;
    Ok(see_other(&with_msg(
        &links::edit_path(LinkOwner::Activity, id),
        "deleted",
    )))
}
