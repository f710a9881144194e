use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Form;
use serde_json::json;

use super::{csv_attachment, form_error, ok_page, render_page, see_other};
use crate::core::export::{self, ExportEntity};
use crate::core::index::{IndexTable, USER_STATUS_ACTIVE};
use crate::core::store::{RepoError, Store};
use crate::web::forms::{with_msg, FlashQuery, MemberForm, MemberQuery};
use crate::web::render::{flash_message, page};
use crate::web::{AppState, WebResult};

fn list_context(
    store: &mut Store,
    query: &MemberQuery,
    form: &MemberForm,
) -> Result<tera::Context, RepoError> {
    store.refresh_release_statuses()?;
    let mut context = page("Members");
    context.insert("members", &store.list_members(&query.filter())?);
    context.insert(
        "filters",
        &json!({
            "q": query.q.clone().unwrap_or_default(),
            "role": query.role.clone().unwrap_or_default(),
            "status": query.status.clone().unwrap_or_default(),
        }),
    );
    context.insert("role_options", &store.index_options(IndexTable::Role)?);
    context.insert("status_options", &store.index_options(IndexTable::UserStatus)?);
    context.insert("form", form);
    context.insert("message", &flash_message(query.msg.as_deref()));
    Ok(context)
}

fn edit_context(store: &Store, id: i64, form: &MemberForm) -> Result<tera::Context, RepoError> {
    let member = store.get_member(id)?;
    let mut context = page("Edit Member");
    context.insert("member", &member);
    context.insert("form", form);
    context.insert("role_options", &store.index_options(IndexTable::Role)?);
    context.insert("status_options", &store.index_options(IndexTable::UserStatus)?);
    Ok(context)
}

pub async fn list(State(state): State<AppState>, Query(query): Query<MemberQuery>) -> WebResult<Response> {
    let mut store = state.store()?;
    let form = MemberForm {
        status_code: USER_STATUS_ACTIVE.to_string(),
        ..Default::default()
    };
    let context = list_context(&mut store, &query, &form)?;
    ok_page(&state, "members.html", &context)
}

pub async fn export(State(state): State<AppState>, Query(query): Query<MemberQuery>) -> WebResult<Response> {
    let mut store = state.store()?;
    store.refresh_release_statuses()?;
    let members = store.list_members(&query.filter())?;
    Ok(csv_attachment(ExportEntity::Members, export::members_csv(&members)?))
}

pub async fn create(State(state): State<AppState>, Form(form): Form<MemberForm>) -> WebResult<Response> {
    let mut store = state.store()?;
    let result = form.to_input().and_then(|input| store.create_member(&input));
    match form_error(result)? {
        Ok(_) => Ok(see_other("/members?msg=created")),
        Err(message) => {
            let mut context = list_context(&mut store, &MemberQuery::default(), &form)?;
            context.insert("error", &message);
            render_page(&state, "members.html", &context, StatusCode::BAD_REQUEST)
        }
    }
}

pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<FlashQuery>,
) -> WebResult<Response> {
    let store = state.store()?;
    let member = store.get_member(id)?;
    let mut context = edit_context(&store, id, &MemberForm::from(&member))?;
    context.insert("message", &flash_message(query.msg.as_deref()));
    ok_page(&state, "member_edit.html", &context)
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<MemberForm>,
) -> WebResult<Response> {
    let mut store = state.store()?;
    let result = form.to_input().and_then(|input| store.update_member(id, &input));
    match form_error(result)? {
        Ok(_) => Ok(see_other(&with_msg("/members", "updated"))),
        Err(message) => {
            let mut context = edit_context(&store, id, &form)?;
            context.insert("error", &message);
            render_page(&state, "member_edit.html", &context, StatusCode::BAD_REQUEST)
        }
    }
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> WebResult<Response> {
    let mut store = state.store()?;
    store.delete_member(id)?;
    Ok(see_other("/members?msg=deleted"))
}
