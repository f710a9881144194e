//! Link add/delete shared by the release and activity edit pages

use tera::Context;

use crate::core::index::IndexTable;
use crate::core::store::{RepoError, Store};
use crate::entities::LinkOwner;
use crate::web::forms::LinkForm;

/// Insert the owner's links and the add-link form
pub(super) fn insert_links(
    context: &mut Context,
    store: &Store,
    owner: LinkOwner,
    owner_id: i64,
    link_form: &LinkForm,
) -> Result<(), RepoError> {
    context.insert("links", &store.list_links(owner, owner_id)?);
    context.insert("link_base", &owner_path(owner, owner_id));
    context.insert("link_form", link_form);
    context.insert("link_type_options", &store.index_options(IndexTable::LinkType)?);
    Ok(())
}

/// Add a link; `Ok(Err(message))` is a validation failure to show on the page
pub(super) fn add(
    store: &mut Store,
    owner: LinkOwner,
    owner_id: i64,
    form: &LinkForm,
) -> Result<Result<(), String>, RepoError> {
    match store.add_link(owner, owner_id, &form.to_input()) {
        Ok(_) => Ok(Ok(())),
        Err(e) if e.is_invalid_input() => Ok(Err(e.to_string())),
        Err(e) => Err(e),
    }
}

fn owner_path(owner: LinkOwner, owner_id: i64) -> String {
    match owner {
        LinkOwner::Release => format!("/releases/{}", owner_id),
        LinkOwner::Activity => format!("/activities/{}", owner_id),
    }
}

pub(super) fn edit_path(owner: LinkOwner, owner_id: i64) -> String {
    format!("{}/edit", owner_path(owner, owner_id))
}
