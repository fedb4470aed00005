//! CRUD page handlers. The page-reload and realtime route sets are thin
//! wrappers over the same core operations, parameterized by [`PageVariant`].

use axum::{
    extract::{Form, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use super::pages::{self, PageVariant};
use super::{ApiError, AppState};
use crate::db::StoreError;
use crate::forms;

/// Combined create + delete submission for the list page. The two embedded
/// forms are told apart by their field prefixes; whichever one is present is
/// the one that gets applied.
#[derive(Debug, Default, Deserialize)]
pub struct ListPageForm {
    #[serde(rename = "add_user-username")]
    pub username: Option<String>,

    #[serde(rename = "add_user-email")]
    pub email: Option<String>,

    #[serde(rename = "add_user-role")]
    pub role: Option<String>,

    #[serde(rename = "add_user-status")]
    pub status: Option<String>,

    #[serde(rename = "delete_user-user_id")]
    pub delete_user_id: Option<String>,
}

impl ListPageForm {
    fn has_create_submission(&self) -> bool {
        self.username.is_some()
            || self.email.is_some()
            || self.role.is_some()
            || self.status.is_some()
    }
}

#[derive(Debug, Deserialize)]
pub struct EditPageForm {
    #[serde(rename = "edit_user-username")]
    pub username: Option<String>,

    #[serde(rename = "edit_user-email")]
    pub email: Option<String>,

    #[serde(rename = "edit_user-role")]
    pub role: Option<String>,

    #[serde(rename = "edit_user-status")]
    pub status: Option<String>,
}

pub async fn index() -> Html<String> {
    Html(pages::render_index())
}

pub async fn basic_page(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    list_page(&state, PageVariant::Basic).await
}

pub async fn basic_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ListPageForm>,
) -> Result<Html<String>, ApiError> {
    submit_list_page(&state, PageVariant::Basic, form).await
}

pub async fn basic_edit_page(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
) -> Result<Html<String>, ApiError> {
    edit_page(&state, PageVariant::Basic, user_id).await
}

pub async fn basic_edit_submit(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
    Form(form): Form<EditPageForm>,
) -> Result<Response, ApiError> {
    submit_edit_page(&state, PageVariant::Basic, user_id, form).await
}

pub async fn realtime_page(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    list_page(&state, PageVariant::Realtime).await
}

pub async fn realtime_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ListPageForm>,
) -> Result<Html<String>, ApiError> {
    submit_list_page(&state, PageVariant::Realtime, form).await
}

pub async fn realtime_edit_page(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
) -> Result<Html<String>, ApiError> {
    edit_page(&state, PageVariant::Realtime, user_id).await
}

pub async fn realtime_edit_submit(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
    Form(form): Form<EditPageForm>,
) -> Result<Response, ApiError> {
    submit_edit_page(&state, PageVariant::Realtime, user_id, form).await
}

async fn list_page(state: &AppState, variant: PageVariant) -> Result<Html<String>, ApiError> {
    let users = state.store().list_users().await?;
    Ok(Html(pages::render_list_page(variant, &users, None, None)))
}

async fn submit_list_page(
    state: &AppState,
    variant: PageVariant,
    form: ListPageForm,
) -> Result<Html<String>, ApiError> {
    let outcome = if let Some(raw_id) = form.delete_user_id.as_deref() {
        Some(apply_delete(state, raw_id).await?)
    } else if form.has_create_submission() {
        Some(apply_create(state, &form).await?)
    } else {
        // Neither embedded form was submitted; just show the list.
        None
    };

    let users = state.store().list_users().await?;
    let (notice, error) = match &outcome {
        Some(Outcome::Applied(msg)) => (Some(msg.as_str()), None),
        Some(Outcome::Rejected(msg)) => (None, Some(msg.as_str())),
        None => (None, None),
    };

    Ok(Html(pages::render_list_page(variant, &users, notice, error)))
}

enum Outcome {
    Applied(String),
    Rejected(String),
}

async fn apply_create(state: &AppState, form: &ListPageForm) -> Result<Outcome, ApiError> {
    let validated = match forms::validate_user_form(
        form.username.as_deref(),
        form.email.as_deref(),
        form.role.as_deref(),
        form.status.as_deref(),
    ) {
        Ok(validated) => validated,
        Err(violation) => return Ok(Outcome::Rejected(violation.to_string())),
    };

    match state.store().create_user(validated.into()).await {
        Ok(user) => Ok(Outcome::Applied(format!("Added user <{}>", user.username))),
        // Uniqueness is the last rule of the pipeline; a collision is a
        // field-level rejection, not a server failure.
        Err(err @ StoreError::Duplicate { .. }) => Ok(Outcome::Rejected(err.to_string())),
        Err(err) => Err(err.into()),
    }
}

async fn apply_delete(state: &AppState, raw_id: &str) -> Result<Outcome, ApiError> {
    let Ok(id) = raw_id.trim().parse::<i32>() else {
        return Ok(Outcome::Rejected(format!("invalid user id '{raw_id}'")));
    };

    let user = state.store().get_user(id).await?;
    state.store().delete_user(id).await?;

    Ok(Outcome::Applied(format!("Deleted user <{}>", user.username)))
}

async fn edit_page(
    state: &AppState,
    variant: PageVariant,
    user_id: i32,
) -> Result<Html<String>, ApiError> {
    let user = state.store().get_user(user_id).await?;
    Ok(Html(pages::render_edit_page(variant, &user, None)))
}

async fn submit_edit_page(
    state: &AppState,
    variant: PageVariant,
    user_id: i32,
    form: EditPageForm,
) -> Result<Response, ApiError> {
    let user = state.store().get_user(user_id).await?;

    let validated = match forms::validate_user_form(
        form.username.as_deref(),
        form.email.as_deref(),
        form.role.as_deref(),
        form.status.as_deref(),
    ) {
        Ok(validated) => validated,
        Err(violation) => {
            let body = pages::render_edit_page(variant, &user, Some(&violation.to_string()));
            return Ok(Html(body).into_response());
        }
    };

    state.store().update_user(user_id, validated.into()).await?;

    Ok(Redirect::to(variant.list_path()).into_response())
}
