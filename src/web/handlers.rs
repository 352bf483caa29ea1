use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use tracing::{info, instrument};

use super::error::AppError;
use super::render;
use crate::db;
use crate::reconcile::{self, AdminAction};
use crate::startup::AppState;
use crate::sync;

pub const INDEX_POST: &str = "index";

async fn serve_post(state: &AppState, post_name: &str) -> Result<Response, AppError> {
    match db::get_post(&state.pool, post_name).await? {
        Some(post) => Ok(Html(render::render_post(
            &state.folder.name,
            &post.post_name,
            &post.content,
        ))
        .into_response()),
        None => Ok((
            StatusCode::NOT_FOUND,
            Html(render::render_not_found(&state.folder.name)),
        )
            .into_response()),
    }
}

pub async fn index(State(state): State<AppState>) -> Result<Response, AppError> {
    serve_post(&state, INDEX_POST).await
}

pub async fn post_page(
    State(state): State<AppState>,
    Path(post_name): Path<String>,
) -> Result<Response, AppError> {
    serve_post(&state, &post_name).await
}

#[instrument(skip_all)]
pub async fn admin_view(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let reconciliation = reconcile::load(&state.pool, state.source.as_ref(), &state.folder)
        .await
        .map_err(AppError::Upstream)?;
    let posts = db::list_posts(&state.pool).await?;
    Ok(Html(render::render_admin(
        &state.folder.name,
        &reconciliation,
        &posts,
    )))
}

fn field<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
    form.iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

#[instrument(skip_all)]
pub async fn admin_action(
    State(state): State<AppState>,
    Form(form): Form<Vec<(String, String)>>,
) -> Result<Redirect, AppError> {
    let action: AdminAction = field(&form, "action")
        .ok_or_else(|| AppError::BadRequest("missing action".into()))?
        .parse()
        .map_err(|e: anyhow::Error| AppError::BadRequest(e.to_string()))?;
    let name = field(&form, "name").map(str::trim).unwrap_or("");
    if action.needs_name() && name.is_empty() {
        return Err(AppError::BadRequest(format!(
            "action '{}' requires a name",
            action.as_str()
        )));
    }

    let result = reconcile::apply(
        &state.pool,
        state.source.as_ref(),
        &state.folder,
        action,
        name,
    )
    .await;
    match (action, result) {
        (_, Ok(outcome)) => {
            info!(action = action.as_str(), name, ?outcome, "admin action done")
        }
        (AdminAction::DeleteAllOrphaned, Err(err)) => return Err(AppError::Upstream(err)),
        (_, Err(err)) => return Err(AppError::Internal(err)),
    }
    Ok(Redirect::to("/admin"))
}

/// Legacy batch form: repeated `post_names` plus `csv_post_names`.
#[instrument(skip_all)]
pub async fn admin_update(
    State(state): State<AppState>,
    Form(form): Form<Vec<(String, String)>>,
) -> Redirect {
    let listed: Vec<&str> = form
        .iter()
        .filter(|(k, _)| k == "post_names")
        .map(|(_, v)| v.as_str())
        .collect();
    let csv = field(&form, "csv_post_names").unwrap_or("");
    let names = sync::collect_names(&listed, csv);

    let report =
        sync::sync_batch(&state.pool, state.source.as_ref(), &state.folder, &names).await;
    info!(
        published = ?report.published,
        not_found = ?report.not_found,
        failed = report.failed.len(),
        "batch update done"
    );
    Redirect::to("/admin")
}
