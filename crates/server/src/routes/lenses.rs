use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use common::types::MessageBody;
use service::Lens;

use crate::errors::ApiError;
use crate::metrics;
use crate::state::AppState;

pub const LENS_DELETED: &str = "Lens deleted";

/// List every lens in stored order
pub async fn list_lenses(State(state): State<AppState>) -> Result<Json<Vec<Lens>>, ApiError> {
    let res = state.lenses.list().await;
    metrics::observe("list", &res);
    Ok(Json(res?))
}

pub async fn get_lens(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Lens>, ApiError> {
    let res = state.lenses.get(&id).await;
    metrics::observe("get", &res);
    Ok(Json(res?))
}

/// Create a lens; any client `id` is replaced by a generated one
pub async fn create_lens(
    State(state): State<AppState>,
    body: Result<Json<Lens>, JsonRejection>,
) -> Result<(StatusCode, Json<Lens>), ApiError> {
    let Json(body) = body?;
    let res = state.lenses.create(body).await;
    metrics::observe("create", &res);
    Ok((StatusCode::CREATED, Json(res?)))
}

/// Merge the body's fields into an existing lens
pub async fn update_lens(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Lens>, JsonRejection>,
) -> Result<Json<Lens>, ApiError> {
    let Json(partial) = body?;
    let res = state.lenses.update(&id, partial).await;
    metrics::observe("update", &res);
    Ok(Json(res?))
}

pub async fn delete_lens(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, ApiError> {
    let res = state.lenses.delete(&id).await;
    metrics::observe("delete", &res);
    res?;
    Ok(Json(MessageBody::new(LENS_DELETED)))
}
