use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use super::repo::{self, Client};
use crate::{
    auth::services::AuthUser,
    error::{AppError, AppResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateClientRequest {
    pub name: String,
    pub phone: Option<String>,
}

pub fn client_routes() -> Router<AppState> {
    Router::new().route("/clients", get(list_clients).post(create_client))
}

#[instrument(skip(state))]
pub async fn list_clients(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> AppResult<Json<Vec<Client>>> {
    Ok(Json(repo::list(&state.db).await?))
}

#[instrument(skip(state, payload))]
pub async fn create_client(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    payload: Result<Json<CreateClientRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Client>)> {
    let Json(payload) = payload?;
    let name = payload.name.trim();
    if name.is_empty() {
        warn!("empty client name");
        return Err(AppError::InvalidInput("Name is required".into()));
    }
    let phone = payload
        .phone
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());

    let client = repo::create(&state.db, name, phone).await?;
    info!(client_id = %client.id, "client created");
    Ok((StatusCode::CREATED, Json(client)))
}
