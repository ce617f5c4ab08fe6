use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::repo::{self, Barber};
use crate::{
    appointments::{
        availability::{check_availability, Slot},
        dto::{AvailabilityQuery, AvailabilityResponse},
        repo as appointments_repo,
    },
    auth::services::AuthUser,
    error::{AppError, AppResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateBarberRequest {
    pub name: String,
}

pub fn barber_routes() -> Router<AppState> {
    Router::new()
        .route("/barbers", get(list_barbers).post(create_barber))
        .route("/barbers/:id", get(get_barber))
        .route("/barbers/:id/availability", get(barber_availability))
}

#[instrument(skip(state))]
pub async fn list_barbers(State(state): State<AppState>) -> AppResult<Json<Vec<Barber>>> {
    Ok(Json(repo::list(&state.db).await?))
}

#[instrument(skip(state))]
pub async fn get_barber(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<Barber>> {
    let Path(id) = id?;
    repo::get(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Barber not found".into()))
}

#[instrument(skip(state, payload))]
pub async fn create_barber(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    payload: Result<Json<CreateBarberRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Barber>)> {
    let Json(payload) = payload?;
    let name = payload.name.trim();
    if name.is_empty() {
        warn!("empty barber name");
        return Err(AppError::InvalidInput("Name is required".into()));
    }
    let barber = repo::create(&state.db, name).await?;
    info!(barber_id = %barber.id, "barber created");
    Ok((StatusCode::CREATED, Json(barber)))
}

/// Answer whether a slot is free without booking it.
#[instrument(skip(state))]
pub async fn barber_availability(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<AvailabilityQuery>, QueryRejection>,
) -> AppResult<Json<AvailabilityResponse>> {
    let Path(id) = id?;
    let Query(q) = query?;
    let slot = Slot {
        barber_id: id,
        date: q.date,
        start_time: q.start_time,
        duration_minutes: q.duration_minutes,
    };
    // Validate before the round trip.
    check_availability(&slot, &[], &state.policy)?;

    if repo::get(&state.db, id).await?.is_none() {
        return Err(AppError::NotFound("Barber not found".into()));
    }
    let snapshot = appointments_repo::list_for_barber_day(&state.db, id, q.date).await?;
    let decision = check_availability(&slot, &snapshot, &state.policy)?;
    Ok(Json(decision.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    fn app() -> Router {
        barber_routes().with_state(AppState::fake())
    }

    #[tokio::test]
    async fn create_requires_authentication() {
        let req = Request::post("/barbers")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name":"Carlos"}"#))
            .unwrap();
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn availability_rejects_zero_duration() {
        let req = Request::get(
            "/barbers/00000000-0000-0000-0000-000000000001/availability?date=2025-12-16&start_time=15:00&duration_minutes=0",
        )
        .body(Body::empty())
        .unwrap();
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn availability_requires_date() {
        let req = Request::get(
            "/barbers/00000000-0000-0000-0000-000000000001/availability?start_time=15:00",
        )
        .body(Body::empty())
        .unwrap();
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_barber_id_gets_json_error_body() {
        let res = app()
            .oneshot(Request::get("/barbers/carlos").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(body["error"]["message"], "Invalid input");
    }
}
