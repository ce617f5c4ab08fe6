use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{AppointmentFilter, CreateAppointmentRequest, DeletedResponse, UpdateAppointmentRequest},
    repo,
    repo_types::Appointment,
    services,
};
use crate::{
    auth::services::AuthUser,
    error::{AppError, AppResult},
    state::AppState,
};

pub fn appointment_routes() -> Router<AppState> {
    Router::new()
        .route("/appointments", get(list_appointments).post(create_appointment))
        .route(
            "/appointments/:id",
            get(get_appointment)
                .put(update_appointment)
                .delete(delete_appointment),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_appointment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<CreateAppointmentRequest>, JsonRejection>,
) -> AppResult<(StatusCode, HeaderMap, Json<Appointment>)> {
    let Json(payload) = payload?;
    let created = services::book_appointment(&state.db, &state.policy, user_id, payload).await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/api/v1/appointments/{}", created.id)) {
        headers.insert(header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(created)))
}

#[instrument(skip(state))]
pub async fn list_appointments(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    filter: Result<Query<AppointmentFilter>, QueryRejection>,
) -> AppResult<Json<Vec<Appointment>>> {
    let Query(filter) = filter?;
    let rows = repo::list(&state.db, filter.barber_id, filter.date).await?;
    Ok(Json(rows))
}

#[instrument(skip(state))]
pub async fn get_appointment(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<Appointment>> {
    let Path(id) = id?;
    repo::get(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Appointment not found".into()))
}

#[instrument(skip(state, payload))]
pub async fn update_appointment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateAppointmentRequest>, JsonRejection>,
) -> AppResult<Json<Appointment>> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    let updated =
        services::update_appointment(&state.db, &state.policy, user_id, id, patch).await?;
    Ok(Json(updated))
}

#[instrument(skip(state))]
pub async fn delete_appointment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<DeletedResponse>> {
    let Path(id) = id?;
    services::delete_appointment(&state.db, user_id, id).await?;
    Ok(Json(DeletedResponse { ok: true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::services::JwtKeys;
    use axum::{body::Body, extract::FromRef, http::Request};
    use tower::ServiceExt;

    fn app(state: AppState) -> Router {
        appointment_routes().with_state(state)
    }

    fn bearer(state: &AppState) -> String {
        let token = JwtKeys::from_ref(state).sign_access(Uuid::new_v4()).unwrap();
        format!("Bearer {token}")
    }

    #[tokio::test]
    async fn create_requires_authentication() {
        let req = Request::post("/appointments")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"barber_id":"00000000-0000-0000-0000-000000000001","date":"2025-12-16","start_time":"15:00:00"}"#,
            ))
            .unwrap();
        let res = app(AppState::fake()).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn zero_duration_is_rejected_before_booking() {
        let state = AppState::fake();
        let req = Request::post("/appointments")
            .header("content-type", "application/json")
            .header("authorization", bearer(&state))
            .body(Body::from(
                r#"{"barber_id":"00000000-0000-0000-0000-000000000001","date":"2025-12-16","start_time":"15:00:00","duration_minutes":0}"#,
            ))
            .unwrap();
        let res = app(state).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_date_is_a_client_error() {
        let state = AppState::fake();
        let req = Request::post("/appointments")
            .header("content-type", "application/json")
            .header("authorization", bearer(&state))
            .body(Body::from(
                r#"{"barber_id":"00000000-0000-0000-0000-000000000001","date":"16/12/2025","start_time":"15:00:00"}"#,
            ))
            .unwrap();
        let res = app(state).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn bad_filter_is_a_client_error() {
        let state = AppState::fake();
        let req = Request::get("/appointments?date=tomorrow")
            .header("authorization", bearer(&state))
            .body(Body::empty())
            .unwrap();
        let res = app(state).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_id_gets_json_error_body() {
        let state = AppState::fake();
        let req = Request::get("/appointments/not-a-uuid")
            .header("authorization", bearer(&state))
            .body(Body::empty())
            .unwrap();
        let res = app(state).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(body["error"]["message"], "Invalid input");
        assert!(body["error"]["details"].is_string());
    }

    #[tokio::test]
    async fn malformed_id_on_delete_is_a_client_error() {
        let state = AppState::fake();
        let req = Request::delete("/appointments/42")
            .header("authorization", bearer(&state))
            .body(Body::empty())
            .unwrap();
        let res = app(state).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
