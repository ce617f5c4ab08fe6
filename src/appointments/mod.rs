use crate::state::AppState;
use axum::Router;

pub mod availability;
pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_CONFIRMED: &str = "confirmed";
pub const STATUS_CANCELLED: &str = "cancelled";

pub const DEFAULT_DURATION_MINUTES: i32 = 30;

pub fn router() -> Router<AppState> {
    handlers::appointment_routes()
}
