pub mod dto;
pub mod handlers;
pub mod jwt;
pub mod password;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::router()
}
