pub mod readings;

use axum::Router;

use crate::state::AppState;

pub fn api_router() -> Router<AppState> {
    Router::new().nest("/readings", readings::router())
}
