use crate::state::AppState;
use axum::Router;

pub mod client;
pub mod dto;
pub mod handlers;
pub mod token;

pub use client::AmadeusClient;

pub fn router() -> Router<AppState> {
    handlers::flight_routes()
}
