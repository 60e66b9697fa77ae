//! Web layer for the Bergen dashboard backend.
//!
//! JSON endpoints for departures, stop search and the bike and weather
//! proxies.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
