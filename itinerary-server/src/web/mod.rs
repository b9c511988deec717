//! Web layer for the itinerary place service.
//!
//! Provides HTTP endpoints for extracting places from text, resolving them,
//! and looking up canonical place details.

mod dto;
mod routes;
mod state;


pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
