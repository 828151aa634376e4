//! Web layer for the split-ticket finder.
//!
//! Provides HTTP endpoints for searching journeys and scanning them for
//! cheaper split tickets.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppState, Scanner};
