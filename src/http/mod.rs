//! HTTP invoke surface for the skill backend
//!
//! Stands in for the serverless hosting layer:
//! - POST /skill/invoke - run one voice-platform turn
//! - GET /health - health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
