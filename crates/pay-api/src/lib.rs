//! # pay-api
//!
//! HTTP API layer for course-pay.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Greeting |
//! | GET | `/health` | Health check |
//! | GET | `/pay` | Create order, redirect to provider |
//! | GET | `/complete-order?token=` | Capture approved order |
//! | GET | `/cancel-order` | Redirect home |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState, ErrorStyle};
