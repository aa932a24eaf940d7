//! Chatrelay HTTP server
//!
//! Exposes the conversation pipeline of `chatrelay-core` over HTTP:
//! `POST /ask`, `POST /set_proxy`, `POST /verify_key`, `GET /logout` and
//! `GET /health`. Sessions travel in the `session_id` cookie.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod session;
pub mod state;

pub use error::{ApiError, ServerError, ServerResult};
pub use routes::create_router;
pub use server::RelayServer;
pub use state::AppState;
