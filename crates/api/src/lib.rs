//! HTTP boundary for the Warden access-control service.
//!
//! Everything HTTP-specific lives here: path and query parsing, JSON
//! shapes, and the mapping from [`WardenError`](warden_core::WardenError)
//! and [`Decision`](warden_core::Decision) to status codes. The engine
//! never sees a request or a response.

pub mod error;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use routes::router;
pub use server::Server;
