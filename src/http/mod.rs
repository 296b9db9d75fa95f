//! HTTP file service adapter
//!
//! Depends only on core/. Never imports from mcp/.
//!
//! Read-only GET endpoints for byte ranges, line windows, search and
//! metadata over the configured roots, served with Axum.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::*;
pub use router::{build_router, with_service_layers};
