//! Core domain logic (protocol-agnostic)
//!
//! This module contains all business logic that is independent
//! of transport protocols (HTTP, MCP, CLI).
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **error**: Error types and Result alias
//! - **types**: Domain data structures
//! - **xdg**: XDG directory handling
//! - **files**: Guarded range/line/search/stat access to files
//! - **pack**: Knowledge pack registry, archive and operations
//! - **services**: Unified service container

pub mod config;
pub mod error;
pub mod files;
pub mod pack;
pub mod services;
pub mod types;
pub mod xdg;

// Re-export key types for convenience
pub use config::Config;
pub use error::{KmgrError, Result};
pub use services::Services;
