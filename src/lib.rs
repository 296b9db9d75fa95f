//! kmgr - Local file access and knowledge pack toolkit
//!
//! Two services for assistant tooling running on the same machine:
//! a read-only HTTP file service that serves byte ranges, line
//! windows, searches and metadata from a fixed set of roots, and a
//! knowledge pack manager that snapshots a repository plus chat
//! history into a single archive and exports relevant context.
//!
//! # Architecture
//!
//! - **core**: Domain logic (protocol-agnostic)
//!   - config, error, types, xdg
//!   - files (path guard, range, lines, search, stat)
//!   - pack (registry, walker, archive, export, retry, manager)
//!   - services (unified service container)
//!
//! - **http**: File service adapter (axum)
//!   - router, handlers, middleware, error mapping
//!
//! - **mcp**: Stdio tool server adapter (JSON-RPC 2.0)
//!   - server, protocol, tools
//!
//! - **cli**: Command-line adapter (clap)

// Core domain logic (protocol-agnostic)
pub mod core;

// HTTP file service adapter
pub mod http;

// MCP (Model Context Protocol) adapter
pub mod mcp;

// Command-line adapter
pub mod cli;

// Re-export commonly used types for convenience
pub use core::config::Config;
pub use core::error::{KmgrError, Result};
pub use core::services::Services;
pub use core::types::*;
