//! MCP tool implementations
//!
//! This module contains the MCP tool handlers that expose the
//! knowledge pack operations to assistant clients.

pub mod append_chat;
pub mod build_pack;
pub mod export_context;
pub mod handler;
pub mod helpers;
pub mod ping;
pub mod registry;
pub mod set_repo_alias;

pub use append_chat::AppendChatHandler;
pub use build_pack::BuildPackHandler;
pub use export_context::ExportContextHandler;
pub use handler::{text_content, McpToolHandler};
pub use ping::PingHandler;
pub use registry::ToolRegistry;
pub use set_repo_alias::SetRepoAliasHandler;
