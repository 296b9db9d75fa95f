//! Knowledge packs: per-repository archives of a filtered source
//! snapshot plus an append-only chat log.
//!
//! - **registry**: alias to directory mapping (`repos.json`)
//! - **walker**: include/exclude filtering of the repository tree
//! - **archive**: the `.kpkg` container
//! - **export**: relevance filter and byte-budgeted payload
//! - **retry**: fixed-count retry for mutations
//! - **manager**: build, append and export operations

pub mod archive;
pub mod export;
pub mod manager;
pub mod registry;
pub mod retry;
pub mod walker;

pub use manager::{AppendRequest, BuildRequest, ExportRequest, PackManager};
pub use registry::{RepoRegistry, ResolvedRepo};
