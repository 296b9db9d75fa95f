//! Unified service container for kmgr
//!
//! Provides shared access to all core services.

use crate::core::config::Config;
use crate::core::files::FileService;
use crate::core::pack::PackManager;
use std::sync::Arc;

/// Unified services container
///
/// All adapters use this same struct for service access. The
/// configuration is loaded once at startup and never mutated.
#[derive(Clone)]
pub struct Services {
    /// Guarded read-only file access
    pub files: Arc<FileService>,

    /// Knowledge pack build/append/export
    pub packs: Arc<PackManager>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl Services {
    /// Create services from configuration
    pub fn new(config: Config) -> Self {
        let files = Arc::new(FileService::new(&config.files));
        let packs = Arc::new(PackManager::new(&config.packs));

        Self {
            files,
            packs,
            config: Arc::new(config),
        }
    }
}
