// Test helper functions

use super::fixtures::TestRepo;
use kmgr::core::config::Config;
use kmgr::core::services::Services;
use kmgr::core::types::PackOutcome;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Services whose file root is `root` and whose pack state lives in `state`
#[allow(dead_code)] // Used in integration tests
pub fn create_test_services(root: &Path, state: &Path) -> Arc<Services> {
    let mut config = Config::default();
    config.files.roots = vec![root.to_path_buf()];
    config.files.working_dir = root.to_path_buf();
    config.packs.root_dir = state.to_path_buf();
    config.packs.default_repo = None;
    config.packs.retry_attempts = 2;
    config.packs.retry_delay_ms = 0;
    Arc::new(Services::new(config))
}

/// A repository, a pack state directory and services over both
#[allow(dead_code)] // Used in integration tests
pub struct TestEnv {
    pub repo: TestRepo,
    pub state: TempDir,
    pub services: Arc<Services>,
}

impl TestEnv {
    #[allow(dead_code)] // Used in integration tests
    pub fn new(repo: TestRepo) -> Self {
        let state = TempDir::new().unwrap();
        let services = create_test_services(repo.path(), state.path());
        Self {
            repo,
            state,
            services,
        }
    }

    /// Small repository registered as the default alias `demo`
    #[allow(dead_code)] // Used in integration tests
    pub fn with_default_alias() -> Self {
        let env = Self::new(TestRepo::small());
        let outcome = env
            .services
            .packs
            .set_repo_alias("demo", env.repo.path(), true);
        assert!(outcome.ok, "set_repo_alias failed: {}", outcome.summary);
        env
    }
}

/// Data of a successful envelope, failing the test otherwise
#[allow(dead_code)] // Used in integration tests
pub fn outcome_data(outcome: &PackOutcome) -> &Value {
    assert!(
        outcome.ok,
        "expected success, got {} failure: {}",
        outcome.step, outcome.summary
    );
    outcome.data.as_ref().expect("success carries data")
}
