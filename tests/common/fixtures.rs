// Test fixtures for integration testing

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Synthetic repository on disk
#[allow(dead_code)] // Used in integration tests
pub struct TestRepo {
    pub dir: TempDir,
    pub files: Vec<PathBuf>,
}

impl TestRepo {
    /// A small mixed repository with one excluded directory
    #[allow(dead_code)] // Used in integration tests
    pub fn small() -> Self {
        Self::with_files(&[
            ("src/main.rs", "fn main() {\n    println!(\"Hello\");\n}\n"),
            (
                "src/auth.rs",
                "// auth helpers\npub fn authenticate(user: &str) -> bool {\n    // auth check\n    !user.is_empty()\n}\n",
            ),
            ("src/lib.rs", "pub mod auth;\npub fn helper() -> u32 { 42 }\n"),
            ("README.md", "# Test Project\r\n\r\nThis is a test about auth.\r\n"),
            ("docs/api.md", "# API\n\n## Functions\n\n- `helper()`\n"),
            ("notes.bin", "not admitted by any include glob"),
            ("target/debug/build.rs", "// auth in build output"),
            ("node_modules/pkg/index.js", "// auth in a dependency"),
        ])
    }

    /// Only files no include glob admits
    #[allow(dead_code)] // Used in integration tests
    pub fn unindexable() -> Self {
        Self::with_files(&[("data.bin", "\u{1}\u{2}"), ("image.png", "png")])
    }

    /// Create with custom files
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().unwrap();
        let mut paths = Vec::new();

        for (path, content) in files {
            let full_path = dir.path().join(path);
            std::fs::create_dir_all(full_path.parent().unwrap()).unwrap();
            std::fs::write(&full_path, content).unwrap();
            paths.push(full_path);
        }

        Self { dir, files: paths }
    }

    /// Get path to the repository
    #[allow(dead_code)] // Used in integration tests
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}
