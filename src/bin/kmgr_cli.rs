//! kmgr CLI - command-line interface for knowledge packs
//!
//! Use this for scripting, automation, or manual operations without an
//! MCP client.
//!
//! # Examples
//!
//! ```bash
//! # Register a repository and make it the default
//! kmgr set-repo-alias myproject /path/to/repo --default
//!
//! # Snapshot it
//! kmgr build-pack
//!
//! # Record a chat turn
//! kmgr append-chat --role user "how is auth wired?"
//!
//! # Export everything mentioning "auth"
//! kmgr export-context auth --max-bytes 65536
//! ```

use clap::Parser;
use kmgr::cli::output::print_error;
use kmgr::cli::{run, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}
