//! show-config command

use crate::common::{TestEnv, TestRepo};
use kmgr::cli::commands::config::{execute, ConfigArgs};
use kmgr::cli::OutputFormat;

#[tokio::test]
async fn test_show_config_human_and_json() {
    let env = TestEnv::new(TestRepo::small());

    execute(ConfigArgs { all: false }, &env.services, OutputFormat::Human)
        .await
        .unwrap();
    execute(ConfigArgs { all: true }, &env.services, OutputFormat::Json)
        .await
        .unwrap();
}
