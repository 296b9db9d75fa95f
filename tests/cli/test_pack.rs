//! Pack commands executed against test services

use crate::common::{TestEnv, TestRepo};
use kmgr::cli::commands::pack::{
    execute_append, execute_build, execute_export, execute_set_alias, AppendArgs, BuildArgs,
    ExportArgs, SetAliasArgs,
};
use kmgr::cli::OutputFormat;
use std::fs;

fn build_args() -> BuildArgs {
    BuildArgs {
        repo: None,
        max_pack_mb: None,
        include: vec![],
        exclude_dirs: vec![],
    }
}

#[tokio::test]
async fn test_set_alias_then_build() {
    let env = TestEnv::new(TestRepo::small());

    execute_set_alias(
        SetAliasArgs {
            alias: "cli-demo".to_string(),
            path: env.repo.path().to_path_buf(),
            default: true,
        },
        &env.services,
        OutputFormat::Json,
    )
    .await
    .unwrap();

    execute_build(build_args(), &env.services, OutputFormat::Human)
        .await
        .unwrap();

    assert!(env.services.packs.pack_path("cli-demo").exists());
}

#[tokio::test]
async fn test_set_alias_rejects_bad_name() {
    let env = TestEnv::new(TestRepo::small());

    let err = execute_set_alias(
        SetAliasArgs {
            alias: "bad alias!".to_string(),
            path: env.repo.path().to_path_buf(),
            default: false,
        },
        &env.services,
        OutputFormat::Human,
    )
    .await
    .unwrap_err();

    assert!(err.to_string().starts_with("set_alias failed"));
}

#[tokio::test]
async fn test_build_failure_is_error() {
    let env = TestEnv::new(TestRepo::small());

    let err = execute_build(build_args(), &env.services, OutputFormat::Human)
        .await
        .unwrap_err();

    assert!(err.to_string().starts_with("resolve_repo failed"));
}

#[tokio::test]
async fn test_append_and_export() {
    let env = TestEnv::with_default_alias();

    execute_append(
        AppendArgs {
            role: "assistant".to_string(),
            content: Some("auth lives in src/auth.rs".to_string()),
            content_file: None,
            repo: None,
            no_dedup: false,
        },
        &env.services,
        OutputFormat::Human,
    )
    .await
    .unwrap();

    let out = env.state.path().join("cli_payload.txt");
    execute_export(
        ExportArgs {
            query: "auth".to_string(),
            repo: Some("demo".to_string()),
            max_bytes: Some(8192),
            out_file: Some(out.clone()),
        },
        &env.services,
        OutputFormat::Json,
    )
    .await
    .unwrap();

    let payload = fs::read_to_string(out).unwrap();
    assert!(payload.lines().next().unwrap().contains("\"chat\""));
}

#[tokio::test]
async fn test_export_rejects_small_budget() {
    let env = TestEnv::with_default_alias();

    let err = execute_export(
        ExportArgs {
            query: "auth".to_string(),
            repo: None,
            max_bytes: Some(10),
            out_file: None,
        },
        &env.services,
        OutputFormat::Human,
    )
    .await
    .unwrap_err();

    assert!(err.to_string().starts_with("validate failed"));
}
