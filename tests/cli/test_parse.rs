//! Argument parsing for the kmgr command line

use clap::Parser;
use kmgr::cli::{Cli, Commands, OutputFormat};

#[test]
fn test_default_format_is_human() {
    let cli = Cli::try_parse_from(["kmgr", "show-config"]).unwrap();
    assert_eq!(cli.format, OutputFormat::Human);
    assert!(matches!(cli.command, Commands::ShowConfig(_)));
}

#[test]
fn test_global_format_after_subcommand() {
    let cli = Cli::try_parse_from(["kmgr", "build-pack", "--format", "json"]).unwrap();
    assert_eq!(cli.format, OutputFormat::Json);
}

#[test]
fn test_set_repo_alias_args() {
    let cli = Cli::try_parse_from(["kmgr", "set-repo-alias", "demo", "/tmp/demo", "--default"])
        .unwrap();
    let Commands::SetRepoAlias(args) = cli.command else {
        panic!("expected set-repo-alias");
    };
    assert_eq!(args.alias, "demo");
    assert_eq!(args.path.to_str(), Some("/tmp/demo"));
    assert!(args.default);
}

#[test]
fn test_append_requires_content() {
    assert!(Cli::try_parse_from(["kmgr", "append-chat", "--role", "user"]).is_err());

    let cli = Cli::try_parse_from(["kmgr", "append-chat", "--role", "user", "hello"]).unwrap();
    let Commands::AppendChat(args) = cli.command else {
        panic!("expected append-chat");
    };
    assert_eq!(args.content.as_deref(), Some("hello"));
    assert!(!args.no_dedup);
}

#[test]
fn test_append_content_sources_conflict() {
    let result = Cli::try_parse_from([
        "kmgr",
        "append-chat",
        "--role",
        "user",
        "inline",
        "--content-file",
        "notes.txt",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_export_args() {
    let cli = Cli::try_parse_from([
        "kmgr",
        "export-context",
        "auth",
        "-r",
        "demo",
        "--max-bytes",
        "2048",
        "-o",
        "out.txt",
    ])
    .unwrap();
    let Commands::ExportContext(args) = cli.command else {
        panic!("expected export-context");
    };
    assert_eq!(args.query, "auth");
    assert_eq!(args.repo.as_deref(), Some("demo"));
    assert_eq!(args.max_bytes, Some(2048));
    assert_eq!(args.out_file.unwrap().to_str(), Some("out.txt"));
}

#[test]
fn test_unknown_command_rejected() {
    assert!(Cli::try_parse_from(["kmgr", "index-repository"]).is_err());
}
