//! Knowledge pack operations driven through `Services`

use crate::common::{outcome_data, TestEnv, TestRepo};
use kmgr::core::pack::archive::{self, PackReader, SCHEMA};
use kmgr::core::pack::{AppendRequest, BuildRequest, ExportRequest};
use std::fs;
use std::path::PathBuf;

fn append(env: &TestEnv, role: &str, content: &str, dedup: bool) -> kmgr::PackOutcome {
    env.services.packs.append(&AppendRequest {
        role: role.to_string(),
        content: content.to_string(),
        repo: None,
        dedup,
    })
}

fn export(env: &TestEnv, query: &str, out: PathBuf) -> kmgr::PackOutcome {
    env.services.packs.export(&ExportRequest {
        query: query.to_string(),
        repo: None,
        max_bytes: Some(64 * 1024),
        out_file: Some(out),
    })
}

#[test]
fn test_build_respects_filters() {
    let env = TestEnv::with_default_alias();

    let outcome = env.services.packs.build(&BuildRequest::default());
    let data = outcome_data(&outcome);
    assert_eq!(outcome.step, "build");
    assert_eq!(data["alias"], "demo");
    assert_eq!(data["files"], 5);

    let mut reader = PackReader::open(&env.services.packs.pack_path("demo")).unwrap();
    let meta = reader.meta().unwrap();
    assert_eq!(meta.schema, SCHEMA);
    assert_eq!(meta.files, 5);

    let snapshot = reader.snapshot().unwrap();
    let paths: Vec<&str> = snapshot.index.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(
        paths,
        vec!["README.md", "docs/api.md", "src/auth.rs", "src/lib.rs", "src/main.rs"]
    );

    let readme = snapshot.text_of(&snapshot.index[0]);
    assert!(!readme.contains('\r'));
    assert!(readme.contains("about auth"));
}

#[test]
fn test_build_with_explicit_globs() {
    let env = TestEnv::with_default_alias();

    let outcome = env.services.packs.build(&BuildRequest {
        include: Some(vec!["*.md".to_string()]),
        ..Default::default()
    });
    assert_eq!(outcome_data(&outcome)["files"], 2);
}

#[test]
fn test_build_nothing_to_pack() {
    let env = TestEnv::new(TestRepo::unindexable());
    let repo = env.repo.path().to_string_lossy().into_owned();

    let outcome = env.services.packs.build(&BuildRequest {
        repo: Some(repo),
        ..Default::default()
    });

    assert!(!outcome.ok);
    assert_eq!(outcome.step, "build");
    assert!(outcome.summary.contains("not created"), "{}", outcome.summary);
    assert!(fs::read_dir(env.services.packs.packs_dir())
        .map(|entries| entries.count() == 0)
        .unwrap_or(true));
}

#[test]
fn test_no_repository_resolved() {
    let env = TestEnv::new(TestRepo::small());

    let outcome = env.services.packs.build(&BuildRequest::default());
    assert!(!outcome.ok);
    assert_eq!(outcome.step, "resolve_repo");
    assert!(outcome.data.is_none());
}

#[test]
fn test_repo_path_derives_alias() {
    let env = TestEnv::new(TestRepo::small());
    let repo_dir = env.repo.path().join("src");

    let outcome = env.services.packs.build(&BuildRequest {
        repo: Some(repo_dir.to_string_lossy().into_owned()),
        ..Default::default()
    });

    assert_eq!(outcome_data(&outcome)["alias"], "src");
    assert!(env.services.packs.pack_path("src").exists());
}

#[test]
fn test_append_grows_pack() {
    let env = TestEnv::with_default_alias();

    let outcome = append(&env, "user", "how does auth work?", true);
    let data = outcome_data(&outcome);
    assert!(data["delta_bytes"].as_u64().unwrap() > 0);
    assert_eq!(data["deduplicated"], false);

    let log = PackReader::open(&env.services.packs.pack_path("demo"))
        .unwrap()
        .chat_log()
        .unwrap();
    let records = archive::parse_chat(&log);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].content, "how does auth work?");
    assert_eq!(records[0].cksum.len(), 64);
}

#[test]
fn test_append_dedup() {
    let env = TestEnv::with_default_alias();

    outcome_data(&append(&env, "assistant", "same answer", true));
    let size = fs::metadata(env.services.packs.pack_path("demo")).unwrap().len();

    let again = append(&env, "assistant", "same answer", true);
    let data = outcome_data(&again);
    assert_eq!(data["delta_bytes"], 0);
    assert_eq!(data["deduplicated"], true);
    assert_eq!(
        fs::metadata(env.services.packs.pack_path("demo")).unwrap().len(),
        size
    );

    let forced = append(&env, "assistant", "same answer", false);
    assert!(outcome_data(&forced)["delta_bytes"].as_u64().unwrap() > 0);
}

#[test]
fn test_append_validation_before_io() {
    let env = TestEnv::with_default_alias();

    let bad_role = append(&env, "narrator", "text", true);
    assert!(!bad_role.ok);
    assert_eq!(bad_role.step, "validate");

    let empty = append(&env, "user", "", true);
    assert!(!empty.ok);
    assert_eq!(empty.step, "validate");

    assert!(!env.services.packs.pack_path("demo").exists());
}

#[test]
fn test_build_resets_chat() {
    let env = TestEnv::with_default_alias();

    outcome_data(&append(&env, "user", "remember this", true));
    outcome_data(&env.services.packs.build(&BuildRequest::default()));

    let log = PackReader::open(&env.services.packs.pack_path("demo"))
        .unwrap()
        .chat_log()
        .unwrap();
    assert!(archive::parse_chat(&log).is_empty());
}

#[test]
fn test_export_orders_chat_before_repo() {
    let env = TestEnv::with_default_alias();
    outcome_data(&append(&env, "user", "Where is AUTH configured?", true));

    let out = env.state.path().join("out/payload.txt");
    let outcome = export(&env, "auth", out.clone());
    let data = outcome_data(&outcome);
    assert!(data["hits"].as_u64().unwrap() >= 3);

    let text = fs::read_to_string(&out).unwrap();
    let lines: Vec<serde_json::Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines[0]["type"], "chat");
    assert_eq!(lines[1]["type"], "repo");
    // auth.rs mentions the query most often
    assert_eq!(lines[1]["path"], "src/auth.rs");
    assert!(lines
        .iter()
        .all(|hit| hit["path"] != "target/debug/build.rs"));
    assert_eq!(data["bytes"].as_u64().unwrap() as usize, text.len());
}

#[test]
fn test_export_default_destination() {
    let env = TestEnv::with_default_alias();

    let outcome = env.services.packs.export(&ExportRequest {
        query: "helper".to_string(),
        repo: Some("demo".to_string()),
        max_bytes: None,
        out_file: None,
    });

    let data = outcome_data(&outcome);
    let default_out = env.services.packs.default_export_path();
    assert_eq!(PathBuf::from(data["out_file"].as_str().unwrap()), default_out);
    assert!(default_out.starts_with(env.state.path()));
    assert!(fs::read_to_string(default_out).unwrap().contains("helper"));
}

#[test]
fn test_export_no_match_writes_nothing() {
    let env = TestEnv::with_default_alias();
    let out_dir = env.state.path().join("exports");
    fs::create_dir_all(&out_dir).unwrap();
    let out = out_dir.join("payload.txt");

    let outcome = export(&env, "zebra-quasar", out.clone());

    assert!(!outcome.ok);
    assert_eq!(outcome.step, "export");
    assert!(!out.exists());
    assert_eq!(fs::read_dir(&out_dir).unwrap().count(), 0);
}

#[test]
fn test_export_budget_bounds() {
    let env = TestEnv::with_default_alias();

    for max_bytes in [0, 1023, 10 * 1024 * 1024 + 1] {
        let outcome = env.services.packs.export(&ExportRequest {
            query: "auth".to_string(),
            repo: None,
            max_bytes: Some(max_bytes),
            out_file: None,
        });
        assert!(!outcome.ok, "max_bytes {max_bytes} accepted");
        assert_eq!(outcome.step, "validate");
    }
}
