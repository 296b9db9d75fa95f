//! File access operations driven through `Services`

use crate::common::{create_test_services, TestRepo};
use kmgr::core::error::KmgrError;
use kmgr::core::types::TextEncoding;
use tempfile::TempDir;

fn setup(files: &[(&str, &str)]) -> (TestRepo, TempDir, std::sync::Arc<kmgr::Services>) {
    let repo = TestRepo::with_files(files);
    let state = TempDir::new().unwrap();
    let services = create_test_services(repo.path(), state.path());
    (repo, state, services)
}

#[test]
fn test_chunk_whole_small_file() {
    let (_repo, _state, services) = setup(&[("hello.txt", "hello")]);

    let chunk = services
        .files
        .chunk("hello.txt", 0, Some(100), Some(TextEncoding::Utf8))
        .unwrap();

    assert_eq!(chunk.bytes, 5);
    assert_eq!(chunk.data, "hello");
    assert_eq!(chunk.next_offset, 5);
    assert!(chunk.eof);
}

#[test]
fn test_chunk_walks_file_in_pieces() {
    let (_repo, _state, services) = setup(&[("abc.txt", "abcdefghij")]);

    let mut offset = 0;
    let mut collected = String::new();
    loop {
        let chunk = services
            .files
            .chunk("abc.txt", offset, Some(4), None)
            .unwrap();
        collected.push_str(&chunk.data);
        if chunk.eof {
            break;
        }
        assert!(chunk.next_offset > offset);
        offset = chunk.next_offset;
    }

    assert_eq!(collected, "abcdefghij");
}

#[test]
fn test_chunk_base64() {
    let (_repo, _state, services) = setup(&[("bin.dat", "\u{0}\u{1}AB")]);

    let chunk = services
        .files
        .chunk("bin.dat", 0, None, Some(TextEncoding::Base64))
        .unwrap();

    assert_eq!(chunk.encoding, TextEncoding::Base64);
    assert_eq!(chunk.data, "AAFBQg==");
}

#[test]
fn test_escape_is_denied() {
    let (_repo, _state, services) = setup(&[("a.txt", "a")]);

    let err = services
        .files
        .chunk("../../etc/passwd", 0, None, None)
        .unwrap_err();
    assert!(matches!(err, KmgrError::AccessDenied(_)), "got {err:?}");

    let err = services.files.stat("/etc/hostname", false).unwrap_err();
    assert!(matches!(err, KmgrError::AccessDenied(_)), "got {err:?}");
}

#[test]
fn test_missing_file_and_directory() {
    let (_repo, _state, services) = setup(&[("dir/a.txt", "a")]);

    let err = services.files.stat("nope.txt", false).unwrap_err();
    assert!(matches!(err, KmgrError::NotFound(_)), "got {err:?}");

    let err = services.files.lines("dir", None, None).unwrap_err();
    assert!(matches!(err, KmgrError::BadRequest(_)), "got {err:?}");
}

#[test]
fn test_lines_window() {
    let (_repo, _state, services) = setup(&[("five.txt", "one\ntwo\r\nthree\nfour\nfive\n")]);

    let window = services.files.lines("five.txt", Some(2), Some(3)).unwrap();
    assert_eq!(window.lines, vec!["two", "three"]);
    assert_eq!(window.start, 2);
    assert_eq!(window.end, 3);
    assert_eq!(window.next_start, 4);
    assert!(!window.eof);

    let tail = services.files.lines("five.txt", Some(4), None).unwrap();
    assert_eq!(tail.lines, vec!["four", "five"]);
    assert!(tail.eof);
}

#[test]
fn test_lines_rejects_bad_range() {
    let (_repo, _state, services) = setup(&[("a.txt", "a\nb\n")]);

    assert!(matches!(
        services.files.lines("a.txt", Some(0), None),
        Err(KmgrError::BadRequest(_))
    ));
    assert!(matches!(
        services.files.lines("a.txt", Some(3), Some(2)),
        Err(KmgrError::BadRequest(_))
    ));
}

#[test]
fn test_search_literal_and_regex() {
    let (_repo, _state, services) = setup(&[(
        "code.rs",
        "fn main() {}\n    let x = a.b;\nfn helper() {}\n",
    )]);

    let literal = services
        .files
        .search("code.rs", "a.b", false, false, None)
        .unwrap();
    assert_eq!(literal.results.len(), 1);
    assert_eq!(literal.results[0].line, 2);
    assert_eq!(literal.results[0].col, 13);
    assert_eq!(literal.results[0].preview, "let x = a.b;");

    let regex = services
        .files
        .search("code.rs", r"^fn \w+", true, false, None)
        .unwrap();
    let lines: Vec<usize> = regex.results.iter().map(|h| h.line).collect();
    assert_eq!(lines, vec![1, 3]);
    assert_eq!(regex.results[1].matched, "fn helper");
}

#[test]
fn test_search_icase_and_max() {
    let (_repo, _state, services) = setup(&[("log.txt", "ERROR one\nerror two\nError three\n")]);

    let result = services
        .files
        .search("log.txt", "error", false, true, Some(2))
        .unwrap();
    assert_eq!(result.max, 2);
    assert_eq!(result.results.len(), 2);

    let none = services
        .files
        .search("log.txt", "error", false, false, None)
        .unwrap();
    assert_eq!(none.results.len(), 1);
    assert_eq!(none.results[0].line, 2);
}

#[test]
fn test_search_invalid_regex() {
    let (_repo, _state, services) = setup(&[("a.txt", "a")]);

    let err = services
        .files
        .search("a.txt", "(unclosed", true, false, None)
        .unwrap_err();
    assert!(matches!(err, KmgrError::BadRequest(_)), "got {err:?}");
}

#[test]
fn test_stat_with_hash() {
    let (_repo, _state, services) = setup(&[("abc.txt", "abc")]);

    let stat = services.files.stat("abc.txt", true).unwrap();
    assert_eq!(stat.size, 3);
    assert_eq!(
        stat.sha256.as_deref(),
        Some("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
    );
    assert!(!stat.mtime.is_empty());

    let plain = services.files.stat("abc.txt", false).unwrap();
    assert!(plain.sha256.is_none());
}
