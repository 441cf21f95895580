//! One-shot `lint_document` tests.

use std::ffi::OsString;
use std::path::Path;

use reds_lint::{LintError, lint_document};
use reds_types::{ConfigurationError, DocumentKey, Severity};

use crate::common::{FakeRunner, Reply, settings, ws};

#[tokio::test]
async fn lints_inside_workspace_root() {
    let runner = FakeRunner::new([Reply::ok(
        "[ERROR] At a.reds:12:5:\nunexpected token\n[WARN] At bar.reds:3:1:\nunused import\n",
    )]);
    let key = DocumentKey::new(ws("a.reds"));

    let outcome = lint_document(&settings(), runner.as_ref(), &key, Some(Path::new("/ws")))
        .await
        .unwrap();

    assert_eq!(outcome.base_dir, Path::new("/ws"));
    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.records[0].file(), "a.reds");
    assert_eq!(outcome.records[0].line(), 12);
    assert_eq!(outcome.records[1].severity(), Severity::Warning);

    let calls = runner.calls();
    assert_eq!(calls[0].args()[2], OsString::from("/ws"));
    assert_eq!(calls[0].cwd(), Some(Path::new("/ws")));
}

#[tokio::test]
async fn loose_file_resolves_against_its_directory() {
    let runner = FakeRunner::clean();
    let key = DocumentKey::new("/mods/loose/main.reds");

    let outcome = lint_document(&settings(), runner.as_ref(), &key, None)
        .await
        .unwrap();

    assert!(outcome.records.is_empty());
    assert_eq!(outcome.base_dir, Path::new("/mods/loose"));
}

#[tokio::test]
async fn missing_blob_path_is_a_configuration_error() {
    let runner = FakeRunner::clean();
    let mut incomplete = settings();
    incomplete.script_blob_path = None;

    let err = lint_document(&incomplete, runner.as_ref(), &DocumentKey::new("/ws/a.reds"), None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LintError::Configuration(ConfigurationError::MissingScriptCachePath)
    ));
    assert_eq!(runner.call_count(), 0);
}

#[tokio::test]
async fn nonzero_exit_is_a_process_error() {
    let runner = FakeRunner::new([Reply::failed(1, "missing dependency")]);

    let err = lint_document(&settings(), runner.as_ref(), &DocumentKey::new("/ws/a.reds"), None)
        .await
        .unwrap_err();

    let LintError::Process(err) = err else {
        panic!("expected a process error, got {err:?}");
    };
    assert_eq!(err.status(), Some(1));
    assert_eq!(err.stderr(), "missing dependency");
}
