//! Document lifecycle tests: debounce, single-flight, close and shutdown.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use reds_lint::{Grammar, NoticeLevel};
use reds_types::Severity;

use crate::common::{
    CapturingNotifier, DEBOUNCE, FakeRunner, Reply, advance, manager, settings, settle, ws,
};

const A_ERROR: &str = "[ERROR] At a.reds:1:1:\nfirst\n";

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[tokio::test(start_paused = true)]
async fn burst_of_triggers_runs_once_with_last_context() {
    let runner = FakeRunner::clean();
    let notifier = Arc::new(CapturingNotifier::default());
    let mut manager = manager(settings(), &runner, &notifier);
    let doc = ws("mod/a.reds");

    for _ in 0..4 {
        assert!(manager.on_document_visible(&doc, "redscript"));
        advance(&mut manager, DEBOUNCE / 4).await;
    }
    manager.set_workspace_roots(vec![ws("mod")]);
    manager.on_document_visible(&doc, "redscript");
    settle(&mut manager).await;

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].args()[2], OsString::from(ws("mod")));
    assert_eq!(calls[0].cwd(), Some(ws("mod").as_path()));
}

#[tokio::test(start_paused = true)]
async fn triggers_outside_the_window_run_separately() {
    let runner = FakeRunner::clean();
    let notifier = Arc::new(CapturingNotifier::default());
    let mut manager = manager(settings(), &runner, &notifier);

    manager.on_document_visible(&ws("a.reds"), "redscript");
    settle(&mut manager).await;
    manager.on_document_visible(&ws("a.reds"), "redscript");
    settle(&mut manager).await;

    assert_eq!(runner.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn documents_without_workspace_lint_the_file_itself() {
    let runner = FakeRunner::clean();
    let notifier = Arc::new(CapturingNotifier::default());
    let mut manager = manager(settings(), &runner, &notifier);

    manager.on_document_visible(Path::new("/loose/a.reds"), "redscript");
    settle(&mut manager).await;

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].args(),
        [
            OsString::from("lint"),
            OsString::from("-s"),
            OsString::from("/loose/a.reds"),
            OsString::from("-b"),
            OsString::from("/game/r6/cache/final.redscripts.bk"),
        ]
    );
    assert!(calls[0].cwd().is_none());
}

#[tokio::test(start_paused = true)]
async fn newer_trigger_wins_over_slower_older_run() {
    let runner = FakeRunner::new([
        Reply::ok("[ERROR] At old.reds:1:1:\nstale\n").after(ms(1_000)),
        Reply::ok("[WARN] At new.reds:2:2:\nfresh\n").after(ms(10)),
    ]);
    let notifier = Arc::new(CapturingNotifier::default());
    let mut manager = manager(settings(), &runner, &notifier);

    manager.on_document_visible(&ws("a.reds"), "redscript");
    advance(&mut manager, ms(300)).await;
    assert_eq!(runner.call_count(), 1, "first run should be in flight");

    manager.on_document_visible(&ws("a.reds"), "redscript");
    settle(&mut manager).await;

    assert_eq!(runner.call_count(), 2);
    let snap = manager.snapshot();
    assert!(!snap.contains(&ws("old.reds")));
    let fresh = snap.get(&ws("new.reds")).unwrap();
    assert_eq!(fresh[0].message(), "fresh");
    assert_eq!(fresh[0].severity(), Severity::Warning);
}

#[tokio::test(start_paused = true)]
async fn one_run_publishes_every_reported_file() {
    let runner = FakeRunner::new([Reply::ok(
        "[ERROR] At a.reds:3:4:\nbroken call\n[WARN] At lib/b.reds:1:1:\nunused import\n",
    )]);
    let notifier = Arc::new(CapturingNotifier::default());
    let mut manager = manager(settings(), &runner, &notifier);

    manager.on_document_visible(&ws("a.reds"), "redscript");
    settle(&mut manager).await;

    let snap = manager.snapshot();
    assert_eq!(snap.files().len(), 2);
    assert_eq!(manager.current_diagnostics(&ws("a.reds")).len(), 1);
    assert_eq!(manager.current_diagnostics(&ws("lib/b.reds")).len(), 1);
    assert_eq!(snap.error_count(), 1);
    assert_eq!(snap.warning_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn relative_files_resolve_against_workspace_root() {
    let runner = FakeRunner::new([Reply::ok("[ERROR] At r6/scripts/a.reds:1:1:\nboom\n")]);
    let notifier = Arc::new(CapturingNotifier::default());
    let mut manager = manager(settings(), &runner, &notifier);
    manager.set_workspace_roots(vec![ws("mod")]);

    manager.on_document_visible(&ws("mod/r6/scripts/a.reds"), "redscript");
    settle(&mut manager).await;

    assert!(manager.snapshot().contains(&ws("mod/r6/scripts/a.reds")));
}

#[tokio::test(start_paused = true)]
async fn closing_clears_diagnostics_even_with_run_in_flight() {
    let runner = FakeRunner::new([
        Reply::ok(A_ERROR),
        Reply::ok("[ERROR] At a.reds:2:2:\nsecond\n").after(ms(1_000)),
    ]);
    let notifier = Arc::new(CapturingNotifier::default());
    let mut manager = manager(settings(), &runner, &notifier);
    let doc = ws("a.reds");

    manager.on_document_visible(&doc, "redscript");
    settle(&mut manager).await;
    assert!(manager.snapshot().contains(&doc));

    manager.on_document_visible(&doc, "redscript");
    advance(&mut manager, ms(300)).await;
    assert_eq!(runner.call_count(), 2);

    manager.on_document_closed(&doc);
    assert!(!manager.snapshot().contains(&doc));
    assert!(!manager.is_tracked(&doc));

    settle(&mut manager).await;
    assert!(!manager.snapshot().contains(&doc));
}

#[tokio::test(start_paused = true)]
async fn process_failure_clears_document_and_notifies() {
    let runner = FakeRunner::new([
        Reply::ok(A_ERROR),
        Reply::failed(1, "missing dependency"),
        Reply::ok(A_ERROR),
    ]);
    let notifier = Arc::new(CapturingNotifier::default());
    let mut manager = manager(settings(), &runner, &notifier);
    let doc = ws("a.reds");

    manager.on_document_visible(&doc, "redscript");
    settle(&mut manager).await;
    assert_eq!(manager.current_diagnostics(&doc).len(), 1);

    manager.on_document_visible(&doc, "redscript");
    settle(&mut manager).await;
    assert!(manager.current_diagnostics(&doc).is_empty());

    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].0, NoticeLevel::Error);
    assert!(notices[0].1.contains("missing dependency"));

    // The pipeline survives and lints again on the next trigger.
    assert!(manager.is_tracked(&doc));
    manager.on_document_visible(&doc, "redscript");
    settle(&mut manager).await;
    assert_eq!(manager.current_diagnostics(&doc).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn unstartable_compiler_clears_document_and_notifies() {
    let runner = FakeRunner::new([Reply::ok(A_ERROR), Reply::unspawnable()]);
    let notifier = Arc::new(CapturingNotifier::default());
    let mut manager = manager(settings(), &runner, &notifier);
    let doc = ws("a.reds");

    manager.on_document_visible(&doc, "redscript");
    settle(&mut manager).await;
    assert!(manager.snapshot().contains(&doc));

    manager.on_document_visible(&doc, "redscript");
    settle(&mut manager).await;

    assert!(!manager.snapshot().contains(&doc));
    assert!(manager.is_tracked(&doc));
    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].0, NoticeLevel::Error);
    assert!(notices[0].1.contains("failed to start /opt/redscript/redscript-cli"));
}

#[tokio::test(start_paused = true)]
async fn missing_configuration_never_spawns_and_keeps_published_set() {
    let runner = FakeRunner::new([Reply::ok(A_ERROR)]);
    let notifier = Arc::new(CapturingNotifier::default());
    let mut manager = manager(settings(), &runner, &notifier);
    let doc = ws("a.reds");

    manager.on_document_visible(&doc, "redscript");
    settle(&mut manager).await;
    assert_eq!(runner.call_count(), 1);

    let mut broken = settings();
    broken.compiler_path = None;
    manager.reconfigure(broken);
    settle(&mut manager).await;

    assert_eq!(runner.call_count(), 1);
    assert!(manager.snapshot().contains(&doc));
    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].1.contains("compiler_path"));

    // Surfaced once per attempt, not retried on its own.
    settle(&mut manager).await;
    assert_eq!(notifier.notices().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn ineligible_documents_never_reach_the_compiler() {
    let runner = FakeRunner::clean();
    let notifier = Arc::new(CapturingNotifier::default());
    let mut manager = manager(settings(), &runner, &notifier);

    assert!(!manager.on_document_visible(&ws("notes.txt"), "plaintext"));
    settle(&mut manager).await;

    assert_eq!(runner.call_count(), 0);
    assert_eq!(manager.tracked_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn legacy_grammar_reads_stdout() {
    let runner = FakeRunner::new([Reply::ok("[ERROR] At a.reds:1:1:\nignored\n")
        .with_stdout("Compilation error at a.reds:4:2:\nundefined symbol\n")]);
    let notifier = Arc::new(CapturingNotifier::default());
    let mut legacy = settings();
    legacy.lint.grammar = Grammar::Legacy;
    let mut manager = manager(legacy, &runner, &notifier);

    manager.on_document_visible(&ws("a.reds"), "redscript");
    settle(&mut manager).await;

    let records = manager.current_diagnostics(&ws("a.reds"));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].message(), "undefined symbol");
    assert_eq!(records[0].severity(), Severity::Error);
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_work_and_clears_everything() {
    let runner = FakeRunner::new([
        Reply::ok("[ERROR] At a.reds:1:1:\ne\n[WARN] At b.reds:1:1:\nw\n"),
        Reply::ok(A_ERROR).after(ms(1_000)),
    ]);
    let notifier = Arc::new(CapturingNotifier::default());
    let mut manager = manager(settings(), &runner, &notifier);

    manager.on_document_visible(&ws("a.reds"), "redscript");
    settle(&mut manager).await;
    manager.on_document_visible(&ws("b.reds"), "redscript");
    advance(&mut manager, ms(300)).await;
    manager.take_changes();

    manager.shutdown();
    assert_eq!(manager.tracked_count(), 0);
    assert!(manager.snapshot().is_empty());
    let cleared: Vec<PathBuf> = manager
        .take_changes()
        .into_iter()
        .filter(|(_, items)| items.is_empty())
        .map(|(path, _)| path)
        .collect();
    assert_eq!(cleared, [ws("a.reds"), ws("b.reds")]);

    settle(&mut manager).await;
    assert!(manager.snapshot().is_empty());
}
