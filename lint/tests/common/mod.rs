//! Shared test utilities and fixtures
//!
//! A scripted process runner and a capturing notifier so pipeline behaviour
//! can be observed without a real compiler.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reds_lint::{
    CommandLine, LintManager, LintSettings, NoticeLevel, Notifier, ProcessError, ProcessOutput,
    ProcessRunner, RunFut,
};

/// One scripted compiler reply.
#[derive(Debug, Clone)]
pub struct Reply {
    pub delay: Duration,
    pub stdout: String,
    pub stderr: String,
    /// `Some(code)` makes the run fail with that exit status.
    pub exit: Option<i32>,
    /// The program could not be started at all.
    pub unspawnable: bool,
}

impl Reply {
    pub fn ok(stderr: &str) -> Self {
        Self {
            delay: Duration::ZERO,
            stdout: String::new(),
            stderr: stderr.to_string(),
            exit: None,
            unspawnable: false,
        }
    }

    pub fn failed(code: i32, stderr: &str) -> Self {
        Self {
            exit: Some(code),
            ..Self::ok(stderr)
        }
    }

    pub fn unspawnable() -> Self {
        Self {
            unspawnable: true,
            ..Self::ok("")
        }
    }

    pub fn with_stdout(mut self, stdout: &str) -> Self {
        self.stdout = stdout.to_string();
        self
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Runner that answers from a queue of [`Reply`]s and records every command
/// it was asked to run. An empty queue answers with clean output.
#[derive(Default)]
pub struct FakeRunner {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<CommandLine>>,
}

impl FakeRunner {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn clean() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, reply: Reply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn calls(&self) -> Vec<CommandLine> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl ProcessRunner for FakeRunner {
    fn run<'a>(&'a self, command: &'a CommandLine) -> RunFut<'a> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(command.clone());
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Reply::ok(""));
            tokio::time::sleep(reply.delay).await;
            if reply.unspawnable {
                return Err(ProcessError::Spawn {
                    program: command.program().display().to_string(),
                    source: io::ErrorKind::NotFound.into(),
                });
            }
            match reply.exit {
                None => Ok(ProcessOutput {
                    stdout: reply.stdout,
                    stderr: reply.stderr,
                }),
                Some(code) => Err(ProcessError::Failed {
                    program: command.program().display().to_string(),
                    status: Some(code),
                    stderr: reply.stderr,
                }),
            }
        })
    }
}

/// Notifier that keeps every notice for later assertions.
#[derive(Default)]
pub struct CapturingNotifier {
    notices: Mutex<Vec<(NoticeLevel, String)>>,
}

impl CapturingNotifier {
    pub fn notices(&self) -> Vec<(NoticeLevel, String)> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for CapturingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        self.notices
            .lock()
            .unwrap()
            .push((level, message.to_string()));
    }
}

pub const DEBOUNCE: Duration = Duration::from_millis(200);

pub fn settings() -> LintSettings {
    LintSettings {
        compiler_path: Some(PathBuf::from("/opt/redscript/redscript-cli")),
        script_blob_path: Some(PathBuf::from("/game/r6/cache/final.redscripts.bk")),
        ..LintSettings::default()
    }
}

pub fn manager(
    settings: LintSettings,
    runner: &Arc<FakeRunner>,
    notifier: &Arc<CapturingNotifier>,
) -> LintManager {
    LintManager::new(settings, runner.clone(), notifier.clone())
}

/// Let the paused clock run for `duration`, then apply every result.
pub async fn advance(manager: &mut LintManager, duration: Duration) {
    tokio::time::sleep(duration).await;
    manager.poll_events(usize::MAX);
}

/// Long enough for any debounce plus scripted delay used in the suite.
pub async fn settle(manager: &mut LintManager) {
    advance(manager, Duration::from_secs(10)).await;
}

pub fn ws(path: &str) -> PathBuf {
    Path::new("/ws").join(path)
}
