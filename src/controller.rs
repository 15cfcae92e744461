//! Grid view controller: turns user triggers into backend requests and
//! backend snapshots into the current view.
//!
//! Requests run on short-lived worker threads and report back over a
//! channel that the UI loop drains. Every request carries a sequence number;
//! a response is applied only if no newer request was issued after it, so
//! the view follows the latest request rather than the latest completion.

use crate::backend::YardBackend;
use crate::config::{GridConfig, ViewerConfig};
use crate::errors::{YardError, YardResult};
use crate::snapshot::Snapshot;
use crate::step_log::StepHistory;
use crate::view::{render_grid, GridView};
use log::{debug, error, info};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub const MANIFEST_FALLBACK_NAME: &str = "manifest.txt";
pub const LOG_FALLBACK_NAME: &str = "operation_log.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Read the current snapshot
    Current,
    /// Advance one step and read the result
    Next,
}

impl RequestKind {
    fn failure_context(self) -> &'static str {
        match self {
            RequestKind::Current => "Error loading grid",
            RequestKind::Next => "Error advancing step",
        }
    }
}

/// Monotonic request numbering
#[derive(Debug, Default)]
pub struct RequestSequencer {
    issued: u64,
}

impl RequestSequencer {
    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    pub fn latest(&self) -> u64 {
        self.issued
    }

    /// A response is stale once a newer request exists
    pub fn is_stale(&self, seq: u64) -> bool {
        seq < self.issued
    }
}

/// Requests that leave the yard view alone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    DownloadManifest,
    /// Fetch the operation log; the session ends afterwards
    Close,
    Note(String),
}

impl Action {
    fn failure_context(&self) -> &'static str {
        match self {
            Action::DownloadManifest => "Error downloading manifest",
            Action::Close => "Error closing session",
            Action::Note(_) => "Error logging note",
        }
    }
}

enum ActionDone {
    Saved(PathBuf),
    Noted,
}

struct ActionCompletion {
    action: Action,
    outcome: YardResult<ActionDone>,
}

fn perform(backend: &dyn YardBackend, download_dir: &Path, action: &Action) -> YardResult<ActionDone> {
    match action {
        Action::DownloadManifest => backend
            .download_manifest()
            .and_then(|attachment| attachment.save_into(download_dir, MANIFEST_FALLBACK_NAME))
            .map(ActionDone::Saved),
        Action::Close => backend
            .close()
            .and_then(|attachment| attachment.save_into(download_dir, LOG_FALLBACK_NAME))
            .map(ActionDone::Saved),
        Action::Note(message) => backend.post_log_message(message).map(|_| ActionDone::Noted),
    }
}

/// What happened to one completed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOutcome {
    Rendered { seq: u64 },
    Stale { seq: u64 },
    Failed { seq: u64 },
}

struct Completion {
    seq: u64,
    kind: RequestKind,
    outcome: YardResult<Snapshot>,
}

/// Rebuild the yard view and the step history from one snapshot
pub fn render_snapshot(snapshot: &Snapshot, grid: &GridConfig, history: &mut StepHistory) -> GridView {
    history.rebuild(snapshot);
    render_grid(snapshot, grid)
}

pub struct GridViewController {
    backend: Arc<dyn YardBackend>,
    grid_config: GridConfig,
    download_dir: PathBuf,
    sequencer: RequestSequencer,
    history: StepHistory,
    view: GridView,
    update_status: Option<String>,
    rendered_seq: u64,
    in_flight: usize,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    actions_in_flight: usize,
    action_tx: Sender<ActionCompletion>,
    action_rx: Receiver<ActionCompletion>,
    closed: bool,
}

impl GridViewController {
    pub fn new(backend: Arc<dyn YardBackend>, config: &ViewerConfig) -> Self {
        let (tx, rx) = mpsc::channel();
        let (action_tx, action_rx) = mpsc::channel();
        let mut history = StepHistory::new();
        let view = render_snapshot(&Snapshot::default(), &config.grid, &mut history);
        Self {
            backend,
            grid_config: config.grid.clone(),
            download_dir: config.display.download_dir.clone(),
            sequencer: RequestSequencer::default(),
            history,
            view,
            update_status: None,
            rendered_seq: 0,
            in_flight: 0,
            tx,
            rx,
            actions_in_flight: 0,
            action_tx,
            action_rx,
            closed: false,
        }
    }

    /// First paint: request the current snapshot
    pub fn initialize(&mut self) -> u64 {
        info!("Initializing yard view");
        self.fetch_current_state()
    }

    pub fn fetch_current_state(&mut self) -> u64 {
        self.dispatch(RequestKind::Current)
    }

    pub fn advance_step(&mut self) -> u64 {
        self.dispatch(RequestKind::Next)
    }

    /// Start a request on a worker thread and return its sequence number
    pub fn dispatch(&mut self, kind: RequestKind) -> u64 {
        let seq = self.sequencer.issue();
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();

        let spawned = thread::Builder::new()
            .name(format!("yard-request-{}", seq))
            .spawn(move || {
                let outcome = match kind {
                    RequestKind::Current => backend.current_grid(),
                    RequestKind::Next => backend.next_grid(),
                };
                // The receiver is gone only when the controller was dropped
                let _ = tx.send(Completion { seq, kind, outcome });
            });

        match spawned {
            Ok(_) => {
                debug!("Dispatched {:?} request #{}", kind, seq);
                self.in_flight += 1;
            }
            Err(e) => error!("{}: could not start request thread: {}", kind.failure_context(), e),
        }
        seq
    }

    /// Run a request on the calling thread and apply the result
    pub fn fetch_blocking(&mut self, kind: RequestKind) -> YardResult<()> {
        let seq = self.sequencer.issue();
        let outcome = match kind {
            RequestKind::Current => self.backend.current_grid(),
            RequestKind::Next => self.backend.next_grid(),
        };
        let snapshot = outcome.map_err(|e| log_failure(kind.failure_context(), e))?;
        self.apply(seq, &snapshot);
        Ok(())
    }

    /// Apply every response that has arrived; true if the view changed
    pub fn poll_responses(&mut self) -> bool {
        let mut changed = false;
        while let Ok(completion) = self.rx.try_recv() {
            if let ResponseOutcome::Rendered { .. } = self.complete(completion) {
                changed = true;
            }
        }
        while let Ok(ActionCompletion { action, outcome }) = self.action_rx.try_recv() {
            self.actions_in_flight = self.actions_in_flight.saturating_sub(1);
            // Failures are logged in finish_action
            if self.finish_action(&action, outcome).is_ok() {
                changed = true;
            }
        }
        changed
    }

    /// Wait up to `timeout` for the next response and apply it
    pub fn wait_for_response(&mut self, timeout: Duration) -> Option<ResponseOutcome> {
        match self.rx.recv_timeout(timeout) {
            Ok(completion) => Some(self.complete(completion)),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    fn complete(&mut self, completion: Completion) -> ResponseOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);
        let Completion { seq, kind, outcome } = completion;

        match outcome {
            Err(e) => {
                error!("{}: {}", kind.failure_context(), e);
                ResponseOutcome::Failed { seq }
            }
            Ok(_) if self.sequencer.is_stale(seq) => {
                debug!(
                    "Discarding response #{} ({:?}); request #{} is newer",
                    seq,
                    kind,
                    self.sequencer.latest()
                );
                ResponseOutcome::Stale { seq }
            }
            Ok(snapshot) => {
                self.apply(seq, &snapshot);
                ResponseOutcome::Rendered { seq }
            }
        }
    }

    fn apply(&mut self, seq: u64, snapshot: &Snapshot) {
        self.view = render_snapshot(snapshot, &self.grid_config, &mut self.history);
        self.rendered_seq = seq;
        debug!(
            "Rendered response #{}: {} ({} log entries)",
            seq,
            self.view.status.text(),
            self.history.len()
        );
    }

    /// Start a download or note on a worker thread; the result lands in `poll_responses`
    pub fn start_action(&mut self, action: Action) -> bool {
        let action = match action {
            Action::Note(message) => match message.trim() {
                "" => return false,
                trimmed => Action::Note(trimmed.to_string()),
            },
            other => other,
        };

        let backend = Arc::clone(&self.backend);
        let download_dir = self.download_dir.clone();
        let tx = self.action_tx.clone();
        let context = action.failure_context();

        let spawned = thread::Builder::new()
            .name("yard-action".to_string())
            .spawn(move || {
                let outcome = perform(backend.as_ref(), &download_dir, &action);
                let _ = tx.send(ActionCompletion { action, outcome });
            });

        match spawned {
            Ok(_) => {
                self.actions_in_flight += 1;
                true
            }
            Err(e) => {
                error!("{}: could not start request thread: {}", context, e);
                false
            }
        }
    }

    fn run_action(&mut self, action: Action) -> YardResult<Option<PathBuf>> {
        let outcome = perform(self.backend.as_ref(), &self.download_dir, &action);
        self.finish_action(&action, outcome)
    }

    fn finish_action(&mut self, action: &Action, outcome: YardResult<ActionDone>) -> YardResult<Option<PathBuf>> {
        let path = match outcome.map_err(|e| log_failure(action.failure_context(), e))? {
            ActionDone::Saved(path) => Some(path),
            ActionDone::Noted => None,
        };
        let status = match (action, &path) {
            (Action::DownloadManifest, Some(path)) => format!("Manifest downloaded: {}", path.display()),
            (Action::Close, Some(path)) => {
                self.closed = true;
                format!("Log downloaded: {}", path.display())
            }
            _ => "Note added to log".to_string(),
        };
        info!("{}", status);
        self.update_status = Some(status);
        Ok(path)
    }

    /// Fetch the outbound manifest into the download directory
    pub fn download_manifest(&mut self) -> YardResult<PathBuf> {
        self.run_action(Action::DownloadManifest)
            .map(Option::unwrap_or_default)
    }

    /// Fetch the operation log; the caller ends the session afterwards
    pub fn close_app(&mut self) -> YardResult<PathBuf> {
        self.run_action(Action::Close).map(Option::unwrap_or_default)
    }

    /// Append an operator note to the backend's operation log
    pub fn post_note(&mut self, message: &str) -> YardResult<()> {
        let message = message.trim();
        if message.is_empty() {
            return Ok(());
        }
        self.run_action(Action::Note(message.to_string())).map(|_| ())
    }

    pub fn view(&self) -> &GridView {
        &self.view
    }

    pub fn history(&self) -> &StepHistory {
        &self.history
    }

    pub fn update_status(&self) -> Option<&str> {
        self.update_status.as_deref()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn actions_in_flight(&self) -> usize {
        self.actions_in_flight
    }

    /// Whether the operation log was fetched and the session is over
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Sequence number of the response currently on screen (0 before the first)
    pub fn rendered_seq(&self) -> u64 {
        self.rendered_seq
    }

    pub fn latest_seq(&self) -> u64 {
        self.sequencer.latest()
    }
}

fn log_failure(context: &str, e: YardError) -> YardError {
    error!("{}: {}", context, e);
    e
}
