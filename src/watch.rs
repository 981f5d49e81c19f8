//! # Watch Service - live render plans for a document on disk
//!
//! [WatchService] stands in for a host editor's change notifications when the document is a
//! plain file. It watches the file's directory with `notify`, turns file events into
//! [HostSignal]s, and runs [run_refresh_loop] on a dedicated single-threaded runtime. Each
//! refresh parses the current file contents against the shared [AnnotationSession] and sends
//! an [Event::Plan] to the host.
//!
//! ```rust,no_run
//! use marginalia_core::{
//!     config::TomlSettingsStore, debounce::DebouncePolicy, event::Event,
//!     session::AnnotationSession, watch::WatchService,
//! };
//! use parking_lot::Mutex;
//! use std::{path::PathBuf, sync::{mpsc::channel, Arc}};
//!
//! let session = Arc::new(Mutex::new(AnnotationSession::load(TomlSettingsStore::new(
//!     "settings.toml",
//! ))));
//! let (tx, rx) = channel::<Event>();
//! let service = WatchService::new(
//!     PathBuf::from("notes.md"),
//!     session.clone(),
//!     DebouncePolicy::default(),
//!     tx,
//! )?;
//! for event in rx {
//!     if let Event::Plan(plan) = event {
//!         println!("{} section(s)", plan.sections().len());
//!     }
//! }
//! service.shutdown()?;
//! # Ok::<(), marginalia_core::MarginaliaError>(())
//! ```
//!
//! ## Threading Model
//!
//! - The `notify` watcher thread only forwards signals into an unbounded channel.
//! - The refresh thread owns a current-thread tokio runtime; parsing and plan building run
//!   there, one refresh at a time.
//! - The session is shared behind a `parking_lot::Mutex` so the host thread can keep
//!   applying [crate::view_state::ViewAction]s while the service runs.

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use std::{
    path::{Path, PathBuf},
    sync::{mpsc::Sender, Arc},
    thread::JoinHandle,
};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

use crate::{
    config::SettingsStore,
    debounce::DebouncePolicy,
    error::MarginaliaError,
    event::{run_refresh_loop, Event, HostSignal},
    host::FileDocumentSource,
    session::AnnotationSession,
};

pub struct WatchService {
    document: PathBuf,
    watcher: Option<RecommendedWatcher>,
    signal_tx: UnboundedSender<HostSignal>,
    refresh_handle: Option<JoinHandle<usize>>,
}

/// Resolve `document` to the path `notify` will report for it.
fn watch_target(document: &Path) -> Result<(PathBuf, PathBuf), MarginaliaError> {
    let file_name = document.file_name().ok_or_else(|| {
        MarginaliaError::NotFound(format!("{document:?} does not name a file"))
    })?;
    let parent = match document.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir()?,
    };
    let parent = parent.canonicalize()?;
    let target = parent.join(file_name);
    Ok((parent, target))
}

fn signal_for(kind: &EventKind) -> Option<HostSignal> {
    match kind {
        EventKind::Modify(_) => Some(HostSignal::DocumentChanged),
        EventKind::Create(_) | EventKind::Remove(_) => Some(HostSignal::ActiveDocumentChanged),
        _ => None,
    }
}

impl WatchService {
    /// Start watching `document`. An initial plan is sent before this returns.
    pub fn new<S>(
        document: PathBuf,
        session: Arc<Mutex<AnnotationSession<S>>>,
        policy: DebouncePolicy,
        event_tx: Sender<Event>,
    ) -> Result<Self, MarginaliaError>
    where
        S: SettingsStore + 'static,
    {
        let (watch_dir, target) = watch_target(&document)?;
        let source = FileDocumentSource::new(&target);
        let (signal_tx, signal_rx) = unbounded_channel::<HostSignal>();

        let initial = session.lock().render_plan(&source);
        event_tx
            .send(Event::Plan(initial))
            .map_err(|_| MarginaliaError::Watch("event receiver dropped".to_string()))?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        let refresh_session = session.clone();
        let refresh_handle = std::thread::spawn(move || {
            runtime.block_on(run_refresh_loop(signal_rx, policy, move || {
                let plan = refresh_session.lock().render_plan(&source);
                if let Err(e) = event_tx.send(Event::Plan(plan)) {
                    tracing::debug!("[WatchService] plan receiver dropped: {e}");
                }
            }))
        });

        let watcher_tx = signal_tx.clone();
        let watched = target.clone();
        let mut watcher =
            notify::recommended_watcher(move |result: notify::Result<notify::Event>| {
                match result {
                    Ok(event) => {
                        if !event.paths.iter().any(|path| path == &watched) {
                            return;
                        }
                        if let Some(signal) = signal_for(&event.kind) {
                            if watcher_tx.send(signal).is_err() {
                                tracing::debug!("[WatchService] refresh loop already stopped");
                            }
                        }
                    }
                    Err(e) => tracing::warn!("[WatchService] watch error: {e}"),
                }
            })?;
        watcher.watch(&watch_dir, RecursiveMode::NonRecursive)?;
        tracing::info!("Watching {:?} (debounce {:?})", target, policy.delay);

        Ok(WatchService {
            document: target,
            watcher: Some(watcher),
            signal_tx,
            refresh_handle: Some(refresh_handle),
        })
    }

    pub fn document(&self) -> &Path {
        &self.document
    }

    /// Inject a signal as if it came from the file watcher.
    pub fn notify(&self, signal: HostSignal) -> Result<(), MarginaliaError> {
        self.signal_tx
            .send(signal)
            .map_err(|_| MarginaliaError::Watch("refresh loop has stopped".to_string()))
    }

    fn stop(&mut self) -> Result<usize, MarginaliaError> {
        drop(self.watcher.take());
        let Some(handle) = self.refresh_handle.take() else {
            return Ok(0);
        };
        // The loop may already have exited on its own; a closed channel is fine here.
        let _ = self.signal_tx.send(HostSignal::Shutdown);
        handle
            .join()
            .map_err(|_| MarginaliaError::Watch("refresh thread panicked".to_string()))
    }

    /// Stop watching and wait for the refresh loop to finish. Returns the number of
    /// debounced refreshes that ran.
    pub fn shutdown(mut self) -> Result<usize, MarginaliaError> {
        let refreshes = self.stop()?;
        tracing::info!("Stopped watching {:?} after {refreshes} refresh(es)", self.document);
        Ok(refreshes)
    }
}

impl Drop for WatchService {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::warn!("[WatchService] {e}");
        }
    }
}
