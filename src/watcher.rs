use notify::{recommended_watcher, EventKind, RecursiveMode, Result as NotifyResult, Watcher};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

/// Quiet period before a burst of file events turns into one reload
const DEBOUNCE_MS: u64 = 500;

/// How often the watch loop checks for shutdown
const POLL_MS: u64 = 200;

/// Event emitted when commands.json needs to be reloaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandsReloadEvent {
    Reload,
}

/// Whether a notify event is a create/modify of `file_name`.
fn is_target_event(event: &notify::Event, file_name: &str) -> bool {
    let touches_target = event.paths.iter().any(|path| {
        path.file_name()
            .and_then(|name| name.to_str())
            .map(|name| name == file_name)
            .unwrap_or(false)
    });
    touches_target && matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
}

/// Watches commands.json and emits debounced reload events.
///
/// The receiver stays connected for as long as the watcher is alive, even
/// after the watch thread gives up, so consumers blocking on it keep running.
pub struct CommandsWatcher {
    path: PathBuf,
    tx: Option<Sender<CommandsReloadEvent>>,
    _keepalive: Sender<CommandsReloadEvent>,
    stop: Arc<AtomicBool>,
    watcher_thread: Option<thread::JoinHandle<()>>,
}

impl CommandsWatcher {
    /// Returns the watcher and the receiver its reload events arrive on.
    pub fn new(commands_path: impl Into<PathBuf>) -> (Self, Receiver<CommandsReloadEvent>) {
        let (tx, rx) = channel();
        let watcher = CommandsWatcher {
            path: commands_path.into(),
            _keepalive: tx.clone(),
            tx: Some(tx),
            stop: Arc::new(AtomicBool::new(false)),
            watcher_thread: None,
        };
        (watcher, rx)
    }

    /// Start watching on a background thread.
    pub fn start(&mut self) -> NotifyResult<()> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| std::io::Error::other("watcher already started"))?;

        let path = self.path.clone();
        let stop = Arc::clone(&self.stop);
        let thread_handle = thread::Builder::new()
            .name("commands-watcher".to_string())
            .spawn(move || {
                if let Err(e) = Self::watch_loop(&path, tx, stop) {
                    warn!(error = %e, watcher = "commands", "Commands watcher error");
                }
            })?;

        self.watcher_thread = Some(thread_handle);
        Ok(())
    }

    fn watch_loop(
        commands_path: &Path,
        tx: Sender<CommandsReloadEvent>,
        stop: Arc<AtomicBool>,
    ) -> NotifyResult<()> {
        let file_name = commands_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("commands.json")
            .to_string();
        let watch_path = commands_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let debounce_active = Arc::new(AtomicBool::new(false));

        let (watch_tx, watch_rx) = channel();
        let mut watcher = recommended_watcher(move |res: notify::Result<notify::Event>| {
            let _ = watch_tx.send(res);
        })?;
        watcher.watch(watch_path, RecursiveMode::NonRecursive)?;

        info!(
            path = %watch_path.display(),
            target = %file_name,
            "Commands watcher started"
        );

        while !stop.load(Ordering::Acquire) {
            match watch_rx.recv_timeout(Duration::from_millis(POLL_MS)) {
                Ok(Ok(event)) => {
                    if !is_target_event(&event, &file_name) {
                        continue;
                    }
                    // Only the first event of a burst schedules a reload
                    if debounce_active.swap(true, Ordering::AcqRel) {
                        continue;
                    }

                    let tx = tx.clone();
                    let debounce_flag = Arc::clone(&debounce_active);
                    let file_name = file_name.clone();
                    thread::spawn(move || {
                        thread::sleep(Duration::from_millis(DEBOUNCE_MS));
                        debounce_flag.store(false, Ordering::Release);
                        info!(file = %file_name, "Commands file changed, emitting reload event");
                        let _ = tx.send(CommandsReloadEvent::Reload);
                    });
                }
                Ok(Err(e)) => {
                    warn!(error = %e, watcher = "commands", "File watcher error");
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        debug!(watcher = "commands", "Commands watcher shutting down");
        Ok(())
    }
}

impl Drop for CommandsWatcher {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.watcher_thread.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};
    use std::fs;
    use tempfile::tempdir;

    fn event(kind: EventKind, path: &str) -> notify::Event {
        notify::Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn target_event_filters_by_name_and_kind() {
        assert!(is_target_event(
            &event(EventKind::Modify(ModifyKind::Any), "/x/commands.json"),
            "commands.json"
        ));
        assert!(is_target_event(
            &event(EventKind::Create(CreateKind::File), "/x/commands.json"),
            "commands.json"
        ));
        assert!(!is_target_event(
            &event(EventKind::Remove(RemoveKind::File), "/x/commands.json"),
            "commands.json"
        ));
        assert!(!is_target_event(
            &event(EventKind::Modify(ModifyKind::Any), "/x/vault.json"),
            "commands.json"
        ));
    }

    #[test]
    fn start_twice_fails() {
        let dir = tempdir().unwrap();
        let (mut watcher, _rx) = CommandsWatcher::new(dir.path().join("commands.json"));
        watcher.start().unwrap();
        assert!(watcher.start().is_err());
    }

    #[test]
    fn receiver_stays_open_when_watching_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gone").join("commands.json");

        let (mut watcher, rx) = CommandsWatcher::new(&path);
        watcher.start().unwrap();
        thread::sleep(Duration::from_millis(100));

        assert_eq!(
            rx.recv_timeout(Duration::from_millis(300)),
            Err(RecvTimeoutError::Timeout)
        );
        drop(watcher);
        assert_eq!(rx.recv(), Err(std::sync::mpsc::RecvError));
    }

    #[test]
    fn writing_the_file_emits_one_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("commands.json");
        fs::write(&path, "[]").unwrap();

        let (mut watcher, rx) = CommandsWatcher::new(&path);
        watcher.start().unwrap();
        // Give the backend a moment to register the watch
        thread::sleep(Duration::from_millis(200));

        fs::write(&path, r#"[{"id": "a", "action": "x"}]"#).unwrap();
        fs::write(&path, r#"[{"id": "b", "action": "x"}]"#).unwrap();

        assert_eq!(
            rx.recv_timeout(Duration::from_secs(5)).unwrap(),
            CommandsReloadEvent::Reload
        );
        assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
    }
}
