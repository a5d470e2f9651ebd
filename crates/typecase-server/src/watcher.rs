//! File watching for rebuild-on-change.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

/// A source change, classified by what part of the pipeline it feeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// An HTML page changed
    Page(PathBuf),

    /// A stylesheet changed
    Style(PathBuf),

    /// A script changed
    Script(PathBuf),

    /// Anything else in the source tree changed (fonts, images, ...)
    Asset(PathBuf),
}

impl WatchEvent {
    pub fn path(&self) -> &Path {
        match self {
            WatchEvent::Page(p)
            | WatchEvent::Style(p)
            | WatchEvent::Script(p)
            | WatchEvent::Asset(p) => p,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            WatchEvent::Page(_) => "page",
            WatchEvent::Style(_) => "style",
            WatchEvent::Script(_) => "script",
            WatchEvent::Asset(_) => "asset",
        }
    }
}

/// File watcher for detecting source changes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Create a new file watcher for the given paths.
    ///
    /// Returns the watcher and a channel to receive events.
    pub fn new(
        paths: &[PathBuf],
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), std::io::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        for path in paths {
            if path.exists() {
                watcher
                    .watch(path, RecursiveMode::Recursive)
                    .map_err(std::io::Error::other)?;
            }
        }

        // Forward events onto the async channel, debouncing bursts.
        std::thread::spawn(move || {
            let mut last_event_time = std::time::Instant::now();
            let debounce_duration = Duration::from_millis(100);

            while let Ok(event) = sync_rx.recv() {
                let now = std::time::Instant::now();
                if now.duration_since(last_event_time) < debounce_duration {
                    continue;
                }
                last_event_time = now;

                for path in event.paths {
                    if let Some(e) = classify_event(&path, &event.kind) {
                        let _ = async_tx.blocking_send(e);
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Classify a notify event into a WatchEvent.
fn classify_event(path: &Path, kind: &notify::EventKind) -> Option<WatchEvent> {
    use notify::EventKind;

    if !matches!(
        kind,
        EventKind::Create(_) | EventKind::Remove(_) | EventKind::Modify(_)
    ) {
        return None;
    }

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let event = match ext {
        "html" => WatchEvent::Page(path.to_path_buf()),
        "scss" | "sass" | "css" => WatchEvent::Style(path.to_path_buf()),
        "js" => WatchEvent::Script(path.to_path_buf()),
        _ => WatchEvent::Asset(path.to_path_buf()),
    };
    Some(event)
}
