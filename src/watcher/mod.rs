use std::io;

use inotify::{EventMask, Inotify, WatchMask};
use tokio::sync::mpsc::Sender;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Create { name: String, base_path: String },
    Delete { name: String, base_path: String },
}

impl WatchEvent {
    /// Full path of the node this event is about
    pub fn path(&self) -> String {
        match self {
            WatchEvent::Create { name, base_path } | WatchEvent::Delete { name, base_path } => {
                format!("{base_path}/{name}")
            }
        }
    }
}

/// Watch for nodes being created or deleted in the given directories,
/// sending [WatchEvent] to the given channel. Blocks until the receiving
/// side of the channel is dropped.
pub fn watch(paths: Vec<String>, tx: Sender<WatchEvent>) -> io::Result<()> {
    let mut inotify = Inotify::init()?;

    let mut watches = Vec::with_capacity(paths.len());
    for path in paths.iter() {
        let descriptor = inotify
            .watches()
            .add(path, WatchMask::CREATE | WatchMask::DELETE)?;
        log::debug!("Watching {path} for device nodes");
        watches.push((descriptor, path.clone()));
    }

    // Listen for watch events
    let mut buffer = [0u8; 4096];
    loop {
        let events = inotify.read_events_blocking(&mut buffer)?;

        for event in events {
            let Some(name) = event.name.and_then(|name| name.to_str()) else {
                continue;
            };
            let Some((_, base_path)) = watches.iter().find(|(wd, _)| *wd == event.wd) else {
                continue;
            };
            let name = name.to_string();
            let base_path = base_path.clone();

            let value = if event.mask.contains(EventMask::CREATE) {
                log::debug!("inotify CREATE: {base_path}/{name}");
                WatchEvent::Create { name, base_path }
            } else if event.mask.contains(EventMask::DELETE) {
                log::debug!("inotify DELETE: {base_path}/{name}");
                WatchEvent::Delete { name, base_path }
            } else {
                continue;
            };

            if tx.blocking_send(value).is_err() {
                log::debug!("Watch receiver closed, stopping watcher");
                return Ok(());
            }
        }
    }
}
