//! Development server for typecase sites.
//!
//! Serves the built output, watches the source tree, rebuilds on
//! change, and live-reloads connected browsers over WebSocket.

pub mod livereload;
pub mod server;
pub mod watcher;

pub use livereload::{reload_client_script, ReloadHub, ReloadMessage};
pub use server::{DevServer, DevServerConfig, ServerError};
pub use watcher::{FileWatcher, WatchEvent};
