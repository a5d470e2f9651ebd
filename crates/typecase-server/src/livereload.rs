//! WebSocket live reload.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Route serving the reload WebSocket.
pub const RELOAD_ROUTE: &str = "/__reload";

/// Route serving the reload client script.
pub const RELOAD_SCRIPT_ROUTE: &str = "/__reload.js";

/// Messages sent to connected browsers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReloadMessage {
    /// Sent once when a browser connects
    Connected,

    /// The site was rebuilt; reload the page
    Reload,

    /// A rebuild failed; the last good output is still being served
    BuildFailed { message: String },
}

/// Hub for broadcasting reload messages to connected browsers.
pub struct ReloadHub {
    tx: broadcast::Sender<ReloadMessage>,
}

impl ReloadHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    /// Subscribe to reload messages.
    pub fn subscribe(&self) -> broadcast::Receiver<ReloadMessage> {
        self.tx.subscribe()
    }

    /// Broadcast a message to all connected browsers.
    pub fn send(&self, msg: ReloadMessage) {
        // Ignore send errors; no browser connected is fine.
        let _ = self.tx.send(msg);
    }

    /// Number of connected browsers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate the client script served on the script route. The script
/// connects back over the page's own host, so the configured port is
/// picked up automatically.
pub fn reload_client_script() -> String {
    format!(
        r#"// Injected by the typecase dev server.
(function () {{
  'use strict';
  var url = 'ws://' + window.location.host + '{RELOAD_ROUTE}';
  var retry = null;

  function connect() {{
    var socket = new WebSocket(url);

    socket.onmessage = function (event) {{
      var message = JSON.parse(event.data);
      if (message.type === 'reload') {{
        window.location.reload();
      }} else if (message.type === 'build_failed') {{
        console.error('[typecase] build failed:\n' + message.message);
      }} else if (message.type === 'connected') {{
        console.log('[typecase] live reload connected');
      }}
    }};

    socket.onclose = function () {{
      if (retry) {{
        return;
      }}
      retry = setTimeout(function () {{
        retry = null;
        connect();
      }}, 1000);
    }};
  }}

  connect();
}}());
"#
    )
}
