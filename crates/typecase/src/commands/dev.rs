//! Development server command.

use std::path::Path;

use anyhow::Result;
use typecase_build::Mode;
use typecase_server::{DevServer, DevServerConfig};

use super::build::load_config;

/// Run the dev server.
pub async fn run(config_path: &Path, port: u16, open: bool) -> Result<()> {
    tracing::info!("Starting development server on port {}", port);

    let file_config = load_config(config_path)?;

    let config = DevServerConfig {
        build: file_config.build_config(Mode::Dev),
        port,
        open,
        ..Default::default()
    };

    DevServer::new(config).start().await?;

    Ok(())
}
