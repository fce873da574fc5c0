//! `mdserve serve` command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use mdserve_config::{CliSettings, Config, RenderMode};
use mdserve_renderer::PendingCleanup;
use mdserve_server::{ServerConfig, run_server, server_config_from_config};

use super::require_dir;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover mdserve.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to serve (overrides config).
    #[arg(short, long, env = "MDSERVE_DIR")]
    dir: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Render with the embedded converter (default: true).
    #[arg(long)]
    offline: Option<bool>,

    /// Render through the remote Markdown API.
    #[arg(long, conflicts_with = "offline")]
    online: bool,

    /// Render every file as Markdown, not only .md files.
    #[arg(long)]
    render_all: bool,

    /// Stop the server on the first render failure.
    #[arg(long)]
    strict: bool,

    /// Enable verbose output (request and render logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// Stylesheets written while serving are removed after the server stops,
    /// even when it stopped because of an error.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the server fails, or
    /// stylesheets cannot be removed.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            host: self.host.clone(),
            port: self.port,
            root: self.dir.clone(),
            render_mode: self.resolve_render_mode(),
            render_all: self.render_all.then_some(true),
            strict: self.strict.then_some(true),
        };

        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        require_dir(&config.docs_resolved.root)?;

        let server_config = server_config_from_config(&config);

        for (label, value) in summary(&config, &server_config) {
            output.field(label, &value);
        }
        if server_config.render_all {
            output.info("Rendering every file as Markdown");
        }
        if server_config.strict {
            output.info("Strict mode: the first render failure stops the server");
        }

        let cleanup = Arc::new(PendingCleanup::new());
        let result = run_server(server_config, Arc::clone(&cleanup)).await;

        let cleaned = cleanup.drain();
        match &cleaned {
            Ok(0) => {}
            Ok(removed) => output.success(&format!("Removed {removed} stylesheet(s)")),
            Err(e) => output.warning(&format!("Cleanup incomplete: {e}")),
        }

        result?;
        cleaned?;
        Ok(())
    }

    /// Resolve the render strategy from --offline/--online flags.
    fn resolve_render_mode(&self) -> Option<RenderMode> {
        if self.online {
            return Some(RenderMode::Remote);
        }
        self.offline.map(|offline| {
            if offline {
                RenderMode::Local
            } else {
                RenderMode::Remote
            }
        })
    }
}

/// Startup summary lines as `(label, value)` pairs.
fn summary(config: &Config, server: &ServerConfig) -> Vec<(&'static str, String)> {
    let mut fields = Vec::new();
    if let Some(path) = &config.config_path {
        fields.push(("Config", path.display().to_string()));
    }
    fields.push(("Serving", server.root.display().to_string()));
    fields.push(("Address", format!("http://{}:{}", server.host, server.port)));
    let renderer = match server.render_mode {
        RenderMode::Local => "local".to_owned(),
        RenderMode::Remote => format!("remote ({})", server.remote_endpoint),
    };
    fields.push(("Renderer", renderer));
    fields
}
