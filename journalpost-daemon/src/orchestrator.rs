//! Daemon assembly -- configuration, journal source and forwarding loop.
//!
//! # Startup Order
//!
//! 1. Load configuration from the environment and apply CLI overrides
//! 2. Validate the configuration (fatal before anything is spawned)
//! 3. Spawn the journal reader
//! 4. Build the forwarder and enter its loop
//!
//! The loop only returns on a fatal condition: a TLS negotiation failure or
//! the journal reader going away. Both make the daemon exit non-zero so the
//! supervisor restarts it.

use anyhow::{Context, Result};

use journalpost_core::config::JournalpostConfig;
use journalpost_core::error::JournalpostError;
use journalpost_core::pipeline::JournalSource;
use journalpost_forwarder::{ForwarderBuilder, JournalctlSource};

use crate::cli::DaemonCli;

/// The daemon orchestrator.
pub struct Orchestrator {
    /// Loaded and validated configuration.
    config: JournalpostConfig,
}

impl Orchestrator {
    /// Load configuration from the process environment, apply CLI overrides
    /// and validate the result.
    pub fn build(cli: &DaemonCli) -> Result<Self> {
        let mut config = JournalpostConfig::from_env()
            .map_err(|e| anyhow::anyhow!("failed to load config: {}", e))?;
        cli.apply_overrides(&mut config);
        Self::build_from_config(config)
    }

    /// Build from an already-loaded configuration.
    pub fn build_from_config(config: JournalpostConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;
        Ok(Self { config })
    }

    /// Spawn `journalctl` and forward its entries until a fatal error.
    pub fn run(&self) -> Result<()> {
        let source = JournalctlSource::spawn(&self.config.journal)
            .map_err(JournalpostError::from)
            .context("failed to start journal reader")?;
        self.run_with_source(source)
    }

    /// Forward entries from the given source until a fatal error.
    pub fn run_with_source<S: JournalSource>(&self, source: S) -> Result<()> {
        let mut forwarder = ForwarderBuilder::new()
            .config(self.config.clone())
            .source(source)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build forwarder: {}", e))?;

        tracing::info!(
            destination = %self.config.syslog.host,
            port = ?self.config.syslog.port,
            protocol = %self.config.syslog.protocol,
            tls = self.config.syslog.tls,
            format = %self.config.syslog.format,
            "journalpost forwarder starting"
        );

        let result = forwarder.run().map_err(JournalpostError::from);
        let stats = forwarder.stats();
        tracing::info!(
            entries = stats.entries,
            delivered = stats.delivered,
            dropped = stats.dropped,
            "forwarder stopped"
        );

        result.context("forwarding stopped")
    }

    /// Human-readable dump of the effective configuration.
    pub fn summary(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.config).context("failed to serialize config")
    }

    /// Get a reference to the loaded configuration.
    pub fn config(&self) -> &JournalpostConfig {
        &self.config
    }
}
