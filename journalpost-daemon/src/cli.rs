//! CLI argument definitions for journalpost-daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.
//! Everything else is configured through the environment.

use clap::Parser;

use journalpost_core::config::JournalpostConfig;

/// Forward the systemd journal to a remote syslog collector.
///
/// The collector is configured with `SYSLOG_HOST`, `SYSLOG_PORT`,
/// `SYSLOG_PROTO`, `SYSLOG_SSL`, `SYSLOG_SSL_VERIFY`, `SYSLOG_FORMAT`
/// and `HAOS_HOSTNAME`.
#[derive(Parser, Debug, Default)]
#[command(name = "journalpost-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over `JOURNALPOST_LOG_LEVEL`.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over `JOURNALPOST_LOG_FORMAT`.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Override the journal directory.
    ///
    /// Takes precedence over `JOURNALPOST_JOURNAL_PATH`.
    #[arg(long)]
    pub journal_path: Option<String>,

    /// Validate configuration, print it and exit without forwarding.
    #[arg(long)]
    pub validate: bool,
}

impl DaemonCli {
    /// Apply command-line overrides on top of the environment configuration.
    pub fn apply_overrides(&self, config: &mut JournalpostConfig) {
        if let Some(level) = &self.log_level {
            config.general.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.general.log_format = format.clone();
        }
        if let Some(path) = &self.journal_path {
            config.journal.path = path.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_flags() {
        let cli = DaemonCli::try_parse_from([
            "journalpost-daemon",
            "--log-level",
            "debug",
            "--log-format",
            "pretty",
            "--journal-path",
            "/run/log/journal",
            "--validate",
        ])
        .unwrap();

        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(cli.log_format.as_deref(), Some("pretty"));
        assert_eq!(cli.journal_path.as_deref(), Some("/run/log/journal"));
        assert!(cli.validate);
    }

    #[test]
    fn no_flags_leaves_config_untouched() {
        let cli = DaemonCli::try_parse_from(["journalpost-daemon"]).unwrap();
        let mut config = JournalpostConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "json");
        assert_eq!(config.journal.path, "/var/log/journal");
    }

    #[test]
    fn overrides_replace_config_values() {
        let cli = DaemonCli {
            log_level: Some("warn".to_owned()),
            journal_path: Some("/tmp/journal".to_owned()),
            ..DaemonCli::default()
        };
        let mut config = JournalpostConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.general.log_format, "json");
        assert_eq!(config.journal.path, "/tmp/journal");
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(DaemonCli::try_parse_from(["journalpost-daemon", "--config", "x"]).is_err());
    }
}
