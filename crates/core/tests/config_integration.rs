//! 환경변수 기반 설정 통합 테스트
//!
//! - 실제 프로세스 환경변수에서 로딩
//! - 선택 항목 기본값
//! - 누락/잘못된 값 에러
//!
//! 프로세스 환경을 조작하므로 모든 테스트는 `#[serial]`로 실행합니다.

use journalpost_core::config::{
    ENV_HAOS_HOSTNAME, ENV_JOURNAL_PATH, ENV_LOG_LEVEL, ENV_STRUCTURED_SOURCES, ENV_SYSLOG_FORMAT,
    ENV_SYSLOG_HOST, ENV_SYSLOG_PORT, ENV_SYSLOG_PROTO, ENV_SYSLOG_SSL, ENV_SYSLOG_SSL_VERIFY,
    JournalpostConfig,
};
use journalpost_core::error::{ConfigError, JournalpostError};
use journalpost_core::types::{Protocol, SyslogFormat};
use serial_test::serial;

const ALL_KEYS: &[&str] = &[
    ENV_SYSLOG_HOST,
    ENV_SYSLOG_PORT,
    ENV_SYSLOG_PROTO,
    ENV_SYSLOG_SSL,
    ENV_SYSLOG_SSL_VERIFY,
    ENV_SYSLOG_FORMAT,
    ENV_HAOS_HOSTNAME,
    ENV_JOURNAL_PATH,
    ENV_STRUCTURED_SOURCES,
    ENV_LOG_LEVEL,
];

fn set_env(pairs: &[(&str, &str)]) {
    // SAFETY: serial 테스트에서만 호출되므로 환경변수 조작이 안전합니다.
    unsafe {
        for key in ALL_KEYS {
            std::env::remove_var(key);
        }
        for (key, value) in pairs {
            std::env::set_var(key, value);
        }
    }
}

fn clear_env() {
    set_env(&[]);
}

fn minimal_udp_env() -> Vec<(&'static str, &'static str)> {
    vec![
        (ENV_SYSLOG_HOST, "192.168.1.10"),
        (ENV_SYSLOG_PORT, "514"),
        (ENV_SYSLOG_PROTO, "udp"),
        (ENV_SYSLOG_SSL, "false"),
        (ENV_SYSLOG_SSL_VERIFY, "false"),
        (ENV_HAOS_HOSTNAME, "homeassistant"),
    ]
}

#[test]
#[serial]
fn loads_from_process_environment() {
    set_env(&minimal_udp_env());

    let config = JournalpostConfig::from_env().expect("config should load");
    assert_eq!(config.syslog.host, "192.168.1.10");
    assert_eq!(config.syslog.port, Some(514));
    assert_eq!(config.syslog.protocol, Protocol::Udp);
    assert!(!config.syslog.tls);
    // SYSLOG_FORMAT 미설정 시 레거시 프레이밍
    assert_eq!(config.syslog.format, SyslogFormat::Rfc3164);

    clear_env();
}

#[test]
#[serial]
fn optional_settings_override_defaults() {
    let mut env = minimal_udp_env();
    env.push((ENV_SYSLOG_FORMAT, "RFC5424"));
    env.push((ENV_JOURNAL_PATH, "/run/log/journal"));
    env.push((ENV_LOG_LEVEL, "debug"));
    set_env(&env);

    let config = JournalpostConfig::from_env().expect("config should load");
    assert_eq!(config.syslog.format, SyslogFormat::Rfc5424);
    assert_eq!(config.journal.path, "/run/log/journal");
    assert_eq!(config.general.log_level, "debug");

    clear_env();
}

#[test]
#[serial]
fn empty_environment_reports_first_missing_key() {
    clear_env();

    let err = JournalpostConfig::from_env().unwrap_err();
    assert!(matches!(
        err,
        JournalpostError::Config(ConfigError::Missing { ref key }) if key == ENV_SYSLOG_HOST
    ));
}

#[test]
#[serial]
fn invalid_protocol_is_fatal() {
    let mut env = minimal_udp_env();
    env.retain(|(k, _)| *k != ENV_SYSLOG_PROTO);
    env.push((ENV_SYSLOG_PROTO, "quic"));
    set_env(&env);

    let err = JournalpostConfig::from_env().unwrap_err();
    assert!(matches!(
        err,
        JournalpostError::Config(ConfigError::InvalidValue { .. })
    ));
    assert!(err.to_string().contains(ENV_SYSLOG_PROTO));

    clear_env();
}

#[test]
#[serial]
fn invalid_log_level_is_fatal() {
    let mut env = minimal_udp_env();
    env.push((ENV_LOG_LEVEL, "verbose"));
    set_env(&env);

    assert!(JournalpostConfig::from_env().is_err());

    clear_env();
}
