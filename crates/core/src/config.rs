//! 설정 관리 -- 환경변수 기반 런타임 설정
//!
//! [`JournalpostConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//! 설정은 시작 시 한 번만 프로세스 환경변수에서 읽습니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선, 데몬에서 적용)
//! 2. 환경변수 (`SYSLOG_HOST`, `JOURNALPOST_LOG_LEVEL` 등)
//! 3. 기본값 (선택 항목만)
//!
//! 필수 항목이 없거나 값이 잘못되면 [`ConfigError`]를 반환하며,
//! 데몬은 포워딩 루프에 들어가기 전에 종료합니다.
//!
//! # 사용 예시
//! ```no_run
//! # fn example() -> Result<(), journalpost_core::error::JournalpostError> {
//! use journalpost_core::config::JournalpostConfig;
//!
//! let config = JournalpostConfig::from_env()?;
//! # Ok(())
//! # }
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, JournalpostError};
use crate::types::{Protocol, SyslogFormat};

// --- 환경변수 키 ---

/// 수집기 호스트 또는 Unix 소켓 경로
pub const ENV_SYSLOG_HOST: &str = "SYSLOG_HOST";
/// 수집기 포트
pub const ENV_SYSLOG_PORT: &str = "SYSLOG_PORT";
/// 전송 프로토콜 (udp, tcp)
pub const ENV_SYSLOG_PROTO: &str = "SYSLOG_PROTO";
/// TLS 사용 여부
pub const ENV_SYSLOG_SSL: &str = "SYSLOG_SSL";
/// TLS 인증서 검증 여부
pub const ENV_SYSLOG_SSL_VERIFY: &str = "SYSLOG_SSL_VERIFY";
/// 와이어 프레이밍 (RFC3164, RFC5424)
pub const ENV_SYSLOG_FORMAT: &str = "SYSLOG_FORMAT";
/// 송신자 호스트 식별자
pub const ENV_HAOS_HOSTNAME: &str = "HAOS_HOSTNAME";
/// 저널 디렉토리
pub const ENV_JOURNAL_PATH: &str = "JOURNALPOST_JOURNAL_PATH";
/// 구조화 로깅 컨테이너 목록 (쉼표 구분)
pub const ENV_STRUCTURED_SOURCES: &str = "JOURNALPOST_STRUCTURED_SOURCES";
/// 데몬 자체 로그 레벨
pub const ENV_LOG_LEVEL: &str = "JOURNALPOST_LOG_LEVEL";
/// 데몬 자체 로그 형식
pub const ENV_LOG_FORMAT: &str = "JOURNALPOST_LOG_FORMAT";

/// journalpost 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JournalpostConfig {
    /// 일반 설정 (데몬 자체 로깅)
    #[serde(default)]
    pub general: GeneralConfig,
    /// syslog 목적지 설정
    #[serde(default)]
    pub syslog: SyslogConfig,
    /// 저널 소스 설정
    #[serde(default)]
    pub journal: JournalConfig,
}

impl JournalpostConfig {
    /// 프로세스 환경변수에서 설정을 읽고 검증합니다.
    pub fn from_env() -> Result<Self, JournalpostError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 임의의 키-값 조회 함수로 설정을 구성하고 검증합니다.
    ///
    /// `from_env`의 실제 구현이며, 테스트에서는 HashMap 기반 조회를 주입합니다.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, JournalpostError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = required(&lookup, ENV_SYSLOG_HOST)?;
        let port = if is_socket_path(&host) {
            optional_parse::<u16, _>(&lookup, ENV_SYSLOG_PORT)?
        } else {
            Some(required_parse::<u16, _>(&lookup, ENV_SYSLOG_PORT)?)
        };

        let syslog = SyslogConfig {
            host,
            port,
            protocol: required_parse(&lookup, ENV_SYSLOG_PROTO)?,
            tls: required_bool(&lookup, ENV_SYSLOG_SSL)?,
            tls_verify: required_bool(&lookup, ENV_SYSLOG_SSL_VERIFY)?,
            format: optional_parse(&lookup, ENV_SYSLOG_FORMAT)?.unwrap_or_default(),
            hostname: required(&lookup, ENV_HAOS_HOSTNAME)?,
        };

        let mut journal = JournalConfig::default();
        override_string(&mut journal.path, &lookup, ENV_JOURNAL_PATH);
        if let Some(csv) = lookup(ENV_STRUCTURED_SOURCES) {
            journal.structured_sources = Some(parse_csv(&csv));
        }

        let mut general = GeneralConfig::default();
        override_string(&mut general.log_level, &lookup, ENV_LOG_LEVEL);
        override_string(&mut general.log_format, &lookup, ENV_LOG_FORMAT);

        let config = Self {
            general,
            syslog,
            journal,
        };
        config.validate()?;
        Ok(config)
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), JournalpostError> {
        if self.syslog.host.trim().is_empty() {
            return Err(invalid(ENV_SYSLOG_HOST, "must not be empty"));
        }

        if self.syslog.hostname.trim().is_empty() {
            return Err(invalid(ENV_HAOS_HOSTNAME, "must not be empty"));
        }

        if !self.syslog.is_unix_socket() && self.syslog.port.is_none() {
            return Err(ConfigError::Missing {
                key: ENV_SYSLOG_PORT.to_owned(),
            }
            .into());
        }

        if self.syslog.tls {
            if self.syslog.is_unix_socket() {
                return Err(invalid(
                    ENV_SYSLOG_SSL,
                    "TLS is not supported for unix socket destinations",
                ));
            }
            if self.syslog.protocol != Protocol::Tcp {
                return Err(invalid(ENV_SYSLOG_SSL, "TLS is only supported for TCP"));
            }
        }

        if self.journal.path.trim().is_empty() {
            return Err(invalid(ENV_JOURNAL_PATH, "must not be empty"));
        }

        if let Some(sources) = &self.journal.structured_sources {
            if sources.iter().any(|s| s.is_empty()) {
                return Err(invalid(
                    ENV_STRUCTURED_SOURCES,
                    "container names must not be empty",
                ));
            }
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                ENV_LOG_LEVEL,
                &format!(
                    "'{}' is not one of {:?}",
                    self.general.log_level, valid_levels
                ),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                ENV_LOG_FORMAT,
                &format!(
                    "'{}' is not one of {:?}",
                    self.general.log_format, valid_formats
                ),
            ));
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// 데몬 자체 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 데몬 자체 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// syslog 목적지 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyslogConfig {
    /// 수집기 호스트, 또는 절대 경로인 경우 Unix 도메인 소켓
    pub host: String,
    /// 수집기 포트 (Unix 소켓이면 없어도 됨)
    pub port: Option<u16>,
    /// 전송 프로토콜
    pub protocol: Protocol,
    /// TLS 사용 여부 (TCP 전용)
    pub tls: bool,
    /// TLS 인증서/호스트명 검증 여부
    pub tls_verify: bool,
    /// 와이어 프레이밍
    pub format: SyslogFormat,
    /// 메시지에 기록되는 송신자 호스트 식별자
    pub hostname: String,
}

impl SyslogConfig {
    /// 목적지가 Unix 도메인 소켓 경로인지 확인합니다.
    pub fn is_unix_socket(&self) -> bool {
        is_socket_path(&self.host)
    }
}

impl Default for SyslogConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_owned(),
            port: Some(514),
            protocol: Protocol::Udp,
            tls: false,
            tls_verify: true,
            format: SyslogFormat::Rfc3164,
            hostname: "homeassistant".to_owned(),
        }
    }
}

/// 저널 소스 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalConfig {
    /// 저널 디렉토리
    pub path: String,
    /// 구조화 로깅 컨테이너 목록. `None`이면 기본 목록을 사용합니다.
    pub structured_sources: Option<Vec<String>>,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            path: "/var/log/journal".to_owned(),
            structured_sources: None,
        }
    }
}

// --- 환경변수 파싱 헬퍼 ---

fn is_socket_path(host: &str) -> bool {
    host.starts_with('/')
}

fn invalid(field: &str, reason: &str) -> JournalpostError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason: reason.to_owned(),
    }
    .into()
}

fn required<F>(lookup: &F, key: &str) -> Result<String, JournalpostError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).ok_or_else(|| {
        ConfigError::Missing {
            key: key.to_owned(),
        }
        .into()
    })
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, JournalpostError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| invalid(key, &format!("'{raw}': {e}")))
}

fn required_parse<T, F>(lookup: &F, key: &str) -> Result<T, JournalpostError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let raw = required(lookup, key)?;
    parse_value(key, &raw)
}

fn optional_parse<T, F>(lookup: &F, key: &str) -> Result<Option<T>, JournalpostError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).map(|raw| parse_value(key, &raw)).transpose()
}

fn required_bool<F>(lookup: &F, key: &str) -> Result<bool, JournalpostError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = required(lookup, key)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(invalid(key, &format!("'{raw}': expected 'true' or 'false'"))),
    }
}

fn override_string<F>(target: &mut String, lookup: &F, key: &str)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup(key) {
        *target = val;
    }
}

fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect()
}
