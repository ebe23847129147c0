//! 도메인 타입 -- 시스템 전역에서 사용되는 공통 타입
//!
//! 저널 소스가 생산하는 [`JournalEntry`]와, 포워더가 결정하는 [`Level`]을 정의합니다.
//! 와이어 형식 선택자([`SyslogFormat`])와 전송 프로토콜([`Protocol`])도 여기에 둡니다.

use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// 저널 엔트리
///
/// systemd 저널에서 읽은 구조화 레코드 하나를 나타냅니다.
/// 외부 저널 소스가 생성하고, 포워더가 한 번 소비한 뒤 버립니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// 메시지 본문 (`MESSAGE`)
    pub message: String,
    /// syslog 우선순위 0-7 (`PRIORITY`), 없을 수 있음
    pub priority: Option<u8>,
    /// 소스 식별자 (`SYSLOG_IDENTIFIER`)
    pub identifier: Option<String>,
    /// 컨테이너 이름 (`CONTAINER_NAME`), 없으면 호스트 엔트리
    pub container_name: Option<String>,
    /// 프로세스 ID (`_PID`)
    pub pid: Option<u32>,
    /// 저널 도착 시각 (`__REALTIME_TIMESTAMP`)
    pub timestamp: SystemTime,
}

impl JournalEntry {
    /// 메시지만 가진 호스트 엔트리를 생성합니다.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            priority: None,
            identifier: None,
            container_name: None,
            pid: None,
            timestamp: SystemTime::now(),
        }
    }

    /// 우선순위를 설정합니다.
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }

    /// 소스 식별자를 설정합니다.
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// 컨테이너 이름을 설정합니다.
    pub fn with_container(mut self, name: impl Into<String>) -> Self {
        self.container_name = Some(name.into());
        self
    }

    /// 프로세스 ID를 설정합니다.
    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    /// 도착 시각을 설정합니다.
    pub fn with_timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// 컨테이너 이름을 반환합니다. 빈 문자열은 없는 것으로 취급합니다.
    pub fn container(&self) -> Option<&str> {
        self.container_name.as_deref().filter(|name| !name.is_empty())
    }

    /// 호스트(컨테이너 밖)에서 발생한 엔트리인지 확인합니다.
    pub fn is_host(&self) -> bool {
        self.container().is_none()
    }
}

impl fmt::Display for JournalEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}]: {}",
            self.container().unwrap_or("host"),
            self.identifier.as_deref().unwrap_or("-"),
            self.message,
        )
    }
}

/// 로그 레벨
///
/// 포워딩되는 메시지의 심각도입니다. `Ord`는 심각한 순서를 따릅니다
/// (`Debug < Info < Warning < Error < Critical`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Level {
    /// 디버그
    Debug,
    /// 정보 (기본값)
    #[default]
    Info,
    /// 경고
    Warning,
    /// 에러
    Error,
    /// 치명적
    Critical,
}

impl Level {
    /// 대문자 레벨 이름(`INFO`, `WARNING`, ...)에서 레벨을 파싱합니다.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "DEBUG" => Some(Self::Debug),
            "INFO" => Some(Self::Info),
            "WARNING" => Some(Self::Warning),
            "ERROR" => Some(Self::Error),
            "CRITICAL" => Some(Self::Critical),
            _ => None,
        }
    }

    /// 저널 우선순위(0-7)를 레벨로 매핑합니다.
    ///
    /// - 0 emerg, 1 alert, 2 crit -> Critical
    /// - 3 err -> Error
    /// - 4 warning -> Warning
    /// - 5 notice, 6 info -> Info
    /// - 7 debug -> Debug
    ///
    /// 범위를 벗어난 값은 `None`입니다.
    pub fn from_priority(priority: u8) -> Option<Self> {
        match priority {
            0..=2 => Some(Self::Critical),
            3 => Some(Self::Error),
            4 => Some(Self::Warning),
            5 | 6 => Some(Self::Info),
            7 => Some(Self::Debug),
            _ => None,
        }
    }

    /// PRI 헤더에 사용되는 syslog severity 값 (RFC 5424 Section 6.2.1)
    pub fn syslog_severity(self) -> u8 {
        match self {
            Self::Critical => 2,
            Self::Error => 3,
            Self::Warning => 4,
            Self::Info => 6,
            Self::Debug => 7,
        }
    }

    /// 대문자 레벨 이름
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// syslog 와이어 프레이밍
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyslogFormat {
    /// BSD syslog (RFC 3164), 기본값
    #[default]
    Rfc3164,
    /// 구조화 syslog (RFC 5424)
    Rfc5424,
}

impl SyslogFormat {
    /// 메시지 본문이 한 줄이어야 하는 프레이밍인지 확인합니다.
    pub fn requires_single_line(self) -> bool {
        matches!(self, Self::Rfc5424)
    }
}

impl FromStr for SyslogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RFC3164" => Ok(Self::Rfc3164),
            "RFC5424" => Ok(Self::Rfc5424),
            other => Err(format!("expected 'RFC3164' or 'RFC5424', got '{other}'")),
        }
    }
}

impl fmt::Display for SyslogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rfc3164 => f.write_str("RFC3164"),
            Self::Rfc5424 => f.write_str("RFC5424"),
        }
    }
}

/// 전송 프로토콜
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    /// UDP 데이터그램 (기본값)
    #[default]
    Udp,
    /// TCP 스트림
    Tcp,
}

impl FromStr for Protocol {
    type Err = String;

    /// 대소문자를 구분하지 않습니다.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "udp" => Ok(Self::Udp),
            "tcp" => Ok(Self::Tcp),
            _ => Err(format!("expected 'udp' or 'tcp', got '{s}'")),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Udp => f.write_str("udp"),
            Self::Tcp => f.write_str("tcp"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_table_matches_journal_levels() {
        let expected = [
            Level::Critical,
            Level::Critical,
            Level::Critical,
            Level::Error,
            Level::Warning,
            Level::Info,
            Level::Info,
            Level::Debug,
        ];
        for (priority, level) in expected.iter().enumerate() {
            assert_eq!(Level::from_priority(priority as u8), Some(*level));
        }
        assert_eq!(Level::from_priority(8), None);
    }

    #[test]
    fn level_names_roundtrip() {
        for level in [
            Level::Debug,
            Level::Info,
            Level::Warning,
            Level::Error,
            Level::Critical,
        ] {
            assert_eq!(Level::from_name(level.as_str()), Some(level));
        }
        assert_eq!(Level::from_name("info"), None);
        assert_eq!(Level::from_name("WARN"), None);
    }

    #[test]
    fn level_ordering() {
        assert!(Level::Critical > Level::Error);
        assert!(Level::Warning > Level::Info);
        assert!(Level::Info > Level::Debug);
        assert_eq!(Level::default(), Level::Info);
    }

    #[test]
    fn syslog_severity_values() {
        assert_eq!(Level::Critical.syslog_severity(), 2);
        assert_eq!(Level::Error.syslog_severity(), 3);
        assert_eq!(Level::Warning.syslog_severity(), 4);
        assert_eq!(Level::Info.syslog_severity(), 6);
        assert_eq!(Level::Debug.syslog_severity(), 7);
    }

    #[test]
    fn empty_container_name_is_host() {
        let entry = JournalEntry::new("hello").with_container("");
        assert!(entry.is_host());
        let entry = JournalEntry::new("hello").with_container("homeassistant");
        assert!(!entry.is_host());
        assert_eq!(entry.container(), Some("homeassistant"));
    }

    #[test]
    fn syslog_format_parsing() {
        assert_eq!("RFC3164".parse::<SyslogFormat>(), Ok(SyslogFormat::Rfc3164));
        assert_eq!("RFC5424".parse::<SyslogFormat>(), Ok(SyslogFormat::Rfc5424));
        assert!("rfc5424".parse::<SyslogFormat>().is_err());
        assert!(SyslogFormat::Rfc5424.requires_single_line());
        assert!(!SyslogFormat::Rfc3164.requires_single_line());
    }

    #[test]
    fn protocol_parsing_is_case_insensitive() {
        assert_eq!("UDP".parse::<Protocol>(), Ok(Protocol::Udp));
        assert_eq!("tcp".parse::<Protocol>(), Ok(Protocol::Tcp));
        assert!("sctp".parse::<Protocol>().is_err());
    }

    #[test]
    fn entry_display() {
        let entry = JournalEntry::new("disk full").with_identifier("kernel");
        assert_eq!(entry.to_string(), "host[kernel]: disk full");
    }
}
