//! syslog 포맷터 -- 정제된 메시지를 와이어 텍스트로 렌더링
//!
//! # 레거시 프레이밍 (RFC 3164)
//! ```text
//! <TIMESTAMP> <HOST> <PROGRAM>: <MSG>
//! TIMESTAMP = "%b %d %H:%M:%S" (로컬 시간, 연도/초 미만 없음)
//! ```
//!
//! # 구조화 프레이밍 (RFC 5424)
//! ```text
//! 1 <TIMESTAMP> <HOST> <PROGRAM> <PID> - - <MSG>
//! TIMESTAMP = UTC, 마이크로초, `Z` 접미사 (예: 2024-01-15T12:00:00.123456Z)
//! ```
//!
//! `<PRI>` 헤더는 전송 계층이 붙입니다.
//!
//! # 사용 예시
//! ```ignore
//! use journalpost_forwarder::format::{MessageMeta, SyslogFormatter};
//!
//! let formatter = SyslogFormatter::new(SyslogFormat::Rfc5424, "ha-box");
//! let meta = MessageMeta::new(SystemTime::now()).program(Some("sshd")).pid(Some(1234));
//! let message = formatter.format(Level::Info, "session opened", &meta);
//! ```

use std::time::SystemTime;

use chrono::{DateTime, Local, Utc};

use journalpost_core::types::{Level, SyslogFormat};

/// NILVALUE (RFC 5424 Section 6)
const NIL: &str = "-";

/// RFC 3164 타임스탬프 형식
const RFC3164_TIMESTAMP: &str = "%b %d %H:%M:%S";

/// RFC 5424 타임스탬프 형식
const RFC5424_TIMESTAMP: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// 엔트리 메타데이터 (프로그램명, PID, 시각)
#[derive(Debug, Clone, Copy)]
pub struct MessageMeta<'a> {
    /// 프로그램명 (`SYSLOG_IDENTIFIER`)
    pub program: Option<&'a str>,
    /// 프로세스 ID
    pub pid: Option<u32>,
    /// 메시지 시각
    pub timestamp: SystemTime,
}

impl<'a> MessageMeta<'a> {
    /// 시각만 가진 메타데이터를 생성합니다.
    pub fn new(timestamp: SystemTime) -> Self {
        Self {
            program: None,
            pid: None,
            timestamp,
        }
    }

    /// 프로그램명을 설정합니다.
    pub fn program(mut self, program: Option<&'a str>) -> Self {
        self.program = program;
        self
    }

    /// 프로세스 ID를 설정합니다.
    pub fn pid(mut self, pid: Option<u32>) -> Self {
        self.pid = pid;
        self
    }
}

/// 전송 준비가 끝난 syslog 메시지
///
/// 엔트리당 하나 생성되어 전송 계층이 한 번 소비합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyslogMessage {
    level: Level,
    body: String,
}

impl SyslogMessage {
    /// 레벨과 본문으로 메시지를 생성합니다.
    pub fn new(level: Level, body: impl Into<String>) -> Self {
        Self {
            level,
            body: body.into(),
        }
    }

    /// 레벨
    pub fn level(&self) -> Level {
        self.level
    }

    /// PRI 헤더를 제외한 본문
    pub fn body(&self) -> &str {
        &self.body
    }
}

/// syslog 포맷터
///
/// 송신자 호스트는 프로세스 전역 설정이며 엔트리마다 바뀌지 않습니다.
pub struct SyslogFormatter {
    /// 프레이밍
    format: SyslogFormat,
    /// 송신자 호스트 식별자
    hostname: String,
}

impl SyslogFormatter {
    /// 새 포맷터를 생성합니다.
    pub fn new(format: SyslogFormat, hostname: impl Into<String>) -> Self {
        Self {
            format,
            hostname: hostname.into(),
        }
    }

    /// 프레이밍
    pub fn syslog_format(&self) -> SyslogFormat {
        self.format
    }

    /// 메시지를 렌더링합니다.
    pub fn format(&self, level: Level, message: &str, meta: &MessageMeta<'_>) -> SyslogMessage {
        let body = match self.format {
            SyslogFormat::Rfc3164 => self.format_rfc3164(message, meta),
            SyslogFormat::Rfc5424 => self.format_rfc5424(message, meta),
        };
        SyslogMessage::new(level, body)
    }

    fn format_rfc3164(&self, message: &str, meta: &MessageMeta<'_>) -> String {
        let timestamp = DateTime::<Local>::from(meta.timestamp).format(RFC3164_TIMESTAMP);
        format!(
            "{timestamp} {} {}: {message}",
            self.hostname,
            program_or_nil(meta.program),
        )
    }

    fn format_rfc5424(&self, message: &str, meta: &MessageMeta<'_>) -> String {
        let timestamp = DateTime::<Utc>::from(meta.timestamp).format(RFC5424_TIMESTAMP);
        let pid = meta
            .pid
            .map(|pid| pid.to_string())
            .unwrap_or_else(|| NIL.to_owned());
        format!(
            "1 {timestamp} {} {} {pid} - - {message}",
            self.hostname,
            program_or_nil(meta.program),
        )
    }
}

fn program_or_nil(program: Option<&str>) -> &str {
    program.filter(|p| !p.is_empty()).unwrap_or(NIL)
}
