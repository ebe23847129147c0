//! 복원력 있는 syslog 전송 계층
//!
//! [`ResilientTransport`]는 수집기 연결을 하나만 유지합니다.
//!
//! # 상태 전이
//! ```text
//! Unconnected --connect 성공--> Connected
//! Connected   --쓰기 실패-----> Unconnected (메시지 드롭, 재시도 없음)
//! Unconnected --send 호출-----> connect 1회 시도 후 전송 또는 드롭
//! ```
//!
//! 백그라운드 스레드나 타이머 없이, 다음 `send` 호출이 재연결을 시도합니다.
//! 연결/전송 실패는 복구 가능, TLS 실패는 치명적입니다
//! ([`TransportError::is_fatal`]).
//!
//! # 와이어 프레임
//! ```text
//! <PRI>BODY[\0]
//! PRI = facility * 8 + severity
//! ```

mod connection;
pub mod tls;

use std::path::PathBuf;
use std::sync::Arc;

use metrics::counter;
use rustls::ClientConfig;
use tracing::{debug, info};

use journalpost_core::config::SyslogConfig;
use journalpost_core::metrics::{
    FORWARDER_CONNECT_ATTEMPTS_TOTAL, FORWARDER_MESSAGES_DROPPED_TOTAL,
    FORWARDER_MESSAGES_SENT_TOTAL, LABEL_REASON,
};
use journalpost_core::types::Protocol;

use crate::error::{ForwarderError, TransportError};
use crate::format::SyslogMessage;
use connection::Connection;

pub use tls::TlsSettings;

/// syslog facility `user`
pub const FACILITY_USER: u8 = 1;

/// 수집기 주소
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Unix 도메인 소켓 경로
    Unix(PathBuf),
    /// 호스트 이름 또는 IP와 포트
    Inet { host: String, port: u16 },
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unix(path) => write!(f, "{}", path.display()),
            Self::Inet { host, port } => write!(f, "{host}:{port}"),
        }
    }
}

/// 전송 설정
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// 수집기 주소
    pub destination: Destination,
    /// 전송 프로토콜 (Unix 소켓에서는 무시)
    pub protocol: Protocol,
    /// TLS 설정 (TCP 전용)
    pub tls: Option<TlsSettings>,
    /// syslog facility
    pub facility: u8,
    /// 프레임 끝에 NUL 바이트를 붙일지 여부
    pub append_nul: bool,
}

impl TransportConfig {
    /// 주소와 프로토콜로 TLS 없는 설정을 생성합니다.
    pub fn new(destination: Destination, protocol: Protocol) -> Self {
        Self {
            destination,
            protocol,
            tls: None,
            facility: FACILITY_USER,
            append_nul: true,
        }
    }

    /// TLS 설정을 지정합니다.
    pub fn with_tls(mut self, tls: TlsSettings) -> Self {
        self.tls = Some(tls);
        self
    }

    /// NUL 종결 여부를 지정합니다.
    pub fn with_append_nul(mut self, append_nul: bool) -> Self {
        self.append_nul = append_nul;
        self
    }

    /// facility를 지정합니다.
    pub fn with_facility(mut self, facility: u8) -> Self {
        self.facility = facility;
        self
    }

    /// syslog 설정에서 전송 설정을 만듭니다.
    pub fn from_config(config: &SyslogConfig) -> Result<Self, ForwarderError> {
        let destination = if config.is_unix_socket() {
            Destination::Unix(PathBuf::from(&config.host))
        } else {
            let port = config.port.ok_or_else(|| ForwarderError::Config {
                field: "port".to_owned(),
                reason: format!("port is required for {}", config.host),
            })?;
            Destination::Inet {
                host: config.host.clone(),
                port,
            }
        };

        let mut transport = Self::new(destination, config.protocol);
        if config.tls {
            transport = transport.with_tls(TlsSettings::from_verify(config.tls_verify));
        }
        Ok(transport)
    }

    /// TLS 조합을 검증합니다.
    pub fn validate(&self) -> Result<(), ForwarderError> {
        if self.tls.is_none() {
            return Ok(());
        }
        if matches!(self.destination, Destination::Unix(_)) {
            return Err(ForwarderError::Config {
                field: "tls".to_owned(),
                reason: "TLS is not supported for unix socket destinations".to_owned(),
            });
        }
        if self.protocol != Protocol::Tcp {
            return Err(ForwarderError::Config {
                field: "tls".to_owned(),
                reason: "TLS is only supported for TCP".to_owned(),
            });
        }
        Ok(())
    }
}

/// 전송 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportStats {
    /// 연결 시도 수
    pub connect_attempts: u64,
    /// 연결 성공 수
    pub connects: u64,
    /// 전송 성공 메시지 수
    pub sent: u64,
    /// 드롭된 메시지 수
    pub dropped: u64,
}

/// 복원력 있는 syslog 전송
pub struct ResilientTransport {
    config: TransportConfig,
    /// TLS 클라이언트 설정 (생성 시 한 번 구성)
    tls: Option<Arc<ClientConfig>>,
    /// 현재 연결 (최대 하나)
    connection: Option<Connection>,
    stats: TransportStats,
}

impl ResilientTransport {
    /// 전송을 생성합니다. 연결은 하지 않습니다.
    ///
    /// UDP나 Unix 소켓에 TLS를 요청하면 [`ForwarderError::Config`]입니다.
    pub fn new(config: TransportConfig) -> Result<Self, ForwarderError> {
        config.validate()?;
        let tls = config
            .tls
            .as_ref()
            .map(TlsSettings::client_config)
            .transpose()?;

        Ok(Self {
            config,
            tls,
            connection: None,
            stats: TransportStats::default(),
        })
    }

    /// syslog 설정에서 전송을 생성합니다.
    pub fn from_config(config: &SyslogConfig) -> Result<Self, ForwarderError> {
        Self::new(TransportConfig::from_config(config)?)
    }

    /// 수집기에 연결합니다. 이미 연결되어 있으면 기존 연결을 닫고 새로 엽니다.
    pub fn connect(&mut self) -> Result<(), TransportError> {
        self.connection = None;
        self.stats.connect_attempts += 1;
        counter!(FORWARDER_CONNECT_ATTEMPTS_TOTAL).increment(1);

        let conn = match &self.config.destination {
            Destination::Unix(path) => connection::open_unix(path)?,
            Destination::Inet { host, port } => {
                connection::open_inet(host, *port, self.config.protocol, self.tls.as_ref())?
            }
        };

        info!(
            destination = %self.config.destination,
            kind = conn.kind(),
            "connected to syslog collector"
        );
        self.connection = Some(conn);
        self.stats.connects += 1;
        Ok(())
    }

    /// 메시지 하나를 전송합니다.
    ///
    /// 연결이 없으면 한 번 연결을 시도합니다. 실패한 메시지는 버리고 재시도하지 않습니다.
    pub fn send(&mut self, message: &SyslogMessage) -> Result<(), TransportError> {
        if self.connection.is_none() {
            if let Err(e) = self.connect() {
                self.record_drop(&e);
                return Err(e);
            }
        }

        let frame = self.encode_frame(message);
        let Some(conn) = self.connection.as_mut() else {
            let err = TransportError::Send {
                reason: "not connected".to_owned(),
            };
            self.record_drop(&err);
            return Err(err);
        };

        match conn.send_frame(&frame) {
            Ok(()) => {
                self.stats.sent += 1;
                counter!(FORWARDER_MESSAGES_SENT_TOTAL).increment(1);
                Ok(())
            }
            Err(e) => {
                self.connection = None;
                let err = TransportError::Send {
                    reason: e.to_string(),
                };
                self.record_drop(&err);
                Err(err)
            }
        }
    }

    /// 메시지를 와이어 프레임으로 인코딩합니다.
    pub fn encode_frame(&self, message: &SyslogMessage) -> Vec<u8> {
        let pri = u16::from(self.config.facility) * 8 + u16::from(message.level().syslog_severity());
        let mut frame = format!("<{pri}>{}", message.body()).into_bytes();
        if self.config.append_nul {
            frame.push(0);
        }
        frame
    }

    /// 연결되어 있는지 확인합니다.
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// 전송 통계
    pub fn stats(&self) -> TransportStats {
        self.stats
    }

    /// 전송 설정
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn record_drop(&mut self, err: &TransportError) {
        self.stats.dropped += 1;
        counter!(FORWARDER_MESSAGES_DROPPED_TOTAL, LABEL_REASON => err.kind()).increment(1);
        debug!(destination = %self.config.destination, error = %err, "message dropped");
    }
}
