//! 포워더 에러 타입
//!
//! [`TransportError`]는 전송 계층의 결과를 복구 가능/치명적으로 구분하고,
//! [`ForwarderError`]는 포워더 내부의 모든 에러를 표현합니다.
//! `From<ForwarderError> for JournalpostError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use journalpost_core::error::{ConfigError, DeliveryError, JournalpostError, SourceError};

/// 전송 계층 에러
///
/// 삼키기/전파 정책은 호출자(포워딩 루프)가 [`TransportError::is_fatal`]로 결정합니다.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// TLS 핸드셰이크/협상 실패 -- 보안 설정 불일치이므로 치명적
    #[error("tls handshake with {peer} failed: {reason}")]
    Tls {
        /// 대상 주소
        peer: String,
        /// 실패 사유
        reason: String,
    },

    /// 연결 수립 실패 (거부, 도달 불가, 이름 해석 실패 등)
    #[error("connect to {peer} failed: {reason}")]
    Connect {
        /// 대상 주소
        peer: String,
        /// 실패 사유
        reason: String,
    },

    /// 이미 포맷된 메시지 전송 중 실패
    #[error("send failed: {reason}")]
    Send {
        /// 실패 사유
        reason: String,
    },
}

impl TransportError {
    /// 프로세스를 종료시켜야 하는 에러인지 확인합니다.
    ///
    /// TLS 실패만 치명적입니다. 나머지는 메시지를 버리고 다음 전송에서 재연결합니다.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Tls { .. })
    }

    /// 메트릭 레이블용 짧은 이름
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Tls { .. } => "tls",
            Self::Connect { .. } => "connect",
            Self::Send { .. } => "send",
        }
    }
}

/// 포워더 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ForwarderError {
    /// 전송 에러 (치명적인 것만 여기까지 올라옴)
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// 저널 소스 에러
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 정규식 컴파일 에러
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ForwarderError> for JournalpostError {
    fn from(err: ForwarderError) -> Self {
        match err {
            ForwarderError::Transport(TransportError::Tls { peer, reason }) => {
                JournalpostError::Delivery(DeliveryError::Tls(format!("{peer}: {reason}")))
            }
            ForwarderError::Transport(other) => {
                JournalpostError::Delivery(DeliveryError::Failed(other.to_string()))
            }
            ForwarderError::Source(e) => JournalpostError::Source(e),
            ForwarderError::Config { field, reason } => {
                JournalpostError::Config(ConfigError::InvalidValue { field, reason })
            }
            ForwarderError::Regex(e) => JournalpostError::Config(ConfigError::InvalidValue {
                field: "pattern".to_owned(),
                reason: e.to_string(),
            }),
            ForwarderError::Io(e) => JournalpostError::Io(e),
        }
    }
}
