//! 에러 타입 -- 도메인별 에러 정의

/// journalpost 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum JournalpostError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 저널 소스 에러
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// 전달 에러
    #[error("delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 필수 환경변수 누락
    #[error("missing required setting: {key}")]
    Missing { key: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 저널 소스 에러
///
/// 소스 자체의 실패는 복구하지 않습니다. 데몬은 종료합니다.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// 소스 프로세스 실행 실패
    #[error("failed to start journal reader: {0}")]
    Spawn(String),

    /// 소스가 더 이상 데이터를 생산하지 않음
    #[error("journal source closed")]
    Closed,

    /// 읽기 실패
    #[error("journal read failed: {0}")]
    Io(#[from] std::io::Error),

    /// 엔트리 디코딩 실패
    #[error("failed to decode journal entry: {reason}")]
    Decode { reason: String },
}

/// 전달 에러 -- 데몬을 멈추게 하는 전송 실패
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// TLS 협상 실패
    #[error("tls negotiation failed: {0}")]
    Tls(String),

    /// 기타 전달 실패
    #[error("delivery failed: {0}")]
    Failed(String),
}
