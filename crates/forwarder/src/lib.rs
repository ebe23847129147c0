#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`source`]: 저널 소스 (journalctl JSON 출력 리더와 디코더)
//! - [`sanitize`]: ANSI 색상 코드 제거와 한 줄 정규화
//! - [`level`]: 레벨 판별 (호스트 우선순위 테이블, 컨테이너 접두사 문법, 이어받기)
//! - [`format`]: RFC 3164 / RFC 5424 본문 렌더링
//! - [`transport`]: 재연결하는 syslog 전송 (Unix/UDP/TCP/TLS)
//! - [`forwarder`]: 포워딩 루프와 빌더
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! JournalSource -> MessageSanitizer -> LevelResolver -> SyslogFormatter -> ResilientTransport
//!      |                 |                  |                 |                    |
//!  journalctl       ANSI / #012       PRIORITY / prefix    3164 / 5424     <PRI>body\0
//! ```

pub mod error;
pub mod format;
pub mod forwarder;
pub mod level;
pub mod sanitize;
pub mod source;
pub mod transport;

// --- 주요 타입 re-export ---

// 포워더
pub use forwarder::{Forwarder, ForwarderBuilder, ForwarderStats};

// 에러
pub use error::{ForwarderError, TransportError};

// 처리 단계
pub use format::{MessageMeta, SyslogFormatter, SyslogMessage};
pub use level::{LevelPrefixGrammar, LevelResolver, LevelState};
pub use sanitize::MessageSanitizer;

// 전송
pub use transport::{
    Destination, ResilientTransport, TlsSettings, TransportConfig, TransportStats,
};

// 소스
pub use source::{JournalctlSource, LineSource, parse_journal_line};
