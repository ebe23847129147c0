//! 저널 소스 구현
//!
//! [`JournalSource`](journalpost_core::pipeline::JournalSource) trait의 구현체입니다.
//! 기본 구현은 `journalctl` 자식 프로세스의 JSON 출력을 읽습니다.

pub mod journal_json;
pub mod journalctl;

pub use journal_json::parse_journal_line;
pub use journalctl::{JournalctlSource, LineSource};
