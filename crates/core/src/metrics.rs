//! 메트릭 상수 및 설명 등록
//!
//! 포워더의 모든 메트릭 이름과 설명을 중앙에서 정의합니다.
//! `metrics::counter!()` 매크로 호출 시 이 상수를 사용합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `journalpost_forwarder_`
//! - 접미어: `_total` (counter)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(journalpost_core::metrics::FORWARDER_ENTRIES_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 레벨 레이블 키 (DEBUG, INFO, WARNING, ERROR, CRITICAL)
pub const LABEL_LEVEL: &str = "level";

/// 드롭 사유 레이블 키 (connect, send)
pub const LABEL_REASON: &str = "reason";

// ─── Forwarder 메트릭 ───────────────────────────────────────────────

/// 처리된 저널 엔트리 수 (counter, label: level)
pub const FORWARDER_ENTRIES_TOTAL: &str = "journalpost_forwarder_entries_total";

/// 전송 성공한 메시지 수 (counter)
pub const FORWARDER_MESSAGES_SENT_TOTAL: &str = "journalpost_forwarder_messages_sent_total";

/// 드롭된 메시지 수 (counter, label: reason)
pub const FORWARDER_MESSAGES_DROPPED_TOTAL: &str = "journalpost_forwarder_messages_dropped_total";

/// 연결 시도 수 (counter)
pub const FORWARDER_CONNECT_ATTEMPTS_TOTAL: &str = "journalpost_forwarder_connect_attempts_total";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::describe_counter;

    describe_counter!(
        FORWARDER_ENTRIES_TOTAL,
        "Total number of journal entries processed, by resolved level"
    );
    describe_counter!(
        FORWARDER_MESSAGES_SENT_TOTAL,
        "Total number of syslog messages written to the collector"
    );
    describe_counter!(
        FORWARDER_MESSAGES_DROPPED_TOTAL,
        "Total number of syslog messages dropped because the collector was unavailable"
    );
    describe_counter!(
        FORWARDER_CONNECT_ATTEMPTS_TOTAL,
        "Total number of connection attempts to the collector"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_names_share_prefix() {
        for name in [
            FORWARDER_ENTRIES_TOTAL,
            FORWARDER_MESSAGES_SENT_TOTAL,
            FORWARDER_MESSAGES_DROPPED_TOTAL,
            FORWARDER_CONNECT_ATTEMPTS_TOTAL,
        ] {
            assert!(name.starts_with("journalpost_forwarder_"));
            assert!(name.ends_with("_total"));
        }
    }

    #[test]
    fn describe_without_recorder_is_noop() {
        describe_all();
    }
}
