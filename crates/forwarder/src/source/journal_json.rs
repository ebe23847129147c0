//! journalctl JSON 출력 디코더
//!
//! `journalctl --output=json`은 엔트리마다 한 줄의 JSON 객체를 출력합니다.
//! 필드 값은 다음 중 하나입니다.
//!
//! - 문자열
//! - 바이트 배열 (UTF-8이 아니거나 제어 문자가 포함된 값)
//! - 값 배열 (같은 필드가 여러 번 기록된 경우, 첫 값을 사용)
//! - `null` (크기 제한을 넘은 값, 없는 것으로 취급)
//!
//! 숫자 필드(`PRIORITY`, `_PID`, `__REALTIME_TIMESTAMP`)도 문자열로 인코딩됩니다.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::{Map, Value};

use journalpost_core::error::SourceError;
use journalpost_core::types::JournalEntry;

const FIELD_MESSAGE: &str = "MESSAGE";
const FIELD_PRIORITY: &str = "PRIORITY";
const FIELD_IDENTIFIER: &str = "SYSLOG_IDENTIFIER";
const FIELD_CONTAINER: &str = "CONTAINER_NAME";
const FIELD_PID: &str = "_PID";
const FIELD_REALTIME: &str = "__REALTIME_TIMESTAMP";

/// journalctl JSON 한 줄을 엔트리로 디코딩합니다.
///
/// 잘못된 JSON이나 객체가 아닌 값은 [`SourceError::Decode`]입니다.
/// 숫자 필드가 잘못된 경우는 해당 필드만 없는 것으로 취급합니다.
pub fn parse_journal_line(line: &str) -> Result<JournalEntry, SourceError> {
    let value: Value = serde_json::from_str(line.trim()).map_err(|e| SourceError::Decode {
        reason: e.to_string(),
    })?;

    let Value::Object(fields) = value else {
        return Err(SourceError::Decode {
            reason: "journal entry is not a JSON object".to_owned(),
        });
    };

    Ok(entry_from_fields(&fields))
}

fn entry_from_fields(fields: &Map<String, Value>) -> JournalEntry {
    let mut entry = JournalEntry::new(field_text(fields, FIELD_MESSAGE).unwrap_or_default());

    entry.priority = field_number::<u8>(fields, FIELD_PRIORITY);
    entry.identifier = field_text(fields, FIELD_IDENTIFIER);
    entry.container_name = field_text(fields, FIELD_CONTAINER);
    entry.pid = field_number::<u32>(fields, FIELD_PID);
    if let Some(micros) = field_number::<u64>(fields, FIELD_REALTIME) {
        entry.timestamp = UNIX_EPOCH + Duration::from_micros(micros);
    } else {
        entry.timestamp = SystemTime::now();
    }

    entry
}

fn field_text(fields: &Map<String, Value>, name: &str) -> Option<String> {
    fields.get(name).and_then(decode_value)
}

fn field_number<T: std::str::FromStr>(fields: &Map<String, Value>, name: &str) -> Option<T> {
    field_text(fields, name).and_then(|s| s.trim().parse().ok())
}

/// 필드 값 하나를 텍스트로 디코딩합니다.
fn decode_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) if is_byte_array(items) => {
            let bytes: Vec<u8> = items
                .iter()
                .filter_map(Value::as_u64)
                .filter_map(|b| u8::try_from(b).ok())
                .collect();
            Some(String::from_utf8_lossy(&bytes).into_owned())
        }
        // 여러 값이 기록된 필드는 첫 값이 우선
        Value::Array(items) => items.first().and_then(decode_value),
        Value::Null | Value::Bool(_) | Value::Object(_) => None,
    }
}

fn is_byte_array(items: &[Value]) -> bool {
    !items.is_empty()
        && items
            .iter()
            .all(|v| v.as_u64().is_some_and(|b| b <= u64::from(u8::MAX)))
}
