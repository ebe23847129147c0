//! 메시지 정제기 -- 터미널 색상 코드 제거 및 줄바꿈 정규화
//!
//! # 규칙
//! - 컨테이너 메시지: `ESC [ <숫자/세미콜론>* m` 형태의 ANSI SGR 시퀀스를 제거
//! - 호스트 메시지: ANSI 단계는 건너뜀 (내용 그대로)
//! - 한 줄 모드 (RFC 5424): 모든 메시지에서 `\n` -> `#012`, `\r` 제거
//!
//! 정제는 멱등입니다. 줄바꿈 정규화를 먼저 수행하고, 제거 후 새로 드러나는
//! 시퀀스(예: `ESC[ESC[0m0m`)도 더 이상 매칭이 없을 때까지 반복 제거합니다.

use std::borrow::Cow;

use regex::Regex;

use journalpost_core::types::SyslogFormat;

use crate::error::ForwarderError;

/// ANSI SGR 색상 코드 정규식
const ANSI_COLOR_PATTERN: &str = r"\x1b\[[0-9;]*m";

/// 줄바꿈 대체 토큰 (8진수 012 = LF)
pub const NEWLINE_ESCAPE: &str = "#012";

/// 메시지 정제기
pub struct MessageSanitizer {
    /// 컴파일된 ANSI 색상 코드 정규식
    ansi: Regex,
    /// 본문을 한 줄로 만들어야 하는지 여부
    single_line: bool,
}

impl MessageSanitizer {
    /// 새 정제기를 생성합니다.
    pub fn new(single_line: bool) -> Result<Self, ForwarderError> {
        Ok(Self {
            ansi: Regex::new(ANSI_COLOR_PATTERN)?,
            single_line,
        })
    }

    /// 프레이밍에 맞는 정제기를 생성합니다.
    pub fn for_format(format: SyslogFormat) -> Result<Self, ForwarderError> {
        Self::new(format.requires_single_line())
    }

    /// 한 줄 모드 여부
    pub fn single_line(&self) -> bool {
        self.single_line
    }

    /// 메시지를 정제합니다.
    ///
    /// 변경이 없으면 빌린 문자열을 그대로 반환합니다.
    pub fn sanitize<'a>(&self, message: &'a str, from_container: bool) -> Cow<'a, str> {
        let mut out = Cow::Borrowed(message);

        // `\r` 제거가 색상 코드를 새로 만들 수 있으므로 줄바꿈을 먼저 정리
        if self.single_line && out.contains(['\n', '\r']) {
            let escaped = out.replace('\n', NEWLINE_ESCAPE).replace('\r', "");
            out = Cow::Owned(escaped);
        }

        if from_container {
            out = self.strip_ansi(out);
        }

        out
    }

    /// ANSI 색상 코드를 매칭이 없을 때까지 제거합니다.
    fn strip_ansi<'a>(&self, mut text: Cow<'a, str>) -> Cow<'a, str> {
        while self.ansi.is_match(&text) {
            text = Cow::Owned(self.ansi.replace_all(&text, "").into_owned());
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn legacy() -> MessageSanitizer {
        MessageSanitizer::new(false).unwrap()
    }

    fn single_line() -> MessageSanitizer {
        MessageSanitizer::new(true).unwrap()
    }

    #[test]
    fn strips_color_codes_from_container_messages() {
        let msg = "\x1b[32m2024-01-01 10:00:00 INFO started\x1b[0m";
        assert_eq!(
            legacy().sanitize(msg, true),
            "2024-01-01 10:00:00 INFO started"
        );
    }

    #[test]
    fn strips_compound_color_codes() {
        let msg = "\x1b[1;31;40mALERT\x1b[m done";
        assert_eq!(legacy().sanitize(msg, true), "ALERT done");
    }

    #[test]
    fn leaves_host_messages_untouched() {
        let msg = "\x1b[32mgreen\x1b[0m";
        assert_eq!(legacy().sanitize(msg, false), msg);
    }

    #[test]
    fn keeps_non_color_escape_sequences() {
        // 커서 이동(ESC[2J)은 색상 코드가 아니므로 유지
        let msg = "\x1b[2Jclear";
        assert_eq!(legacy().sanitize(msg, true), msg);
    }

    #[test]
    fn nested_sequence_is_removed_completely() {
        let msg = "a\x1b[\x1b[0m0mb";
        assert_eq!(legacy().sanitize(msg, true), "ab");
    }

    #[test]
    fn unchanged_message_is_borrowed() {
        let msg = "plain text";
        assert!(matches!(legacy().sanitize(msg, true), Cow::Borrowed(_)));
        assert!(matches!(single_line().sanitize(msg, false), Cow::Borrowed(_)));
    }

    #[test]
    fn single_line_escapes_newlines_and_drops_carriage_returns() {
        let msg = "Traceback:\r\n  File \"x.py\"\n    boom";
        assert_eq!(
            single_line().sanitize(msg, false),
            "Traceback:#012  File \"x.py\"#012    boom"
        );
    }

    #[test]
    fn carriage_return_inside_color_code_is_stripped_in_one_pass() {
        let sanitizer = single_line();
        let once = sanitizer.sanitize("x\x1b[\r0my", true).into_owned();
        assert_eq!(once, "xy");
        assert_eq!(sanitizer.sanitize(&once, true), once);
    }

    #[test]
    fn legacy_mode_keeps_newlines() {
        let msg = "line1\nline2";
        assert_eq!(legacy().sanitize(msg, true), msg);
    }

    #[test]
    fn single_line_and_color_strip_combine() {
        let msg = "\x1b[31mERROR\x1b[0m\nnext";
        assert_eq!(single_line().sanitize(msg, true), "ERROR#012next");
    }

    #[test]
    fn for_format_selects_single_line_mode() {
        assert!(MessageSanitizer::for_format(SyslogFormat::Rfc5424)
            .unwrap()
            .single_line());
        assert!(!MessageSanitizer::for_format(SyslogFormat::Rfc3164)
            .unwrap()
            .single_line());
    }

    fn message_strategy() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop_oneof![
                Just("\x1b[".to_owned()),
                Just("0m".to_owned()),
                Just(";".to_owned()),
                Just("\n".to_owned()),
                Just("\r".to_owned()),
                Just("#012".to_owned()),
                "[a-zA-Z0-9 ]{0,8}",
            ],
            0..24,
        )
        .prop_map(|parts| parts.concat())
    }

    proptest! {
        #[test]
        fn sanitize_is_idempotent(msg in message_strategy(), container in any::<bool>(), one_line in any::<bool>()) {
            let sanitizer = MessageSanitizer::new(one_line).unwrap();
            let once = sanitizer.sanitize(&msg, container).into_owned();
            let twice = sanitizer.sanitize(&once, container).into_owned();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn single_line_output_has_no_line_breaks(msg in message_strategy(), container in any::<bool>()) {
            let out = single_line().sanitize(&msg, container);
            prop_assert!(!out.contains('\n'));
            prop_assert!(!out.contains('\r'));
        }

        #[test]
        fn host_messages_keep_escape_bytes(msg in message_strategy()) {
            let out = legacy().sanitize(&msg, false);
            prop_assert_eq!(out.as_ref(), msg.as_str());
        }
    }
}
