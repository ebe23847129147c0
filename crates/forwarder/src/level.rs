//! 레벨 판별기 -- 저널 엔트리의 심각도 결정
//!
//! [`LevelResolver`]는 엔트리 출처에 따라 세 가지 규칙 중 하나를 적용합니다.
//!
//! 1. 호스트 엔트리 (컨테이너 없음): 저널 `PRIORITY` 값을 고정 테이블로 매핑
//! 2. 구조화 로깅 컨테이너가 아닌 컨테이너: 항상 기본 레벨 (`INFO`)
//! 3. 구조화 로깅 컨테이너: 메시지 접두사에서 레벨을 파싱.
//!    실패하면 (여러 줄 traceback의 연속 라인 등) 같은 컨테이너의 마지막 레벨을 이어받음
//!
//! # 레벨 접두사 문법
//! ```text
//! ^<token> <token> <LEVEL>
//! token := 공백이 아닌 문자 1개 이상
//! LEVEL := INFO | WARNING | DEBUG | ERROR | CRITICAL
//! ```
//! 예: `2024-01-01 10:00:00.123 WARNING (MainThread) [homeassistant.core] ...`

use std::collections::{HashMap, HashSet};

use regex::Regex;
use tracing::trace;

use journalpost_core::types::Level;

use crate::error::ForwarderError;

/// 레벨을 메시지에서 파싱할 수 있는 기본 컨테이너 목록
pub const DEFAULT_STRUCTURED_SOURCES: &[&str] = &["homeassistant", "hassio_supervisor"];

/// 레벨 접두사 정규식
const LEVEL_PREFIX_PATTERN: &str = r"^\S+ \S+ (?P<level>INFO|WARNING|DEBUG|ERROR|CRITICAL) ";

/// 레벨 접두사 문법
///
/// 공백으로 구분된 토큰 두 개 다음에 레벨 이름과 공백이 오는 형태만 인식합니다.
pub struct LevelPrefixGrammar {
    /// 컴파일된 접두사 정규식
    pattern: Regex,
}

impl LevelPrefixGrammar {
    /// 문법을 컴파일합니다.
    pub fn new() -> Result<Self, ForwarderError> {
        Ok(Self {
            pattern: Regex::new(LEVEL_PREFIX_PATTERN)?,
        })
    }

    /// 메시지 접두사에서 레벨을 파싱합니다. 접두사가 없으면 `None`입니다.
    pub fn parse(&self, message: &str) -> Option<Level> {
        self.pattern
            .captures(message)
            .and_then(|caps| caps.name("level"))
            .and_then(|m| Level::from_name(m.as_str()))
    }
}

/// 컨테이너별 마지막 레벨 상태
///
/// 프로세스 수명 동안 유지되며, 구조화 로깅 컨테이너의 라인에서 레벨이
/// 새로 파싱될 때만 갱신됩니다.
#[derive(Debug, Default, Clone)]
pub struct LevelState {
    /// 컨테이너 이름 -> 마지막으로 파싱된 레벨
    last_level: HashMap<String, Level>,
}

impl LevelState {
    /// 빈 상태를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 컨테이너의 마지막 레벨을 반환합니다.
    pub fn last_level(&self, container: &str) -> Option<Level> {
        self.last_level.get(container).copied()
    }

    /// 컨테이너의 마지막 레벨을 기록합니다.
    fn record(&mut self, container: &str, level: Level) {
        match self.last_level.get_mut(container) {
            Some(slot) => *slot = level,
            None => {
                self.last_level.insert(container.to_owned(), level);
            }
        }
    }

    /// 기록된 컨테이너 수
    pub fn len(&self) -> usize {
        self.last_level.len()
    }

    /// 기록이 하나도 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.last_level.is_empty()
    }
}

/// 레벨 판별기
pub struct LevelResolver {
    /// 레벨 접두사 문법
    grammar: LevelPrefixGrammar,
    /// 구조화 로깅 컨테이너 집합
    structured_sources: HashSet<String>,
    /// 컨테이너별 이어받기 상태
    state: LevelState,
}

impl LevelResolver {
    /// 기본 구조화 로깅 컨테이너 목록으로 판별기를 생성합니다.
    pub fn new() -> Result<Self, ForwarderError> {
        Self::with_structured_sources(DEFAULT_STRUCTURED_SOURCES.iter().copied())
    }

    /// 구조화 로깅 컨테이너 목록을 지정하여 판별기를 생성합니다.
    pub fn with_structured_sources<I, S>(sources: I) -> Result<Self, ForwarderError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            grammar: LevelPrefixGrammar::new()?,
            structured_sources: sources.into_iter().map(Into::into).collect(),
            state: LevelState::new(),
        })
    }

    /// 엔트리의 레벨을 결정합니다.
    ///
    /// `message`는 이미 정제된 메시지여야 합니다 (ANSI 색상 코드가 남아 있으면
    /// 접두사를 인식하지 못함). `container`가 `None`이거나 비어 있으면 호스트 엔트리입니다.
    pub fn resolve(&mut self, message: &str, container: Option<&str>, priority: Option<u8>) -> Level {
        let container = match container.filter(|name| !name.is_empty()) {
            None => return Self::host_level(priority),
            Some(name) => name,
        };

        if !self.structured_sources.contains(container) {
            return Level::default();
        }

        match self.grammar.parse(message) {
            Some(level) => {
                self.state.record(container, level);
                level
            }
            None => {
                let carried = self.state.last_level(container).unwrap_or_default();
                trace!(container, level = %carried, "no level prefix, carrying previous level");
                carried
            }
        }
    }

    /// 호스트 엔트리의 우선순위를 레벨로 매핑합니다.
    ///
    /// 우선순위가 없거나 범위를 벗어나면 `INFO`입니다.
    pub fn host_level(priority: Option<u8>) -> Level {
        priority
            .and_then(Level::from_priority)
            .unwrap_or_default()
    }

    /// 컨테이너가 구조화 로깅 소스인지 확인합니다.
    pub fn is_structured_source(&self, container: &str) -> bool {
        self.structured_sources.contains(container)
    }

    /// 이어받기 상태를 반환합니다.
    pub fn state(&self) -> &LevelState {
        &self.state
    }
}
