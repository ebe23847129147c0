//! 파이프라인 trait -- 모듈 확장 포인트 정의

use crate::error::SourceError;
use crate::types::JournalEntry;

/// 저널 소스 trait
///
/// 포워더의 유일한 입력 경계입니다. 구현체는 도착 순서대로 엔트리를 내보내야 합니다.
///
/// 사용 패턴:
/// ```ignore
/// loop {
///     source.wait()?;
///     while let Some(entry) = source.next_entry()? {
///         // ...
///     }
/// }
/// ```
pub trait JournalSource {
    /// 새 데이터가 생길 때까지 타임아웃 없이 대기합니다.
    ///
    /// 소스가 닫히면 [`SourceError::Closed`]를 반환합니다.
    fn wait(&mut self) -> Result<(), SourceError>;

    /// 지금 읽을 수 있는 다음 엔트리를 반환합니다.
    ///
    /// 더 이상 즉시 읽을 엔트리가 없으면 `Ok(None)`입니다.
    fn next_entry(&mut self) -> Result<Option<JournalEntry>, SourceError>;
}

impl<S: JournalSource + ?Sized> JournalSource for Box<S> {
    fn wait(&mut self) -> Result<(), SourceError> {
        (**self).wait()
    }

    fn next_entry(&mut self) -> Result<Option<JournalEntry>, SourceError> {
        (**self).next_entry()
    }
}
