//! 포워딩 루프 -- 저널 엔트리를 syslog 수집기로 전달합니다.
//!
//! [`Forwarder`]는 단일 스레드에서 블로킹 I/O로 동작하며, 유일한 대기 지점은
//! [`JournalSource::wait`]입니다.
//!
//! # 엔트리 처리 순서
//! ```text
//! JournalSource -> MessageSanitizer -> LevelResolver -> SyslogFormatter -> ResilientTransport
//! ```
//!
//! 레벨 접두사 문법은 정제된 메시지 기준이므로 정제가 레벨 판별보다 먼저 수행됩니다.
//! 복구 가능한 전송 실패는 debug 로그만 남기고 삼키며, TLS 실패와 소스 실패는
//! 호출자에게 전파됩니다.

use metrics::counter;
use tracing::{debug, info, warn};

use journalpost_core::config::{JournalpostConfig, SyslogConfig};
use journalpost_core::metrics::{FORWARDER_ENTRIES_TOTAL, LABEL_LEVEL};
use journalpost_core::pipeline::JournalSource;
use journalpost_core::types::JournalEntry;

use crate::error::ForwarderError;
use crate::format::{MessageMeta, SyslogFormatter};
use crate::level::{DEFAULT_STRUCTURED_SOURCES, LevelResolver};
use crate::sanitize::MessageSanitizer;
use crate::transport::ResilientTransport;

/// 포워더 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForwarderStats {
    /// 처리한 엔트리 수
    pub entries: u64,
    /// 수집기에 전달된 메시지 수
    pub delivered: u64,
    /// 드롭된 메시지 수
    pub dropped: u64,
}

/// 저널 -> syslog 포워더
///
/// # 사용 예시
/// ```ignore
/// use journalpost_forwarder::{ForwarderBuilder, JournalctlSource};
///
/// let source = JournalctlSource::spawn(&config.journal)?;
/// let mut forwarder = ForwarderBuilder::new()
///     .config(config)
///     .source(source)
///     .build()?;
///
/// // TLS 실패나 소스 종료 시에만 반환
/// forwarder.run()?;
/// ```
pub struct Forwarder<S> {
    source: S,
    sanitizer: MessageSanitizer,
    resolver: LevelResolver,
    formatter: SyslogFormatter,
    transport: ResilientTransport,
    stats: ForwarderStats,
}

impl<S: JournalSource> Forwarder<S> {
    /// 엔트리 하나를 전달합니다.
    ///
    /// 메시지를 전달하지 못해도 복구 가능한 실패면 `Ok(())`입니다.
    pub fn forward(&mut self, entry: &JournalEntry) -> Result<(), ForwarderError> {
        self.stats.entries += 1;

        let container = entry.container();
        let message = self.sanitizer.sanitize(&entry.message, container.is_some());
        let level = self.resolver.resolve(&message, container, entry.priority);
        counter!(FORWARDER_ENTRIES_TOTAL, LABEL_LEVEL => level.as_str()).increment(1);

        let meta = MessageMeta::new(entry.timestamp)
            .program(entry.identifier.as_deref())
            .pid(entry.pid);
        let syslog = self.formatter.format(level, &message, &meta);

        match self.transport.send(&syslog) {
            Ok(()) => {
                self.stats.delivered += 1;
                Ok(())
            }
            Err(e) if e.is_fatal() => Err(e.into()),
            Err(e) => {
                self.stats.dropped += 1;
                debug!(error = %e, %level, "dropped journal entry");
                Ok(())
            }
        }
    }

    /// 대기 한 번과 드레인 한 번을 수행합니다. 처리한 엔트리 수를 반환합니다.
    pub fn step(&mut self) -> Result<usize, ForwarderError> {
        self.source.wait()?;

        let mut handled = 0;
        while let Some(entry) = self.source.next_entry()? {
            self.forward(&entry)?;
            handled += 1;
        }
        Ok(handled)
    }

    /// 포워딩 루프를 실행합니다.
    ///
    /// 시작 시 한 번 연결을 시도합니다 (TLS 실패만 치명적).
    /// TLS 실패나 소스 실패가 발생할 때만 반환합니다.
    pub fn run(&mut self) -> Result<(), ForwarderError> {
        match self.transport.connect() {
            Ok(()) => {}
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => warn!(error = %e, "collector unavailable, will retry on next message"),
        }

        info!("forwarding journal entries");
        loop {
            self.step()?;
        }
    }

    /// 포워더 통계
    pub fn stats(&self) -> ForwarderStats {
        self.stats
    }

    /// 전송 계층
    pub fn transport(&self) -> &ResilientTransport {
        &self.transport
    }

    /// 레벨 판별기
    pub fn resolver(&self) -> &LevelResolver {
        &self.resolver
    }
}

/// 포워더 빌더
pub struct ForwarderBuilder<S> {
    syslog: SyslogConfig,
    source: Option<S>,
    transport: Option<ResilientTransport>,
    structured_sources: Option<Vec<String>>,
}

impl<S: JournalSource> ForwarderBuilder<S> {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            syslog: SyslogConfig::default(),
            source: None,
            transport: None,
            structured_sources: None,
        }
    }

    /// 통합 설정을 지정합니다.
    ///
    /// syslog 설정과 구조화 로깅 컨테이너 목록을 가져옵니다.
    pub fn config(mut self, config: JournalpostConfig) -> Self {
        self.syslog = config.syslog;
        if let Some(sources) = config.journal.structured_sources {
            self.structured_sources = Some(sources);
        }
        self
    }

    /// syslog 설정만 지정합니다.
    pub fn syslog_config(mut self, syslog: SyslogConfig) -> Self {
        self.syslog = syslog;
        self
    }

    /// 저널 소스를 지정합니다.
    pub fn source(mut self, source: S) -> Self {
        self.source = Some(source);
        self
    }

    /// 전송 계층을 직접 지정합니다. 설정하지 않으면 syslog 설정으로 생성합니다.
    pub fn transport(mut self, transport: ResilientTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// 구조화 로깅 컨테이너 목록을 지정합니다.
    pub fn structured_sources<I, T>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.structured_sources = Some(sources.into_iter().map(Into::into).collect());
        self
    }

    /// 포워더를 빌드합니다.
    pub fn build(self) -> Result<Forwarder<S>, ForwarderError> {
        let source = self.source.ok_or_else(|| ForwarderError::Config {
            field: "source".to_owned(),
            reason: "journal source is required".to_owned(),
        })?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => ResilientTransport::from_config(&self.syslog)?,
        };

        let resolver = match self.structured_sources {
            Some(sources) => LevelResolver::with_structured_sources(sources)?,
            None => LevelResolver::with_structured_sources(DEFAULT_STRUCTURED_SOURCES.iter().copied())?,
        };

        Ok(Forwarder {
            source,
            sanitizer: MessageSanitizer::for_format(self.syslog.format)?,
            resolver,
            formatter: SyslogFormatter::new(self.syslog.format, self.syslog.hostname),
            transport,
            stats: ForwarderStats::default(),
        })
    }
}

impl<S: JournalSource> Default for ForwarderBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}
