//! journalctl 자식 프로세스 기반 저널 소스
//!
//! 현재 부팅의 저널 끝에서부터 새로 기록되는 엔트리만 따라갑니다.
//!
//! ```text
//! journalctl --directory <path> --boot --follow --lines=0 --all --output=json
//! ```
//!
//! 출력은 엔트리당 한 줄이며, [`LineSource`]가 완성된 줄만 디코딩합니다.

use std::io::Read;
use std::process::{Child, ChildStdout, Command, Stdio};

use tracing::{debug, info, warn};

use journalpost_core::config::JournalConfig;
use journalpost_core::error::SourceError;
use journalpost_core::pipeline::JournalSource;
use journalpost_core::types::JournalEntry;

use super::journal_json::parse_journal_line;

/// journalctl 실행 파일 이름
pub const JOURNALCTL_BIN: &str = "journalctl";

/// 한 번에 읽는 최대 바이트 수
const READ_CHUNK_SIZE: usize = 64 * 1024;

/// 줄 단위 JSON 스트림 소스
///
/// 임의의 `Read` 위에서 동작합니다. `wait`는 데이터가 올 때까지 블로킹하고,
/// `next_entry`는 버퍼에 완성된 줄이 있을 때만 엔트리를 반환합니다.
/// 줄 길이에는 제한이 없습니다.
pub struct LineSource<R> {
    reader: R,
    /// 아직 줄바꿈을 만나지 못한 바이트
    pending: Vec<u8>,
    chunk: Vec<u8>,
}

impl<R: Read> LineSource<R> {
    /// 리더를 감싸는 소스를 생성합니다.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: Vec::new(),
            chunk: vec![0; READ_CHUNK_SIZE],
        }
    }

    /// 버퍼에 남은 바이트 수
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

impl<R: Read> JournalSource for LineSource<R> {
    fn wait(&mut self) -> Result<(), SourceError> {
        if self.pending.contains(&b'\n') {
            return Ok(());
        }
        loop {
            match self.reader.read(&mut self.chunk) {
                Ok(0) => return Err(SourceError::Closed),
                Ok(n) => {
                    self.pending.extend_from_slice(&self.chunk[..n]);
                    return Ok(());
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(SourceError::Io(e)),
            }
        }
    }

    fn next_entry(&mut self) -> Result<Option<JournalEntry>, SourceError> {
        loop {
            let Some(end) = self.pending.iter().position(|&b| b == b'\n') else {
                return Ok(None);
            };
            let line: Vec<u8> = self.pending.drain(..=end).collect();
            let text = String::from_utf8_lossy(&line);
            if text.trim().is_empty() {
                continue;
            }
            return parse_journal_line(&text).map(Some);
        }
    }
}

/// journalctl 자식 프로세스 소스
pub struct JournalctlSource {
    child: Child,
    lines: LineSource<ChildStdout>,
}

impl JournalctlSource {
    /// journalctl을 실행합니다.
    pub fn spawn(config: &JournalConfig) -> Result<Self, SourceError> {
        Self::spawn_with(JOURNALCTL_BIN, config)
    }

    /// 지정한 실행 파일로 journalctl을 실행합니다.
    pub fn spawn_with(program: &str, config: &JournalConfig) -> Result<Self, SourceError> {
        let args = journalctl_args(config);
        debug!(program, ?args, "spawning journal reader");

        let mut child = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| SourceError::Spawn(format!("{program}: {e}")))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SourceError::Spawn(format!("{program}: stdout not captured")))?;

        info!(path = %config.path, pid = child.id(), "journal reader started");
        Ok(Self {
            child,
            lines: LineSource::new(stdout),
        })
    }

    /// 자식 프로세스 ID
    pub fn pid(&self) -> u32 {
        self.child.id()
    }
}

impl JournalSource for JournalctlSource {
    fn wait(&mut self) -> Result<(), SourceError> {
        self.lines.wait()
    }

    fn next_entry(&mut self) -> Result<Option<JournalEntry>, SourceError> {
        self.lines.next_entry()
    }
}

impl Drop for JournalctlSource {
    fn drop(&mut self) {
        if let Err(e) = self.child.kill() {
            debug!(error = %e, "journal reader already exited");
        }
        match self.child.wait() {
            Ok(status) => debug!(%status, "journal reader stopped"),
            Err(e) => warn!(error = %e, "failed to reap journal reader"),
        }
    }
}

/// journalctl 인자 목록을 만듭니다.
pub fn journalctl_args(config: &JournalConfig) -> Vec<String> {
    vec![
        "--directory".to_owned(),
        config.path.clone(),
        "--boot".to_owned(),
        "--follow".to_owned(),
        "--lines=0".to_owned(),
        "--all".to_owned(),
        "--output=json".to_owned(),
    ]
}
