//! 수집기 연결 -- 소켓 종류별 열기/쓰기

use std::io::{self, Write};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, TcpStream, ToSocketAddrs, UdpSocket};
#[cfg(unix)]
use std::os::unix::net::{UnixDatagram, UnixStream};
use std::path::Path;
use std::sync::Arc;

use rustls::ClientConfig;
use tracing::debug;

use journalpost_core::types::Protocol;

use super::tls::{self, TlsStream};
use crate::error::TransportError;

/// 열린 수집기 연결
pub(crate) enum Connection {
    #[cfg(unix)]
    UnixDatagram(UnixDatagram),
    #[cfg(unix)]
    UnixStream(UnixStream),
    Udp {
        socket: UdpSocket,
        peer: SocketAddr,
    },
    Tcp(TcpStream),
    Tls(Box<TlsStream>),
}

impl Connection {
    /// 프레임 하나를 씁니다.
    pub(crate) fn send_frame(&mut self, frame: &[u8]) -> io::Result<()> {
        match self {
            #[cfg(unix)]
            Self::UnixDatagram(sock) => sock.send(frame).map(drop),
            #[cfg(unix)]
            Self::UnixStream(stream) => stream.write_all(frame),
            Self::Udp { socket, peer } => socket.send_to(frame, *peer).map(drop),
            Self::Tcp(stream) => stream.write_all(frame),
            Self::Tls(stream) => {
                stream.write_all(frame)?;
                stream.flush()
            }
        }
    }

    /// 로그용 연결 종류 이름
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            #[cfg(unix)]
            Self::UnixDatagram(_) => "unix_dgram",
            #[cfg(unix)]
            Self::UnixStream(_) => "unix_stream",
            Self::Udp { .. } => "udp",
            Self::Tcp(_) => "tcp",
            Self::Tls(_) => "tls",
        }
    }
}

/// Unix 도메인 소켓을 엽니다. 데이터그램을 먼저 시도하고 실패하면 스트림으로 연결합니다.
#[cfg(unix)]
pub(crate) fn open_unix(path: &Path) -> Result<Connection, TransportError> {
    let dgram_err = match UnixDatagram::unbound().and_then(|sock| sock.connect(path).map(|()| sock)) {
        Ok(sock) => return Ok(Connection::UnixDatagram(sock)),
        Err(e) => e,
    };
    debug!(path = %path.display(), error = %dgram_err, "datagram connect failed, trying stream");

    UnixStream::connect(path)
        .map(Connection::UnixStream)
        .map_err(|e| TransportError::Connect {
            peer: path.display().to_string(),
            reason: e.to_string(),
        })
}

#[cfg(not(unix))]
pub(crate) fn open_unix(path: &Path) -> Result<Connection, TransportError> {
    Err(TransportError::Connect {
        peer: path.display().to_string(),
        reason: "unix domain sockets are not supported on this platform".to_owned(),
    })
}

/// 호스트/포트를 해석하고 후보 주소를 순서대로 시도합니다. 첫 성공이 이깁니다.
///
/// TLS 오류는 즉시 반환합니다. 나머지 실패는 다음 후보로 넘어가며,
/// 모든 후보가 실패하면 마지막 오류를 반환합니다.
pub(crate) fn open_inet(
    host: &str,
    port: u16,
    protocol: Protocol,
    tls: Option<&Arc<ClientConfig>>,
) -> Result<Connection, TransportError> {
    let peer = format!("{host}:{port}");
    let candidates = (host, port)
        .to_socket_addrs()
        .map_err(|e| TransportError::Connect {
            peer: peer.clone(),
            reason: format!("name resolution failed: {e}"),
        })?;

    let mut last_err = TransportError::Connect {
        peer: peer.clone(),
        reason: "no addresses resolved".to_owned(),
    };

    for addr in candidates {
        let attempt = match protocol {
            Protocol::Udp => open_udp(addr),
            Protocol::Tcp => open_tcp(addr, host, &peer, tls),
        };
        match attempt {
            Ok(conn) => return Ok(conn),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                debug!(%addr, error = %e, "candidate address failed");
                last_err = e;
            }
        }
    }

    Err(last_err)
}

fn open_udp(addr: SocketAddr) -> Result<Connection, TransportError> {
    let bind = if addr.is_ipv4() {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
    } else {
        SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
    };
    UdpSocket::bind(bind)
        .map(|socket| Connection::Udp { socket, peer: addr })
        .map_err(|e| TransportError::Connect {
            peer: addr.to_string(),
            reason: e.to_string(),
        })
}

fn open_tcp(
    addr: SocketAddr,
    host: &str,
    peer: &str,
    tls: Option<&Arc<ClientConfig>>,
) -> Result<Connection, TransportError> {
    let stream = TcpStream::connect(addr).map_err(|e| TransportError::Connect {
        peer: addr.to_string(),
        reason: e.to_string(),
    })?;

    match tls {
        None => Ok(Connection::Tcp(stream)),
        Some(config) => tls::handshake(Arc::clone(config), host, peer, stream)
            .map(|s| Connection::Tls(Box::new(s))),
    }
}
