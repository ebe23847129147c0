//! TLS 클라이언트 설정 및 핸드셰이크
//!
//! - [`TlsSettings::Verified`]: 시스템 루트 인증서로 서버 인증서와 호스트명을 검증
//! - [`TlsSettings::Insecure`]: 검증 없이 암호화만 수행 (자체 서명 인증서 수집기용)
//! - [`TlsSettings::Custom`]: 호출자가 만든 `rustls::ClientConfig`를 그대로 사용

use std::fmt;
use std::io;
use std::net::TcpStream;
use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{CryptoProvider, verify_tls12_signature, verify_tls13_signature};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, ClientConnection, DigitallySignedStruct, RootCertStore, SignatureScheme, StreamOwned};
use tracing::{debug, warn};

use crate::error::TransportError;

/// TLS 스트림
pub(crate) type TlsStream = StreamOwned<ClientConnection, TcpStream>;

/// TLS 설정
#[derive(Clone)]
pub enum TlsSettings {
    /// 시스템 루트 인증서로 검증
    Verified,
    /// 인증서/호스트명 검증 없음
    Insecure,
    /// 호출자 제공 클라이언트 설정
    Custom(Arc<ClientConfig>),
}

impl fmt::Debug for TlsSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verified => f.write_str("Verified"),
            Self::Insecure => f.write_str("Insecure"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl TlsSettings {
    /// 검증 여부 플래그로 설정을 선택합니다.
    pub fn from_verify(verify: bool) -> Self {
        if verify { Self::Verified } else { Self::Insecure }
    }

    /// `rustls` 클라이언트 설정을 생성합니다.
    pub(crate) fn client_config(&self) -> Result<Arc<ClientConfig>, TransportError> {
        init_crypto_provider()?;
        match self {
            Self::Custom(config) => Ok(Arc::clone(config)),
            Self::Verified => {
                let roots = native_root_store();
                Ok(Arc::new(
                    ClientConfig::builder()
                        .with_root_certificates(roots)
                        .with_no_client_auth(),
                ))
            }
            Self::Insecure => {
                let provider = provider()?;
                Ok(Arc::new(
                    ClientConfig::builder()
                        .dangerous()
                        .with_custom_certificate_verifier(SkipServerVerification::new(provider))
                        .with_no_client_auth(),
                ))
            }
        }
    }
}

/// 프로세스 기본 암호 provider를 설치합니다. 이미 설치되어 있으면 아무것도 하지 않습니다.
pub fn init_crypto_provider() -> Result<(), TransportError> {
    if CryptoProvider::get_default().is_none() {
        // 다른 스레드가 먼저 설치한 경우에도 Err이므로 다시 확인
        if rustls::crypto::aws_lc_rs::default_provider()
            .install_default()
            .is_err()
            && CryptoProvider::get_default().is_none()
        {
            return Err(TransportError::Tls {
                peer: "-".to_owned(),
                reason: "failed to initialize crypto provider".to_owned(),
            });
        }
    }
    Ok(())
}

fn provider() -> Result<Arc<CryptoProvider>, TransportError> {
    CryptoProvider::get_default()
        .cloned()
        .ok_or_else(|| TransportError::Tls {
            peer: "-".to_owned(),
            reason: "no crypto provider installed".to_owned(),
        })
}

fn native_root_store() -> RootCertStore {
    let mut roots = RootCertStore::empty();
    let result = rustls_native_certs::load_native_certs();
    for err in &result.errors {
        warn!(error = %err, "failed to load a native root certificate");
    }
    let (added, ignored) = roots.add_parsable_certificates(result.certs);
    debug!(added, ignored, "loaded native root certificates");
    roots
}

/// TCP 연결 위에서 TLS 핸드셰이크를 완료합니다.
///
/// 핸드셰이크 중의 프로토콜/인증서 오류와 상대의 연결 종료는 [`TransportError::Tls`],
/// 그 외 I/O 오류는 [`TransportError::Connect`]입니다.
pub(crate) fn handshake(
    config: Arc<ClientConfig>,
    host: &str,
    peer: &str,
    mut tcp: TcpStream,
) -> Result<TlsStream, TransportError> {
    let server_name = ServerName::try_from(host.to_owned()).map_err(|e| TransportError::Tls {
        peer: peer.to_owned(),
        reason: format!("invalid server name '{host}': {e}"),
    })?;

    let mut conn = ClientConnection::new(config, server_name).map_err(|e| TransportError::Tls {
        peer: peer.to_owned(),
        reason: e.to_string(),
    })?;

    while conn.is_handshaking() {
        conn.complete_io(&mut tcp)
            .map_err(|e| classify_handshake_error(peer, e))?;
    }

    Ok(StreamOwned::new(conn, tcp))
}

fn classify_handshake_error(peer: &str, err: io::Error) -> TransportError {
    let is_tls = err.kind() == io::ErrorKind::UnexpectedEof
        || err
            .get_ref()
            .is_some_and(|inner| inner.downcast_ref::<rustls::Error>().is_some());

    if is_tls {
        TransportError::Tls {
            peer: peer.to_owned(),
            reason: err.to_string(),
        }
    } else {
        TransportError::Connect {
            peer: peer.to_owned(),
            reason: err.to_string(),
        }
    }
}

/// 서버 인증서를 검증하지 않는 verifier
///
/// 서명 자체는 provider 알고리즘으로 확인합니다.
struct SkipServerVerification {
    provider: Arc<CryptoProvider>,
}

impl SkipServerVerification {
    fn new(provider: Arc<CryptoProvider>) -> Arc<Self> {
        Arc::new(Self { provider })
    }
}

impl fmt::Debug for SkipServerVerification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SkipServerVerification")
    }
}

impl ServerCertVerifier for SkipServerVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_verify_selects_mode() {
        assert!(matches!(TlsSettings::from_verify(true), TlsSettings::Verified));
        assert!(matches!(TlsSettings::from_verify(false), TlsSettings::Insecure));
    }

    #[test]
    fn insecure_config_builds() {
        assert!(TlsSettings::Insecure.client_config().is_ok());
    }

    #[test]
    fn custom_config_is_reused() {
        init_crypto_provider().unwrap();
        let config = Arc::new(
            ClientConfig::builder()
                .with_root_certificates(RootCertStore::empty())
                .with_no_client_auth(),
        );
        let built = TlsSettings::Custom(Arc::clone(&config))
            .client_config()
            .unwrap();
        assert!(Arc::ptr_eq(&config, &built));
    }

    #[test]
    fn eof_during_handshake_is_tls_error() {
        let err = io::Error::new(io::ErrorKind::UnexpectedEof, "peer closed");
        assert!(classify_handshake_error("h:1", err).is_fatal());
    }

    #[test]
    fn rustls_error_during_handshake_is_tls_error() {
        let err = io::Error::new(
            io::ErrorKind::InvalidData,
            rustls::Error::General("bad record".to_owned()),
        );
        assert!(classify_handshake_error("h:1", err).is_fatal());
    }

    #[test]
    fn plain_io_error_during_handshake_is_connect_error() {
        let err = io::Error::new(io::ErrorKind::ConnectionReset, "reset");
        let classified = classify_handshake_error("h:1", err);
        assert!(!classified.is_fatal());
        assert_eq!(classified.kind(), "connect");
    }
}
