//! 수집기 커넥터.
//!
//! 사이클마다 새 TCP 소켓을 열고(송신 버퍼 지정), 필요하면 TLS 핸드셰이크를 한다.
//! TLS는 플랫폼 기본 신뢰 저장소를 사용하며 인증서 피닝은 하지 않는다.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::{lookup_host, TcpSocket, TcpStream};
use tokio_native_tls::native_tls;
use tracing::{debug, warn};
use wycdn_core::config::CollectorConfig;
use wycdn_core::error::CoreError;
use wycdn_core::models::metric::MetricLine;
use wycdn_core::ports::collector::{CollectorConnection, CollectorConnector, CollectorTarget};

/// 소켓 파라미터
#[derive(Debug, Clone, Copy)]
pub struct ConnectSettings {
    /// 연결 + 핸드셰이크 타임아웃
    pub connect_timeout: Duration,
    /// 쓰기/flush/종료 타임아웃
    pub io_timeout: Duration,
    /// 소켓 송신 버퍼 크기
    pub send_buffer_bytes: u32,
}

impl ConnectSettings {
    pub fn from_config(config: &CollectorConfig) -> Self {
        Self {
            connect_timeout: Duration::from_millis(config.connect_timeout_ms),
            io_timeout: Duration::from_millis(config.io_timeout_ms),
            send_buffer_bytes: config.send_buffer_bytes,
        }
    }
}

impl Default for ConnectSettings {
    fn default() -> Self {
        Self::from_config(&CollectorConfig::default())
    }
}

/// 설정에 맞는 커넥터 생성 (`tls = false`면 평문 TCP)
pub fn connector_for(config: &CollectorConfig) -> Result<Arc<dyn CollectorConnector>, CoreError> {
    let settings = ConnectSettings::from_config(config);
    if config.tls {
        Ok(Arc::new(TlsCollectorConnector::new(settings)?))
    } else {
        warn!("수집기 TLS 비활성화, 평문 TCP 사용");
        Ok(Arc::new(TcpCollectorConnector::new(settings)))
    }
}

/// TLS 수집기 커넥터
pub struct TlsCollectorConnector {
    settings: ConnectSettings,
    tls: tokio_native_tls::TlsConnector,
}

impl TlsCollectorConnector {
    pub fn new(settings: ConnectSettings) -> Result<Self, CoreError> {
        let connector = native_tls::TlsConnector::new()
            .map_err(|e| CoreError::Tls(format!("TLS 커넥터 초기화 실패: {e}")))?;
        Ok(Self {
            settings,
            tls: tokio_native_tls::TlsConnector::from(connector),
        })
    }
}

#[async_trait]
impl CollectorConnector for TlsCollectorConnector {
    async fn connect(
        &self,
        target: &CollectorTarget,
    ) -> Result<Box<dyn CollectorConnection>, CoreError> {
        let settings = self.settings;
        let handshake = async {
            let tcp = open_tcp(target, settings.send_buffer_bytes).await?;
            self.tls
                .connect(&target.hostname, tcp)
                .await
                .map_err(|e| CoreError::Tls(format!("{target} 핸드셰이크 실패: {e}")))
        };

        let stream = with_timeout(settings.connect_timeout, handshake).await?;
        debug!("수집기 TLS 연결 수립: {target}");
        Ok(Box::new(StreamConnection::new(stream, settings.io_timeout)))
    }
}

/// 평문 TCP 수집기 커넥터 (로컬 수집기용)
pub struct TcpCollectorConnector {
    settings: ConnectSettings,
}

impl TcpCollectorConnector {
    pub fn new(settings: ConnectSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl CollectorConnector for TcpCollectorConnector {
    async fn connect(
        &self,
        target: &CollectorTarget,
    ) -> Result<Box<dyn CollectorConnection>, CoreError> {
        let settings = self.settings;
        let stream = with_timeout(
            settings.connect_timeout,
            open_tcp(target, settings.send_buffer_bytes),
        )
        .await?;
        debug!("수집기 TCP 연결 수립: {target}");
        Ok(Box::new(StreamConnection::new(stream, settings.io_timeout)))
    }
}

/// 임의의 쓰기 스트림 위의 수집기 연결
pub struct StreamConnection<S> {
    stream: S,
    io_timeout: Duration,
}

impl<S> StreamConnection<S>
where
    S: AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S, io_timeout: Duration) -> Self {
        Self { stream, io_timeout }
    }
}

#[async_trait]
impl<S> CollectorConnection for StreamConnection<S>
where
    S: AsyncWrite + Unpin + Send,
{
    async fn send_line(&mut self, line: &MetricLine) -> Result<(), CoreError> {
        let mut buf = Vec::with_capacity(line.len() + 1);
        buf.extend_from_slice(line.as_str().as_bytes());
        buf.push(b'\n');

        let stream = &mut self.stream;
        with_timeout(self.io_timeout, async move {
            stream.write_all(&buf).await?;
            stream.flush().await?;
            Ok::<(), CoreError>(())
        })
        .await
    }

    async fn close(&mut self) -> Result<(), CoreError> {
        let stream = &mut self.stream;
        with_timeout(self.io_timeout, async move {
            stream.shutdown().await?;
            Ok::<(), CoreError>(())
        })
        .await
    }
}

/// DNS 조회 후 주소별로 연결 시도
async fn open_tcp(target: &CollectorTarget, send_buffer_bytes: u32) -> Result<TcpStream, CoreError> {
    let addrs = lookup_host((target.hostname.as_str(), target.port))
        .await
        .map_err(|e| CoreError::Network(format!("{target} 주소 조회 실패: {e}")))?;

    let mut last_err = None;
    for addr in addrs {
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        if let Err(e) = socket.set_send_buffer_size(send_buffer_bytes) {
            debug!("송신 버퍼 설정 실패 ({addr}): {e}");
        }

        match socket.connect(addr).await {
            Ok(stream) => {
                stream.set_nodelay(true)?;
                return Ok(stream);
            }
            Err(e) => {
                debug!("{addr} 연결 실패: {e}");
                last_err = Some(e);
            }
        }
    }

    Err(match last_err {
        Some(e) => CoreError::Network(format!("{target} 연결 실패: {e}")),
        None => CoreError::Network(format!("{target} 주소 없음")),
    })
}

async fn with_timeout<T, F>(limit: Duration, fut: F) -> Result<T, CoreError>
where
    F: std::future::Future<Output = Result<T, CoreError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| CoreError::Timeout {
            timeout_ms: limit.as_millis() as u64,
        })?
}
