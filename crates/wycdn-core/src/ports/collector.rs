//! 메트릭 수집기 연결 포트.
//!
//! 구현: `wycdn-network` crate (tokio + tokio-native-tls)

use async_trait::async_trait;
use std::fmt;

use crate::error::CoreError;
use crate::models::metric::MetricLine;

/// 수집기 주소 (호스트명 + 포트)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorTarget {
    pub hostname: String,
    pub port: u16,
}

impl CollectorTarget {
    pub fn new(hostname: impl Into<String>, port: u16) -> Self {
        Self {
            hostname: hostname.into(),
            port,
        }
    }
}

impl fmt::Display for CollectorTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hostname, self.port)
    }
}

/// 플러시 사이클 하나가 독점하는 수집기 연결
#[async_trait]
pub trait CollectorConnection: Send {
    /// 라인 + 개행 종료자 기록 후 스트림 flush
    async fn send_line(&mut self, line: &MetricLine) -> Result<(), CoreError>;

    /// 연결 종료 (best-effort, 호출자는 에러를 무시해도 된다)
    async fn close(&mut self) -> Result<(), CoreError>;
}

/// 수집기 연결 생성기
#[async_trait]
pub trait CollectorConnector: Send + Sync {
    /// 새 연결 수립. 사이클마다 호출되며 연결은 재사용되지 않는다.
    async fn connect(
        &self,
        target: &CollectorTarget,
    ) -> Result<Box<dyn CollectorConnection>, CoreError>;
}
