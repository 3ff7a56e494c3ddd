//! 애플리케이션 설정 구조체.
//!
//! 수집기 연결/플러시 파라미터, 수집기 환경 목록, 피어 ID를 정의한다.
//! [`crate::config_manager::ConfigManager`]를 통해 JSON 파일에서 로드.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::error::CoreError;
use crate::models::environment::Environment;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 수집기 연결 및 플러시 설정
    #[serde(default)]
    pub collector: CollectorConfig,
    /// 선택 가능한 수집기 환경 목록
    #[serde(default = "default_environments")]
    pub environments: Vec<Environment>,
    /// 활성 환경 이름
    #[serde(default = "default_active_environment")]
    pub active_environment: String,
    /// 설치 단위 피어 ID (없으면 최초 실행 시 생성)
    #[serde(default)]
    pub peer_id: Option<String>,
}

// ============================================================
// 수집기 설정
// ============================================================

/// 수집기 연결/플러시 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// 수집기 포트
    #[serde(default = "default_collector_port")]
    pub port: u16,
    /// TLS 사용 여부 (로컬 수집기는 평문 허용)
    #[serde(default = "default_true")]
    pub tls: bool,
    /// 연결 타임아웃 (밀리초, TLS 핸드셰이크 포함)
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// 쓰기 타임아웃 (밀리초)
    #[serde(default = "default_io_timeout_ms")]
    pub io_timeout_ms: u64,
    /// 소켓 송신 버퍼 크기 (바이트)
    #[serde(default = "default_send_buffer_bytes")]
    pub send_buffer_bytes: u32,
    /// 라인 간 전송 지연 (밀리초)
    #[serde(default = "default_message_delay_ms")]
    pub message_delay_ms: u64,
    /// 플러시 주기 (밀리초)
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            port: default_collector_port(),
            tls: true,
            connect_timeout_ms: default_connect_timeout_ms(),
            io_timeout_ms: default_io_timeout_ms(),
            send_buffer_bytes: default_send_buffer_bytes(),
            message_delay_ms: default_message_delay_ms(),
            flush_interval_ms: default_flush_interval_ms(),
        }
    }
}

// ============================================================
// AppConfig impl
// ============================================================

impl AppConfig {
    /// 기본 설정값 반환
    pub fn default_config() -> Self {
        Self {
            collector: CollectorConfig::default(),
            environments: default_environments(),
            active_environment: default_active_environment(),
            peer_id: None,
        }
    }

    /// 활성 환경 조회
    pub fn active(&self) -> Result<&Environment, CoreError> {
        self.environments
            .iter()
            .find(|env| env.name == self.active_environment)
            .ok_or_else(|| {
                CoreError::Config(format!(
                    "알 수 없는 활성 환경: {}",
                    self.active_environment
                ))
            })
    }

    /// 활성 환경의 수집기 호스트를 교체 (CLI 오버라이드용)
    pub fn override_collector_host(&mut self, hostname: &str) -> Result<(), CoreError> {
        let name = self.active_environment.clone();
        let env = self
            .environments
            .iter_mut()
            .find(|env| env.name == name)
            .ok_or_else(|| CoreError::Config(format!("알 수 없는 활성 환경: {name}")))?;
        env.influxdb_hostname = hostname.to_string();
        Ok(())
    }

    /// 설정값 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        let env = self.active()?;
        if env.influxdb_hostname.trim().is_empty() {
            return Err(CoreError::Validation {
                field: "influxdb_hostname".to_string(),
                message: format!("환경 {}의 수집기 호스트가 비어 있음", env.name),
            });
        }
        if self.collector.port == 0 {
            return Err(CoreError::Validation {
                field: "collector.port".to_string(),
                message: "포트는 0일 수 없음".to_string(),
            });
        }
        if self.collector.flush_interval_ms == 0 {
            return Err(CoreError::Validation {
                field: "collector.flush_interval_ms".to_string(),
                message: "플러시 주기는 0보다 커야 함".to_string(),
            });
        }
        if self.collector.connect_timeout_ms == 0 || self.collector.io_timeout_ms == 0 {
            return Err(CoreError::Validation {
                field: "collector.timeout".to_string(),
                message: "타임아웃은 0보다 커야 함".to_string(),
            });
        }
        Ok(())
    }

    /// 피어 ID 보장, 없으면 `<접두사>-<12자리 hex>`로 생성해 저장
    ///
    /// 반환값: (피어 ID, 새로 생성되었는지 여부)
    pub fn ensure_peer_id(&mut self) -> Result<(String, bool), CoreError> {
        if let Some(id) = self.peer_id.as_ref().filter(|id| !id.is_empty()) {
            return Ok((id.clone(), false));
        }

        let prefix = self.active()?.peer_id_prefix.clone();
        let simple = Uuid::new_v4().simple().to_string();
        let id = format!("{prefix}-{}", &simple[..12]);
        self.peer_id = Some(id.clone());
        Ok((id, true))
    }

    /// 연결 타임아웃을 Duration으로 반환
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.collector.connect_timeout_ms)
    }

    /// 쓰기 타임아웃을 Duration으로 반환
    pub fn io_timeout(&self) -> Duration {
        Duration::from_millis(self.collector.io_timeout_ms)
    }

    /// 라인 간 전송 지연을 Duration으로 반환
    pub fn message_delay(&self) -> Duration {
        Duration::from_millis(self.collector.message_delay_ms)
    }

    /// 플러시 주기를 Duration으로 반환
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.collector.flush_interval_ms)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

// ============================================================
// 기본값 함수
// ============================================================

fn default_true() -> bool {
    true
}
fn default_collector_port() -> u16 {
    8094
}
fn default_connect_timeout_ms() -> u64 {
    5_000
}
fn default_io_timeout_ms() -> u64 {
    5_000
}
fn default_send_buffer_bytes() -> u32 {
    65_536
}
fn default_message_delay_ms() -> u64 {
    50
}
fn default_flush_interval_ms() -> u64 {
    10_000
}
fn default_active_environment() -> String {
    "production".to_string()
}
fn default_environments() -> Vec<Environment> {
    vec![
        Environment::new("production", "influxdb.example.com"),
        Environment::new("staging", "influxdb.staging.example.com"),
        Environment::new("local", "localhost"),
    ]
}
