//! 수집기 환경 모델.
//!
//! 환경마다 InfluxDB 수집기 호스트와 피어 ID 접두사가 다르다.

use serde::{Deserialize, Serialize};

/// 이름이 붙은 수집기 환경 하나
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// 환경 이름 (예: "production", "staging")
    pub name: String,
    /// 생성되는 피어 ID 접두사 (예: "generic")
    #[serde(default = "default_peer_id_prefix")]
    pub peer_id_prefix: String,
    /// 메트릭 수집기 호스트명
    pub influxdb_hostname: String,
}

impl Environment {
    pub fn new(name: &str, influxdb_hostname: &str) -> Self {
        Self {
            name: name.to_string(),
            peer_id_prefix: default_peer_id_prefix(),
            influxdb_hostname: influxdb_hostname.to_string(),
        }
    }
}

fn default_peer_id_prefix() -> String {
    "generic".to_string()
}
