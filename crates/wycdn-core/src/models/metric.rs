//! 메트릭 레코드와 라인 프로토콜 직렬화.
//!
//! 와이어 포맷 (개행 종료):
//! `player,peerId=<peerId> resolution="<WxH>",state=<int> <timestamp_ns>`

use chrono::Utc;
use std::fmt;

use super::player::{PlaybackState, PlayerSnapshot, Resolution};

/// 측정(measurement) 이름
pub const MEASUREMENT: &str = "player";

/// 관측 하나를 나타내는 메트릭 레코드
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricRecord {
    /// 보고하는 클라이언트 식별자 (설치 단위로 고정)
    pub peer_id: String,
    pub resolution: Resolution,
    pub playback_state: PlaybackState,
    /// 포맷 시점 캡처 시각 (Unix epoch 기준 나노초)
    pub timestamp_nanos: i64,
}

impl MetricRecord {
    /// 현재 시각으로 레코드 캡처
    pub fn capture(peer_id: &str, snapshot: PlayerSnapshot) -> Self {
        Self::with_timestamp(peer_id, snapshot, now_nanos())
    }

    pub fn with_timestamp(peer_id: &str, snapshot: PlayerSnapshot, timestamp_nanos: i64) -> Self {
        Self {
            peer_id: peer_id.to_string(),
            resolution: snapshot.resolution,
            playback_state: snapshot.playback_state,
            timestamp_nanos,
        }
    }

    /// 두 축 모두 센티널이면 전송 가치가 없음
    pub fn carries_signal(&self) -> bool {
        !PlayerSnapshot {
            resolution: self.resolution,
            playback_state: self.playback_state,
        }
        .is_empty()
    }

    /// 라인 프로토콜로 직렬화
    pub fn to_line(&self) -> MetricLine {
        MetricLine(format!(
            "{MEASUREMENT},peerId={} resolution=\"{}\",state={} {}",
            escape_tag(&self.peer_id),
            escape_field_string(&self.resolution.to_string()),
            self.playback_state.code(),
            self.timestamp_nanos,
        ))
    }
}

/// 직렬화된 메트릭 한 줄 (개행 미포함)
///
/// [`MetricRecord::to_line`]으로만 생성된다. 큐에서는 불투명 문자열로 다룬다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricLine(String);

impl MetricLine {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for MetricLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn now_nanos() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
}

/// 태그 값: 쉼표, `=`, 공백 이스케이프
fn escape_tag(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, ',' | '=' | ' ') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// 문자열 필드 값: `"`와 `\` 이스케이프
fn escape_field_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
