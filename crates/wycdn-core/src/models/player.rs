//! 플레이어 관측 모델.
//!
//! 해상도와 재생 상태는 서로 독립적으로 갱신되는 두 축이다.
//! 각 축은 "아직 관측되지 않음"을 뜻하는 센티널 값을 가진다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// 비디오 해상도 (`WIDTHxHEIGHT`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// 센티널 `0x0`, 해상도 미확정
    pub const UNKNOWN: Resolution = Resolution {
        width: 0,
        height: 0,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// 실제 관측된 해상도인지 여부
    pub fn is_known(&self) -> bool {
        *self != Self::UNKNOWN
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::Validation {
            field: "resolution".to_string(),
            message: format!("WIDTHxHEIGHT 형식이 아님: {s:?}"),
        };

        let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        let width = w.parse::<u32>().map_err(|_| invalid())?;
        let height = h.parse::<u32>().map_err(|_| invalid())?;
        Ok(Self { width, height })
    }
}

/// 플레이어 재생 상태
///
/// 정수 코드는 플레이어 SDK의 공개 상태 상수를 따른다.
/// 알 수 없는 코드는 `Other`로 그대로 전달된다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlaybackState {
    /// 센티널 `-1`, 상태 미확정
    #[default]
    Unknown,
    /// 재생 리소스 없음 (1)
    Idle,
    /// 버퍼링 중 (2)
    Buffering,
    /// 즉시 재생 가능 (3)
    Ready,
    /// 재생 완료 (4)
    Ended,
    /// 그 외 플레이어 고유 코드
    Other(i32),
}

impl PlaybackState {
    pub const UNKNOWN_CODE: i32 = -1;

    /// 와이어 포맷에 기록되는 정수 코드
    pub fn code(&self) -> i32 {
        match self {
            PlaybackState::Unknown => Self::UNKNOWN_CODE,
            PlaybackState::Idle => 1,
            PlaybackState::Buffering => 2,
            PlaybackState::Ready => 3,
            PlaybackState::Ended => 4,
            PlaybackState::Other(code) => *code,
        }
    }

    pub fn from_code(code: i32) -> Self {
        match code {
            Self::UNKNOWN_CODE => PlaybackState::Unknown,
            1 => PlaybackState::Idle,
            2 => PlaybackState::Buffering,
            3 => PlaybackState::Ready,
            4 => PlaybackState::Ended,
            other => PlaybackState::Other(other),
        }
    }

    pub fn is_known(&self) -> bool {
        *self != PlaybackState::Unknown
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// 두 축의 마지막 관측값을 합친 불변 스냅샷
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerSnapshot {
    pub resolution: Resolution,
    pub playback_state: PlaybackState,
}

impl PlayerSnapshot {
    /// 두 축 모두 센티널, 전송할 정보가 없음
    pub fn is_empty(&self) -> bool {
        !self.resolution.is_known() && !self.playback_state.is_known()
    }
}

/// 플레이어 콜백에서 발생하는 이벤트
///
/// 각 이벤트는 변경된 축 하나만 담는다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerEvent {
    /// 비디오 해상도 변경
    ResolutionChanged { width: u32, height: u32 },
    /// 재생 상태 전환
    PlaybackStateChanged { state: i32 },
}
