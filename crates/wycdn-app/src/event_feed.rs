//! 플레이어 이벤트 입력.
//!
//! 줄 단위 JSON `PlayerEvent`를 읽어 이벤트 버스로 발행한다.
//! 플레이어 콜백처럼 별도 OS 스레드에서 동작한다.

use std::io::BufRead;
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};
use wycdn_core::models::player::PlayerEvent;
use wycdn_player::event_bus::PlayerEventBus;

use crate::lifecycle::LifecycleManager;

/// 입력 처리 결과
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FeedSummary {
    /// 발행된 이벤트 수
    pub published: usize,
    /// 파싱 실패로 건너뛴 줄 수
    pub rejected: usize,
}

/// EOF 또는 종료 신호까지 입력을 읽어 발행
pub fn pump_events<R: BufRead>(
    reader: R,
    bus: &PlayerEventBus,
    lifecycle: &LifecycleManager,
) -> FeedSummary {
    let mut summary = FeedSummary::default();

    for line in reader.lines() {
        if lifecycle.is_shutting_down() {
            break;
        }
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("이벤트 입력 읽기 실패: {e}");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<PlayerEvent>(line) {
            Ok(event) => {
                bus.publish(event);
                summary.published += 1;
            }
            Err(e) => {
                warn!("잘못된 플레이어 이벤트 건너뜀: {e}");
                debug!("원본: {line}");
                summary.rejected += 1;
            }
        }
    }

    summary
}

/// 표준 입력 리더 스레드 시작. EOF에 도달하면 종료 신호를 보낸다.
pub fn spawn_stdin_feed(
    bus: PlayerEventBus,
    lifecycle: Arc<LifecycleManager>,
) -> std::io::Result<thread::JoinHandle<FeedSummary>> {
    thread::Builder::new()
        .name("player-event-feed".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            let summary = pump_events(stdin.lock(), &bus, &lifecycle);
            info!(
                "이벤트 입력 종료: 발행={}, 거부={}",
                summary.published, summary.rejected
            );
            lifecycle.shutdown();
            summary
        })
}
