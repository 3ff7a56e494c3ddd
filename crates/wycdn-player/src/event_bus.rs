//! 플레이어 이벤트 버스.
//!
//! `tokio::broadcast` 기반. 플레이어 콜백 스레드에서 발행하고 세션이 구독한다.

use tokio::sync::broadcast;
use tracing::debug;
use wycdn_core::models::player::PlayerEvent;

/// 플레이어 이벤트 버스
#[derive(Debug, Clone)]
pub struct PlayerEventBus {
    tx: broadcast::Sender<PlayerEvent>,
}

impl PlayerEventBus {
    /// 새 이벤트 버스 생성
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// 이벤트 발행 (구독자가 없으면 버려짐)
    pub fn publish(&self, event: PlayerEvent) {
        debug!("플레이어 이벤트 발행: {event:?}");
        let _ = self.tx.send(event);
    }

    /// 구독자 생성
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.tx.subscribe()
    }
}

impl Default for PlayerEventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
