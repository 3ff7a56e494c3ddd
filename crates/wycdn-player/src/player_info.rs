//! 플레이어 정보 기록기.
//!
//! 해상도와 재생 상태는 독립적으로 갱신된다. 이벤트는 변경된 축 하나만 담고,
//! 다른 축은 마지막 관측값을 쓴다. 두 축 모두 센티널이면 큐에 넣지 않는다.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;
use wycdn_core::models::metric::MetricRecord;
use wycdn_core::models::player::{PlaybackState, PlayerEvent, PlayerSnapshot, Resolution};
use wycdn_network::metric_queue::MetricQueue;

/// 플레이어 관측값 → 메트릭 라인 생산자
///
/// 임의의 스레드에서 호출해도 된다.
pub struct PlayerInfoRecorder {
    peer_id: String,
    /// 마지막 해상도/재생 상태. 갱신, 병합, 큐 삽입이 한 락 안에서 일어난다.
    latest: Mutex<PlayerSnapshot>,
    queue: Arc<MetricQueue>,
}

impl PlayerInfoRecorder {
    pub fn new(peer_id: impl Into<String>, queue: Arc<MetricQueue>) -> Self {
        Self {
            peer_id: peer_id.into(),
            latest: Mutex::new(PlayerSnapshot::default()),
            queue,
        }
    }

    pub fn peer_id(&self) -> &str {
        &self.peer_id
    }

    /// 해상도 변경. 라인이 큐에 들어갔으면 `true`.
    pub fn on_resolution_changed(&self, resolution: Resolution) -> bool {
        let mut latest = self.latest.lock();
        latest.resolution = resolution;
        self.record(*latest)
    }

    /// 재생 상태 전환. 라인이 큐에 들어갔으면 `true`.
    pub fn on_playback_state_changed(&self, state: PlaybackState) -> bool {
        let mut latest = self.latest.lock();
        latest.playback_state = state;
        self.record(*latest)
    }

    pub fn handle_event(&self, event: &PlayerEvent) -> bool {
        match *event {
            PlayerEvent::ResolutionChanged { width, height } => {
                self.on_resolution_changed(Resolution::new(width, height))
            }
            PlayerEvent::PlaybackStateChanged { state } => {
                self.on_playback_state_changed(PlaybackState::from_code(state))
            }
        }
    }

    /// 현재 마지막 관측값
    pub fn snapshot(&self) -> PlayerSnapshot {
        *self.latest.lock()
    }

    /// `latest` 락을 쥔 채로 호출된다
    fn record(&self, snapshot: PlayerSnapshot) -> bool {
        if snapshot.is_empty() {
            debug!("해상도/재생 상태 모두 미확정, 기록 생략");
            return false;
        }
        let line = MetricRecord::capture(&self.peer_id, snapshot).to_line();
        self.queue.enqueue(line);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Arc<MetricQueue>, PlayerInfoRecorder) {
        let queue = Arc::new(MetricQueue::new());
        let recorder = PlayerInfoRecorder::new("X", queue.clone());
        (queue, recorder)
    }

    /// 타임스탬프를 뗀 라인 본문
    fn body(queue: &MetricQueue) -> String {
        let line = queue.try_dequeue().unwrap();
        let (body, ts) = line.as_str().rsplit_once(' ').unwrap();
        assert!(ts.parse::<i64>().unwrap() > 0);
        body.to_string()
    }

    #[test]
    fn no_callbacks_no_lines() {
        let (queue, recorder) = recorder();
        assert!(queue.is_empty());
        assert!(recorder.snapshot().is_empty());
    }

    #[test]
    fn both_sentinels_never_enqueued() {
        let (queue, recorder) = recorder();
        assert!(!recorder.on_resolution_changed(Resolution::UNKNOWN));
        assert!(!recorder.on_playback_state_changed(PlaybackState::Unknown));
        assert!(queue.is_empty());
    }

    #[test]
    fn resolution_with_unknown_state_is_enqueued() {
        let (queue, recorder) = recorder();
        assert!(recorder.on_resolution_changed(Resolution::new(1280, 720)));
        assert_eq!(
            body(&queue),
            "player,peerId=X resolution=\"1280x720\",state=-1"
        );
    }

    #[test]
    fn state_update_merges_last_resolution() {
        let (queue, recorder) = recorder();
        recorder.on_resolution_changed(Resolution::new(1280, 720));
        recorder.on_playback_state_changed(PlaybackState::Buffering);

        assert_eq!(queue.len(), 2);
        let _ = queue.try_dequeue();
        assert_eq!(
            body(&queue),
            "player,peerId=X resolution=\"1280x720\",state=2"
        );
    }

    #[test]
    fn resolution_update_merges_last_state() {
        let (queue, recorder) = recorder();
        recorder.handle_event(&PlayerEvent::PlaybackStateChanged { state: 3 });
        recorder.handle_event(&PlayerEvent::ResolutionChanged {
            width: 1920,
            height: 1080,
        });

        assert_eq!(body(&queue), "player,peerId=X resolution=\"0x0\",state=3");
        assert_eq!(
            body(&queue),
            "player,peerId=X resolution=\"1920x1080\",state=3"
        );
    }

    #[test]
    fn concurrent_producers() {
        use std::thread;

        let (queue, recorder) = recorder();
        let recorder = Arc::new(recorder);

        let res = {
            let recorder = Arc::clone(&recorder);
            thread::spawn(move || {
                for h in 1..=50 {
                    recorder.on_resolution_changed(Resolution::new(h * 2, h));
                }
            })
        };
        let state = {
            let recorder = Arc::clone(&recorder);
            thread::spawn(move || {
                for _ in 0..50 {
                    recorder.on_playback_state_changed(PlaybackState::Ready);
                }
            })
        };
        res.join().unwrap();
        state.join().unwrap();

        // 두 축 모두 실제 값이므로 모든 호출이 라인을 만든다
        assert_eq!(queue.len(), 100);
        assert_eq!(
            recorder.snapshot(),
            PlayerSnapshot {
                resolution: Resolution::new(100, 50),
                playback_state: PlaybackState::Ready,
            }
        );
    }

    #[test]
    fn enqueued_lines_follow_update_order() {
        use std::thread;

        let (queue, recorder) = recorder();
        let recorder = Arc::new(recorder);

        let res = {
            let recorder = Arc::clone(&recorder);
            thread::spawn(move || {
                for h in 1..=200 {
                    recorder.on_resolution_changed(Resolution::new(h * 2, h));
                }
            })
        };
        let state = {
            let recorder = Arc::clone(&recorder);
            thread::spawn(move || {
                for code in 0..200 {
                    recorder.on_playback_state_changed(PlaybackState::from_code(code % 4 + 1));
                }
            })
        };
        res.join().unwrap();
        state.join().unwrap();

        let heights: Vec<u32> = std::iter::from_fn(|| queue.try_dequeue())
            .map(|line| {
                let (_, rest) = line.as_str().split_once("resolution=\"").unwrap();
                let (resolution, _) = rest.split_once('"').unwrap();
                resolution.parse::<Resolution>().unwrap().height
            })
            .collect();

        // 한 락 아래 병합되므로 해상도가 되돌아가는 라인은 없다
        assert_eq!(heights.len(), 400);
        assert!(heights.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(heights.last(), Some(&200));
    }
}
