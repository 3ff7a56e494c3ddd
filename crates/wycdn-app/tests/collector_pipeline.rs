//! 수집기 파이프라인 통합 테스트.
//!
//! 프로세스 내 평문 TCP 수집기를 띄우고 세션 → 큐 → 전송기 → 소켓 경로를 검증한다.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use wycdn_core::models::player::{PlaybackState, PlayerEvent, Resolution};
use wycdn_core::ports::collector::CollectorTarget;
use wycdn_network::collector_client::{ConnectSettings, TcpCollectorConnector};
use wycdn_player::session::{PlayerInfoSession, SessionOptions};

/// 연결마다 받은 라인을 기록하는 수집기
struct TestCollector {
    port: u16,
    lines: Arc<Mutex<Vec<String>>>,
    connections: Arc<Mutex<usize>>,
}

impl TestCollector {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let lines = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(Mutex::new(0));

        let (lines_srv, conns_srv) = (lines.clone(), connections.clone());
        tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    break;
                };
                *conns_srv.lock().unwrap() += 1;
                let lines = lines_srv.clone();
                tokio::spawn(async move {
                    let mut reader = BufReader::new(socket).lines();
                    while let Ok(Some(line)) = reader.next_line().await {
                        lines.lock().unwrap().push(line);
                    }
                });
            }
        });

        Self {
            port,
            lines,
            connections,
        }
    }

    fn target(&self) -> CollectorTarget {
        CollectorTarget::new("127.0.0.1", self.port)
    }

    fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    fn connections(&self) -> usize {
        *self.connections.lock().unwrap()
    }

    async fn wait_for_lines(&self, count: usize) -> Vec<String> {
        for _ in 0..100 {
            let lines = self.lines();
            if lines.len() >= count {
                return lines;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        self.lines()
    }
}

fn fast_options(peer_id: &str, target: CollectorTarget) -> SessionOptions {
    SessionOptions {
        flush_interval: Duration::from_millis(200),
        message_delay: Duration::from_millis(1),
        ..SessionOptions::new(peer_id, target)
    }
}

fn tcp_connector() -> Arc<TcpCollectorConnector> {
    Arc::new(TcpCollectorConnector::new(ConnectSettings {
        connect_timeout: Duration::from_secs(2),
        io_timeout: Duration::from_secs(2),
        send_buffer_bytes: 65_536,
    }))
}

#[tokio::test]
async fn recorded_changes_arrive_in_order() {
    let collector = TestCollector::start().await;
    let session = PlayerInfoSession::start(
        fast_options("generic-abc123", collector.target()),
        tcp_connector(),
    );

    let recorder = session.recorder();
    recorder.on_resolution_changed(Resolution::new(1920, 1080));
    recorder.on_playback_state_changed(PlaybackState::Buffering);
    recorder.on_playback_state_changed(PlaybackState::Ready);

    let lines = collector.wait_for_lines(3).await;
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("player,peerId=generic-abc123 resolution=\"1920x1080\",state=-1 "));
    assert!(lines[1].starts_with("player,peerId=generic-abc123 resolution=\"1920x1080\",state=2 "));
    assert!(lines[2].starts_with("player,peerId=generic-abc123 resolution=\"1920x1080\",state=3 "));

    let timestamps: Vec<i64> = lines
        .iter()
        .map(|l| l.rsplit(' ').next().unwrap().parse().unwrap())
        .collect();
    assert!(timestamps.windows(2).all(|w| w[0] <= w[1]));

    session.shutdown().await;
}

#[tokio::test]
async fn bus_events_reach_collector() {
    let collector = TestCollector::start().await;
    let session = PlayerInfoSession::start(fast_options("bus-peer", collector.target()), tcp_connector());

    let bus = session.event_bus().clone();
    // 콜백 스레드에서 발행
    std::thread::spawn(move || {
        bus.publish(PlayerEvent::ResolutionChanged {
            width: 1280,
            height: 720,
        });
        bus.publish(PlayerEvent::PlaybackStateChanged { state: 4 });
    })
    .join()
    .unwrap();

    let lines = collector.wait_for_lines(2).await;
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("player,peerId=bus-peer resolution=\"1280x720\",state=4 "));

    session.shutdown().await;
}

#[tokio::test]
async fn idle_session_opens_no_connection() {
    let collector = TestCollector::start().await;
    let session = PlayerInfoSession::start(fast_options("idle", collector.target()), tcp_connector());

    tokio::time::sleep(Duration::from_millis(700)).await;
    assert_eq!(collector.connections(), 0);
    assert_eq!(session.stats().cycles_completed, 0);

    session.shutdown().await;
}

#[tokio::test]
async fn unreachable_collector_keeps_lines_for_next_cycle() {
    // 바인딩 후 해제 → 연결 거부
    let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_port = closed.local_addr().unwrap().port();
    drop(closed);

    let session = PlayerInfoSession::start(
        fast_options("retry", CollectorTarget::new("127.0.0.1", dead_port)),
        tcp_connector(),
    );
    session
        .recorder()
        .on_resolution_changed(Resolution::new(854, 480));

    tokio::time::sleep(Duration::from_millis(500)).await;
    let stats = session.stats();
    assert!(stats.cycles_aborted >= 1);
    assert_eq!(stats.queue_size, 1);
    assert_eq!(stats.lines_sent, 0);

    // 수집기 복구 후 재시도 전달
    let collector = TestCollector::start().await;
    session.retarget(collector.target());
    let lines = collector.wait_for_lines(1).await;
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("player,peerId=retry resolution=\"854x480\",state=-1 "));
    assert_eq!(session.stats().queue_size, 0);

    session.shutdown().await;
}

#[tokio::test]
async fn shutdown_completes_quickly_with_pending_lines() {
    let collector = TestCollector::start().await;
    let options = SessionOptions {
        flush_interval: Duration::from_secs(60),
        ..SessionOptions::new("pending", collector.target())
    };
    let session = PlayerInfoSession::start(options, tcp_connector());
    session
        .recorder()
        .on_playback_state_changed(PlaybackState::Idle);

    tokio::time::timeout(Duration::from_secs(2), session.shutdown())
        .await
        .expect("세션 종료 지연");
    assert!(collector.lines().is_empty());
}
