//! 플레이어 정보 세션.
//!
//! 큐, 전송기, 기록기, 이벤트 버스를 한 수명으로 묶는다.
//! 시작 시 플러시 스케줄러와 버스 전달 태스크를 띄우고, `shutdown()`에서
//! 종료 신호를 보낸 뒤 두 태스크가 끝날 때까지 기다린다.
//! 종료 시 남은 라인은 전송하지 않고 버린다.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use wycdn_core::config::AppConfig;
use wycdn_core::error::CoreError;
use wycdn_core::models::player::PlayerEvent;
use wycdn_core::ports::collector::{CollectorConnector, CollectorTarget};
use wycdn_network::metric_queue::MetricQueue;
use wycdn_network::metric_sender::{MetricSender, SenderStats, DEFAULT_MESSAGE_DELAY};

use crate::event_bus::PlayerEventBus;
use crate::flush_scheduler::{FlushScheduler, DEFAULT_FLUSH_INTERVAL};
use crate::player_info::PlayerInfoRecorder;

/// 세션 설정
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub peer_id: String,
    pub target: CollectorTarget,
    pub flush_interval: Duration,
    pub message_delay: Duration,
    pub bus_capacity: usize,
}

impl SessionOptions {
    pub fn new(peer_id: impl Into<String>, target: CollectorTarget) -> Self {
        Self {
            peer_id: peer_id.into(),
            target,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            message_delay: DEFAULT_MESSAGE_DELAY,
            bus_capacity: 256,
        }
    }

    /// 앱 설정의 활성 환경/수집기 설정으로부터 생성
    pub fn from_config(config: &AppConfig, peer_id: &str) -> Result<Self, CoreError> {
        config.validate()?;
        let env = config.active()?;
        Ok(Self {
            flush_interval: config.flush_interval(),
            message_delay: config.message_delay(),
            ..Self::new(
                peer_id,
                CollectorTarget::new(env.influxdb_hostname.clone(), config.collector.port),
            )
        })
    }
}

/// 플레이어 정보 컴포넌트 한 수명
pub struct PlayerInfoSession {
    recorder: Arc<PlayerInfoRecorder>,
    sender: Arc<MetricSender>,
    bus: PlayerEventBus,
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl PlayerInfoSession {
    /// 세션 시작 (tokio 런타임 안에서 호출)
    pub fn start(options: SessionOptions, connector: Arc<dyn CollectorConnector>) -> Self {
        let queue = Arc::new(MetricQueue::new());
        let sender = Arc::new(
            MetricSender::new(queue.clone(), connector, options.target.clone())
                .with_message_delay(options.message_delay),
        );
        let recorder = Arc::new(PlayerInfoRecorder::new(options.peer_id.clone(), queue));
        let bus = PlayerEventBus::new(options.bus_capacity);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let scheduler = FlushScheduler::new(sender.clone(), options.flush_interval);
        let flush_rx = shutdown_rx.clone();
        let flush_task = tokio::spawn(async move {
            scheduler.run(flush_rx).await;
        });

        let forward_task = tokio::spawn(forward_events(
            bus.subscribe(),
            recorder.clone(),
            shutdown_rx,
        ));

        info!(
            "플레이어 정보 세션 시작: peerId={}, 수집기={}",
            options.peer_id, options.target
        );

        Self {
            recorder,
            sender,
            bus,
            shutdown_tx,
            tasks: vec![flush_task, forward_task],
        }
    }

    /// 플레이어 콜백에서 직접 호출할 기록기
    pub fn recorder(&self) -> &Arc<PlayerInfoRecorder> {
        &self.recorder
    }

    /// 플레이어 이벤트 버스 (복제해서 콜백 쪽에 넘긴다)
    pub fn event_bus(&self) -> &PlayerEventBus {
        &self.bus
    }

    /// 환경 전환, 다음 플러시 사이클부터 새 수집기 사용
    pub fn retarget(&self, target: CollectorTarget) {
        self.sender.retarget(target);
    }

    pub fn stats(&self) -> SenderStats {
        self.sender.stats()
    }

    /// 종료 신호 발송 후 백그라운드 태스크 합류
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                warn!("세션 태스크 비정상 종료: {e}");
            }
        }
        let stats = self.sender.stats();
        if stats.queue_size > 0 {
            info!("세션 종료, 미전송 라인 {}개 폐기", stats.queue_size);
        }
        info!(
            "플레이어 정보 세션 종료: 전송={}, 중단 사이클={}",
            stats.lines_sent, stats.cycles_aborted
        );
    }
}

/// 버스 이벤트 → 기록기 전달 루프
async fn forward_events(
    mut events: broadcast::Receiver<PlayerEvent>,
    recorder: Arc<PlayerInfoRecorder>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            received = events.recv() => match received {
                Ok(event) => {
                    recorder.handle_event(&event);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("플레이어 이벤트 {skipped}개 유실 (버스 지연)");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("플레이어 이벤트 버스 닫힘");
                    break;
                }
            },
            _ = shutdown_rx.changed() => {
                break;
            }
        }
    }
}
