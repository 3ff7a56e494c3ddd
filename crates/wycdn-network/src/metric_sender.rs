//! 메트릭 전송기.
//!
//! 플러시 사이클 하나 = 연결 열기 → 큐 비우기 → 연결 닫기.
//! 연결 실패 시 큐는 그대로 두고, 쓰기 실패 시 보내지 못한 라인을 맨 앞에 되돌린 뒤
//! 사이클을 중단한다. 어떤 에러도 호출자에게 전파하지 않으며 다음 틱에서 재시도한다.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use wycdn_core::ports::collector::{CollectorConnector, CollectorTarget};

use crate::metric_queue::MetricQueue;

/// 라인 간 기본 전송 지연
pub const DEFAULT_MESSAGE_DELAY: Duration = Duration::from_millis(50);

/// 연속 중단 사이클이 이 배수에 도달할 때마다 error 로그
const ABORT_ESCALATION_CYCLES: u64 = 6;

/// 메트릭 전송기, 큐 소비자
pub struct MetricSender {
    queue: Arc<MetricQueue>,
    connector: Arc<dyn CollectorConnector>,
    /// 수집기 주소 (환경 전환 시 다음 사이클부터 반영)
    target: RwLock<CollectorTarget>,
    message_delay: Duration,
    lines_sent: AtomicU64,
    lines_requeued: AtomicU64,
    cycles_completed: AtomicU64,
    cycles_aborted: AtomicU64,
    consecutive_aborts: AtomicU64,
}

impl MetricSender {
    /// 새 전송기 생성
    pub fn new(
        queue: Arc<MetricQueue>,
        connector: Arc<dyn CollectorConnector>,
        target: CollectorTarget,
    ) -> Self {
        Self {
            queue,
            connector,
            target: RwLock::new(target),
            message_delay: DEFAULT_MESSAGE_DELAY,
            lines_sent: AtomicU64::new(0),
            lines_requeued: AtomicU64::new(0),
            cycles_completed: AtomicU64::new(0),
            cycles_aborted: AtomicU64::new(0),
            consecutive_aborts: AtomicU64::new(0),
        }
    }

    /// 라인 간 전송 지연 설정
    pub fn with_message_delay(mut self, delay: Duration) -> Self {
        self.message_delay = delay;
        self
    }

    /// 수집기 교체, 진행 중인 사이클에는 영향 없음
    pub fn retarget(&self, target: CollectorTarget) {
        let mut current = self.target.write();
        if *current != target {
            info!("수집기 변경: {} → {}", *current, target);
            *current = target;
        }
    }

    pub fn target(&self) -> CollectorTarget {
        self.target.read().clone()
    }

    pub fn queue(&self) -> &Arc<MetricQueue> {
        &self.queue
    }

    /// 플러시 사이클 1회 실행
    ///
    /// 반환값은 이번 사이클에 전달된 라인 수 (로그/통계용). 실패는 반환하지 않는다.
    /// 큐가 비어 있으면 연결을 열지 않는다.
    pub async fn flush(&self) -> usize {
        if self.queue.is_empty() {
            return 0;
        }

        let target = self.target();
        let mut connection = match self.connector.connect(&target).await {
            Ok(conn) => conn,
            Err(e) => {
                self.record_abort(&target);
                warn!(
                    "수집기 연결 실패, 사이클 중단 (대기 {}개): {e}",
                    self.queue.len()
                );
                return 0;
            }
        };

        let mut sent = 0usize;
        let mut aborted = false;
        while let Some(line) = self.queue.try_dequeue() {
            match connection.send_line(&line).await {
                Ok(()) => {
                    sent += 1;
                    debug!("메트릭 전송: {line}");
                    if !self.queue.is_empty() {
                        tokio::time::sleep(self.message_delay).await;
                    }
                }
                Err(e) => {
                    self.queue.requeue_front(line);
                    self.lines_requeued.fetch_add(1, Ordering::Relaxed);
                    warn!("메트릭 쓰기 실패, 라인 재큐잉 후 사이클 중단: {e}");
                    aborted = true;
                    break;
                }
            }
        }

        if let Err(e) = connection.close().await {
            debug!("수집기 연결 종료 실패 (무시): {e}");
        }

        self.lines_sent.fetch_add(sent as u64, Ordering::Relaxed);
        if aborted {
            self.record_abort(&target);
        } else {
            self.cycles_completed.fetch_add(1, Ordering::Relaxed);
            self.consecutive_aborts.store(0, Ordering::Relaxed);
        }
        if sent > 0 {
            debug!("플러시 완료: {sent}개 전송 → {target}");
        }
        sent
    }

    fn record_abort(&self, target: &CollectorTarget) {
        self.cycles_aborted.fetch_add(1, Ordering::Relaxed);
        let streak = self.consecutive_aborts.fetch_add(1, Ordering::Relaxed) + 1;
        if streak % ABORT_ESCALATION_CYCLES == 0 {
            error!(
                "수집기 {target}에 {streak}회 연속 전송 실패 (대기 {}개)",
                self.queue.len()
            );
        }
    }

    /// 전송 통계
    pub fn stats(&self) -> SenderStats {
        SenderStats {
            queue_size: self.queue.len(),
            lines_sent: self.lines_sent.load(Ordering::Relaxed),
            lines_requeued: self.lines_requeued.load(Ordering::Relaxed),
            cycles_completed: self.cycles_completed.load(Ordering::Relaxed),
            cycles_aborted: self.cycles_aborted.load(Ordering::Relaxed),
            consecutive_aborts: self.consecutive_aborts.load(Ordering::Relaxed),
        }
    }
}

/// 전송기 통계
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SenderStats {
    /// 현재 큐 크기
    pub queue_size: usize,
    /// 누적 전송 라인 수
    pub lines_sent: u64,
    /// 쓰기 실패로 재큐잉된 라인 수
    pub lines_requeued: u64,
    /// 큐를 끝까지 비운 사이클 수
    pub cycles_completed: u64,
    /// 연결/쓰기 실패로 중단된 사이클 수
    pub cycles_aborted: u64,
    /// 마지막 성공 이후 연속 중단 사이클 수
    pub consecutive_aborts: u64,
}
