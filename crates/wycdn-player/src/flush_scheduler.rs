//! 플러시 스케줄러.
//!
//! 직전 사이클이 끝난 뒤 한 주기를 기다려 플러시 사이클을 1회 실행한다.
//! 생산자 활동과 무관하게 동작하며 종료 신호(watch)를 받으면 진행 중인 사이클까지 중단하고 빠져나간다.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use wycdn_network::metric_sender::MetricSender;

/// 기본 플러시 주기
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(10);

/// 고정 주기 플러시 루프
pub struct FlushScheduler {
    sender: Arc<MetricSender>,
    interval: Duration,
}

impl FlushScheduler {
    /// 주기가 0이면 기본 주기로 대체
    pub fn new(sender: Arc<MetricSender>, interval: Duration) -> Self {
        let interval = if interval.is_zero() {
            warn!(
                "플러시 주기 0은 허용되지 않음, 기본값 {}ms 사용",
                DEFAULT_FLUSH_INTERVAL.as_millis()
            );
            DEFAULT_FLUSH_INTERVAL
        } else {
            interval
        };
        Self { sender, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// 종료 신호까지 루프 실행
    ///
    /// 대기는 직전 사이클이 끝난 시점부터 한 주기. 첫 플러시는 시작 후 한 주기 뒤.
    /// 송신 측이 drop되어도 종료한다.
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) {
        info!(
            "플러시 스케줄러 시작: 주기={}ms, 수집기={}",
            self.interval.as_millis(),
            self.sender.target()
        );

        if *shutdown_rx.borrow() {
            return;
        }

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {
                    tokio::select! {
                        sent = self.sender.flush() => {
                            if sent > 0 {
                                debug!("주기 플러시: {sent}개 전송, 남은 {}개", self.sender.queue().len());
                            }
                        }
                        _ = shutdown_rx.changed() => {
                            info!("플러시 사이클 중 종료 신호, 사이클 중단");
                            break;
                        }
                    }
                }
                _ = shutdown_rx.changed() => {
                    break;
                }
            }
        }

        info!("플러시 스케줄러 종료");
    }
}
