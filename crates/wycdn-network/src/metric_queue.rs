//! 메트릭 큐.
//!
//! 여러 생산자 스레드 → 단일 소비자(플러시 사이클) FIFO 버퍼.
//! 전송 실패한 라인은 맨 앞으로 되돌려 다음 사이클에서 가장 먼저 보낸다.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;
use wycdn_core::models::metric::MetricLine;

/// 무제한 메트릭 큐 (락 보호 `VecDeque`)
#[derive(Debug, Default)]
pub struct MetricQueue {
    lines: Mutex<VecDeque<MetricLine>>,
    /// 큐 크기 (락 없이 조회)
    size: AtomicUsize,
}

impl MetricQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// 꼬리에 추가. 블로킹/실패 없음.
    pub fn enqueue(&self, line: MetricLine) {
        let size = {
            let mut lines = self.lines.lock();
            lines.push_back(line);
            self.size.fetch_add(1, Ordering::Relaxed) + 1
        };
        debug!("메트릭 큐 추가, 현재 크기: {size}");
    }

    /// 머리에서 하나 꺼냄. 비어 있으면 `None`.
    pub fn try_dequeue(&self) -> Option<MetricLine> {
        let mut lines = self.lines.lock();
        let line = lines.pop_front();
        if line.is_some() {
            self.size.fetch_sub(1, Ordering::Relaxed);
        }
        line
    }

    /// 꺼냈지만 보내지 못한 라인을 머리에 되돌림
    pub fn requeue_front(&self, line: MetricLine) {
        let mut lines = self.lines.lock();
        lines.push_front(line);
        self.size.fetch_add(1, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.size.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
