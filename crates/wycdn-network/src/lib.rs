//! # wycdn-network
//!
//! 플레이어 메트릭 전송 어댑터.
//! 생산자(플레이어 콜백)와 소비자(플러시 루프) 사이의 메트릭 큐,
//! 사이클 단위 연결을 여는 전송기, TLS/TCP 수집기 커넥터를 제공한다.
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use wycdn_network::collector_client::connector_for;
//! use wycdn_network::metric_queue::MetricQueue;
//! use wycdn_network::metric_sender::MetricSender;
//!
//! let queue = Arc::new(MetricQueue::new());
//! let sender = MetricSender::new(queue.clone(), connector_for(&config.collector)?, target);
//! sender.flush().await;
//! ```

pub mod collector_client;
pub mod metric_queue;
pub mod metric_sender;
