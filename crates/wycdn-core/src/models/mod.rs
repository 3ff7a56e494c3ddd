//! WyCDN 도메인 모델.
//!
//! 플레이어 관측값, 메트릭 레코드/라인, 수집기 환경을 정의한다.

pub mod environment;
pub mod metric;
pub mod player;
