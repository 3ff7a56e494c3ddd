//! # wycdn-player
//!
//! 플레이어 정보 컴포넌트.
//! 플레이어 콜백(해상도/재생 상태)을 메트릭 라인으로 바꿔 큐에 넣고,
//! 백그라운드 플러시 스케줄러가 주기적으로 수집기에 전송한다.
//!
//! ## 구조
//!
//! - [`player_info`]: 두 축의 마지막 관측값을 합쳐 메트릭 기록
//! - [`event_bus`]: 플레이어 이벤트 브로드캐스트
//! - [`flush_scheduler`]: 고정 주기 플러시 루프
//! - [`session`]: 위 구성요소의 생성/종료를 묶는 컴포넌트 수명 단위

pub mod event_bus;
pub mod flush_scheduler;
pub mod player_info;
pub mod session;
