//! # wycdn-app
//!
//! WyCDN 플레이어 메트릭 클라이언트 바이너리 진입점.
//! 설정 로드, 피어 ID 확보, 세션 조립, 라이프사이클 관리.
//!
//! 플레이어 이벤트는 표준 입력으로 한 줄에 하나씩 JSON으로 들어온다.
//! 예: `{"type":"resolution_changed","width":1920,"height":1080}`

mod event_feed;
mod lifecycle;

use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wycdn_core::config::AppConfig;
use wycdn_core::config_manager::ConfigManager;
use wycdn_network::collector_client::connector_for;
use wycdn_player::session::{PlayerInfoSession, SessionOptions};

use crate::lifecycle::LifecycleManager;

/// WyCDN 플레이어 메트릭 클라이언트
///
/// 플레이어 해상도/재생 상태를 라인 프로토콜로 수집기에 보낸다.
#[derive(Parser, Debug)]
#[command(name = "wycdn-metrics")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리의 config.json)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// 활성 환경 이름 (production, staging, local ...)
    #[arg(long, short = 'e')]
    environment: Option<String>,

    /// 활성 환경의 수집기 호스트 오버라이드
    #[arg(long)]
    collector_host: Option<String>,

    /// 피어 ID 지정 (기본: 설정에 저장된 값, 없으면 생성)
    #[arg(long)]
    peer_id: Option<String>,

    /// TLS 없이 평문 TCP로 전송 (로컬 수집기용)
    #[arg(long)]
    plaintext: bool,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,
}

fn open_config(path: Option<PathBuf>) -> Result<ConfigManager> {
    let manager = match path {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new(),
    };
    manager.map_err(|e| anyhow!("설정 로드 실패: {e}"))
}

/// 저장된 설정 + CLI 오버라이드 → 실행 설정과 피어 ID
///
/// 환경 선택과 새로 생성된 피어 ID만 파일에 저장한다.
/// 호스트/평문 오버라이드는 이번 실행에만 적용된다.
fn resolve_runtime_config(manager: &ConfigManager, args: &Args) -> Result<(AppConfig, String)> {
    let mut persisted = manager.get();
    let mut dirty = false;

    if let Some(env) = args.environment.as_ref() {
        if persisted.active_environment != *env {
            persisted.active_environment = env.clone();
            dirty = true;
        }
    }
    persisted
        .active()
        .map_err(|e| anyhow!("환경 선택 실패: {e}"))?;

    let peer_id = match args.peer_id.as_ref() {
        Some(id) => id.clone(),
        None => {
            let (id, created) = persisted
                .ensure_peer_id()
                .map_err(|e| anyhow!("피어 ID 생성 실패: {e}"))?;
            if created {
                info!("새 피어 ID 생성: {id}");
                dirty = true;
            }
            id
        }
    };

    if dirty {
        manager
            .update(persisted.clone())
            .map_err(|e| anyhow!("설정 저장 실패: {e}"))?;
    }

    let mut config = persisted;
    if let Some(host) = args.collector_host.as_ref() {
        config
            .override_collector_host(host)
            .map_err(|e| anyhow!("수집기 호스트 오버라이드 실패: {e}"))?;
    }
    if args.plaintext {
        config.collector.tls = false;
    }

    Ok((config, peer_id))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_filter = format!(
        "wycdn_app={},wycdn_core={},wycdn_network={},wycdn_player={}",
        args.log_level, args.log_level, args.log_level, args.log_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("WyCDN 플레이어 메트릭 클라이언트 시작");

    let manager = open_config(args.config.clone())?;
    info!("설정 파일: {}", manager.config_path().display());

    let (config, peer_id) = resolve_runtime_config(&manager, &args)?;
    let options = SessionOptions::from_config(&config, &peer_id)
        .map_err(|e| anyhow!("설정 검증 실패: {e}"))?;
    let connector =
        connector_for(&config.collector).map_err(|e| anyhow!("수집기 커넥터 생성 실패: {e}"))?;

    info!(
        "환경: {}, 수집기: {}, 플러시 주기: {:?}",
        config.active_environment, options.target, options.flush_interval
    );

    let session = PlayerInfoSession::start(options, connector);
    let lifecycle = Arc::new(LifecycleManager::new());

    // 표준 입력 스레드는 합류하지 않는다 (블로킹 read 중일 수 있음)
    if let Err(e) = event_feed::spawn_stdin_feed(session.event_bus().clone(), lifecycle.clone()) {
        warn!("이벤트 입력 스레드 시작 실패: {e}");
    }

    lifecycle.wait_for_shutdown().await;

    let stats = session.stats();
    info!(
        "종료 중: 전송={}, 재시도 대기={}, 완료 사이클={}",
        stats.lines_sent, stats.queue_size, stats.cycles_completed
    );
    session.shutdown().await;

    info!("WyCDN 플레이어 메트릭 클라이언트 종료");
    Ok(())
}
