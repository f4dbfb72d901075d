//! 연결 상태 / 저하 모드 신호.
//!
//! 감독자의 상태 전환과, 시계 보정·프레즌스 정의 조회 실패 같은
//! 조용한 폴백 진입을 `watch` 채널로 관찰 가능하게 한다.

use presencewatch_core::models::notification::ConnectionState;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// 저하 모드 플래그
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HealthStatus {
    /// 서버 시각 조회 실패 → 로컬 시계 사용 중
    pub clock_fallback: bool,
    /// 프레즌스 정의 조회 실패 → 원시 ID 표시 중
    pub catalog_fallback: bool,
    /// 옵저버 없이 채널 재생성이 필요해 복구 중단
    pub recovery_aborted: bool,
}

impl HealthStatus {
    /// 저하 모드 진입 여부
    pub fn is_degraded(&self) -> bool {
        self.clock_fallback || self.catalog_fallback || self.recovery_aborted
    }
}

/// 연결 상태 / 건강 상태 관리자
pub struct ConnectivityMonitor {
    state_tx: watch::Sender<ConnectionState>,
    health_tx: watch::Sender<HealthStatus>,
}

impl ConnectivityMonitor {
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        let (health_tx, _) = watch::channel(HealthStatus::default());
        Self {
            state_tx,
            health_tx,
        }
    }

    /// 현재 연결 상태
    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    /// 연결 상태 전환 기록, 실제로 바뀌었으면 `true`
    pub fn set_state(&self, next: ConnectionState) -> bool {
        self.state_tx.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            debug!("연결 상태 전환: {current} → {next}");
            *current = next;
            true
        })
    }

    /// 연결 상태 수신기
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// 현재 건강 상태
    pub fn health(&self) -> HealthStatus {
        *self.health_tx.borrow()
    }

    /// 건강 상태 수신기
    pub fn subscribe_health(&self) -> watch::Receiver<HealthStatus> {
        self.health_tx.subscribe()
    }

    /// 시계 보정 폴백 여부 기록
    pub fn set_clock_fallback(&self, fallback: bool) {
        self.update_health(|h| h.clock_fallback = fallback);
    }

    /// 프레즌스 정의 폴백 여부 기록
    pub fn set_catalog_fallback(&self, fallback: bool) {
        self.update_health(|h| h.catalog_fallback = fallback);
    }

    /// 복구 중단 기록
    pub fn mark_recovery_aborted(&self) {
        self.update_health(|h| h.recovery_aborted = true);
    }

    fn update_health(&self, apply: impl FnOnce(&mut HealthStatus)) {
        self.health_tx.send_if_modified(|health| {
            let before = *health;
            apply(health);
            if before == *health {
                return false;
            }
            if health.is_degraded() {
                warn!("저하 모드: {health:?}");
            }
            true
        });
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// Arc로 감싼 ConnectivityMonitor
pub type SharedConnectivityMonitor = Arc<ConnectivityMonitor>;
