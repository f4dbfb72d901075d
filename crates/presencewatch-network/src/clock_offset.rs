//! 서버 시계 보정값 측정.
//!
//! 세션 시작 시 한 번만 서버 시각을 조회한다. 실패하면 재시도 없이
//! 보정값 0(로컬 시계 신뢰)으로 폴백하고 건강 상태에 기록한다.

use chrono::Utc;
use presencewatch_core::models::presence::ClockOffset;
use presencewatch_core::ports::platform::TimeSource;
use tracing::{info, warn};

use crate::connectivity::ConnectivityMonitor;

/// 서버 시각 − 로컬 시각 측정
pub async fn capture_offset(
    time_source: &dyn TimeSource,
    monitor: &ConnectivityMonitor,
) -> ClockOffset {
    match time_source.server_time().await {
        Ok(server_time) => {
            let offset = ClockOffset::between(server_time, Utc::now());
            info!(
                "서버 시계 보정값: {}ms",
                offset.as_duration().num_milliseconds()
            );
            monitor.set_clock_fallback(false);
            offset
        }
        Err(e) => {
            warn!("서버 시각 조회 실패, 로컬 시계 사용: {e}");
            monitor.set_clock_fallback(true);
            ClockOffset::zero()
        }
    }
}
