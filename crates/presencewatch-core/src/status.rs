//! 표시 상태 판정.
//!
//! 프레즌스 ID를 라벨로 바꾸고, 부재(out of office) 기간이 지금 유효한지
//! 서버 보정 시각 기준으로 판단한다. I/O 없는 순수 함수만 둔다.

use chrono::{DateTime, Utc};

use crate::models::presence::{ClockOffset, OutOfOfficeWindow, PresenceCatalog};

/// 부재 상태일 때 표시하는 라벨
pub const OUT_OF_OFFICE_LABEL: &str = "Out of Office";

/// 프레즌스 ID의 표시 라벨, 모르거나 라벨이 빈 ID는 그대로 반환
pub fn resolve_presence_label(presence_id: &str, catalog: &PresenceCatalog) -> String {
    catalog
        .label(presence_id)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| presence_id.to_string())
}

/// 부재 기간이 현재(로컬 시각 + 보정값) 유효한지
pub fn is_override_active(window: Option<&OutOfOfficeWindow>, offset: ClockOffset) -> bool {
    is_override_active_at(window, offset.server_now())
}

/// 부재 기간이 `now` 시점에 유효한지
///
/// 시작/종료 경계는 모두 포함. 둘 중 하나라도 없으면 무기한이 아닌 한 비활성.
pub fn is_override_active_at(window: Option<&OutOfOfficeWindow>, now: DateTime<Utc>) -> bool {
    let Some(window) = window else {
        return false;
    };
    if !window.active {
        return false;
    }
    if window.indefinite {
        return true;
    }
    match (window.start_date, window.end_date) {
        (Some(start), Some(end)) => start <= now && now <= end,
        _ => false,
    }
}

/// 최종 표시 상태. 부재가 유효하면 항상 부재 라벨이 우선
pub fn effective_status(
    presence_id: &str,
    window: Option<&OutOfOfficeWindow>,
    catalog: &PresenceCatalog,
    offset: ClockOffset,
) -> String {
    effective_status_at(presence_id, window, catalog, offset.server_now())
}

/// `now` 시점 기준 최종 표시 상태
pub fn effective_status_at(
    presence_id: &str,
    window: Option<&OutOfOfficeWindow>,
    catalog: &PresenceCatalog,
    now: DateTime<Utc>,
) -> String {
    if is_override_active_at(window, now) {
        OUT_OF_OFFICE_LABEL.to_string()
    } else {
        resolve_presence_label(presence_id, catalog)
    }
}
