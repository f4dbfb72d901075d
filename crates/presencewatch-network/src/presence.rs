//! 프레즌스 정의 카탈로그 로드.

use presencewatch_core::models::presence::PresenceCatalog;
use presencewatch_core::ports::platform::PresenceDefinitionSource;
use tracing::{info, warn};

use crate::connectivity::ConnectivityMonitor;

/// 프레즌스 정의를 한 번 조회해 카탈로그 구성
///
/// 실패하면 빈 카탈로그를 돌려준다. 이후 표시 라벨은 원시 ID가 된다.
pub async fn load_presence_catalog(
    source: &dyn PresenceDefinitionSource,
    locale: &str,
    page_size: u32,
    monitor: &ConnectivityMonitor,
) -> PresenceCatalog {
    match source.presence_definitions(locale, page_size).await {
        Ok(definitions) => {
            let catalog = PresenceCatalog::from_definitions(&definitions, locale);
            info!("프레즌스 정의 로드: {}개", catalog.len());
            monitor.set_catalog_fallback(false);
            catalog
        }
        Err(e) => {
            warn!("프레즌스 정의 조회 실패, 원시 ID로 표시: {e}");
            monitor.set_catalog_fallback(true);
            PresenceCatalog::new()
        }
    }
}
