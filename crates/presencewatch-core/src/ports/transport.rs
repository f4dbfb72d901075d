//! 메시지 지향 전송 계층 포트.
//!
//! 구현: `presencewatch-network::ws_client` (tokio-tungstenite)

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::CoreError;

/// 전송 계층 이벤트
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// 연결 수립 완료
    Opened,
    /// 텍스트 프레임 수신
    Text(String),
    /// 연결 종료
    Closed,
    /// 전송 에러 (이후 `Closed`가 오지 않을 수도 있음)
    Error(String),
}

/// 알림 채널 전송 계층
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    /// `endpoint`로 연결을 열고 이벤트 수신기를 반환
    ///
    /// 반환된 수신기를 drop하면 구현체는 연결을 닫아야 한다.
    async fn open(&self, endpoint: &str) -> Result<mpsc::Receiver<TransportEvent>, CoreError>;
}
