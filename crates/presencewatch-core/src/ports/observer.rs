//! 알림 수신 옵저버 포트.
//!
//! UI 레이어가 구현한다. 모든 호출은 감독 태스크 안에서 동기적으로 일어난다.

use tokio::sync::mpsc;

use crate::models::notification::{ConnectionState, NotificationMessage};

/// 알림 메시지 / 연결 상태 변경 수신자
pub trait NotificationObserver: Send + Sync {
    /// 하트비트가 아닌 메시지마다 도착 순서대로 정확히 한 번 호출
    fn on_message(&self, message: &NotificationMessage);

    /// 연결 상태 전환 시 호출
    fn on_connectivity_change(&self, _state: ConnectionState) {}
}

/// 옵저버가 큐로 내보내는 이벤트
#[derive(Debug, Clone, PartialEq)]
pub enum ObserverEvent {
    Message(NotificationMessage),
    Connectivity(ConnectionState),
}

/// 수신한 이벤트를 단일 소비자 큐로 넘기는 옵저버
pub struct QueueObserver {
    tx: mpsc::UnboundedSender<ObserverEvent>,
}

impl QueueObserver {
    /// 옵저버와 소비자 쪽 수신기 생성
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ObserverEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotificationObserver for QueueObserver {
    fn on_message(&self, message: &NotificationMessage) {
        let _ = self.tx.send(ObserverEvent::Message(message.clone()));
    }

    fn on_connectivity_change(&self, state: ConnectionState) {
        let _ = self.tx.send(ObserverEvent::Connectivity(state));
    }
}
