//! WebSocket 전송 계층.
//!
//! `tokio-tungstenite` 기반 `NotificationTransport` 포트 구현.
//! 알림 채널은 수신 전용이라 송신 경로는 종료 프레임 하나뿐이다.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use presencewatch_core::error::CoreError;
use presencewatch_core::ports::transport::{NotificationTransport, TransportEvent};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// 기본 이벤트 버퍼 크기
const DEFAULT_EVENT_BUFFER: usize = 64;

/// WebSocket 전송 계층
pub struct WsTransport {
    event_buffer: usize,
}

impl WsTransport {
    pub fn new(event_buffer: usize) -> Self {
        Self {
            event_buffer: event_buffer.max(1),
        }
    }

    /// 수신 루프
    ///
    /// 소비자가 수신기를 drop하면 종료 프레임을 보내고 끝낸다.
    async fn read_loop(ws: WsStream, tx: mpsc::Sender<TransportEvent>) {
        let (mut write, mut read) = ws.split();

        if tx.send(TransportEvent::Opened).await.is_err() {
            let _ = write.send(Message::Close(None)).await;
            return;
        }

        loop {
            tokio::select! {
                _ = tx.closed() => {
                    debug!("수신기 해제, WebSocket 종료");
                    let _ = write.send(Message::Close(None)).await;
                    break;
                }
                msg = read.next() => match msg {
                    Some(Ok(Message::Text(text))) => {
                        if tx.send(TransportEvent::Text(text.to_string())).await.is_err() {
                            let _ = write.send(Message::Close(None)).await;
                            break;
                        }
                    }
                    Some(Ok(Message::Binary(data))) => {
                        debug!("바이너리 프레임 무시: {} bytes", data.len());
                    }
                    Some(Ok(Message::Close(frame))) => {
                        debug!("서버 종료 프레임 수신: {frame:?}");
                        let _ = tx.send(TransportEvent::Closed).await;
                        break;
                    }
                    Some(Ok(_)) => {} // Ping/Pong은 자동 처리
                    Some(Err(e)) => {
                        warn!("WebSocket 수신 에러: {e}");
                        let _ = tx.send(TransportEvent::Error(e.to_string())).await;
                        break;
                    }
                    None => {
                        let _ = tx.send(TransportEvent::Closed).await;
                        break;
                    }
                }
            }
        }
        debug!("WebSocket 수신 루프 종료");
    }
}

impl Default for WsTransport {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER)
    }
}

#[async_trait]
impl NotificationTransport for WsTransport {
    async fn open(&self, endpoint: &str) -> Result<mpsc::Receiver<TransportEvent>, CoreError> {
        let url = url::Url::parse(endpoint)
            .map_err(|e| CoreError::Transport(format!("잘못된 접속 URI: {endpoint}: {e}")))?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(CoreError::Transport(format!(
                "WebSocket 스킴이 아님: {}",
                url.scheme()
            )));
        }

        info!("WebSocket 연결: {}", url.path());

        let (ws_stream, _) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| CoreError::Transport(format!("WebSocket 연결 실패: {e}")))?;

        let (tx, rx) = mpsc::channel(self.event_buffer);
        tokio::spawn(Self::read_loop(ws_stream, tx));
        Ok(rx)
    }
}
