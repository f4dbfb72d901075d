//! 연결 감독자.
//!
//! 전송 계층 연결의 수명주기를 담당한다: 연결, 메시지 전달, 끊김 감지,
//! 고정 지연 후 복구, 채널 무효화 시 재생성.
//!
//! ```text
//! Disconnected ──open_with──▶ Connecting ──Opened──▶ Open ◀──Text
//!                                 ▲                   │ Closed / Error
//!                                 │                   ▼
//!                                 └──recovery tick── Reconnecting
//! ```
//!
//! 감독자마다 tokio 태스크 하나가 전송 이벤트와 재연결 타이머를 처리한다.
//! 복구 단계(목록 조회, 채널 생성, 구독 재적용)는 이 태스크 안에서 순서대로
//! 기다리므로 두 복구가 겹치지 않는다.

use parking_lot::Mutex;
use presencewatch_core::config::NotificationConfig;
use presencewatch_core::error::CoreError;
use presencewatch_core::models::notification::{ConnectionState, NotificationMessage};
use presencewatch_core::ports::observer::NotificationObserver;
use presencewatch_core::ports::transport::{NotificationTransport, TransportEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::channel_manager::ChannelManager;
use crate::connectivity::SharedConnectivityMonitor;

/// 감독자 설정
#[derive(Debug, Clone)]
pub struct SupervisorSettings {
    /// 끊김 후 복구 시도까지 고정 대기 시간
    pub reconnect_delay: Duration,
    /// 옵저버에 전달하지 않는 하트비트 토픽
    pub heartbeat_topic: String,
}

impl From<&NotificationConfig> for SupervisorSettings {
    fn from(config: &NotificationConfig) -> Self {
        Self {
            reconnect_delay: config.reconnect_delay(),
            heartbeat_topic: config.heartbeat_topic.clone(),
        }
    }
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self::from(&NotificationConfig::default())
    }
}

/// 연결 한 번이 끝난 이유
enum PumpExit {
    /// 전송 계층 종료/에러 → 복구
    Dropped,
    /// 세션 종료 신호
    Shutdown,
}

/// 복구 시도 실패
enum RecoveryFailure {
    /// 다음 틱에 다시 시도
    Retry(CoreError),
    /// 옵저버가 없어 채널을 다시 만들 수 없음
    Abort,
}

struct SupervisorTask {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

struct SupervisorInner {
    channels: Arc<ChannelManager>,
    transport: Arc<dyn NotificationTransport>,
    monitor: SharedConnectivityMonitor,
    settings: SupervisorSettings,
}

/// 연결 감독자
///
/// 인스턴스당 열린 전송 연결은 최대 하나다.
pub struct ConnectionSupervisor {
    inner: Arc<SupervisorInner>,
    task: Mutex<Option<SupervisorTask>>,
}

impl ConnectionSupervisor {
    pub fn new(
        channels: Arc<ChannelManager>,
        transport: Arc<dyn NotificationTransport>,
        monitor: SharedConnectivityMonitor,
        settings: SupervisorSettings,
    ) -> Self {
        Self {
            inner: Arc::new(SupervisorInner {
                channels,
                transport,
                monitor,
                settings,
            }),
            task: Mutex::new(None),
        }
    }

    /// 현재 연결 상태
    pub fn state(&self) -> ConnectionState {
        self.inner.monitor.state()
    }

    /// 연결 상태 수신기
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.monitor.subscribe_state()
    }

    /// `endpoint`로 전송 연결 시작
    ///
    /// 이전 연결과 대기 중인 재연결은 먼저 정리한다.
    pub async fn open_with(&self, endpoint: impl Into<String>) {
        self.stop_task().await;

        let endpoint = endpoint.into();
        info!("알림 전송 연결 시작");
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(Arc::clone(&self.inner).run(endpoint, shutdown_rx));
        *self.task.lock() = Some(SupervisorTask {
            shutdown_tx,
            handle,
        });
    }

    /// 연결과 대기 중인 재연결 틱을 취소하고 `Disconnected`로 전환
    pub async fn shutdown(&self) {
        self.stop_task().await;
        self.inner.transition(ConnectionState::Disconnected).await;
        info!("알림 감독자 종료");
    }

    async fn stop_task(&self) {
        let task = self.task.lock().take();
        if let Some(task) = task {
            let _ = task.shutdown_tx.send(true);
            if let Err(e) = task.handle.await {
                if !e.is_cancelled() {
                    warn!("감독 태스크 비정상 종료: {e}");
                }
            }
        }
    }
}

impl Drop for ConnectionSupervisor {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.handle.abort();
        }
    }
}

impl SupervisorInner {
    async fn run(self: Arc<Self>, mut endpoint: String, mut shutdown: watch::Receiver<bool>) {
        loop {
            self.transition(ConnectionState::Connecting).await;
            let observer = self.channels.observer().await;

            let opened = tokio::select! {
                biased;
                _ = shutdown.changed() => return,
                opened = self.transport.open(&endpoint) => opened,
            };

            match opened {
                Ok(mut events) => {
                    let exit = self
                        .pump(&mut events, observer.as_deref(), &mut shutdown)
                        .await;
                    drop(events);
                    if let PumpExit::Shutdown = exit {
                        return;
                    }
                }
                Err(e) => warn!("전송 연결 실패: {e}"),
            }

            self.transition(ConnectionState::Reconnecting).await;

            loop {
                debug!("{:?} 후 복구 시도", self.settings.reconnect_delay);
                tokio::select! {
                    biased;
                    _ = shutdown.changed() => return,
                    _ = tokio::time::sleep(self.settings.reconnect_delay) => {}
                }

                let recovered = tokio::select! {
                    biased;
                    _ = shutdown.changed() => return,
                    recovered = self.recover(&endpoint) => recovered,
                };

                match recovered {
                    Ok(next) => {
                        endpoint = next;
                        break;
                    }
                    Err(RecoveryFailure::Retry(e)) => {
                        warn!("복구 실패, 다음 틱에 재시도: {e}");
                    }
                    Err(RecoveryFailure::Abort) => {
                        error!("등록된 옵저버가 없어 채널을 재생성할 수 없음, 자동 복구 중단");
                        self.monitor.mark_recovery_aborted();
                        return;
                    }
                }
            }
        }
    }

    /// 전송 이벤트 처리 루프
    async fn pump(
        &self,
        events: &mut mpsc::Receiver<TransportEvent>,
        observer: Option<&dyn NotificationObserver>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> PumpExit {
        loop {
            let event = tokio::select! {
                biased;
                _ = shutdown.changed() => return PumpExit::Shutdown,
                event = events.recv() => event,
            };

            match event {
                Some(TransportEvent::Opened) => {
                    info!("알림 채널 수신 준비 완료");
                    self.transition(ConnectionState::Open).await;
                }
                Some(TransportEvent::Text(text)) => {
                    dispatch(&text, &self.settings.heartbeat_topic, observer);
                }
                Some(TransportEvent::Error(e)) => {
                    warn!("전송 에러, 연결 종료로 처리: {e}");
                    return PumpExit::Dropped;
                }
                Some(TransportEvent::Closed) | None => {
                    info!("전송 연결 끊김");
                    return PumpExit::Dropped;
                }
            }
        }
    }

    /// 복구 틱: 채널이 살아 있으면 같은 엔드포인트, 아니면 새 채널 엔드포인트
    async fn recover(&self, endpoint: &str) -> Result<String, RecoveryFailure> {
        if let Some(handle) = self.channels.current().await {
            match self.channels.is_channel_valid(&handle).await {
                Ok(true) => {
                    info!("채널 {} 유효, 같은 엔드포인트로 재연결", handle.id());
                    return Ok(endpoint.to_string());
                }
                Ok(false) => info!("채널 {} 무효화됨, 새 채널 생성", handle.id()),
                Err(e) => return Err(RecoveryFailure::Retry(e)),
            }
        } else {
            info!("현재 채널 없음, 새 채널 생성");
        }

        match self.channels.recreate_channel().await {
            Ok(handle) => Ok(handle.endpoint().to_string()),
            Err(CoreError::NoObserver) => Err(RecoveryFailure::Abort),
            Err(e) => Err(RecoveryFailure::Retry(e)),
        }
    }

    /// 상태 전환 + 옵저버 통지
    async fn transition(&self, next: ConnectionState) {
        if self.monitor.set_state(next) {
            if let Some(observer) = self.channels.observer().await {
                observer.on_connectivity_change(next);
            }
        }
    }
}

/// 텍스트 프레임 하나를 옵저버로 전달
///
/// 하트비트와 파싱할 수 없는 프레임은 버린다.
fn dispatch(text: &str, heartbeat_topic: &str, observer: Option<&dyn NotificationObserver>) {
    let message = match NotificationMessage::parse(text) {
        Ok(message) => message,
        Err(e) => {
            warn!("알림 프레임 무시: {e}");
            return;
        }
    };

    if message.topic_name == heartbeat_topic {
        debug!("하트비트 수신");
        return;
    }

    match observer {
        Some(observer) => observer.on_message(&message),
        None => debug!("옵저버 없음, 메시지 폐기: {}", message.topic_name),
    }
}
