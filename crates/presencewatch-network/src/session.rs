//! 알림 세션.
//!
//! 채널 관리자, 연결 감독자, 시계 보정값, 프레즌스 카탈로그를 한 컨텍스트로 묶는다.
//! UI 레이어는 이 타입 하나만 들고 다닌다. 세션끼리는 상태를 공유하지 않는다.

use parking_lot::RwLock;
use presencewatch_core::config::AppConfig;
use presencewatch_core::error::CoreError;
use presencewatch_core::models::channel::{ChannelHandle, SubscriptionSet, Topic};
use presencewatch_core::models::notification::{ConnectionState, UserStatusUpdate};
use presencewatch_core::models::presence::{ClockOffset, OutOfOfficeWindow, PresenceCatalog};
use presencewatch_core::ports::observer::NotificationObserver;
use presencewatch_core::ports::platform::{NotificationsApi, PresenceDefinitionSource, TimeSource};
use presencewatch_core::ports::transport::NotificationTransport;
use presencewatch_core::status;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

use crate::auth::TokenManager;
use crate::channel_manager::ChannelManager;
use crate::clock_offset;
use crate::connectivity::{ConnectivityMonitor, HealthStatus, SharedConnectivityMonitor};
use crate::http_client::PlatformHttpClient;
use crate::presence;
use crate::supervisor::{ConnectionSupervisor, SupervisorSettings};
use crate::ws_client::WsTransport;

/// 세션이 의존하는 외부 포트 묶음
#[derive(Clone)]
pub struct SessionPorts {
    pub notifications: Arc<dyn NotificationsApi>,
    pub time_source: Arc<dyn TimeSource>,
    pub presence_definitions: Arc<dyn PresenceDefinitionSource>,
    pub transport: Arc<dyn NotificationTransport>,
}

/// 알림 세션
pub struct NotificationSession {
    config: AppConfig,
    ports: SessionPorts,
    channels: Arc<ChannelManager>,
    supervisor: ConnectionSupervisor,
    monitor: SharedConnectivityMonitor,
    clock_offset: RwLock<ClockOffset>,
    catalog: RwLock<PresenceCatalog>,
}

impl NotificationSession {
    /// REST(reqwest) + WebSocket(tokio-tungstenite) 어댑터로 세션 구성
    pub fn connect(config: AppConfig, token_manager: Arc<TokenManager>) -> Result<Self, CoreError> {
        let http = Arc::new(PlatformHttpClient::from_config(
            &config.platform,
            token_manager,
        )?);
        let transport = Arc::new(WsTransport::new(config.notification.event_buffer));
        let ports = SessionPorts {
            notifications: http.clone(),
            time_source: http.clone(),
            presence_definitions: http,
            transport,
        };
        Ok(Self::with_ports(config, ports))
    }

    /// 임의의 포트 구현으로 세션 구성
    pub fn with_ports(config: AppConfig, ports: SessionPorts) -> Self {
        let monitor: SharedConnectivityMonitor = Arc::new(ConnectivityMonitor::new());
        let channels = Arc::new(ChannelManager::new(ports.notifications.clone()));
        let supervisor = ConnectionSupervisor::new(
            channels.clone(),
            ports.transport.clone(),
            monitor.clone(),
            SupervisorSettings::from(&config.notification),
        );

        Self {
            config,
            ports,
            channels,
            supervisor,
            monitor,
            clock_offset: RwLock::new(ClockOffset::zero()),
            catalog: RwLock::new(PresenceCatalog::new()),
        }
    }

    /// 서버 시계 보정값 측정 후 세션에 저장
    pub async fn capture_offset(&self) -> ClockOffset {
        let offset = clock_offset::capture_offset(self.ports.time_source.as_ref(), &self.monitor).await;
        *self.clock_offset.write() = offset;
        offset
    }

    /// 저장된 시계 보정값
    pub fn clock_offset(&self) -> ClockOffset {
        *self.clock_offset.read()
    }

    /// 프레즌스 정의 다시 조회, 카탈로그 크기 반환
    pub async fn refresh_presence_catalog(&self) -> usize {
        let catalog = presence::load_presence_catalog(
            self.ports.presence_definitions.as_ref(),
            &self.config.presence.locale_code,
            self.config.presence.page_size,
            &self.monitor,
        )
        .await;
        let len = catalog.len();
        *self.catalog.write() = catalog;
        len
    }

    /// 현재 프레즌스 카탈로그 (복제본)
    pub fn presence_catalog(&self) -> PresenceCatalog {
        self.catalog.read().clone()
    }

    /// 알림 채널 생성 후 전송 연결 시작
    ///
    /// 채널 생성 응답이 불완전하면 에러를 그대로 반환하고 연결하지 않는다.
    pub async fn create_notification_channel(
        &self,
        observer: Arc<dyn NotificationObserver>,
    ) -> Result<ChannelHandle, CoreError> {
        let handle = self.channels.create_channel(observer).await?;
        self.supervisor.open_with(handle.endpoint()).await;
        Ok(handle)
    }

    /// 구독 토픽 전체 교체
    pub async fn subscribe_to_topics<I, T>(&self, topics: I) -> Result<(), CoreError>
    where
        I: IntoIterator<Item = T>,
        T: Into<Topic>,
    {
        let topics: SubscriptionSet = topics.into_iter().collect();
        self.channels.replace_subscriptions(topics).await
    }

    /// 마지막으로 반영한 구독 목록
    pub async fn subscriptions(&self) -> SubscriptionSet {
        self.channels.subscriptions().await
    }

    /// 현재 채널 핸들
    pub async fn current_channel(&self) -> Option<ChannelHandle> {
        self.channels.current().await
    }

    pub fn resolve_presence_label(&self, presence_id: &str) -> String {
        status::resolve_presence_label(presence_id, &self.catalog.read())
    }

    pub fn is_override_active(&self, window: Option<&OutOfOfficeWindow>) -> bool {
        status::is_override_active(window, self.clock_offset())
    }

    pub fn effective_status(&self, presence_id: &str, window: Option<&OutOfOfficeWindow>) -> String {
        status::effective_status(
            presence_id,
            window,
            &self.catalog.read(),
            self.clock_offset(),
        )
    }

    /// 사용자 상태 메시지의 표시 상태, 프레즌스 ID가 없으면 `None`
    pub fn status_of(&self, update: &UserStatusUpdate) -> Option<String> {
        let presence_id = update.presence_id()?;
        Some(self.effective_status(presence_id, update.out_of_office.as_ref()))
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.supervisor.state()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.supervisor.subscribe_state()
    }

    pub fn health(&self) -> HealthStatus {
        self.monitor.health()
    }

    pub fn subscribe_health(&self) -> watch::Receiver<HealthStatus> {
        self.monitor.subscribe_health()
    }

    /// 세션 종료, 대기 중인 재연결 틱까지 취소
    pub async fn shutdown(&self) {
        self.supervisor.shutdown().await;
        info!("알림 세션 종료");
    }
}
