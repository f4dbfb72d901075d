//! 통합 테스트 공용 mock 포트.
//!
//! 실제 소켓/HTTP 없이 감독자 상태 머신을 구동하기 위한 메모리 구현.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use presencewatch_core::config::AppConfig;
use presencewatch_core::error::CoreError;
use presencewatch_core::models::channel::{ChannelCreateResponse, ChannelDescriptor, Topic};
use presencewatch_core::models::presence::PresenceDefinition;
use presencewatch_core::ports::platform::{NotificationsApi, PresenceDefinitionSource, TimeSource};
use presencewatch_core::ports::transport::{NotificationTransport, TransportEvent};
use presencewatch_network::session::{NotificationSession, SessionPorts};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// 플랫폼 API 호출 기록
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    Create(String),
    List,
    Replace(String, Vec<String>),
}

/// 메모리 플랫폼. 채널 ID는 `ch-1`, `ch-2` ... 순으로 발급
#[derive(Default)]
pub struct MockPlatform {
    next_id: AtomicUsize,
    alive: Mutex<Vec<String>>,
    calls: Mutex<Vec<PlatformCall>>,
    list_failures: AtomicUsize,
    incomplete_create: AtomicBool,
    server_time: Mutex<Option<DateTime<Utc>>>,
    definitions: Mutex<Option<Vec<PresenceDefinition>>>,
}

impl MockPlatform {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// 서버 측에서 모든 채널 만료
    pub fn invalidate_all(&self) {
        self.alive.lock().clear();
    }

    /// 다음 `n`번의 목록 조회 실패
    pub fn fail_next_lists(&self, n: usize) {
        self.list_failures.store(n, Ordering::SeqCst);
    }

    /// 채널 생성 응답에서 connectUri 누락
    pub fn set_incomplete_create(&self, incomplete: bool) {
        self.incomplete_create.store(incomplete, Ordering::SeqCst);
    }

    pub fn set_server_time(&self, time: DateTime<Utc>) {
        *self.server_time.lock() = Some(time);
    }

    pub fn set_definitions(&self, definitions: Vec<PresenceDefinition>) {
        *self.definitions.lock() = Some(definitions);
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.lock().clone()
    }

    pub fn calls_since(&self, mark: usize) -> Vec<PlatformCall> {
        self.calls.lock()[mark..].to_vec()
    }

    pub fn create_count(&self) -> usize {
        self.count(|c| matches!(c, PlatformCall::Create(_)))
    }

    pub fn list_count(&self) -> usize {
        self.count(|c| matches!(c, PlatformCall::List))
    }

    pub fn replace_count(&self) -> usize {
        self.count(|c| matches!(c, PlatformCall::Replace(..)))
    }

    fn count(&self, pred: impl Fn(&PlatformCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| pred(c)).count()
    }
}

pub fn endpoint_for(id: &str) -> String {
    format!("wss://streaming.mock/channels/{id}")
}

#[async_trait]
impl NotificationsApi for MockPlatform {
    async fn create_channel(&self) -> Result<ChannelCreateResponse, CoreError> {
        let id = format!("ch-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.calls.lock().push(PlatformCall::Create(id.clone()));
        if self.incomplete_create.load(Ordering::SeqCst) {
            return Ok(ChannelCreateResponse {
                id: Some(id),
                connect_uri: None,
                expires: None,
            });
        }
        self.alive.lock().push(id.clone());
        Ok(ChannelCreateResponse {
            connect_uri: Some(endpoint_for(&id)),
            id: Some(id),
            expires: None,
        })
    }

    async fn list_channels(&self) -> Result<Vec<ChannelDescriptor>, CoreError> {
        self.calls.lock().push(PlatformCall::List);
        let remaining = self.list_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.list_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(CoreError::Network("list timeout".into()));
        }
        Ok(self
            .alive
            .lock()
            .iter()
            .map(|id| ChannelDescriptor {
                id: id.clone(),
                connect_uri: Some(endpoint_for(id)),
                expires: None,
            })
            .collect())
    }

    async fn replace_subscriptions(
        &self,
        channel_id: &str,
        topics: &[Topic],
    ) -> Result<(), CoreError> {
        self.calls.lock().push(PlatformCall::Replace(
            channel_id.to_string(),
            topics.iter().map(|t| t.id.clone()).collect(),
        ));
        Ok(())
    }
}

#[async_trait]
impl TimeSource for MockPlatform {
    async fn server_time(&self) -> Result<DateTime<Utc>, CoreError> {
        self.server_time
            .lock()
            .ok_or_else(|| CoreError::Network("date endpoint unreachable".into()))
    }
}

#[async_trait]
impl PresenceDefinitionSource for MockPlatform {
    async fn presence_definitions(
        &self,
        _locale: &str,
        _page_size: u32,
    ) -> Result<Vec<PresenceDefinition>, CoreError> {
        self.definitions
            .lock()
            .clone()
            .ok_or_else(|| CoreError::ServiceUnavailable("definitions".into()))
    }
}

/// 테스트가 이벤트를 직접 밀어 넣는 전송 계층
///
/// 연결이 열릴 때마다 `Opened`를 먼저 넣어 둔다.
#[derive(Default)]
pub struct ScriptedTransport {
    endpoints: Mutex<Vec<String>>,
    links: Mutex<Vec<mpsc::Sender<TransportEvent>>>,
    open_failures: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_next_opens(&self, n: usize) {
        self.open_failures.store(n, Ordering::SeqCst);
    }

    pub fn open_count(&self) -> usize {
        self.endpoints.lock().len()
    }

    pub fn endpoints(&self) -> Vec<String> {
        self.endpoints.lock().clone()
    }

    /// 가장 최근 연결로 이벤트 전송
    pub async fn push(&self, event: TransportEvent) {
        let link = self
            .links
            .lock()
            .last()
            .cloned()
            .expect("열린 연결 없음");
        link.send(event).await.expect("감독자가 연결을 놓음");
    }

    /// 가장 최근 연결을 감독자가 놓았는지
    pub fn latest_released(&self) -> bool {
        self.links.lock().last().is_some_and(|tx| tx.is_closed())
    }
}

#[async_trait]
impl NotificationTransport for ScriptedTransport {
    async fn open(&self, endpoint: &str) -> Result<mpsc::Receiver<TransportEvent>, CoreError> {
        self.endpoints.lock().push(endpoint.to_string());
        let remaining = self.open_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.open_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(CoreError::Transport("handshake refused".into()));
        }
        let (tx, rx) = mpsc::channel(32);
        tx.try_send(TransportEvent::Opened)
            .map_err(|e| CoreError::Internal(e.to_string()))?;
        self.links.lock().push(tx);
        Ok(rx)
    }
}

/// mock 포트로 구성한 세션
pub fn session_with_delay(
    delay: Duration,
) -> (NotificationSession, Arc<MockPlatform>, Arc<ScriptedTransport>) {
    let platform = MockPlatform::new();
    let transport = ScriptedTransport::new();
    let mut config = AppConfig::default();
    config.notification.reconnect_delay_ms = delay.as_millis() as u64;

    let ports = SessionPorts {
        notifications: platform.clone(),
        time_source: platform.clone(),
        presence_definitions: platform.clone(),
        transport: transport.clone(),
    };
    (
        NotificationSession::with_ports(config, ports),
        platform,
        transport,
    )
}

/// 조건이 참이 될 때까지 대기 (5초 제한)
pub async fn wait_until(what: &str, cond: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !cond() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "대기 시간 초과: {what}"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
