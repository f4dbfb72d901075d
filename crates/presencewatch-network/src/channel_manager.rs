//! 알림 채널 관리자.
//!
//! 현재 채널 핸들, 마지막 구독 토픽 목록, 등록된 옵저버를 단독으로 소유한다.
//! 다른 컴포넌트는 아래 연산을 통해서만 이 상태를 바꾼다.

use presencewatch_core::error::CoreError;
use presencewatch_core::models::channel::{ChannelHandle, SubscriptionSet};
use presencewatch_core::ports::observer::NotificationObserver;
use presencewatch_core::ports::platform::NotificationsApi;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Default)]
struct ChannelState {
    current: Option<ChannelHandle>,
    subscriptions: SubscriptionSet,
    observer: Option<Arc<dyn NotificationObserver>>,
}

/// 알림 채널 관리자
pub struct ChannelManager {
    api: Arc<dyn NotificationsApi>,
    state: Mutex<ChannelState>,
}

impl ChannelManager {
    pub fn new(api: Arc<dyn NotificationsApi>) -> Self {
        Self {
            api,
            state: Mutex::new(ChannelState::default()),
        }
    }

    /// 새 채널 생성 후 현재 채널로 교체
    ///
    /// 응답에 `id`나 `connectUri`가 없으면 `ChannelCreation` 에러이며
    /// 현재 채널과 옵저버는 바뀌지 않는다.
    pub async fn create_channel(
        &self,
        observer: Arc<dyn NotificationObserver>,
    ) -> Result<ChannelHandle, CoreError> {
        let mut state = self.state.lock().await;
        let handle = self.mint_channel().await?;

        if let Some(previous) = state.current.replace(handle.clone()) {
            debug!("이전 채널 대체: {}", previous.id());
        }
        state.observer = Some(observer);
        info!("알림 채널 생성: {}", handle.id());
        Ok(handle)
    }

    /// 현재 채널의 구독을 `topics`로 통째로 교체
    ///
    /// 병합이 아니다. 호출자는 원하는 전체 목록을 매번 넘겨야 한다.
    pub async fn replace_subscriptions(&self, topics: SubscriptionSet) -> Result<(), CoreError> {
        let mut state = self.state.lock().await;
        let channel_id = state
            .current
            .as_ref()
            .map(|h| h.id().to_string())
            .ok_or(CoreError::NoActiveChannel)?;

        self.api
            .replace_subscriptions(&channel_id, topics.topics())
            .await?;
        info!("구독 교체 완료: channel={channel_id}, {}개 토픽", topics.len());
        state.subscriptions = topics;
        Ok(())
    }

    /// 서버 채널 목록에 `handle`이 아직 있는지
    ///
    /// 목록 전체를 조회하므로 복구 경로에서만 쓴다.
    pub async fn is_channel_valid(&self, handle: &ChannelHandle) -> Result<bool, CoreError> {
        let channels = self.api.list_channels().await?;
        let valid = channels.iter().any(|c| c.id == handle.id());
        debug!("채널 유효성: {} → {valid}", handle.id());
        Ok(valid)
    }

    /// 등록된 옵저버로 새 채널을 만들고 마지막 구독 목록을 재적용
    ///
    /// 재적용까지 성공해야 새 채널이 현재 채널이 된다.
    pub async fn recreate_channel(&self) -> Result<ChannelHandle, CoreError> {
        let mut state = self.state.lock().await;
        if state.observer.is_none() {
            return Err(CoreError::NoObserver);
        }

        let handle = self.mint_channel().await?;
        if state.subscriptions.is_empty() {
            debug!("재적용할 구독 없음");
        } else {
            self.api
                .replace_subscriptions(handle.id(), state.subscriptions.topics())
                .await
                .inspect_err(|e| warn!("새 채널 {}에 구독 재적용 실패: {e}", handle.id()))?;
            info!(
                "새 채널 {}에 구독 {}개 재적용",
                handle.id(),
                state.subscriptions.len()
            );
        }

        state.current = Some(handle.clone());
        Ok(handle)
    }

    /// 현재 채널 핸들
    pub async fn current(&self) -> Option<ChannelHandle> {
        self.state.lock().await.current.clone()
    }

    /// 마지막으로 반영한 구독 목록
    pub async fn subscriptions(&self) -> SubscriptionSet {
        self.state.lock().await.subscriptions.clone()
    }

    /// 등록된 옵저버
    pub async fn observer(&self) -> Option<Arc<dyn NotificationObserver>> {
        self.state.lock().await.observer.clone()
    }

    async fn mint_channel(&self) -> Result<ChannelHandle, CoreError> {
        let resp = self.api.create_channel().await?;
        ChannelHandle::try_from(resp).inspect_err(|e| warn!("채널 생성 응답 불완전: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use parking_lot::Mutex as SyncMutex;
    use presencewatch_core::models::channel::{ChannelCreateResponse, ChannelDescriptor, Topic};
    use presencewatch_core::models::notification::NotificationMessage;

    #[derive(Default)]
    struct FakeApi {
        responses: SyncMutex<Vec<ChannelCreateResponse>>,
        listed: SyncMutex<Vec<String>>,
        replaced: SyncMutex<Vec<(String, Vec<Topic>)>>,
        fail_replace: SyncMutex<bool>,
    }

    impl FakeApi {
        fn with_channels(ids: &[&str]) -> Self {
            let api = FakeApi::default();
            *api.responses.lock() = ids
                .iter()
                .rev()
                .map(|id| ChannelCreateResponse {
                    id: Some(id.to_string()),
                    connect_uri: Some(format!("wss://stream.example/{id}")),
                    expires: None,
                })
                .collect();
            api
        }
    }

    #[async_trait]
    impl NotificationsApi for FakeApi {
        async fn create_channel(&self) -> Result<ChannelCreateResponse, CoreError> {
            Ok(self.responses.lock().pop().unwrap_or_default())
        }

        async fn list_channels(&self) -> Result<Vec<ChannelDescriptor>, CoreError> {
            Ok(self
                .listed
                .lock()
                .iter()
                .map(|id| ChannelDescriptor {
                    id: id.clone(),
                    connect_uri: None,
                    expires: None,
                })
                .collect())
        }

        async fn replace_subscriptions(
            &self,
            channel_id: &str,
            topics: &[Topic],
        ) -> Result<(), CoreError> {
            if *self.fail_replace.lock() {
                return Err(CoreError::Network("reset".into()));
            }
            self.replaced
                .lock()
                .push((channel_id.to_string(), topics.to_vec()));
            Ok(())
        }
    }

    struct NullObserver;

    impl NotificationObserver for NullObserver {
        fn on_message(&self, _message: &NotificationMessage) {}
    }

    fn topics() -> SubscriptionSet {
        ["v2.users.A?presence", "v2.users.B?presence"]
            .into_iter()
            .collect()
    }

    #[tokio::test]
    async fn create_channel_sets_current_handle() {
        let manager = ChannelManager::new(Arc::new(FakeApi::with_channels(&["ch-1"])));
        let handle = manager.create_channel(Arc::new(NullObserver)).await.unwrap();
        assert_eq!(handle.id(), "ch-1");
        assert_eq!(manager.current().await, Some(handle));
        assert!(manager.observer().await.is_some());
    }

    #[tokio::test]
    async fn incomplete_response_leaves_no_handle() {
        let api = FakeApi::default();
        *api.responses.lock() = vec![ChannelCreateResponse {
            id: Some("ch-1".into()),
            connect_uri: None,
            expires: None,
        }];
        let manager = ChannelManager::new(Arc::new(api));

        let err = manager.create_channel(Arc::new(NullObserver)).await.unwrap_err();
        assert_matches!(err, CoreError::ChannelCreation(_));
        assert!(manager.current().await.is_none());
        assert!(manager.observer().await.is_none());

        let err = manager.create_channel(Arc::new(NullObserver)).await.unwrap_err();
        assert_matches!(err, CoreError::ChannelCreation(_));
        assert!(manager.current().await.is_none());
    }

    #[tokio::test]
    async fn subscribing_without_channel_fails() {
        let api = Arc::new(FakeApi::default());
        let manager = ChannelManager::new(api.clone());
        let err = manager.replace_subscriptions(topics()).await.unwrap_err();
        assert_matches!(err, CoreError::NoActiveChannel);
        assert!(api.replaced.lock().is_empty());
        assert!(manager.subscriptions().await.is_empty());
    }

    #[tokio::test]
    async fn replace_is_full_overwrite() {
        let api = Arc::new(FakeApi::with_channels(&["ch-1"]));
        let manager = ChannelManager::new(api.clone());
        manager.create_channel(Arc::new(NullObserver)).await.unwrap();

        manager.replace_subscriptions(topics()).await.unwrap();
        let second: SubscriptionSet = ["v2.users.C?presence"].into_iter().collect();
        manager.replace_subscriptions(second.clone()).await.unwrap();

        assert_eq!(manager.subscriptions().await, second);
        let replaced = api.replaced.lock();
        assert_eq!(replaced.len(), 2);
        assert_eq!(replaced[1], ("ch-1".to_string(), second.topics().to_vec()));
    }

    #[tokio::test]
    async fn failed_replace_keeps_previous_set() {
        let api = Arc::new(FakeApi::with_channels(&["ch-1"]));
        let manager = ChannelManager::new(api.clone());
        manager.create_channel(Arc::new(NullObserver)).await.unwrap();
        manager.replace_subscriptions(topics()).await.unwrap();

        *api.fail_replace.lock() = true;
        let other: SubscriptionSet = ["v2.users.Z?presence"].into_iter().collect();
        assert!(manager.replace_subscriptions(other).await.is_err());
        assert_eq!(manager.subscriptions().await, topics());
    }

    #[tokio::test]
    async fn validity_checks_listing() {
        let api = Arc::new(FakeApi::with_channels(&["ch-1"]));
        let manager = ChannelManager::new(api.clone());
        let handle = manager.create_channel(Arc::new(NullObserver)).await.unwrap();

        *api.listed.lock() = vec!["ch-0".into(), "ch-1".into()];
        assert!(manager.is_channel_valid(&handle).await.unwrap());

        *api.listed.lock() = vec!["ch-0".into()];
        assert!(!manager.is_channel_valid(&handle).await.unwrap());
    }

    #[tokio::test]
    async fn recreate_replays_last_set_in_order() {
        let api = Arc::new(FakeApi::with_channels(&["ch-1", "ch-2"]));
        let manager = ChannelManager::new(api.clone());
        manager.create_channel(Arc::new(NullObserver)).await.unwrap();
        manager.replace_subscriptions(topics()).await.unwrap();

        let handle = manager.recreate_channel().await.unwrap();
        assert_eq!(handle.id(), "ch-2");
        assert_eq!(manager.current().await, Some(handle));
        assert_eq!(manager.subscriptions().await, topics());

        let replaced = api.replaced.lock();
        assert_eq!(replaced.last().unwrap(), &("ch-2".to_string(), topics().topics().to_vec()));
    }

    #[tokio::test]
    async fn recreate_skips_replay_for_empty_set() {
        let api = Arc::new(FakeApi::with_channels(&["ch-1", "ch-2"]));
        let manager = ChannelManager::new(api.clone());
        manager.create_channel(Arc::new(NullObserver)).await.unwrap();

        manager.recreate_channel().await.unwrap();
        assert!(api.replaced.lock().is_empty());
    }

    #[tokio::test]
    async fn recreate_without_observer_fails() {
        let api = Arc::new(FakeApi::with_channels(&["ch-1"]));
        let manager = ChannelManager::new(api.clone());
        let err = manager.recreate_channel().await.unwrap_err();
        assert_matches!(err, CoreError::NoObserver);
        // 채널 생성 요청조차 하지 않는다
        assert_eq!(api.responses.lock().len(), 1);
    }
}
