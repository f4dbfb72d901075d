//! 플랫폼 REST API 포트.
//!
//! 구현: `presencewatch-network` crate (reqwest)

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::CoreError;
use crate::models::channel::{ChannelCreateResponse, ChannelDescriptor, Topic};
use crate::models::presence::PresenceDefinition;

/// 알림 채널 API
#[async_trait]
pub trait NotificationsApi: Send + Sync {
    /// 새 알림 채널 생성
    ///
    /// 응답 필드 검증은 호출자(채널 관리자)가 한다.
    async fn create_channel(&self) -> Result<ChannelCreateResponse, CoreError>;

    /// 현재 토큰으로 접근 가능한 채널 목록
    async fn list_channels(&self) -> Result<Vec<ChannelDescriptor>, CoreError>;

    /// 채널 구독을 `topics`로 통째로 교체
    async fn replace_subscriptions(
        &self,
        channel_id: &str,
        topics: &[Topic],
    ) -> Result<(), CoreError>;
}

/// 신뢰할 수 있는 서버 시각 제공자
#[async_trait]
pub trait TimeSource: Send + Sync {
    async fn server_time(&self) -> Result<DateTime<Utc>, CoreError>;
}

/// 프레즌스 정의 제공자
#[async_trait]
pub trait PresenceDefinitionSource: Send + Sync {
    async fn presence_definitions(
        &self,
        locale: &str,
        page_size: u32,
    ) -> Result<Vec<PresenceDefinition>, CoreError>;
}
