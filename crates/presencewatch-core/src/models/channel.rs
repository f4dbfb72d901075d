//! 알림 채널 / 토픽 모델.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// 채널 생성(`POST /api/v2/notifications/channels`) 응답
///
/// 두 필드 모두 옵션으로 받고 [`ChannelHandle`] 변환 시 검증한다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelCreateResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub connect_uri: Option<String>,
    #[serde(default)]
    pub expires: Option<String>,
}

/// 채널 목록 응답의 항목
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelDescriptor {
    pub id: String,
    #[serde(default)]
    pub connect_uri: Option<String>,
    #[serde(default)]
    pub expires: Option<String>,
}

/// 현재 사용 중인 알림 채널
///
/// 서버에서 비활성/삭제로 무효화될 수 있으며, 무효화는 목록 조회로만 감지된다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelHandle {
    id: String,
    endpoint: String,
}

impl ChannelHandle {
    /// 채널 ID와 접속 URI로 생성 (둘 다 비어 있으면 안 됨)
    pub fn new(id: impl Into<String>, endpoint: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        let endpoint = endpoint.into();
        if id.trim().is_empty() {
            return Err(CoreError::ChannelCreation("채널 ID 없음".to_string()));
        }
        if endpoint.trim().is_empty() {
            return Err(CoreError::ChannelCreation("connectUri 없음".to_string()));
        }
        Ok(Self { id, endpoint })
    }

    /// 채널 ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// WebSocket 접속 URI
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl TryFrom<ChannelCreateResponse> for ChannelHandle {
    type Error = CoreError;

    fn try_from(resp: ChannelCreateResponse) -> Result<Self, Self::Error> {
        let id = resp
            .id
            .ok_or_else(|| CoreError::ChannelCreation("채널 ID 없음".to_string()))?;
        let endpoint = resp
            .connect_uri
            .ok_or_else(|| CoreError::ChannelCreation("connectUri 없음".to_string()))?;
        Self::new(id, endpoint)
    }
}

/// 사용자 토픽에 포함할 필드
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicField {
    Presence,
    RoutingStatus,
    OutOfOffice,
}

impl TopicField {
    fn as_str(self) -> &'static str {
        match self {
            TopicField::Presence => "presence",
            TopicField::RoutingStatus => "routingStatus",
            TopicField::OutOfOffice => "outOfOffice",
        }
    }
}

/// 구독 토픽 (와이어 형식 `{"id": "<pattern>"}`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
}

impl Topic {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self { id: pattern.into() }
    }

    /// `v2.users.{user_id}?presence&routingStatus` 형태의 사용자 토픽
    pub fn user(user_id: &str, fields: &[TopicField]) -> Self {
        let fields = fields
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join("&");
        if fields.is_empty() {
            Self::new(format!("v2.users.{user_id}"))
        } else {
            Self::new(format!("v2.users.{user_id}?{fields}"))
        }
    }

    pub fn pattern(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl From<&str> for Topic {
    fn from(pattern: &str) -> Self {
        Self::new(pattern)
    }
}

impl From<String> for Topic {
    fn from(pattern: String) -> Self {
        Self::new(pattern)
    }
}

/// 마지막으로 서버에 반영한 구독 토픽 목록 (순서 유지)
///
/// 항상 통째로 교체되며, 채널 재생성 시 새 채널에 그대로 재적용된다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionSet(Vec<Topic>);

impl SubscriptionSet {
    pub fn new(topics: Vec<Topic>) -> Self {
        Self(topics)
    }

    pub fn topics(&self) -> &[Topic] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<T: Into<Topic>> FromIterator<T> for SubscriptionSet {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<Topic>> for SubscriptionSet {
    fn from(topics: Vec<Topic>) -> Self {
        Self(topics)
    }
}
