//! 알림 메시지 및 연결 상태 모델.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::CoreError;
use crate::models::presence::OutOfOfficeWindow;

/// 알림 연결 상태
///
/// 종료 상태는 없다. 호출자가 세션을 내리지 않는 한 항상 복구를 시도한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionState {
    /// 연결 안 됨 (초기 상태)
    Disconnected,
    /// 전송 계층 연결 중
    Connecting,
    /// 연결됨, 메시지 수신 중
    Open,
    /// 연결 끊김, 복구 대기/진행 중
    Reconnecting,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "Disconnected"),
            ConnectionState::Connecting => write!(f, "Connecting"),
            ConnectionState::Open => write!(f, "Open"),
            ConnectionState::Reconnecting => write!(f, "Reconnecting"),
        }
    }
}

/// 수신한 알림 메시지
///
/// `payload`는 파싱한 프레임 전체를 그대로 담는다.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationMessage {
    pub topic_name: String,
    pub payload: Value,
}

impl NotificationMessage {
    /// 텍스트 프레임 파싱: `topicName` 문자열 필드가 있는 JSON 객체만 허용
    pub fn parse(text: &str) -> Result<Self, CoreError> {
        let payload: Value = serde_json::from_str(text)?;
        let topic_name = payload
            .get("topicName")
            .and_then(Value::as_str)
            .ok_or_else(|| CoreError::Transport("topicName 없는 프레임".to_string()))?
            .to_string();
        Ok(Self {
            topic_name,
            payload,
        })
    }

    /// 프레임의 `eventBody`
    pub fn event_body(&self) -> Option<&Value> {
        self.payload.get("eventBody")
    }
}

/// 프레즌스 정의 참조
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceDefinitionRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub system_presence: Option<String>,
}

/// 사용자 프레즌스 스냅샷
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceSnapshot {
    #[serde(default)]
    pub presence_definition: Option<PresenceDefinitionRef>,
    #[serde(default)]
    pub message: Option<String>,
}

/// 라우팅 상태 스냅샷 (`IDLE`, `INTERACTING`, `NOT_RESPONDING`, `OFF_QUEUE` ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingStatusSnapshot {
    #[serde(default)]
    pub status: Option<String>,
}

/// `v2.users.{id}?...` 토픽 메시지의 타입 뷰
///
/// 모든 필드가 옵션이며, 필드가 빠져 있어도 디코딩은 실패하지 않는다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatusUpdate {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub presence: Option<PresenceSnapshot>,
    #[serde(default)]
    pub routing_status: Option<RoutingStatusSnapshot>,
    #[serde(default)]
    pub out_of_office: Option<OutOfOfficeWindow>,
}

const USER_TOPIC_PREFIX: &str = "v2.users.";

impl UserStatusUpdate {
    /// 사용자 토픽 메시지면 디코딩, 아니면 `None`
    pub fn from_message(message: &NotificationMessage) -> Option<Self> {
        let user_id = message
            .topic_name
            .strip_prefix(USER_TOPIC_PREFIX)?
            .split('?')
            .next()
            .filter(|id| !id.is_empty())?;

        let mut update: UserStatusUpdate = match message.event_body() {
            Some(body) => serde_json::from_value(body.clone()).ok()?,
            None => UserStatusUpdate::default(),
        };
        if update.id.is_none() {
            update.id = Some(user_id.to_string());
        }
        Some(update)
    }

    /// 현재 프레즌스 정의 ID
    pub fn presence_id(&self) -> Option<&str> {
        self.presence
            .as_ref()?
            .presence_definition
            .as_ref()?
            .id
            .as_deref()
    }

    /// 라우팅 상태 문자열
    pub fn routing_status(&self) -> Option<&str> {
        self.routing_status.as_ref()?.status.as_deref()
    }
}
