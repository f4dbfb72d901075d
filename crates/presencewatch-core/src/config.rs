//! 애플리케이션 설정 구조체.
//!
//! 플랫폼 API 주소, 알림 채널 재연결 정책, 프레즌스 정의 조회 옵션을 정의한다.
//! 파일 로드/저장은 [`crate::config_manager`]가 담당.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 플랫폼 REST API 설정
    #[serde(default)]
    pub platform: PlatformConfig,
    /// 알림 채널 설정
    #[serde(default)]
    pub notification: NotificationConfig,
    /// 프레즌스 정의 조회 설정
    #[serde(default)]
    pub presence: PresenceConfig,
}

impl AppConfig {
    /// 기본 설정
    pub fn default_config() -> Self {
        Self::default()
    }
}

// ============================================================
// 플랫폼 설정
// ============================================================

/// 플랫폼 REST API 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// API 기본 URL (예: `https://api.mypurecloud.com`)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// 요청 타임아웃 (초)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// 재시도 가능한 에러의 최대 재시도 횟수
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl PlatformConfig {
    /// 요청 타임아웃
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://api.mypurecloud.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

// ============================================================
// 알림 채널 설정
// ============================================================

/// 알림 채널 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// 연결 끊김 후 복구 시도까지 대기 시간 (밀리초, 고정값)
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// 콜백으로 전달하지 않는 하트비트 토픽 이름
    #[serde(default = "default_heartbeat_topic")]
    pub heartbeat_topic: String,
    /// 전송 계층 이벤트 버퍼 크기
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl NotificationConfig {
    /// 재연결 대기 시간
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: default_reconnect_delay_ms(),
            heartbeat_topic: default_heartbeat_topic(),
            event_buffer: default_event_buffer(),
        }
    }
}

fn default_reconnect_delay_ms() -> u64 {
    3_000
}

fn default_heartbeat_topic() -> String {
    "channel.heartbeat".to_string()
}

fn default_event_buffer() -> usize {
    64
}

// ============================================================
// 프레즌스 설정
// ============================================================

/// 프레즌스 정의 조회 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceConfig {
    /// 표시 라벨 로케일
    #[serde(default = "default_locale_code")]
    pub locale_code: String,
    /// 정의 조회 페이지 크기
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            locale_code: default_locale_code(),
            page_size: default_page_size(),
        }
    }
}

fn default_locale_code() -> String {
    "en_US".to_string()
}

fn default_page_size() -> u32 {
    100
}
