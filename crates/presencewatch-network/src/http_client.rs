//! 플랫폼 REST API 클라이언트.
//!
//! `NotificationsApi`, `TimeSource`, `PresenceDefinitionSource` 포트 구현.
//! 베어러 토큰 자동 주입. 프레즌스 정의 조회만 재시도 가능한 에러에 exponential backoff를 적용하고,
//! 서버 시각 / 채널 API는 한 번만 요청한다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use presencewatch_core::config::PlatformConfig;
use presencewatch_core::error::CoreError;
use presencewatch_core::models::channel::{ChannelCreateResponse, ChannelDescriptor, Topic};
use presencewatch_core::models::presence::PresenceDefinition;
use presencewatch_core::ports::platform::{
    NotificationsApi, PresenceDefinitionSource, TimeSource,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::auth::TokenManager;

/// 기본 재시도 횟수
const DEFAULT_MAX_RETRIES: u32 = 3;

/// 429 응답에 Retry-After 헤더가 없을 때 대기 시간 (초)
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

const CHANNELS_PATH: &str = "/api/v2/notifications/channels";

/// 목록 응답 공통 래퍼
#[derive(Debug, Deserialize)]
struct EntityListing<T> {
    #[serde(default = "Vec::new")]
    entities: Vec<T>,
}

/// `GET /api/v2/date` 응답
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerDate {
    #[serde(default)]
    current_date: Option<DateTime<Utc>>,
}

/// 플랫폼 REST 클라이언트
pub struct PlatformHttpClient {
    client: reqwest::Client,
    base_url: String,
    token_manager: Arc<TokenManager>,
    max_retries: u32,
    initial_backoff: Duration,
}

impl PlatformHttpClient {
    /// 새 REST 클라이언트 생성
    pub fn new(
        base_url: &str,
        token_manager: Arc<TokenManager>,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 빌드 실패: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token_manager,
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: Duration::from_secs(1),
        })
    }

    /// 설정으로 생성
    pub fn from_config(
        config: &PlatformConfig,
        token_manager: Arc<TokenManager>,
    ) -> Result<Self, CoreError> {
        Ok(Self::new(&config.api_base_url, token_manager, config.request_timeout())?
            .with_max_retries(config.max_retries))
    }

    /// 재시도 횟수 설정
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// 첫 재시도 대기 시간 설정 (이후 2배씩, 최대 30초)
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    /// Authorization 헤더가 포함된 요청 빌더
    async fn authorized_request(
        &self,
        method: reqwest::Method,
        path: &str,
    ) -> Result<reqwest::RequestBuilder, CoreError> {
        let token = self.token_manager.get_token().await?;
        let url = format!("{}{}", self.base_url, path);
        Ok(self.client.request(method, &url).bearer_auth(token))
    }

    /// 응답 상태 코드 확인 및 에러 매핑
    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, CoreError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let retry_after = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS);

        let text = resp.text().await.unwrap_or_else(|e| {
            warn!("응답 본문 읽기 실패: {e}");
            String::new()
        });

        match status.as_u16() {
            401 => Err(CoreError::Auth(format!("인증 실패: {text}"))),
            404 => Err(CoreError::NotFound {
                resource_type: "API".to_string(),
                id: text,
            }),
            429 => Err(CoreError::RateLimit {
                retry_after_secs: retry_after,
            }),
            503 => Err(CoreError::ServiceUnavailable(text)),
            _ => Err(CoreError::Internal(format!("API 에러 ({status}): {text}"))),
        }
    }

    async fn parse_json<T: DeserializeOwned>(
        resp: reqwest::Response,
        what: &str,
    ) -> Result<T, CoreError> {
        resp.json()
            .await
            .map_err(|e| CoreError::Internal(format!("{what} 응답 파싱 실패: {e}")))
    }

    /// 재시도가 포함된 요청 실행
    async fn execute_with_retry<F, Fut, T>(&self, operation: F) -> Result<T, CoreError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut delay = self.initial_backoff;
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if !e.is_retryable() || attempt >= self.max_retries => return Err(e),
                Err(e) => {
                    attempt += 1;
                    if let CoreError::RateLimit { retry_after_secs } = &e {
                        delay = Duration::from_secs(*retry_after_secs);
                    }
                    warn!(
                        "요청 실패 (시도 {attempt}/{}): {e}, {delay:?} 후 재시도",
                        self.max_retries + 1
                    );
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(Duration::from_secs(30));
                }
            }
        }
    }

    /// 재시도 없는 단건 GET
    async fn get_json_once<T: DeserializeOwned>(
        &self,
        path: &str,
        what: &str,
    ) -> Result<T, CoreError> {
        let resp = self
            .authorized_request(reqwest::Method::GET, path)
            .await?
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("{what} 요청 실패: {e}")))?;
        let resp = Self::check_response(resp).await?;
        Self::parse_json(resp, what).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T, CoreError> {
        self.execute_with_retry(|| self.get_json_once(path, what))
            .await
    }
}

/// 채널 API는 단건 요청만 보낸다. 재시도는 감독자의 고정 지연 틱이 맡는다.
#[async_trait]
impl NotificationsApi for PlatformHttpClient {
    async fn create_channel(&self) -> Result<ChannelCreateResponse, CoreError> {
        debug!("알림 채널 생성 요청");

        let resp = self
            .authorized_request(reqwest::Method::POST, CHANNELS_PATH)
            .await?
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("채널 생성 요청 실패: {e}")))?;
        let resp = Self::check_response(resp).await?;
        Self::parse_json(resp, "채널 생성").await
    }

    async fn list_channels(&self) -> Result<Vec<ChannelDescriptor>, CoreError> {
        let listing: EntityListing<ChannelDescriptor> =
            self.get_json_once(CHANNELS_PATH, "채널 목록").await?;
        debug!("채널 목록 조회: {}개", listing.entities.len());
        Ok(listing.entities)
    }

    async fn replace_subscriptions(
        &self,
        channel_id: &str,
        topics: &[Topic],
    ) -> Result<(), CoreError> {
        debug!("구독 교체: channel={channel_id}, {}개 토픽", topics.len());
        let path = format!("{CHANNELS_PATH}/{channel_id}/subscriptions");

        let resp = self
            .authorized_request(reqwest::Method::PUT, &path)
            .await?
            .json(topics)
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("구독 교체 요청 실패: {e}")))?;
        Self::check_response(resp).await?;
        Ok(())
    }
}

#[async_trait]
impl TimeSource for PlatformHttpClient {
    async fn server_time(&self) -> Result<DateTime<Utc>, CoreError> {
        let date: ServerDate = self.get_json_once("/api/v2/date", "서버 시각").await?;
        date.current_date
            .ok_or_else(|| CoreError::Internal("서버 시각 응답에 currentDate 없음".to_string()))
    }
}

#[async_trait]
impl PresenceDefinitionSource for PlatformHttpClient {
    async fn presence_definitions(
        &self,
        locale: &str,
        page_size: u32,
    ) -> Result<Vec<PresenceDefinition>, CoreError> {
        let path = format!(
            "/api/v2/presencedefinitions?pageNumber=1&pageSize={page_size}&deleted=false&localeCode={locale}"
        );
        let listing: EntityListing<PresenceDefinition> =
            self.get_json(&path, "프레즌스 정의").await?;
        debug!("프레즌스 정의 조회: {}개", listing.entities.len());
        Ok(listing.entities)
    }
}
