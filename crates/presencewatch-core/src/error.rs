//! presencewatch 핵심 에러 타입.
//!
//! REST/WebSocket 어댑터와 채널 관리자가 모두 이 타입으로 에러를 반환한다.

use thiserror::Error;

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 인증 실패 (토큰 없음, 만료, 401 응답)
    #[error("인증 에러: {0}")]
    Auth(String),

    /// 리소스를 찾을 수 없음
    #[error("{resource_type} 미발견: {id}")]
    NotFound {
        /// 리소스 종류 (예: "Channel")
        resource_type: String,
        /// 리소스 식별자
        id: String,
    },

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),

    /// 네트워크 에러 (연결 실패, 타임아웃)
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// Rate Limit 초과 (429)
    #[error("요청 한도 초과, {retry_after_secs}초 후 재시도")]
    RateLimit {
        /// 재시도 대기 시간 (초)
        retry_after_secs: u64,
    },

    /// 서비스 일시 불가 (503)
    #[error("서비스 일시 불가: {0}")]
    ServiceUnavailable(String),

    /// 알림 채널 생성 응답에 `id` 또는 `connectUri`가 없음
    #[error("채널 생성 실패: {0}")]
    ChannelCreation(String),

    /// 현재 채널 없이 구독 교체 시도
    #[error("활성 알림 채널 없음")]
    NoActiveChannel,

    /// 재생성할 채널에 연결할 옵저버가 등록되지 않음
    #[error("등록된 알림 옵저버 없음")]
    NoObserver,

    /// 전송 계층(WebSocket) 에러
    #[error("전송 에러: {0}")]
    Transport(String),
}

impl CoreError {
    /// 같은 요청을 다시 보내면 성공할 수 있는 에러인지
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CoreError::Network(_) | CoreError::ServiceUnavailable(_) | CoreError::RateLimit { .. }
        )
    }
}
