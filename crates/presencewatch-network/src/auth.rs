//! 액세스 토큰 보관.
//!
//! 인증 절차(implicit grant 등)는 호출자가 처리하고, 얻은 토큰만 여기에 넣는다.
//! REST 클라이언트는 요청마다 [`TokenManager::get_token`]으로 토큰을 꺼낸다.

use chrono::{DateTime, Duration, Utc};
use presencewatch_core::error::CoreError;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone)]
struct TokenState {
    access_token: String,
    expires_at: Option<DateTime<Utc>>,
}

/// 베어러 토큰 매니저
#[derive(Clone, Default)]
pub struct TokenManager {
    state: Arc<RwLock<Option<TokenState>>>,
}

impl TokenManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 이미 발급된 토큰으로 생성
    pub fn with_token(access_token: impl Into<String>) -> Self {
        Self {
            state: Arc::new(RwLock::new(Some(TokenState {
                access_token: access_token.into(),
                expires_at: None,
            }))),
        }
    }

    /// 토큰 설정 (`expires_in_secs`가 없으면 만료 없음으로 취급)
    pub async fn set_token(&self, access_token: impl Into<String>, expires_in_secs: Option<i64>) {
        let expires_at = expires_in_secs.map(|secs| Utc::now() + Duration::seconds(secs));
        *self.state.write().await = Some(TokenState {
            access_token: access_token.into(),
            expires_at,
        });
        debug!("액세스 토큰 설정, 만료: {expires_at:?}");
    }

    /// 유효한 액세스 토큰
    pub async fn get_token(&self) -> Result<String, CoreError> {
        let state = self.state.read().await;
        match &*state {
            Some(s) if s.expires_at.is_some_and(|at| Utc::now() >= at) => {
                Err(CoreError::Auth("토큰 만료".to_string()))
            }
            Some(s) => Ok(s.access_token.clone()),
            None => Err(CoreError::Auth("인증되지 않음".to_string())),
        }
    }

    /// 토큰 폐기
    pub async fn clear(&self) {
        *self.state.write().await = None;
        debug!("액세스 토큰 폐기");
    }

    /// 현재 인증 상태
    pub async fn is_authenticated(&self) -> bool {
        self.get_token().await.is_ok()
    }
}
