//! # presencewatch-network
//!
//! 알림 채널 수명주기와 재연결 감독, 플랫폼 REST / WebSocket 어댑터.
//!
//! ## 구성
//!
//! - [`session`] — 호출자용 진입점 (`NotificationSession`)
//! - [`supervisor`] — 전송 연결 상태 머신 + 고정 지연 복구
//! - [`channel_manager`] — 채널 생성, 구독 교체, 재생성 시 구독 재적용
//! - [`clock_offset`] — 서버 시계 보정값 측정
//! - [`presence`] — 프레즌스 정의 카탈로그 로드
//! - [`connectivity`] — 연결 상태 / 저하 모드 신호
//! - [`http_client`], [`ws_client`], [`auth`] — 어댑터
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use presencewatch_core::config::AppConfig;
//! use presencewatch_core::ports::observer::QueueObserver;
//! use presencewatch_network::auth::TokenManager;
//! use presencewatch_network::session::NotificationSession;
//!
//! let tokens = Arc::new(TokenManager::with_token(access_token));
//! let session = NotificationSession::connect(AppConfig::default(), tokens)?;
//! session.capture_offset().await;
//! session.refresh_presence_catalog().await;
//!
//! let (observer, mut events) = QueueObserver::channel();
//! session.create_notification_channel(Arc::new(observer)).await?;
//! session
//!     .subscribe_to_topics(["v2.users.A?presence&routingStatus"])
//!     .await?;
//! ```

pub mod auth;
pub mod channel_manager;
pub mod clock_offset;
pub mod connectivity;
pub mod http_client;
pub mod presence;
pub mod session;
pub mod supervisor;
pub mod ws_client;
