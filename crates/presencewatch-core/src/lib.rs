//! # presencewatch-core
//!
//! 실시간 상태 알림 클라이언트의 도메인 모델, 포트(trait), 에러 타입,
//! 표시 상태 판정 로직.
//!
//! ## 구조
//!
//! - [`models`] — 채널/토픽/메시지/프레즌스 데이터 구조체 (serde)
//! - [`ports`] — 플랫폼 API, 전송 계층, 옵저버 인터페이스 (async_trait)
//! - [`status`] — 프레즌스 라벨 + 부재 기간 판정 (순수 함수)
//! - [`error`] — 핵심 에러 타입 (thiserror)
//! - [`config`] — 설정 구조체
//! - [`config_manager`] — 설정 파일 관리 (로드/저장)

pub mod config;
pub mod config_manager;
pub mod error;
pub mod models;
pub mod ports;
pub mod status;
