//! 포트 인터페이스 (trait).
//!
//! `presencewatch-network`의 어댑터가 이 trait들을 구현하고,
//! 채널 관리자/연결 감독자는 `Arc<dyn T>`로만 의존한다.
//! 테스트에서는 메모리 구현으로 교체한다.

pub mod observer;
pub mod platform;
pub mod transport;
