//! 도메인 모델.
//!
//! 알림 채널, 토픽, 메시지, 프레즌스 데이터 구조체.

pub mod channel;
pub mod notification;
pub mod presence;
