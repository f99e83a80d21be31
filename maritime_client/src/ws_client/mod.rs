// maritime_client/src/ws_client/mod.rs

//! 遥测客户端的 WebSocket 连接管理。
//!
//! - `service`: `MaritimeWsClient`，负责连接、接收解码、断线重连和出站发送。
//! - `reconnect`: 重连延迟与次数策略。

pub mod reconnect;
pub mod service;

pub use reconnect::{BackoffStrategy, ReconnectPolicy};
pub use service::MaritimeWsClient;
