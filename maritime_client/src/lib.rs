//! `maritime_client` 海事遥测客户端库。
//!
//! 提供到遥测分发服务的 WebSocket 连接管理器 [`MaritimeWsClient`]：
//! 维护连接状态、自动重连、缓存最近一条遥测信封，并通过广播通道发布事件。

pub mod config;
pub mod error;
pub mod event;
pub mod ws_client;

pub use config::ClientConfig;
pub use error::ClientError;
pub use event::{ClientEvent, ConnectionStatus};
pub use ws_client::{MaritimeWsClient, ReconnectPolicy};
