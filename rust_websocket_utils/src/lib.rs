//! `rust_websocket_utils` 是遥测分发链路共用的 WebSocket 工具库。
//!
//! 它封装了 `tokio-tungstenite` 的监听、握手与收发细节，并负责遥测信封的编解码，
//! 使服务端 (`maritime_server`) 与客户端 (`maritime_client`) 只需处理业务层面的 `Envelope`。
//!
//! 主要模块包括：
//! - `message`: 遥测信封 `Envelope` 以及 `encode`/`decode`。
//! - `error`: 库内统一使用的错误类型 `WsError`。
//! - `server`: 服务端传输层，负责绑定监听地址并为每个连接执行握手。
//! - `client`: 客户端传输层，负责建立连接并从连接中读取信封。

pub mod client;
pub mod error;
pub mod message;
pub mod server;

pub use error::WsError;
pub use message::{decode, encode, Envelope};
