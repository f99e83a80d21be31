// rust_websocket_utils/src/client/mod.rs

//! WebSocket 客户端模块。
//!
//! `transport` 子模块提供建立连接、发送文本帧以及读取遥测信封的基础函数。
//! 重连与状态管理由上层 (`maritime_client`) 负责。

pub mod transport;
