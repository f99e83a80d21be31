// rust_websocket_utils/src/server/mod.rs

//! WebSocket 服务端模块。
//!
//! `transport` 子模块负责绑定监听地址、接受 TCP 连接并完成 WebSocket 握手，
//! 然后把握手成功的流交给上层提供的回调。会话管理、推送节奏等业务逻辑不在本模块内。

pub mod transport;
