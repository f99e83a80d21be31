// maritime_server/src/ws_server/mod.rs

//! WebSocket 分发服务模块。

pub mod client_session;
pub mod connection_manager;
pub mod push_loop;
pub mod push_timer;
pub mod service;
