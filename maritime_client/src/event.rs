// maritime_client/src/event.rs

//! 客户端向使用方广播的状态与事件。
//!
//! 使用方通过 [`crate::ws_client::service::MaritimeWsClient::subscribe`] 获得一个
//! `broadcast::Receiver<ClientEvent>`，即可观察连接状态变化、收到的遥测信封以及解析失败。

use rust_websocket_utils::Envelope;
use serde::Serialize;
use std::fmt;

/// 连接状态。新建的客户端处于 `Connecting`。
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Disconnected => "disconnected",
        };
        f.write_str(text)
    }
}

/// 客户端广播的事件。
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// 连接状态发生了变化 (相同状态不会重复广播)。
    StatusChanged(ConnectionStatus),
    /// 收到并成功解码了一条遥测信封。
    MessageReceived(Envelope),
    /// 收到的帧无法解析；连接状态不受影响。内容为错误描述。
    ParseFailed(String),
}
