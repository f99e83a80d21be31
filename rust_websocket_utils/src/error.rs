// rust_websocket_utils/src/error.rs

//! 定义 WebSocket 工具库相关的错误类型。

use common_models::TelemetryCategory;
use thiserror::Error;

/// WebSocket 工具库的统一错误类型。
///
/// 其中 `MalformedFrame`、`UnknownCategory`、`PayloadMismatch` 三类统称为"解析错误"：
/// 接收方只需记录并丢弃该帧，连接本身不受影响。
/// 参见 [`WsError::is_parse_error`]。
#[derive(Error, Debug)]
pub enum WsError {
    /// 当信封序列化失败时返回。
    #[error("序列化错误: {0}")]
    SerializationError(String),

    /// 收到的文本不是结构良好的 JSON，或缺少 `type`/`data`/`timestamp` 字段。
    #[error("消息帧格式错误: {0}")]
    MalformedFrame(String),

    /// `type` 字段不是已知的遥测类别。
    #[error("未知的消息类别: '{0}'")]
    UnknownCategory(String),

    /// `data` 字段的结构与 `type` 声明的类别不匹配。
    #[error("类别 {category} 的载荷结构不匹配: {reason}")]
    PayloadMismatch {
        category: TelemetryCategory,
        reason: String,
    },

    /// WebSocket 协议相关的错误。
    #[error("WebSocket协议错误: {0}")]
    WebSocketProtocolError(#[from] tokio_tungstenite::tungstenite::Error),

    /// 监听地址绑定失败。这是服务端唯一会导致进程退出的错误。
    #[error("监听地址 {addr} 绑定失败: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// 底层 I/O 错误。
    #[error("I/O错误: {0}")]
    IoError(#[from] std::io::Error),

    /// 无效的 URL 格式。
    #[error("无效的URL: {0}")]
    InvalidUrl(String),
}

impl WsError {
    /// 是否为可恢复的入站解析错误 (丢弃该帧即可，不影响连接)。
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            WsError::MalformedFrame(_) | WsError::UnknownCategory(_) | WsError::PayloadMismatch { .. }
        )
    }
}
