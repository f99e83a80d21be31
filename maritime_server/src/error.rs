use rust_websocket_utils::error::WsError;
use thiserror::Error;

/// 服务端的主要错误类型
///
/// 运行期间只有监听地址绑定失败会向上传播并终止进程，
/// 其余错误 (单个会话的发送、协议错误等) 都在会话内部记录后处理掉。
#[derive(Error, Debug)]
pub enum AppError {
    #[error("WebSocket 服务错误: {0}")]
    WebSocketService(#[from] WsError),

    #[error("配置错误: {0}")]
    ConfigError(String),
}
