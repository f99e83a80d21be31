// maritime_client/src/error.rs

//! 客户端连接管理器的错误类型。

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// 配置中的服务端地址无法解析，或不是 `ws://` / `wss://`。
    #[error("无效的服务端地址: {0}")]
    InvalidUrl(String),

    /// 配置项取值无效。
    #[error("配置错误: {0}")]
    Config(String),
}
