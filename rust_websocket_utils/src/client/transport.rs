// rust_websocket_utils/src/client/transport.rs

//! 客户端 WebSocket 传输层。
//!
//! 提供建立连接、发送文本帧以及从接收端读取文本或遥测信封的函数。
//! 控制帧 (Ping/Pong/Frame) 在这里被跳过，调用方只会看到业务数据、错误或连接结束。

use crate::error::WsError;
use crate::message::{decode, Envelope};
use futures_util::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use log::{debug, error, info};
use tokio_tungstenite::{
    connect_async,
    tungstenite::protocol::Message,
    tungstenite::Error as TungsteniteError,
    WebSocketStream,
};
use url::Url;

/// 客户端连接成功后得到的流类型 (可能经过 TLS)。
pub type ClientWsStream = WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// 客户端连接的发送端。
pub type ClientWsSink = SplitSink<ClientWsStream, Message>;

/// 客户端连接的接收端。
pub type ClientWsReceiver = SplitStream<ClientWsStream>;

/// 一个活动的客户端 WebSocket 连接，已拆分为发送端和接收端。
pub struct ClientConnection {
    pub ws_sender: ClientWsSink,
    pub ws_receiver: ClientWsReceiver,
}

/// 通过发送端写出一个文本帧。
pub async fn send_text(ws_sender: &mut ClientWsSink, text: String) -> Result<(), WsError> {
    debug!("客户端：准备发送文本帧，长度: {} 字节", text.len());
    ws_sender.send(Message::Text(text)).await?;
    Ok(())
}

/// 连接到指定的 WebSocket 服务器 (例如 `"ws://localhost:8080"`)。
///
/// # Errors
/// URL 无法解析时返回 `WsError::InvalidUrl`；TCP 连接或握手失败时返回 `WsError::WebSocketProtocolError`。
pub async fn connect_client(url_str: &str) -> Result<ClientConnection, WsError> {
    debug!("客户端：开始尝试连接到 WebSocket 服务器，URL: {}", url_str);
    let parsed_url = Url::parse(url_str)
        .map_err(|e| WsError::InvalidUrl(format!("无效的 WebSocket URL '{}': {}", url_str, e)))?;

    match connect_async(parsed_url.as_str()).await {
        Ok((ws_stream, response)) => {
            info!("客户端：已成功连接到 {} (HTTP 状态码: {})", url_str, response.status());
            let (ws_sender, ws_receiver) = ws_stream.split();
            Ok(ClientConnection {
                ws_sender,
                ws_receiver,
            })
        }
        Err(e) => {
            debug!("客户端：连接到 {} 失败，错误: {}", url_str, e);
            Err(WsError::WebSocketProtocolError(e))
        }
    }
}

/// 读取下一条文本帧。
///
/// * `Some(Ok(text))`：收到文本帧。
/// * `Some(Err(e))`：收到二进制帧 (`MalformedFrame`，可丢弃) 或底层协议错误。
/// * `None`：连接已关闭。
pub async fn receive_text(ws_receiver: &mut ClientWsReceiver) -> Option<Result<String, WsError>> {
    loop {
        match ws_receiver.next().await {
            Some(Ok(Message::Text(text))) => break Some(Ok(text)),
            Some(Ok(Message::Binary(bin))) => {
                break Some(Err(WsError::MalformedFrame(format!(
                    "收到非预期的二进制帧，长度: {} 字节",
                    bin.len()
                ))));
            }
            Some(Ok(Message::Close(close_frame))) => {
                debug!("客户端：收到 Close 控制帧: {:?}", close_frame);
                break None;
            }
            Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => continue,
            Some(Err(TungsteniteError::ConnectionClosed | TungsteniteError::AlreadyClosed)) => {
                debug!("客户端：连接已关闭");
                break None;
            }
            Some(Err(e)) => {
                error!("客户端：从 WebSocket 流接收消息时发生底层错误: {}", e);
                break Some(Err(WsError::WebSocketProtocolError(e)));
            }
            None => {
                debug!("客户端：WebSocket 接收流已结束");
                break None;
            }
        }
    }
}

/// 读取并解码下一条遥测信封。
///
/// 返回 `Some(Err(e))` 且 `e.is_parse_error()` 为真时，表示该帧无法解析，连接仍然可用。
pub async fn receive_message(ws_receiver: &mut ClientWsReceiver) -> Option<Result<Envelope, WsError>> {
    match receive_text(ws_receiver).await? {
        Ok(text) => Some(decode(&text)),
        Err(e) => Some(Err(e)),
    }
}
