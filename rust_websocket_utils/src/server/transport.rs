// rust_websocket_utils/src/server/transport.rs

//! 包含服务端 WebSocket 监听、接受连接和握手逻辑。

use crate::error::WsError;
use log::{debug, error, info};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{accept_async, WebSocketStream};

/// `WsStream` 是一个类型别名，代表经过 WebSocket 握手后的 TCP 流。
pub type WsStream = WebSocketStream<TcpStream>;

/// `ServerTransport` 持有已绑定的 TCP 监听器，负责接受连接并完成握手。
///
/// 绑定与运行被拆成两步：绑定失败可以在启动阶段立即报告，
/// 而 `local_addr` 能在监听端口为 0 时拿到系统实际分配的端口。
pub struct ServerTransport {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl ServerTransport {
    /// 绑定监听地址 (例如 `"0.0.0.0:8080"`)。
    ///
    /// # Errors
    /// 地址无法解析或端口被占用时返回 `WsError::Bind`。
    pub async fn bind(addr: &str) -> Result<Self, WsError> {
        let listener = TcpListener::bind(addr).await.map_err(|e| WsError::Bind {
            addr: addr.to_string(),
            source: e,
        })?;
        let local_addr = listener.local_addr()?;
        info!("[ServerTransport] WebSocket 服务器正在监听地址: {}", local_addr);
        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// 实际监听的地址。
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// 持续接受连接，直到所在任务被终止。
    ///
    /// 每个 TCP 连接在独立的 Tokio 任务中执行握手，握手成功后调用 `on_connect`。
    /// 单个连接的握手失败或 `accept` 失败只会被记录，不会影响监听循环。
    pub async fn run<F, Fut>(self, on_connect: F)
    where
        F: Fn(WsStream, SocketAddr) -> Fut + Send + Sync + Clone + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        loop {
            match self.listener.accept().await {
                Ok((tcp_stream, peer_addr)) => {
                    debug!("[ServerTransport] 从 {} 接受了新的 TCP 连接", peer_addr);
                    let on_connect_callback = on_connect.clone();

                    tokio::spawn(async move {
                        match accept_async(tcp_stream).await {
                            Ok(ws_stream) => {
                                info!("[ServerTransport] 与 {} 的 WebSocket 握手成功", peer_addr);
                                on_connect_callback(ws_stream, peer_addr).await;
                            }
                            Err(e) => {
                                error!("[ServerTransport] 与 {} 的 WebSocket 握手失败: {}", peer_addr, e);
                            }
                        }
                    });
                }
                Err(e) => {
                    error!("[ServerTransport] 接受 TCP 连接失败: {}。服务器将继续运行。", e);
                }
            }
        }
    }
}
