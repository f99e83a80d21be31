// maritime_server/src/ws_server/service.rs

//! 遥测分发服务：监听连接，为每个连接建立会话并驱动其推送。

use crate::config::{AppConfig, PushConfig};
use crate::error::AppError;
use crate::producer::{ProducerFactory, SeedSource};
use crate::ws_server::client_session::{ClientSession, TeardownReason};
use crate::ws_server::connection_manager::ConnectionManager;
use crate::ws_server::push_loop::{run_push_loop, PushSettings};
use anyhow::Context;
use futures_util::stream::SplitStream;
use futures_util::{Sink, SinkExt, StreamExt};
use log::{debug, error, info, warn};
use rust_websocket_utils::server::transport::{ServerTransport, WsStream};
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::tungstenite::Error as TungsteniteError;

/// 写任务退出前等待 Close 帧写出的最长时间。对端停止读取时关闭握手可能永远不会完成。
const WRITER_CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// WebSocket 服务结构体，封装了配置、会话注册表和生产者工厂。
pub struct WsService {
    config: AppConfig,
    connection_manager: Arc<ConnectionManager>,
    producer_factory: ProducerFactory,
    seed_source: Arc<SeedSource>,
}

/// 每个连接处理任务需要的共享句柄。
#[derive(Clone)]
struct ConnectionContext {
    connection_manager: Arc<ConnectionManager>,
    producer_factory: ProducerFactory,
    seed_source: Arc<SeedSource>,
    push: PushConfig,
}

impl WsService {
    pub fn new(
        config: AppConfig,
        connection_manager: Arc<ConnectionManager>,
        producer_factory: ProducerFactory,
    ) -> Self {
        let seed_source = Arc::new(SeedSource::new(config.seed));
        info!("[WsService] 服务实例已创建，基准种子: {:?}", config.seed);
        Self {
            config,
            connection_manager,
            producer_factory,
            seed_source,
        }
    }

    /// 绑定配置中的监听地址。
    pub async fn bind(&self) -> Result<ServerTransport, AppError> {
        let listen_addr = self.config.websocket.listen_addr();
        let transport = ServerTransport::bind(&listen_addr).await?;
        Ok(transport)
    }

    /// 在已绑定的监听器上持续接受连接，直到所在任务被终止。
    pub async fn serve(&self, transport: ServerTransport) {
        info!(
            "[WsService] 开始在 {} 上分发遥测，推送间隔 {} ms",
            transport.local_addr(),
            self.config.push.interval_ms
        );
        let ctx = ConnectionContext {
            connection_manager: Arc::clone(&self.connection_manager),
            producer_factory: Arc::clone(&self.producer_factory),
            seed_source: Arc::clone(&self.seed_source),
            push: self.config.push.clone(),
        };

        transport
            .run(move |ws_stream: WsStream, peer_addr: SocketAddr| {
                let ctx = ctx.clone();
                async move { handle_connection(ws_stream, peer_addr, ctx).await }
            })
            .await;
    }

    /// 绑定并运行服务。只有绑定失败会返回错误。
    pub async fn start(&self) -> Result<(), anyhow::Error> {
        info!(
            "[WsService] 正在启动 WebSocket 服务: host={}, port={}",
            self.config.websocket.host, self.config.websocket.port
        );
        let transport = self
            .bind()
            .await
            .context("WebSocket 服务监听地址绑定失败")?;
        self.serve(transport).await;
        warn!("[WsService] 监听循环意外结束");
        Ok(())
    }
}

/// 处理单个连接的完整生命周期。
///
/// 写任务负责把出站队列写入套接字，推送任务负责生成数据，当前任务运行读循环。
/// 三者任何一方结束都会取消会话定时器，其余两方随之退出；
/// 随后等待两个任务结束，并且只从注册表中移除会话一次。
async fn handle_connection(ws_stream: WsStream, peer_addr: SocketAddr, ctx: ConnectionContext) {
    let (ws_sender, ws_receiver) = ws_stream.split();
    let (tx, rx) = mpsc::channel::<String>(ctx.push.outbound_queue);
    let session = ctx.connection_manager.add_client(peer_addr, tx, ctx.push.interval());

    let (seed, selection_rng) = ctx.seed_source.next_session_rngs();
    let producer = (ctx.producer_factory)(seed);
    debug!("[WsService] 会话 {}: 生产者种子 {}", session.client_id, seed);

    let writer_handle = tokio::spawn(run_writer(Arc::clone(&session), ws_sender, rx));
    let push_handle = tokio::spawn(run_push_loop(
        Arc::clone(&session),
        producer,
        selection_rng,
        PushSettings::from(&ctx.push),
    ));

    let reader_reason = run_reader(&session, ws_receiver).await;
    session.timer.cancel();

    let writer_reason = match writer_handle.await {
        Ok(reason) => reason,
        Err(e) => {
            error!("[WsService] 会话 {}: 写任务异常结束: {:?}", session.client_id, e);
            None
        }
    };
    let push_reason = match push_handle.await {
        Ok(reason) => reason,
        Err(e) => {
            error!("[WsService] 会话 {}: 推送任务异常结束: {:?}", session.client_id, e);
            TeardownReason::Cancelled
        }
    };

    let reason = resolve_teardown_reason(reader_reason, writer_reason, push_reason);
    ctx.connection_manager.remove_client(&session.client_id);
    info!(
        "[WsService] 会话 {} (addr={}) 已拆除，原因: {}",
        session.client_id, session.addr, reason
    );
}

/// 三方各自给出的结束原因中，最先发生的具体原因优先，`Cancelled` 只是连带结果。
fn resolve_teardown_reason(
    reader: TeardownReason,
    writer: Option<TeardownReason>,
    pusher: TeardownReason,
) -> TeardownReason {
    if reader != TeardownReason::Cancelled {
        return reader;
    }
    writer.unwrap_or(pusher)
}

/// 读循环。客户端发来的文本帧只记录、不处理。
async fn run_reader(session: &ClientSession, mut ws_receiver: SplitStream<WsStream>) -> TeardownReason {
    loop {
        let frame = tokio::select! {
            biased;
            _ = session.timer.cancelled() => return TeardownReason::Cancelled,
            frame = ws_receiver.next() => frame,
        };

        match frame {
            Some(Ok(Message::Text(text))) => {
                debug!(
                    "[WsService] 会话 {}: 收到客户端文本帧 ({} 字节)，忽略",
                    session.client_id,
                    text.len()
                );
            }
            Some(Ok(Message::Close(close_frame))) => {
                debug!("[WsService] 会话 {}: 收到 Close 帧: {:?}", session.client_id, close_frame);
                return TeardownReason::ClientClosed;
            }
            Some(Ok(_)) => continue,
            Some(Err(TungsteniteError::ConnectionClosed | TungsteniteError::AlreadyClosed)) | None => {
                return TeardownReason::ClientClosed;
            }
            Some(Err(e)) => {
                warn!("[WsService] 会话 {}: 连接读取错误: {}", session.client_id, e);
                return TeardownReason::TransportError;
            }
        }
    }
}

/// 写任务：把出站队列中的文本帧写入套接字。
///
/// 写入失败时取消会话定时器并返回 `SendFailed`；定时器被其他一方取消时尝试发送 Close 帧后退出，
/// 关闭最多等待 [`WRITER_CLOSE_TIMEOUT`]。
async fn run_writer<S>(
    session: Arc<ClientSession>,
    mut ws_sender: S,
    mut rx: mpsc::Receiver<String>,
) -> Option<TeardownReason>
where
    S: Sink<Message> + Unpin,
    S::Error: fmt::Display,
{
    loop {
        let text = tokio::select! {
            biased;
            _ = session.timer.cancelled() => break,
            next = rx.recv() => match next {
                Some(text) => text,
                None => break,
            },
        };

        let sent = tokio::select! {
            biased;
            _ = session.timer.cancelled() => break,
            sent = ws_sender.send(Message::Text(text)) => sent,
        };
        if let Err(e) = sent {
            warn!("[WsService] 会话 {}: 写入套接字失败，视为断开: {}", session.client_id, e);
            session.timer.cancel();
            return Some(TeardownReason::SendFailed);
        }
    }

    match timeout(WRITER_CLOSE_TIMEOUT, ws_sender.close()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            debug!("[WsService] 会话 {}: 关闭写端时出错 (连接可能已关闭): {}", session.client_id, e);
        }
        Err(_) => {
            warn!(
                "[WsService] 会话 {}: 关闭写端超过 {:?} 未完成，放弃等待",
                session.client_id, WRITER_CLOSE_TIMEOUT
            );
        }
    }
    None
}
