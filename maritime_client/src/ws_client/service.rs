// maritime_client/src/ws_client/service.rs

//! 遥测客户端连接管理器。
//!
//! `MaritimeWsClient` 维护一条到分发服务的 WebSocket 连接：
//! 连接断开后按重连策略自动重连，收到的每一帧都经过信封解码，
//! 最近一条成功解码的信封可以随时读取，状态变化与消息通过广播通道通知使用方。
//! 任意时刻最多只有一条活动连接。

use futures_util::SinkExt;
use log::{debug, error, info, warn};
use rust_websocket_utils::client::transport::{self, ClientConnection, ClientWsReceiver, ClientWsSink};
use rust_websocket_utils::message::{decode, Envelope};
use rust_websocket_utils::WsError;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex as TokioMutex, RwLock};
use tokio::task::JoinHandle;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::event::{ClientEvent, ConnectionStatus};

/// 事件广播通道容量。落后太多的订阅者会收到 `Lagged`。
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// 客户端。克隆得到的句柄共享同一条连接和同一份状态。
#[derive(Clone)]
pub struct MaritimeWsClient {
    state: Arc<ClientState>,
}

/// 连接任务与外部调用共享的状态。
struct ClientState {
    config: ClientConfig,
    status: RwLock<ConnectionStatus>,
    last_message: RwLock<Option<Envelope>>,
    /// 当前连接的发送端。`None` 表示没有可用连接。
    ws_sink: TokioMutex<Option<ClientWsSink>>,
    /// 连接监督任务的句柄。
    supervisor: TokioMutex<Option<JoinHandle<()>>>,
    /// 显式断开后置位，监督任务不再发起新的连接。
    stop_requested: AtomicBool,
    open_attempts: AtomicU32,
    events: broadcast::Sender<ClientEvent>,
}

impl MaritimeWsClient {
    pub fn new(config: ClientConfig) -> Self {
        info!("[客户端] 正在初始化，目标地址: {}", config.url);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(ClientState {
                config,
                status: RwLock::new(ConnectionStatus::Connecting),
                last_message: RwLock::new(None),
                ws_sink: TokioMutex::new(None),
                supervisor: TokioMutex::new(None),
                stop_requested: AtomicBool::new(false),
                open_attempts: AtomicU32::new(0),
                events,
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.state.config
    }

    pub async fn status(&self) -> ConnectionStatus {
        *self.state.status.read().await
    }

    pub async fn is_connected(&self) -> bool {
        self.status().await == ConnectionStatus::Connected
    }

    /// 最近一条成功解码的信封。
    pub async fn last_message(&self) -> Option<Envelope> {
        self.state.last_message.read().await.clone()
    }

    /// 迄今为止发起的连接尝试次数。
    pub fn open_attempts(&self) -> u32 {
        self.state.open_attempts.load(Ordering::SeqCst)
    }

    /// 订阅客户端事件。只能收到订阅之后发生的事件。
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.state.events.subscribe()
    }

    /// 启动连接监督任务。
    ///
    /// 监督任务已在运行 (正在连接、已连接或等待重连) 时直接返回，不会建立第二条连接。
    ///
    /// # Errors
    /// 配置中的地址无效时返回 `ClientError::InvalidUrl`，此时不会发起任何连接。
    pub async fn connect(&self) -> Result<(), ClientError> {
        let url = self.state.config.validate()?;

        let mut supervisor_guard = self.state.supervisor.lock().await;
        if let Some(handle) = supervisor_guard.as_ref() {
            if !handle.is_finished() {
                debug!("[客户端] 连接任务已在运行，忽略重复的 connect 调用");
                return Ok(());
            }
        }

        self.state.stop_requested.store(false, Ordering::SeqCst);
        let state = Arc::clone(&self.state);
        *supervisor_guard = Some(tokio::spawn(run_supervisor(state, url.to_string())));
        info!("[客户端] 连接任务已启动: {}", url);
        Ok(())
    }

    /// 显式断开。取消尚未到期的重连，关闭当前连接，状态置为 `Disconnected`。
    ///
    /// 之后再次调用 [`connect`](Self::connect) 会重新开始连接周期。
    pub async fn disconnect(&self) {
        info!("[客户端] 收到断开请求");
        self.state.stop_requested.store(true, Ordering::SeqCst);

        let handle = self.state.supervisor.lock().await.take();
        if let Some(handle) = handle {
            handle.abort();
            match handle.await {
                Ok(()) => debug!("[客户端] 连接任务已结束"),
                Err(e) if e.is_cancelled() => debug!("[客户端] 连接任务已取消"),
                Err(e) => error!("[客户端] 等待连接任务结束时出错: {:?}", e),
            }
        }

        self.state.close_sink().await;
        self.state.set_status(ConnectionStatus::Disconnected).await;
    }

    /// 解码一条入站文本帧并分发。
    ///
    /// 成功时更新最近信封并广播 `MessageReceived`，返回 `true`；
    /// 失败时记录日志并广播 `ParseFailed`，连接状态不变，返回 `false`。
    pub async fn handle_inbound_text(&self, text: &str) -> bool {
        self.state.handle_inbound_text(text).await
    }

    /// 序列化并发送一条消息。
    ///
    /// 只有在 `Connected` 且连接可写时才会发送；否则静默丢弃并返回 `false`，从不返回错误。
    pub async fn send_message<T: Serialize>(&self, payload: &T) -> bool {
        if self.status().await != ConnectionStatus::Connected {
            debug!("[客户端] 当前未连接，丢弃出站消息");
            return false;
        }
        let text = match serde_json::to_string(payload) {
            Ok(text) => text,
            Err(e) => {
                warn!("[客户端] 出站消息序列化失败，丢弃: {}", e);
                return false;
            }
        };

        let mut sink_guard = self.state.ws_sink.lock().await;
        match sink_guard.as_mut() {
            Some(sink) => match transport::send_text(sink, text).await {
                Ok(()) => true,
                Err(e) => {
                    warn!("[客户端] 发送消息失败，丢弃: {}", e);
                    false
                }
            },
            None => {
                debug!("[客户端] 连接发送端不可用，丢弃出站消息");
                false
            }
        }
    }
}

impl ClientState {
    /// 更新状态；只有状态真正改变时才广播。
    async fn set_status(&self, status: ConnectionStatus) {
        let mut guard = self.status.write().await;
        if *guard == status {
            return;
        }
        debug!("[客户端] 状态变化: {} -> {}", *guard, status);
        *guard = status;
        drop(guard);
        self.emit(ClientEvent::StatusChanged(status));
    }

    fn emit(&self, event: ClientEvent) {
        // 没有订阅者时发送会失败，这是正常情况
        let _ = self.events.send(event);
    }

    async fn handle_inbound_text(&self, text: &str) -> bool {
        match decode(text) {
            Ok(envelope) => {
                debug!(
                    "[客户端] 收到 {} 信封 (记录数: {})",
                    envelope.category(),
                    envelope.payload().cardinality()
                );
                *self.last_message.write().await = Some(envelope.clone());
                self.emit(ClientEvent::MessageReceived(envelope));
                true
            }
            Err(e) => {
                self.report_parse_failure(&e);
                false
            }
        }
    }

    fn report_parse_failure(&self, e: &WsError) {
        warn!("[客户端] 入站帧解析失败，已丢弃: {}", e);
        self.emit(ClientEvent::ParseFailed(e.to_string()));
    }

    async fn close_sink(&self) {
        let sink = self.ws_sink.lock().await.take();
        if let Some(mut sink) = sink {
            if let Err(e) = sink.close().await {
                debug!("[客户端] 关闭发送端时出错 (连接可能已关闭): {}", e);
            }
        }
    }

    /// 连接建立后的接收循环，直到连接关闭或出现传输错误。
    async fn receive_loop(&self, ws_receiver: &mut ClientWsReceiver) {
        loop {
            match transport::receive_text(ws_receiver).await {
                Some(Ok(text)) => {
                    self.handle_inbound_text(&text).await;
                }
                Some(Err(e)) if e.is_parse_error() => self.report_parse_failure(&e),
                Some(Err(e)) => {
                    warn!("[客户端] 连接读取错误，连接将关闭: {}", e);
                    break;
                }
                None => {
                    info!("[客户端] 连接已被服务端关闭");
                    break;
                }
            }
        }
    }
}

/// 连接监督任务：连接 → 接收 → 断开 → 等待重连延迟 → 再次连接。
///
/// 连续失败达到策略上限，或收到显式断开请求后结束。
async fn run_supervisor(state: Arc<ClientState>, url: String) {
    let policy = state.config.reconnect.clone();
    let mut consecutive_failures: u32 = 0;

    loop {
        if state.stop_requested.load(Ordering::SeqCst) {
            break;
        }

        state.set_status(ConnectionStatus::Connecting).await;
        let attempt = state.open_attempts.fetch_add(1, Ordering::SeqCst) + 1;
        info!("[客户端] 第 {} 次连接尝试: {}", attempt, url);

        match transport::connect_client(&url).await {
            Ok(ClientConnection {
                ws_sender,
                mut ws_receiver,
            }) => {
                consecutive_failures = 0;
                *state.ws_sink.lock().await = Some(ws_sender);
                state.set_status(ConnectionStatus::Connected).await;
                info!("[客户端] 已连接到 {}", url);

                state.receive_loop(&mut ws_receiver).await;

                state.close_sink().await;
                state.set_status(ConnectionStatus::Disconnected).await;
            }
            Err(e) => {
                consecutive_failures += 1;
                warn!("[客户端] 连接失败 (连续 {} 次): {}", consecutive_failures, e);
                state.set_status(ConnectionStatus::Disconnected).await;
                if policy.is_exhausted(consecutive_failures) {
                    warn!(
                        "[客户端] 连续失败已达上限 {:?}，停止重连",
                        policy.max_attempts
                    );
                    break;
                }
            }
        }

        if state.stop_requested.load(Ordering::SeqCst) {
            break;
        }
        let delay = policy.delay_for(consecutive_failures);
        info!("[客户端] 将在 {:?} 后重连", delay);
        tokio::time::sleep(delay).await;
    }
    debug!("[客户端] 连接任务退出");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws_client::reconnect::ReconnectPolicy;
    use chrono::{TimeZone, Utc};
    use common_models::enums::AlertLevel;
    use common_models::ws_payloads::Alert;
    use common_models::TelemetryPayload;
    use rust_websocket_utils::message::encode;
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio::sync::broadcast::error::TryRecvError;

    fn alert_envelope() -> Envelope {
        let timestamp = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
        let alert = Alert {
            id: "6f1c2a0e-8d9b-4c3e-9a51-0f2b7d4e1a33".to_string(),
            level: AlertLevel::Warning,
            title: "设备维护提醒".to_string(),
            message: "QC-03 需要进行预防性维护".to_string(),
            timestamp,
            acknowledged: false,
            source: "QC-03".to_string(),
        };
        Envelope::with_timestamp(TelemetryPayload::Alert(alert), timestamp)
    }

    /// 返回一个当前没有任何进程监听的本地地址。
    async fn unreachable_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("ws://{}", addr)
    }

    async fn wait_until<F: Fn() -> bool>(condition: F) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("等待条件超时");
    }

    #[tokio::test]
    async fn test_initial_state() {
        let client = MaritimeWsClient::new(ClientConfig::default());
        assert_eq!(client.status().await, ConnectionStatus::Connecting);
        assert!(!client.is_connected().await);
        assert!(client.last_message().await.is_none());
        assert_eq!(client.open_attempts(), 0);
    }

    #[tokio::test]
    async fn test_malformed_frame_keeps_status_and_valid_frame_updates_last_message() {
        let _ = env_logger::builder().is_test(true).try_init();
        let client = MaritimeWsClient::new(ClientConfig::default());
        let mut events = client.subscribe();

        assert!(!client.handle_inbound_text("{oops").await);
        assert!(!client.handle_inbound_text(r#"{"type":"sonar_ping","data":{},"timestamp":"2024-05-01T08:30:00Z"}"#).await);
        assert_eq!(client.status().await, ConnectionStatus::Connecting);
        assert!(client.last_message().await.is_none());
        assert!(matches!(events.try_recv(), Ok(ClientEvent::ParseFailed(_))));
        assert!(matches!(events.try_recv(), Ok(ClientEvent::ParseFailed(_))));

        let envelope = alert_envelope();
        assert!(client.handle_inbound_text(&encode(&envelope).unwrap()).await);
        assert_eq!(client.last_message().await, Some(envelope.clone()));
        match events.try_recv() {
            Ok(ClientEvent::MessageReceived(received)) => assert_eq!(received, envelope),
            other => panic!("应收到 MessageReceived，实际: {:?}", other),
        }
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(client.status().await, ConnectionStatus::Connecting);
    }

    #[tokio::test]
    async fn test_send_message_is_dropped_when_not_connected() {
        let client = MaritimeWsClient::new(ClientConfig::default());
        assert!(!client.send_message(&serde_json::json!({"hello": "world"})).await);
        client.disconnect().await;
        assert!(!client.send_message(&"ping").await);
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_url() {
        let client = MaritimeWsClient::new(ClientConfig::with_url("http://localhost:8080"));
        assert!(matches!(client.connect().await, Err(ClientError::InvalidUrl(_))));
        assert_eq!(client.open_attempts(), 0);
    }

    #[tokio::test]
    async fn test_failed_open_goes_disconnected_and_retries() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut config = ClientConfig::with_url(unreachable_url().await);
        config.reconnect = ReconnectPolicy::fixed(Duration::from_millis(100));
        let client = MaritimeWsClient::new(config);
        let mut events = client.subscribe();

        client.connect().await.unwrap();
        // 重复调用不会启动第二个连接任务
        client.connect().await.unwrap();

        let first = tokio::time::timeout(Duration::from_secs(5), events.recv()).await.unwrap().unwrap();
        assert!(matches!(first, ClientEvent::StatusChanged(ConnectionStatus::Disconnected)));
        let second = tokio::time::timeout(Duration::from_secs(5), events.recv()).await.unwrap().unwrap();
        assert!(matches!(second, ClientEvent::StatusChanged(ConnectionStatus::Connecting)));

        let watched = client.clone();
        wait_until(move || watched.open_attempts() >= 3).await;
        client.disconnect().await;
        assert_eq!(client.status().await, ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_disconnect_cancels_pending_reconnect() {
        let mut config = ClientConfig::with_url(unreachable_url().await);
        config.reconnect = ReconnectPolicy::fixed(Duration::from_millis(500));
        let client = MaritimeWsClient::new(config);
        let mut events = client.subscribe();

        client.connect().await.unwrap();
        let first = tokio::time::timeout(Duration::from_secs(5), events.recv()).await.unwrap().unwrap();
        assert!(matches!(first, ClientEvent::StatusChanged(ConnectionStatus::Disconnected)));

        // 第一次失败之后、重连延迟到期之前断开
        client.disconnect().await;
        let attempts = client.open_attempts();
        assert_eq!(attempts, 1);

        tokio::time::sleep(Duration::from_millis(900)).await;
        assert_eq!(client.open_attempts(), attempts);
        assert_eq!(client.status().await, ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_supervisor_stops_after_max_attempts() {
        let mut config = ClientConfig::with_url(unreachable_url().await);
        config.reconnect = ReconnectPolicy::fixed(Duration::from_millis(50)).with_max_attempts(2);
        let client = MaritimeWsClient::new(config);

        client.connect().await.unwrap();
        let watched = client.clone();
        wait_until(move || watched.open_attempts() >= 2).await;

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(client.open_attempts(), 2);
        assert_eq!(client.status().await, ConnectionStatus::Disconnected);

        // 监督任务已结束，再次 connect 会开始新的周期
        client.connect().await.unwrap();
        let watched = client.clone();
        wait_until(move || watched.open_attempts() >= 3).await;
        client.disconnect().await;
    }
}
