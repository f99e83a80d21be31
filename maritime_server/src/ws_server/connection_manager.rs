use dashmap::DashMap;
use log::{debug, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::ws_server::client_session::ClientSession;

/// 管理所有活动的推送会话
///
/// 注册表是服务端唯一的共享状态：连接建立时加入，连接拆除时移除。
/// `DashMap` 保证多线程运行时下的增删互不干扰。
#[derive(Debug, Clone, Default)]
pub struct ConnectionManager {
    /// Key: client_id (Uuid)；Value: 会话
    clients: Arc<DashMap<Uuid, Arc<ClientSession>>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为新连接创建会话并加入注册表。
    ///
    /// # Arguments
    /// * `addr` - 新连接客户端的 SocketAddr。
    /// * `sender` - 该会话出站队列的发送端。
    /// * `push_interval` - 会话定时器的周期。
    pub fn add_client(
        &self,
        addr: SocketAddr,
        sender: mpsc::Sender<String>,
        push_interval: Duration,
    ) -> Arc<ClientSession> {
        let client_session = Arc::new(ClientSession::new(addr, sender, push_interval));
        self.clients.insert(client_session.client_id, Arc::clone(&client_session));

        info!(
            "[连接管理器] 新客户端会话: id={}, addr={}",
            client_session.client_id, client_session.addr
        );
        debug!("[连接管理器] 当前活动会话总数: {}", self.clients.len());
        client_session
    }

    /// 根据 client_id 获取会话。
    pub fn get_client(&self, client_id: &Uuid) -> Option<Arc<ClientSession>> {
        self.clients.get(client_id).map(|entry| Arc::clone(entry.value()))
    }

    /// 从注册表移除会话并取消其定时器。
    ///
    /// 重复移除同一会话是无害的：第二次调用返回 `None`。
    pub fn remove_client(&self, client_id: &Uuid) -> Option<Arc<ClientSession>> {
        match self.clients.remove(client_id) {
            Some((_id, session)) => {
                session.timer.cancel();
                let alive = chrono::Utc::now() - session.creation_time;
                info!(
                    "[连接管理器] 会话已移除: id={}, addr={}, 存活 {} 秒",
                    session.client_id,
                    session.addr,
                    alive.num_seconds()
                );
                debug!("[连接管理器] 移除后当前活动会话总数: {}", self.clients.len());
                Some(session)
            }
            None => {
                warn!("[连接管理器] 尝试移除不存在的会话: id={}", client_id);
                None
            }
        }
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// 返回所有活动会话的快照。
    pub fn get_all_client_sessions(&self) -> Vec<Arc<ClientSession>> {
        self.clients.iter().map(|entry| Arc::clone(entry.value())).collect()
    }

    /// 取消所有会话的定时器，用于服务关闭。各会话随后自行完成拆除并移出注册表。
    pub fn cancel_all(&self) -> usize {
        let sessions = self.get_all_client_sessions();
        let cancelled = sessions.iter().filter(|session| session.timer.cancel()).count();
        info!("[连接管理器] 已取消 {} 个会话的推送定时器", cancelled);
        cancelled
    }
}
