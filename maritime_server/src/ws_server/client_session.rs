use chrono::{DateTime, Utc};
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::ws_server::push_timer::PushTimer;

/// 代表一个已连接客户端的推送会话。
///
/// 每个成功握手的 WebSocket 连接对应一个 `ClientSession`。会话之间不共享任何可变状态：
/// 各自持有出站队列的发送端和自己的推送定时器。
#[derive(Debug)]
pub struct ClientSession {
    /// 服务端在会话创建时生成的唯一标识 (UUID v4)。
    pub client_id: Uuid,

    /// 客户端的源网络地址。
    pub addr: SocketAddr,

    /// 会话创建时间 (UTC)。
    pub creation_time: DateTime<Utc>,

    /// 出站队列的发送端。写任务从队列另一端取出已编码的文本帧写入套接字；
    /// 发送失败说明写任务已经结束，即连接已不可用。
    pub sender: mpsc::Sender<String>,

    /// 会话的推送定时器。取消它就是拆除会话的信号，
    /// 推送任务、写任务和读循环都会因此退出。
    pub timer: PushTimer,
}

impl ClientSession {
    pub fn new(addr: SocketAddr, sender: mpsc::Sender<String>, push_interval: Duration) -> Self {
        Self {
            client_id: Uuid::new_v4(),
            addr,
            creation_time: Utc::now(),
            sender,
            timer: PushTimer::new(push_interval),
        }
    }
}

/// 会话结束的原因，在拆除时记录到日志。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownReason {
    /// 客户端发送了 Close 帧或连接流正常结束。
    ClientClosed,
    /// 读取连接时发生协议或 I/O 错误。
    TransportError,
    /// 推送消息时连接已不可用。
    SendFailed,
    /// 定时器被其他一方取消 (例如会话被移出注册表或服务关闭)。
    Cancelled,
}

impl fmt::Display for TeardownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TeardownReason::ClientClosed => "客户端关闭连接",
            TeardownReason::TransportError => "传输层错误",
            TeardownReason::SendFailed => "推送发送失败",
            TeardownReason::Cancelled => "定时器已取消",
        };
        f.write_str(text)
    }
}
