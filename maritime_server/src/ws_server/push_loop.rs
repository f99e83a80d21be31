// maritime_server/src/ws_server/push_loop.rs

//! 单个会话的推送循环：连接建立时的首次全量推送，以及随后的定时随机推送。

use common_models::TelemetryCategory;
use log::{debug, error, info, warn};
use rand::Rng;
use rust_websocket_utils::message::{encode, Envelope};
use std::sync::Arc;
use std::time::Duration;

use crate::config::PushConfig;
use crate::producer::{pick_periodic_category, TelemetryProducer};
use crate::ws_server::client_session::{ClientSession, TeardownReason};

/// 推送循环使用的参数。
#[derive(Debug, Clone, PartialEq)]
pub struct PushSettings {
    pub interval: Duration,
    pub initial_vessel_count: usize,
    pub periodic_vessel_count: usize,
    pub periodic_equipment_count: usize,
}

impl PushSettings {
    /// 定时推送时某个类别的批量大小；快照类别返回 1。
    pub fn periodic_cardinality(&self, category: TelemetryCategory) -> usize {
        match category {
            TelemetryCategory::VesselUpdate => self.periodic_vessel_count,
            TelemetryCategory::EquipmentData => self.periodic_equipment_count,
            _ => 1,
        }
    }
}

impl From<&PushConfig> for PushSettings {
    fn from(config: &PushConfig) -> Self {
        Self {
            interval: config.interval(),
            initial_vessel_count: config.initial_vessel_count,
            periodic_vessel_count: config.periodic_vessel_count,
            periodic_equipment_count: config.periodic_equipment_count,
        }
    }
}

/// 运行会话的推送循环，直到定时器被取消或出站队列关闭。
///
/// 首次推送 (`initial_vessel_count` 条船舶) 先进入队列，之后才启动定时器。
/// 推送失败时本函数负责取消定时器，调用方据此拆除整个会话。
pub async fn run_push_loop<P, R>(
    session: Arc<ClientSession>,
    mut producer: P,
    mut rng: R,
    settings: PushSettings,
) -> TeardownReason
where
    P: TelemetryProducer,
    R: Rng + Send,
{
    let initial = producer.produce(TelemetryCategory::VesselUpdate, settings.initial_vessel_count);
    if let Err(reason) = push(&session, Envelope::new(initial)).await {
        return reason;
    }
    info!(
        "[推送循环] 会话 {}: 首次推送已入队 ({} 条船舶)，定时推送间隔 {:?}",
        session.client_id, settings.initial_vessel_count, settings.interval
    );

    let mut ticker = session.timer.ticker();
    while ticker.tick().await {
        let category = pick_periodic_category(&mut rng);
        let payload = producer.produce(category, settings.periodic_cardinality(category));
        if let Err(reason) = push(&session, Envelope::new(payload)).await {
            return reason;
        }
    }
    debug!("[推送循环] 会话 {}: 定时器已取消，推送循环结束", session.client_id);
    TeardownReason::Cancelled
}

/// 编码并把一条信封放入出站队列。
///
/// 编码失败只记录并丢弃这一条；队列已关闭则取消定时器并返回 `SendFailed`。
/// 队列满时等待，但定时器一旦被取消立即放弃。
async fn push(session: &ClientSession, envelope: Envelope) -> Result<(), TeardownReason> {
    let category = envelope.category();
    let text = match encode(&envelope) {
        Ok(text) => text,
        Err(e) => {
            error!("[推送循环] 会话 {}: 编码 {} 信封失败，丢弃: {}", session.client_id, category, e);
            return Ok(());
        }
    };

    tokio::select! {
        biased;
        _ = session.timer.cancelled() => Err(TeardownReason::Cancelled),
        sent = session.sender.send(text) => match sent {
            Ok(()) => {
                debug!(
                    "[推送循环] 会话 {}: 已入队 {} (记录数: {})",
                    session.client_id,
                    category,
                    envelope.payload().cardinality()
                );
                Ok(())
            }
            Err(_) => {
                warn!("[推送循环] 会话 {}: 出站队列已关闭，停止推送", session.client_id);
                session.timer.cancel();
                Err(TeardownReason::SendFailed)
            }
        },
    }
}
