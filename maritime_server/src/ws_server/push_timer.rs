// maritime_server/src/ws_server/push_timer.rs

//! 会话持有的可取消定时器。
//!
//! 取消状态保存在 `watch` 通道中：取消是幂等的，任意数量的等待者都能观察到，
//! 并且 `Ticker::tick` 在到期后还会再检查一次取消状态，保证取消之后不会再有任何一次触发。

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// 周期推送定时器。克隆得到的句柄共享同一个取消状态。
#[derive(Debug, Clone)]
pub struct PushTimer {
    period: Duration,
    cancelled: Arc<watch::Sender<bool>>,
}

impl PushTimer {
    pub fn new(period: Duration) -> Self {
        let (cancelled, _) = watch::channel(false);
        Self {
            period,
            cancelled: Arc::new(cancelled),
        }
    }

    /// 取消定时器。只有真正把状态从"运行"改为"已取消"的那次调用返回 `true`，
    /// 重复取消不会出错。
    pub fn cancel(&self) -> bool {
        self.cancelled.send_if_modified(|cancelled| {
            if *cancelled {
                false
            } else {
                *cancelled = true;
                true
            }
        })
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// 等待直到定时器被取消。
    pub async fn cancelled(&self) {
        let mut rx = self.cancelled.subscribe();
        // 发送端由 self 持有，wait_for 只会在取消后返回
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// 启动周期计时。第一次触发在一个完整周期之后。
    pub fn ticker(&self) -> Ticker {
        let mut interval = interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Ticker {
            interval,
            cancelled: self.cancelled.subscribe(),
        }
    }
}

/// 由 [`PushTimer::ticker`] 创建的周期计时器。
#[derive(Debug)]
pub struct Ticker {
    interval: Interval,
    cancelled: watch::Receiver<bool>,
}

impl Ticker {
    /// 等待下一次触发。返回 `false` 表示定时器已取消，调用方应当结束循环。
    pub async fn tick(&mut self) -> bool {
        if *self.cancelled.borrow() {
            return false;
        }
        tokio::select! {
            biased;
            _ = self.cancelled.wait_for(|cancelled| *cancelled) => return false,
            _ = self.interval.tick() => {}
        }
        // 到期与取消可能发生在同一轮调度中，以取消为准
        !*self.cancelled.borrow()
    }
}
