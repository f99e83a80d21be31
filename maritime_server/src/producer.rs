// maritime_server/src/producer.rs

//! 遥测数据生产者接口、按会话创建生产者的工厂以及定时推送的类别抽样。

use common_models::{TelemetryCategory, TelemetryPayload};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::data_generator::MaritimeDataGenerator;

/// 遥测数据生产者。
///
/// 对五个类别都能给出载荷；`cardinality` 只对批量类别 (船舶、岸桥) 生效，
/// 快照类别忽略该参数。实现不得阻塞，也不得触碰分发层的状态。
pub trait TelemetryProducer: Send {
    fn produce(&mut self, category: TelemetryCategory, cardinality: usize) -> TelemetryPayload;
}

impl<P: TelemetryProducer + ?Sized> TelemetryProducer for Box<P> {
    fn produce(&mut self, category: TelemetryCategory, cardinality: usize) -> TelemetryPayload {
        (**self).produce(category, cardinality)
    }
}

/// 按种子为每个会话创建独立的生产者。
pub type ProducerFactory = Arc<dyn Fn(u64) -> Box<dyn TelemetryProducer> + Send + Sync>;

/// 默认工厂：每个会话一个以该会话种子初始化的 `MaritimeDataGenerator`。
pub fn maritime_producer_factory() -> ProducerFactory {
    Arc::new(|seed| Box::new(MaritimeDataGenerator::with_seed(seed)) as Box<dyn TelemetryProducer>)
}

/// 为会话分配随机种子。
///
/// 配置了基准种子时按 `base, base+1, ...` 依次分配，整个进程的数据可复现；
/// 否则每次都取自系统熵源。
#[derive(Debug)]
pub struct SeedSource {
    next: Option<AtomicU64>,
}

impl SeedSource {
    pub fn new(base_seed: Option<u64>) -> Self {
        Self {
            next: base_seed.map(AtomicU64::new),
        }
    }

    pub fn next_seed(&self) -> u64 {
        match &self.next {
            Some(counter) => counter.fetch_add(1, Ordering::Relaxed),
            None => rand::random(),
        }
    }

    /// 同时返回生产者种子和类别抽样用的随机源，两者互不相关。
    pub fn next_session_rngs(&self) -> (u64, StdRng) {
        let seed = self.next_seed();
        // 抽样随机源与生产者种子错开，避免两条序列相同
        let selection_rng = StdRng::seed_from_u64(seed ^ 0x9E37_79B9_7F4A_7C15);
        (seed, selection_rng)
    }
}

/// 在四个定时推送类别中均匀抽取一个。
pub fn pick_periodic_category<R: Rng + ?Sized>(rng: &mut R) -> TelemetryCategory {
    let periodic = &TelemetryCategory::PERIODIC;
    periodic[rng.gen_range(0..periodic.len())]
}
