// maritime_client/src/ws_client/reconnect.rs

//! 重连策略。
//!
//! 默认策略是固定 3000 ms 延迟、不限次数。指数退避按连续失败次数翻倍，直到 `max_delay`。
//! 连续失败计数在每次成功建立连接后清零。

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 默认重连延迟 (毫秒)
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 3000;

/// 延迟增长方式。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackoffStrategy {
    /// 每次都等待 `base_delay`。
    Fixed,
    /// 每多一次连续失败，延迟翻倍，最多到 `max_delay`。
    Exponential {
        #[serde(rename = "max_delay_ms", with = "duration_ms")]
        max_delay: Duration,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ReconnectPolicy {
    #[serde(rename = "base_delay_ms", with = "duration_ms")]
    pub base_delay: Duration,
    pub strategy: BackoffStrategy,
    /// 连续失败达到该次数后不再重连；`None` 表示不限。
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(DEFAULT_RECONNECT_DELAY_MS),
            strategy: BackoffStrategy::Fixed,
            max_attempts: None,
        }
    }
}

impl ReconnectPolicy {
    pub fn fixed(base_delay: Duration) -> Self {
        Self {
            base_delay,
            ..Self::default()
        }
    }

    pub fn exponential(base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            base_delay,
            strategy: BackoffStrategy::Exponential { max_delay },
            max_attempts: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// 在 `consecutive_failures` 次连续失败之后，下一次尝试前应等待的时间。
    ///
    /// 已建立的连接正常断开时计数为 0，此时总是等待 `base_delay`。
    pub fn delay_for(&self, consecutive_failures: u32) -> Duration {
        match &self.strategy {
            BackoffStrategy::Fixed => self.base_delay,
            BackoffStrategy::Exponential { max_delay } => {
                let factor = 1u32.checked_shl(consecutive_failures.saturating_sub(1)).unwrap_or(u32::MAX);
                self.base_delay
                    .checked_mul(factor)
                    .unwrap_or(*max_delay)
                    .min(*max_delay)
            }
        }
    }

    /// 连续失败次数是否已用尽。
    pub fn is_exhausted(&self, consecutive_failures: u32) -> bool {
        self.max_attempts
            .map_or(false, |max_attempts| consecutive_failures >= max_attempts)
    }
}

/// `Duration` 在配置文件中以毫秒整数表示。
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_fixed_three_seconds_unlimited() {
        let policy = ReconnectPolicy::default();
        for failures in [0, 1, 5, 100] {
            assert_eq!(policy.delay_for(failures), Duration::from_millis(3000));
            assert!(!policy.is_exhausted(failures));
        }
    }

    #[test]
    fn test_exponential_doubles_and_caps() {
        let policy = ReconnectPolicy::exponential(Duration::from_millis(500), Duration::from_millis(5000));
        assert_eq!(policy.delay_for(0), Duration::from_millis(500));
        assert_eq!(policy.delay_for(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for(2), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(4), Duration::from_millis(4000));
        assert_eq!(policy.delay_for(5), Duration::from_millis(5000));
        assert_eq!(policy.delay_for(64), Duration::from_millis(5000));
    }

    #[test]
    fn test_max_attempts() {
        let policy = ReconnectPolicy::fixed(Duration::from_millis(100)).with_max_attempts(3);
        assert!(!policy.is_exhausted(2));
        assert!(policy.is_exhausted(3));
    }

    #[test]
    fn test_policy_json_uses_milliseconds() {
        let policy: ReconnectPolicy = serde_json::from_str(
            r#"{"base_delay_ms": 250, "strategy": {"kind": "exponential", "max_delay_ms": 8000}}"#,
        )
        .unwrap();
        assert_eq!(policy, ReconnectPolicy::exponential(Duration::from_millis(250), Duration::from_millis(8000)));

        let json = serde_json::to_value(ReconnectPolicy::default()).unwrap();
        assert_eq!(json["base_delay_ms"], 3000);
        assert_eq!(json["strategy"]["kind"], "fixed");
    }
}
