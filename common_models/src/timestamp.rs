// common_models/src/timestamp.rs

//! 线上时间戳格式。
//!
//! 所有遥测时间戳都以毫秒精度的 RFC 3339 UTC 字符串传输，例如 `"2024-05-01T08:30:00.123Z"`，
//! 与现有前端读取的格式完全一致。配合 `#[serde(with = "common_models::timestamp")]` 使用。
//! 反序列化接受任意精度的 RFC 3339 字符串。

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// 截断到毫秒的当前 UTC 时间。生成数据时使用它，内存中的值与编码后再解码的值保持一致。
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    DateTime::<Utc>::deserialize(deserializer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde::Serialize;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Stamped {
        #[serde(with = "crate::timestamp")]
        at: DateTime<Utc>,
    }

    #[test]
    fn test_serializes_with_millisecond_precision() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap() + chrono::Duration::nanoseconds(123_456_789);
        let json = serde_json::to_string(&Stamped { at }).unwrap();
        assert_eq!(json, r#"{"at":"2024-05-01T08:30:00.123Z"}"#);

        let whole = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
        let json = serde_json::to_string(&Stamped { at: whole }).unwrap();
        assert_eq!(json, r#"{"at":"2024-05-01T08:30:00.000Z"}"#);
    }

    #[test]
    fn test_accepts_any_rfc3339_precision() {
        let parsed: Stamped = serde_json::from_str(r#"{"at":"2024-05-01T08:30:00Z"}"#).unwrap();
        assert_eq!(parsed.at, Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap());
        assert!(serde_json::from_str::<Stamped>(r#"{"at":"2024-05-01T08:30:00.123456789Z"}"#).is_ok());
    }

    #[test]
    fn test_now_millis_has_no_sub_millisecond_part() {
        let now = now_millis();
        assert_eq!(now.timestamp_subsec_nanos() % 1_000_000, 0);
        let json = serde_json::to_string(&Stamped { at: now }).unwrap();
        let round_trip: Stamped = serde_json::from_str(&json).unwrap();
        assert_eq!(round_trip.at, now);
    }
}
