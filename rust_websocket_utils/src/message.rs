// rust_websocket_utils/src/message.rs

//! 定义遥测推送使用的消息信封及其编解码。
//!
//! 线上格式固定为：
//!
//! ```json
//! { "type": "vessel_update", "data": [ ... ], "timestamp": "2024-05-01T08:30:00.123Z" }
//! ```
//!
//! 解码分两步：先解析外层对象并把 `type` 解析为 `TelemetryCategory`，
//! 再按该类别的结构反序列化 `data`。任何一步失败都只产生解析错误，由调用方记录后丢弃。

use chrono::{DateTime, Utc};
use common_models::ws_payloads::{
    Alert, AisVesselData, CraneMonitoringData, PortOperationMetrics, WeatherData,
};
use common_models::{timestamp, TelemetryCategory, TelemetryPayload};
use serde::{Deserialize, Serialize};

use crate::error::WsError;

/// 遥测消息信封：类别 + 载荷 + 生成时间。
///
/// 类别始终由载荷推导，字段不对外可写，因此不可能构造出类别与载荷错配的信封。
/// 信封创建后不再修改。
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    category: TelemetryCategory,
    payload: TelemetryPayload,
    generated_at: DateTime<Utc>,
}

impl Envelope {
    /// 用当前 UTC 时间（截断到毫秒）作为生成时间创建信封。
    pub fn new(payload: TelemetryPayload) -> Self {
        Self::with_timestamp(payload, timestamp::now_millis())
    }

    /// 使用指定的生成时间创建信封。
    pub fn with_timestamp(payload: TelemetryPayload, generated_at: DateTime<Utc>) -> Self {
        Self {
            category: payload.category(),
            payload,
            generated_at,
        }
    }

    pub fn category(&self) -> TelemetryCategory {
        self.category
    }

    pub fn payload(&self) -> &TelemetryPayload {
        &self.payload
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }
}

/// 编码时借用信封内容的线上结构。
#[derive(Serialize)]
struct WireEnvelopeRef<'a> {
    #[serde(rename = "type")]
    category: TelemetryCategory,
    data: &'a TelemetryPayload,
    #[serde(with = "common_models::timestamp")]
    timestamp: DateTime<Utc>,
}

/// 解码第一步使用的外层结构，`data` 暂存为未定型的 JSON 值。
#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(rename = "type")]
    category: String,
    data: serde_json::Value,
    #[serde(with = "common_models::timestamp")]
    timestamp: DateTime<Utc>,
}

/// 将信封编码为 JSON 文本。
///
/// 对本工作区内的载荷类型而言序列化不会失败；保留 `Result` 只为不在库代码中 panic。
pub fn encode(envelope: &Envelope) -> Result<String, WsError> {
    let wire = WireEnvelopeRef {
        category: envelope.category,
        data: &envelope.payload,
        timestamp: envelope.generated_at,
    };
    serde_json::to_string(&wire).map_err(|e| {
        WsError::SerializationError(format!(
            "编码 {} 信封失败: {}",
            envelope.category, e
        ))
    })
}

/// 将 JSON 文本解码为信封。
pub fn decode(text: &str) -> Result<Envelope, WsError> {
    let raw: RawEnvelope = serde_json::from_str(text)
        .map_err(|e| WsError::MalformedFrame(format!("{}, 原始文本长度: {} 字节", e, text.len())))?;

    let category: TelemetryCategory = raw
        .category
        .parse()
        .map_err(|_| WsError::UnknownCategory(raw.category.clone()))?;

    let payload = decode_payload(category, raw.data)?;
    Ok(Envelope {
        category,
        payload,
        generated_at: raw.timestamp,
    })
}

fn decode_payload(
    category: TelemetryCategory,
    data: serde_json::Value,
) -> Result<TelemetryPayload, WsError> {
    let mismatch = |e: serde_json::Error| WsError::PayloadMismatch {
        category,
        reason: e.to_string(),
    };
    let payload = match category {
        TelemetryCategory::VesselUpdate => TelemetryPayload::VesselUpdate(
            serde_json::from_value::<Vec<AisVesselData>>(data).map_err(mismatch)?,
        ),
        TelemetryCategory::PortMetrics => TelemetryPayload::PortMetrics(
            serde_json::from_value::<PortOperationMetrics>(data).map_err(mismatch)?,
        ),
        TelemetryCategory::EquipmentData => TelemetryPayload::EquipmentData(
            serde_json::from_value::<Vec<CraneMonitoringData>>(data).map_err(mismatch)?,
        ),
        TelemetryCategory::WeatherData => TelemetryPayload::WeatherData(
            serde_json::from_value::<WeatherData>(data).map_err(mismatch)?,
        ),
        TelemetryCategory::Alert => {
            TelemetryPayload::Alert(serde_json::from_value::<Alert>(data).map_err(mismatch)?)
        }
    };
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use common_models::enums::{AlertLevel, NavigationStatus, SpreaderStatus, VesselType};
    use common_models::ws_payloads::{
        Atmospheric, CraneLocation, CraneMaintenance, CraneOperational, CraneSensors,
        EquipmentAlert, GeoPosition, MarineConditions, Navigation, OceanData, VesselDimensions,
        VesselInfo, WeatherLocation,
    };

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap() + chrono::Duration::milliseconds(123)
    }

    fn vessel(mmsi: u32) -> AisVesselData {
        AisVesselData {
            mmsi,
            timestamp: fixed_time(),
            position: GeoPosition { longitude: 4.1250, latitude: 51.8985 },
            navigation: Navigation {
                course_over_ground: 271.3,
                speed_over_ground: 12.4,
                heading: 270,
                rate_of_turn: -12,
                navigation_status: NavigationStatus::UnderWay,
            },
            vessel_info: VesselInfo {
                imo: 9_321_483,
                name: "MSC OSCAR".to_string(),
                callsign: "ABC002".to_string(),
                vessel_type: VesselType::Cargo,
                dimensions: VesselDimensions { length: 395.4, width: 59.0, draft: 14.2 },
            },
            destination: "HAMBURG".to_string(),
            eta: "05-04 17:45".to_string(),
        }
    }

    fn port_metrics() -> PortOperationMetrics {
        PortOperationMetrics {
            timestamp: fixed_time(),
            terminal_id: "TERM-001".to_string(),
            vessel_productivity: 47.25,
            berth_utilization: 0.81,
            yard_utilization: 0.66,
            crane_utilization: 0.74,
            truck_turn_time: 31.0,
            gate_moves: 2412.5,
            dwell_time: 3.1,
            vessel_waiting_time: 2.2,
        }
    }

    fn crane(crane_id: &str, alerts: Vec<EquipmentAlert>) -> CraneMonitoringData {
        CraneMonitoringData {
            crane_id: crane_id.to_string(),
            timestamp: fixed_time(),
            location: CraneLocation { latitude: 51.8985, longitude: 4.1250, berth: "B03".to_string() },
            operational: CraneOperational {
                load_weight: 41.5,
                boom_angle: 32.0,
                hook_height: 27.5,
                trolley_position: 18.25,
                spreader_status: SpreaderStatus::Engaged,
            },
            sensors: CraneSensors {
                motor_temperature: 92.5,
                hydraulic_pressure: 205.0,
                vibration_level: 3.2,
                power_consumption: 610.0,
                wind_speed: 9.5,
            },
            maintenance: CraneMaintenance {
                operating_hours: 12_480.0,
                last_maintenance: fixed_time() - chrono::Duration::days(12),
                next_maintenance: fixed_time() + chrono::Duration::days(18),
                health_score: 0.64,
            },
            alerts,
        }
    }

    fn weather() -> WeatherData {
        WeatherData {
            location: WeatherLocation { latitude: 33.7362, longitude: -118.2632 },
            timestamp: fixed_time(),
            marine_conditions: MarineConditions {
                wave_height: 1.2,
                wave_direction: 240.0,
                wave_period: 8.5,
                swell_height: 0.9,
                swell_direction: 250.0,
                swell_period: 12.0,
                wind_wave_height: 0.4,
                wind_wave_direction: 200.0,
                wind_wave_period: 5.0,
            },
            ocean_data: OceanData {
                sea_surface_temperature: 18.4,
                sea_level_height: 0.12,
                ocean_current_velocity: 0.8,
                ocean_current_direction: 160.0,
            },
            atmospheric: Atmospheric {
                wind_speed: 7.5,
                wind_direction: 280.0,
                air_pressure: 1013.2,
                visibility: 9000.0,
                precipitation: 0.0,
            },
        }
    }

    #[test]
    fn test_encode_produces_type_data_timestamp_fields() {
        let envelope = Envelope::with_timestamp(TelemetryPayload::PortMetrics(port_metrics()), fixed_time());
        let text = encode(&envelope).expect("编码不应失败");
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["type"], "port_metrics");
        assert_eq!(value["data"]["terminalId"], "TERM-001");
        assert_eq!(value["timestamp"], "2024-05-01T08:30:00.123Z");
        assert_eq!(value.as_object().unwrap().len(), 3);
    }

    #[test]
    fn test_round_trip_preserves_category_payload_and_timestamp() {
        let payloads = vec![
            TelemetryPayload::VesselUpdate(vec![vessel(211_000_001), vessel(244_000_777)]),
            TelemetryPayload::PortMetrics(port_metrics()),
            TelemetryPayload::EquipmentData(vec![
                crane(
                    "QC-004",
                    vec![EquipmentAlert {
                        level: AlertLevel::Critical,
                        message: "Motor temperature exceeds threshold".to_string(),
                        threshold: 85.0,
                        current_value: 92.5,
                    }],
                ),
                crane("QC-005", Vec::new()),
            ]),
            TelemetryPayload::WeatherData(weather()),
            TelemetryPayload::Alert(Alert {
                id: "alert-001".to_string(),
                level: AlertLevel::Warning,
                title: "QC-004 健康度下降".to_string(),
                message: "Schedule maintenance soon".to_string(),
                timestamp: fixed_time(),
                acknowledged: false,
                source: "QC-004".to_string(),
            }),
        ];

        for payload in payloads {
            let category = payload.category();
            let envelope = Envelope::with_timestamp(payload.clone(), fixed_time());
            let decoded = decode(&encode(&envelope).unwrap()).expect("合法信封应能解码");

            assert_eq!(decoded.category(), category);
            assert_eq!(decoded.payload(), &payload);
            assert_eq!(decoded.generated_at(), fixed_time());
        }
    }

    #[test]
    fn test_decode_alert_with_free_form_id() {
        let text = r#"{
            "type": "alert",
            "data": {
                "id": "alert-001",
                "level": "critical",
                "title": "QC-002 需要立即维护",
                "message": "Health score 0.62 below critical threshold",
                "timestamp": "2024-05-01T08:30:00.123Z",
                "acknowledged": false,
                "source": "QC-002"
            },
            "timestamp": "2024-05-01T08:30:00.123Z"
        }"#;

        let envelope = decode(text).expect("非 UUID 形式的告警 ID 也应能解码");
        match envelope.payload() {
            TelemetryPayload::Alert(alert) => {
                assert_eq!(alert.id, "alert-001");
                assert_eq!(alert.level, AlertLevel::Critical);
                assert_eq!(alert.timestamp, fixed_time());
            }
            other => panic!("预期告警载荷，实际: {:?}", other),
        }
    }

    #[test]
    fn test_new_envelope_encodes_millisecond_timestamp() {
        let envelope = Envelope::new(TelemetryPayload::PortMetrics(port_metrics()));
        let value: serde_json::Value = serde_json::from_str(&encode(&envelope).unwrap()).unwrap();

        // 形如 2024-05-01T08:30:00.123Z，与浏览器 Date#toISOString 一致
        let stamp = value["timestamp"].as_str().unwrap();
        assert_eq!(stamp.len(), 24, "时间戳: {}", stamp);
        assert!(stamp.ends_with('Z'));
        assert_eq!(&stamp[19..20], ".");
        assert_eq!(value["data"]["timestamp"].as_str().unwrap().len(), 24);

        let decoded = decode(&encode(&envelope).unwrap()).unwrap();
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn test_decode_rejects_non_json_text() {
        let err = decode("not json at all").unwrap_err();
        assert!(matches!(err, WsError::MalformedFrame(_)), "实际错误: {:?}", err);
    }

    #[test]
    fn test_decode_rejects_missing_type_field() {
        let err = decode(r#"{"data": {}, "timestamp": "2024-05-01T08:30:00Z"}"#).unwrap_err();
        assert!(matches!(err, WsError::MalformedFrame(_)));
    }

    #[test]
    fn test_decode_rejects_unknown_category() {
        let err = decode(r#"{"type": "tide_table", "data": {}, "timestamp": "2024-05-01T08:30:00Z"}"#)
            .unwrap_err();
        match err {
            WsError::UnknownCategory(name) => assert_eq!(name, "tide_table"),
            other => panic!("预期 UnknownCategory，实际: {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_mismatched_payload_shape() {
        // 港口指标的载荷冒充船舶批量
        let metrics = serde_json::to_value(port_metrics()).unwrap();
        let text = serde_json::json!({
            "type": "vessel_update",
            "data": metrics,
            "timestamp": "2024-05-01T08:30:00Z",
        })
        .to_string();

        match decode(&text).unwrap_err() {
            WsError::PayloadMismatch { category, .. } => {
                assert_eq!(category, TelemetryCategory::VesselUpdate)
            }
            other => panic!("预期 PayloadMismatch，实际: {:?}", other),
        }
    }

    #[test]
    fn test_envelope_category_follows_payload() {
        let envelope = Envelope::new(TelemetryPayload::WeatherData(weather()));
        assert_eq!(envelope.category(), TelemetryCategory::WeatherData);
        assert!(envelope.generated_at() <= Utc::now());
    }
}
