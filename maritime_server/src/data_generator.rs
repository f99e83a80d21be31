// maritime_server/src/data_generator.rs

//! 模拟海事遥测数据生成器。
//!
//! 以五个参考港口为基准伪造船舶 AIS、港口作业指标、岸桥设备监测与海洋气象数据，
//! 取值范围对齐现有看板所期望的量级。随机源是显式持有的 `StdRng`，
//! 固定种子即可复现完全相同的数据序列。

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use common_models::timestamp::now_millis;
use common_models::enums::{AlertLevel, NavigationStatus, SpreaderStatus, VesselType};
use common_models::ws_payloads::{
    Alert, AisVesselData, Atmospheric, CraneLocation, CraneMaintenance, CraneMonitoringData,
    CraneOperational, CraneSensors, EquipmentAlert, GeoPosition, MarineConditions, Navigation,
    OceanData, PortOperationMetrics, VesselDimensions, VesselInfo, WeatherData, WeatherLocation,
};
use common_models::{TelemetryCategory, TelemetryPayload};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use crate::producer::TelemetryProducer;

/// 参考港口：名称 (同时作为目的港代码)、纬度、经度。
const PORTS: [(&str, f64, f64); 5] = [
    ("LOS_ANGELES", 33.7362, -118.2632),
    ("SINGAPORE", 1.2897, 103.8517),
    ("HAMBURG", 53.5511, 9.9937),
    ("ROTTERDAM", 51.8985, 4.1250),
    ("SHANGHAI", 31.2304, 121.4737),
];

const VESSEL_NAMES: [&str; 10] = [
    "MAERSK EDINBURGH",
    "EVER GIVEN",
    "MSC OSCAR",
    "OOCL HONG KONG",
    "COSCO SHIPPING UNIVERSE",
    "MADRID MAERSK",
    "HAPAG EXPRESS",
    "CMA CGM MARCO POLO",
    "ATLANTIC SAIL",
    "PACIFIC PIONEER",
];

/// 码头编号与岸桥、气象站所在位置 (洛杉矶港)。
const TERMINAL_ID: &str = "TERM-001";
const TERMINAL_LAT: f64 = 33.7362;
const TERMINAL_LON: f64 = -118.2632;

/// 健康评分低于该值产生 critical 告警。
const CRITICAL_HEALTH: f64 = 0.7;
/// 健康评分低于该值 (且不低于 critical 阈值) 产生 warning 告警。
const WARNING_HEALTH: f64 = 0.85;

/// 基于 `StdRng` 的遥测数据生成器。
#[derive(Debug)]
pub struct MaritimeDataGenerator {
    rng: StdRng,
}

impl MaritimeDataGenerator {
    /// 使用固定种子创建生成器，相同种子产生相同序列。
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// 生成 `count` 条船舶 AIS 记录。第 `i` 艘船围绕第 `i % 5` 个参考港口分布。
    pub fn generate_ais_data(&mut self, count: usize) -> Vec<AisVesselData> {
        (0..count).map(|i| self.vessel(i)).collect()
    }

    fn vessel(&mut self, index: usize) -> AisVesselData {
        let (_, port_lat, port_lon) = PORTS[index % PORTS.len()];
        let now = now_millis();
        let rng = &mut self.rng;

        let position = GeoPosition {
            longitude: port_lon + rng.gen_range(-0.1..0.1),
            latitude: port_lat + rng.gen_range(-0.1..0.1),
        };
        let navigation = Navigation {
            course_over_ground: rng.gen_range(0.0..360.0),
            speed_over_ground: rng.gen_range(0.0..25.0),
            heading: rng.gen_range(0..360),
            rate_of_turn: rng.gen_range(-128..127),
            navigation_status: NavigationStatus::ALL[rng.gen_range(0..NavigationStatus::ALL.len())],
        };
        let vessel_info = VesselInfo {
            imo: 9_000_000 + rng.gen_range(0..999_999),
            name: VESSEL_NAMES[index % VESSEL_NAMES.len()].to_string(),
            callsign: format!("ABC{:03}", index),
            vessel_type: VesselType::ALL[rng.gen_range(0..VesselType::ALL.len())],
            dimensions: VesselDimensions {
                length: rng.gen_range(150.0..400.0),
                width: rng.gen_range(20.0..50.0),
                draft: rng.gen_range(5.0..15.0),
            },
        };
        let destination = PORTS.choose(rng).map_or(PORTS[0].0, |port| port.0).to_string();
        // 一周之内的任意时刻
        let eta_offset = ChronoDuration::seconds(rng.gen_range(0..7 * 24 * 3600));

        AisVesselData {
            mmsi: 200_000_000 + rng.gen_range(0..99_999_999),
            timestamp: now,
            position,
            navigation,
            vessel_info,
            destination,
            eta: (now + eta_offset).format("%m-%d %H:%M").to_string(),
        }
    }

    /// 生成一份港口作业指标快照。
    pub fn generate_port_metrics(&mut self) -> PortOperationMetrics {
        let rng = &mut self.rng;
        PortOperationMetrics {
            timestamp: now_millis(),
            terminal_id: TERMINAL_ID.to_string(),
            vessel_productivity: rng.gen_range(40.0..60.0),
            berth_utilization: rng.gen_range(0.7..0.9),
            yard_utilization: rng.gen_range(0.6..0.8),
            crane_utilization: rng.gen_range(0.7..0.9),
            truck_turn_time: rng.gen_range(20.0..45.0),
            gate_moves: rng.gen_range(2000.0..3000.0),
            dwell_time: rng.gen_range(2.0..5.0),
            vessel_waiting_time: rng.gen_range(1.0..4.0),
        }
    }

    /// 生成 `count` 台岸桥的监测数据，编号从 `QC-001` 起。
    pub fn generate_equipment_data(&mut self, count: usize) -> Vec<CraneMonitoringData> {
        (0..count).map(|i| self.crane(i)).collect()
    }

    fn crane(&mut self, index: usize) -> CraneMonitoringData {
        let now = now_millis();
        let rng = &mut self.rng;
        let health_score: f64 = rng.gen_range(0.5..1.0);

        CraneMonitoringData {
            crane_id: format!("QC-{:03}", index + 1),
            timestamp: now,
            location: CraneLocation {
                latitude: TERMINAL_LAT + rng.gen_range(-0.005..0.005),
                longitude: TERMINAL_LON + rng.gen_range(-0.005..0.005),
                berth: format!("B-{}", index + 1),
            },
            operational: CraneOperational {
                load_weight: rng.gen_range(0.0..50.0),
                boom_angle: rng.gen_range(20.0..60.0),
                hook_height: rng.gen_range(10.0..50.0),
                trolley_position: rng.gen_range(0.0..30.0),
                spreader_status: if rng.gen_bool(0.5) {
                    SpreaderStatus::Engaged
                } else {
                    SpreaderStatus::Disengaged
                },
            },
            sensors: CraneSensors {
                motor_temperature: rng.gen_range(60.0..90.0),
                hydraulic_pressure: rng.gen_range(150.0..200.0),
                vibration_level: rng.gen_range(0.0..5.0),
                power_consumption: rng.gen_range(100.0..200.0),
                wind_speed: rng.gen_range(0.0..20.0),
            },
            maintenance: CraneMaintenance {
                operating_hours: rng.gen_range(0.0..2000.0),
                last_maintenance: within_days(rng, now, -30),
                next_maintenance: within_days(rng, now, 30),
                health_score,
            },
            alerts: health_alert(health_score).into_iter().collect(),
        }
    }

    /// 生成洛杉矶港的海洋气象快照。
    pub fn generate_weather_data(&mut self) -> WeatherData {
        let rng = &mut self.rng;
        WeatherData {
            location: WeatherLocation {
                latitude: TERMINAL_LAT,
                longitude: TERMINAL_LON,
            },
            timestamp: now_millis(),
            marine_conditions: MarineConditions {
                wave_height: rng.gen_range(0.5..3.0),
                wave_direction: rng.gen_range(0.0..360.0),
                wave_period: rng.gen_range(5.0..15.0),
                swell_height: rng.gen_range(0.3..2.0),
                swell_direction: rng.gen_range(0.0..360.0),
                swell_period: rng.gen_range(8.0..20.0),
                wind_wave_height: rng.gen_range(0.2..1.5),
                wind_wave_direction: rng.gen_range(0.0..360.0),
                wind_wave_period: rng.gen_range(4.0..12.0),
            },
            ocean_data: OceanData {
                sea_surface_temperature: rng.gen_range(15.0..25.0),
                sea_level_height: rng.gen_range(-0.5..0.5),
                ocean_current_velocity: rng.gen_range(0.1..2.0),
                ocean_current_direction: rng.gen_range(0.0..360.0),
            },
            atmospheric: Atmospheric {
                wind_speed: rng.gen_range(0.0..25.0),
                wind_direction: rng.gen_range(0.0..360.0),
                air_pressure: rng.gen_range(1000.0..1030.0),
                visibility: rng.gen_range(5000.0..15000.0),
                precipitation: rng.gen_range(0.0..10.0),
            },
        }
    }

    /// 生成一条独立告警：随机抽取一台岸桥，按其健康评分给出告警级别。
    /// 评分取值范围与岸桥监测一致，健康的岸桥产生 info 级状态消息。
    pub fn generate_alert(&mut self) -> Alert {
        let crane_no = self.rng.gen_range(1..=10);
        let health_score: f64 = self.rng.gen_range(0.5..1.0);
        let source = format!("QC-{:03}", crane_no);
        let (level, message) = match health_alert(health_score) {
            Some(alert) => (alert.level, alert.message),
            None => (AlertLevel::Info, "Equipment operating normally".to_string()),
        };
        let title = match level {
            AlertLevel::Critical => format!("{} health critical", source),
            AlertLevel::Warning => format!("{} health degraded", source),
            AlertLevel::Info => format!("{} status", source),
        };
        Alert {
            id: uuid_from_rng(&mut self.rng).to_string(),
            level,
            title,
            message,
            timestamp: now_millis(),
            acknowledged: false,
            source,
        }
    }
}

impl TelemetryProducer for MaritimeDataGenerator {
    fn produce(&mut self, category: TelemetryCategory, cardinality: usize) -> TelemetryPayload {
        match category {
            TelemetryCategory::VesselUpdate => {
                TelemetryPayload::VesselUpdate(self.generate_ais_data(cardinality))
            }
            TelemetryCategory::PortMetrics => TelemetryPayload::PortMetrics(self.generate_port_metrics()),
            TelemetryCategory::EquipmentData => {
                TelemetryPayload::EquipmentData(self.generate_equipment_data(cardinality))
            }
            TelemetryCategory::WeatherData => TelemetryPayload::WeatherData(self.generate_weather_data()),
            TelemetryCategory::Alert => TelemetryPayload::Alert(self.generate_alert()),
        }
    }
}

/// 按健康评分给出设备告警，健康时返回 `None`。
fn health_alert(health_score: f64) -> Option<EquipmentAlert> {
    if health_score < CRITICAL_HEALTH {
        Some(EquipmentAlert {
            level: AlertLevel::Critical,
            message: "Equipment requires immediate maintenance".to_string(),
            threshold: CRITICAL_HEALTH,
            current_value: health_score,
        })
    } else if health_score < WARNING_HEALTH {
        Some(EquipmentAlert {
            level: AlertLevel::Warning,
            message: "Schedule maintenance soon".to_string(),
            threshold: WARNING_HEALTH,
            current_value: health_score,
        })
    } else {
        None
    }
}

/// 在 `now` 与 `now + days` 天之间取一个随机时刻 (`days` 可为负)。
fn within_days(rng: &mut StdRng, now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    let span = days.abs() * 24 * 3600;
    let offset = rng.gen_range(0..span.max(1));
    if days < 0 {
        now - ChronoDuration::seconds(offset)
    } else {
        now + ChronoDuration::seconds(offset)
    }
}

/// 从生成器自身的随机源构造 v4 UUID，保证固定种子下告警 ID 也可复现。
fn uuid_from_rng(rng: &mut StdRng) -> Uuid {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vessel_batch_has_requested_cardinality() {
        let mut generator = MaritimeDataGenerator::with_seed(7);
        for count in [0usize, 1, 5, 25] {
            let payload = generator.produce(TelemetryCategory::VesselUpdate, count);
            assert_eq!(payload.category(), TelemetryCategory::VesselUpdate);
            assert_eq!(payload.cardinality(), count);
        }
    }

    #[test]
    fn test_vessels_cycle_through_names_and_ports() {
        let mut generator = MaritimeDataGenerator::with_seed(1);
        let vessels = generator.generate_ais_data(12);
        assert_eq!(vessels[0].vessel_info.name, "MAERSK EDINBURGH");
        assert_eq!(vessels[10].vessel_info.name, "MAERSK EDINBURGH");
        assert_eq!(vessels[3].vessel_info.callsign, "ABC003");
        // 第 3 艘船 (索引 3) 围绕鹿特丹
        assert!((vessels[3].position.latitude - 51.8985).abs() <= 0.1);
        assert!(vessels.iter().all(|v| v.mmsi >= 200_000_000));
        assert!(vessels.iter().all(|v| v.eta.len() == "MM-DD HH:MM".len()));
    }

    #[test]
    fn test_crane_alerts_follow_health_thresholds() {
        let mut generator = MaritimeDataGenerator::with_seed(99);
        let cranes = generator.generate_equipment_data(50);
        assert_eq!(cranes[0].crane_id, "QC-001");
        assert_eq!(cranes[49].location.berth, "B-50");

        for crane in &cranes {
            let score = crane.maintenance.health_score;
            match crane.alerts.as_slice() {
                [] => assert!(score >= WARNING_HEALTH),
                [alert] if alert.level == AlertLevel::Critical => assert!(score < CRITICAL_HEALTH),
                [alert] => {
                    assert_eq!(alert.level, AlertLevel::Warning);
                    assert!((CRITICAL_HEALTH..WARNING_HEALTH).contains(&score));
                }
                more => panic!("每台岸桥最多一条告警，实际: {}", more.len()),
            }
        }
    }

    #[test]
    fn test_snapshot_categories_ignore_cardinality() {
        let mut generator = MaritimeDataGenerator::with_seed(3);
        for category in [TelemetryCategory::PortMetrics, TelemetryCategory::WeatherData, TelemetryCategory::Alert] {
            let payload = generator.produce(category, 40);
            assert_eq!(payload.category(), category);
            assert_eq!(payload.cardinality(), 1);
        }
    }

    #[test]
    fn test_same_seed_reproduces_same_values() {
        let mut a = MaritimeDataGenerator::with_seed(2024);
        let mut b = MaritimeDataGenerator::with_seed(2024);
        let va = a.generate_ais_data(3);
        let vb = b.generate_ais_data(3);
        for (x, y) in va.iter().zip(vb.iter()) {
            assert_eq!(x.mmsi, y.mmsi);
            assert_eq!(x.position, y.position);
            assert_eq!(x.vessel_info.imo, y.vessel_info.imo);
        }
        assert_eq!(a.generate_alert().id, b.generate_alert().id);
    }

    #[test]
    fn test_alerts_cover_every_level() {
        let mut generator = MaritimeDataGenerator::with_seed(11);
        let alerts: Vec<Alert> = (0..300).map(|_| generator.generate_alert()).collect();

        for level in [AlertLevel::Info, AlertLevel::Warning, AlertLevel::Critical] {
            assert!(alerts.iter().any(|a| a.level == level), "300 条告警中没有 {:?} 级别", level);
        }
        for alert in &alerts {
            let expected_suffix = match alert.level {
                AlertLevel::Critical => "health critical",
                AlertLevel::Warning => "health degraded",
                AlertLevel::Info => "status",
            };
            assert!(alert.title.starts_with(&alert.source));
            assert!(alert.title.ends_with(expected_suffix), "标题: {}", alert.title);
            assert!(!alert.acknowledged);
            // 服务端生成的 ID 是 UUID 文本
            assert!(Uuid::parse_str(&alert.id).is_ok(), "告警 ID: {}", alert.id);
        }
        assert!(alerts
            .iter()
            .filter(|a| a.level == AlertLevel::Info)
            .all(|a| a.message == "Equipment operating normally"));
    }

    #[test]
    fn test_generated_timestamps_are_millisecond_aligned() {
        let mut generator = MaritimeDataGenerator::with_seed(5);
        let crane = &generator.generate_equipment_data(1)[0];
        let vessel = &generator.generate_ais_data(1)[0];
        let alert = generator.generate_alert();
        for stamp in [
            crane.timestamp,
            crane.maintenance.last_maintenance,
            vessel.timestamp,
            alert.timestamp,
            generator.generate_port_metrics().timestamp,
            generator.generate_weather_data().timestamp,
        ] {
            assert_eq!(stamp.timestamp_subsec_nanos() % 1_000_000, 0, "时间戳: {}", stamp);
        }
    }
}
