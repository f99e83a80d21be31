// common_models/src/ws_payloads.rs

//! 包含遥测推送中使用的各类载荷结构体定义。
//!
//! 字段名与单位属于线上协议的一部分（前端按 camelCase 字段直接读取），
//! 因此所有结构体统一使用 `#[serde(rename_all = "camelCase")]`，不得随意改名。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{AlertLevel, NavigationStatus, SpreaderStatus, TelemetryCategory, VesselType};

// --- 船舶 AIS 数据 ---

/// 单艘船舶的 AIS 报文。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AisVesselData {
    /// 海上移动业务标识 (MMSI)。
    pub mmsi: u32,
    #[serde(with = "crate::timestamp")]
    pub timestamp: DateTime<Utc>,
    pub position: GeoPosition,
    pub navigation: Navigation,
    pub vessel_info: VesselInfo,
    /// 目的港代码，例如 `"ROTTERDAM"`。
    pub destination: String,
    /// 预计到港时间，格式 `"MM-DD HH:MM"`。
    pub eta: String,
}

/// 经纬度坐标 (十进制度)。
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeoPosition {
    pub longitude: f64,
    pub latitude: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
    /// 对地航向，单位：度。
    pub course_over_ground: f64,
    /// 对地航速，单位：节。
    pub speed_over_ground: f64,
    /// 艏向，单位：度。
    pub heading: u16,
    pub rate_of_turn: i16,
    pub navigation_status: NavigationStatus,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VesselInfo {
    pub imo: u32,
    pub name: String,
    pub callsign: String,
    #[serde(rename = "type")]
    pub vessel_type: VesselType,
    pub dimensions: VesselDimensions,
}

/// 船舶尺度，单位：米。
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VesselDimensions {
    pub length: f64,
    pub width: f64,
    pub draft: f64,
}

// --- 港口作业指标 ---

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortOperationMetrics {
    #[serde(with = "crate::timestamp")]
    pub timestamp: DateTime<Utc>,
    pub terminal_id: String,
    /// 每小时作业箱量。
    pub vessel_productivity: f64,
    /// 利用率以小数表示 (0.0 - 1.0)。
    pub berth_utilization: f64,
    pub yard_utilization: f64,
    pub crane_utilization: f64,
    /// 集卡周转时间，单位：分钟。
    pub truck_turn_time: f64,
    pub gate_moves: f64,
    /// 堆存天数。
    pub dwell_time: f64,
    /// 船舶等泊时间，单位：小时。
    pub vessel_waiting_time: f64,
}

// --- 岸桥设备监测 ---

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CraneMonitoringData {
    /// 岸桥编号，例如 `"QC-001"`。
    pub crane_id: String,
    #[serde(with = "crate::timestamp")]
    pub timestamp: DateTime<Utc>,
    pub location: CraneLocation,
    pub operational: CraneOperational,
    pub sensors: CraneSensors,
    pub maintenance: CraneMaintenance,
    pub alerts: Vec<EquipmentAlert>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CraneLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub berth: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CraneOperational {
    /// 吊重，单位：吨。
    pub load_weight: f64,
    pub boom_angle: f64,
    pub hook_height: f64,
    pub trolley_position: f64,
    pub spreader_status: SpreaderStatus,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CraneSensors {
    /// 电机温度，摄氏度。
    pub motor_temperature: f64,
    /// 液压，PSI。
    pub hydraulic_pressure: f64,
    pub vibration_level: f64,
    /// 功率，kW。
    pub power_consumption: f64,
    pub wind_speed: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CraneMaintenance {
    pub operating_hours: f64,
    #[serde(with = "crate::timestamp")]
    pub last_maintenance: DateTime<Utc>,
    #[serde(with = "crate::timestamp")]
    pub next_maintenance: DateTime<Utc>,
    /// 健康评分 (0.0 - 1.0)。
    pub health_score: f64,
}

/// 附着在单台设备上的告警。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentAlert {
    #[serde(rename = "type")]
    pub level: AlertLevel,
    pub message: String,
    pub threshold: f64,
    pub current_value: f64,
}

// --- 海洋气象 ---

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherData {
    pub location: WeatherLocation,
    #[serde(with = "crate::timestamp")]
    pub timestamp: DateTime<Utc>,
    pub marine_conditions: MarineConditions,
    pub ocean_data: OceanData,
    pub atmospheric: Atmospheric,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// 海况。波高单位米，方向单位度，周期单位秒。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MarineConditions {
    pub wave_height: f64,
    pub wave_direction: f64,
    pub wave_period: f64,
    pub swell_height: f64,
    pub swell_direction: f64,
    pub swell_period: f64,
    pub wind_wave_height: f64,
    pub wind_wave_direction: f64,
    pub wind_wave_period: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OceanData {
    pub sea_surface_temperature: f64,
    pub sea_level_height: f64,
    pub ocean_current_velocity: f64,
    pub ocean_current_direction: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Atmospheric {
    pub wind_speed: f64,
    pub wind_direction: f64,
    /// 气压，hPa。
    pub air_pressure: f64,
    /// 能见度，米。
    pub visibility: f64,
    /// 降水，mm/h。
    pub precipitation: f64,
}

// --- 独立告警 ---

/// 面向看板的独立告警记录。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// 告警 ID。服务端生成 UUID 字符串，其他来源可以使用任意字符串。
    pub id: String,
    #[serde(rename = "type")]
    pub level: AlertLevel,
    pub title: String,
    pub message: String,
    #[serde(with = "crate::timestamp")]
    pub timestamp: DateTime<Utc>,
    pub acknowledged: bool,
    /// 告警来源，例如岸桥编号。
    pub source: String,
}

// --- 带类别标签的载荷 ---

/// 按类别区分的遥测载荷。
///
/// 每个变体与一个 `TelemetryCategory` 一一对应，类别与结构不可能错配。
/// 序列化时只输出内部数据 (untagged)；反序列化必须先知道类别，由信封编解码器完成。
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum TelemetryPayload {
    VesselUpdate(Vec<AisVesselData>),
    PortMetrics(PortOperationMetrics),
    EquipmentData(Vec<CraneMonitoringData>),
    WeatherData(WeatherData),
    Alert(Alert),
}

impl TelemetryPayload {
    /// 返回载荷所属的类别。
    pub fn category(&self) -> TelemetryCategory {
        match self {
            TelemetryPayload::VesselUpdate(_) => TelemetryCategory::VesselUpdate,
            TelemetryPayload::PortMetrics(_) => TelemetryCategory::PortMetrics,
            TelemetryPayload::EquipmentData(_) => TelemetryCategory::EquipmentData,
            TelemetryPayload::WeatherData(_) => TelemetryCategory::WeatherData,
            TelemetryPayload::Alert(_) => TelemetryCategory::Alert,
        }
    }

    /// 返回载荷中的记录条数；快照类载荷固定为 1。
    pub fn cardinality(&self) -> usize {
        match self {
            TelemetryPayload::VesselUpdate(vessels) => vessels.len(),
            TelemetryPayload::EquipmentData(cranes) => cranes.len(),
            _ => 1,
        }
    }
}
