//! 通用枚举模块。
//!
//! 本模块定义了遥测分发链路两端共享的枚举类型：消息类别 (`TelemetryCategory`)、
//! AIS 航行状态与船舶类型，以及岸桥设备和告警使用的若干小枚举。
//!
//! 与线上协议相关的枚举都显式固定了序列化形式（字符串或整数），
//! 因为这些值会被现有的前端直接读取。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 遥测消息类别。
///
/// 类别唯一决定了信封中 `data` 字段的结构，线上以 snake_case 字符串表示
/// (`vessel_update`、`port_metrics` 等)。
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TelemetryCategory {
    /// 船舶 AIS 位置批量更新。
    VesselUpdate,
    /// 港口作业指标快照。
    PortMetrics,
    /// 岸桥设备监测数据批量更新。
    EquipmentData,
    /// 海洋气象快照。
    WeatherData,
    /// 告警。数据模型中声明，但服务端的定时推送不会选择它。
    Alert,
}

impl TelemetryCategory {
    /// 定时推送时参与均匀抽样的四个类别，按线上顺序排列。
    pub const PERIODIC: [TelemetryCategory; 4] = [
        TelemetryCategory::VesselUpdate,
        TelemetryCategory::PortMetrics,
        TelemetryCategory::EquipmentData,
        TelemetryCategory::WeatherData,
    ];

    /// 返回线上使用的类别字符串。
    pub fn as_str(&self) -> &'static str {
        match self {
            TelemetryCategory::VesselUpdate => "vessel_update",
            TelemetryCategory::PortMetrics => "port_metrics",
            TelemetryCategory::EquipmentData => "equipment_data",
            TelemetryCategory::WeatherData => "weather_data",
            TelemetryCategory::Alert => "alert",
        }
    }
}

impl fmt::Display for TelemetryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 无法识别的类别字符串。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "未知的遥测类别: '{}'", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for TelemetryCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vessel_update" => Ok(TelemetryCategory::VesselUpdate),
            "port_metrics" => Ok(TelemetryCategory::PortMetrics),
            "equipment_data" => Ok(TelemetryCategory::EquipmentData),
            "weather_data" => Ok(TelemetryCategory::WeatherData),
            "alert" => Ok(TelemetryCategory::Alert),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

/// AIS 航行状态 (ITU-R M.1371 第 0-15 号)，线上以整数表示。
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(into = "u8", try_from = "u8")]
pub enum NavigationStatus {
    UnderWay = 0,
    AtAnchor = 1,
    NotUnderCommand = 2,
    RestrictedManeuverability = 3,
    ConstrainedByDraft = 4,
    Moored = 5,
    Aground = 6,
    EngagedInFishing = 7,
    UnderWayUsingSail = 8,
    Reserved = 9,
    Reserved2 = 10,
    Reserved3 = 11,
    Reserved4 = 12,
    Reserved5 = 13,
    AisSearchAndRescue = 14,
    Undefined = 15,
}

impl NavigationStatus {
    /// 按编号顺序排列的全部状态，索引即编号。
    pub const ALL: [NavigationStatus; 16] = [
        NavigationStatus::UnderWay,
        NavigationStatus::AtAnchor,
        NavigationStatus::NotUnderCommand,
        NavigationStatus::RestrictedManeuverability,
        NavigationStatus::ConstrainedByDraft,
        NavigationStatus::Moored,
        NavigationStatus::Aground,
        NavigationStatus::EngagedInFishing,
        NavigationStatus::UnderWayUsingSail,
        NavigationStatus::Reserved,
        NavigationStatus::Reserved2,
        NavigationStatus::Reserved3,
        NavigationStatus::Reserved4,
        NavigationStatus::Reserved5,
        NavigationStatus::AisSearchAndRescue,
        NavigationStatus::Undefined,
    ];
}

impl From<NavigationStatus> for u8 {
    fn from(status: NavigationStatus) -> Self {
        status as u8
    }
}

impl TryFrom<u8> for NavigationStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        NavigationStatus::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| format!("无效的 AIS 航行状态编号: {}", value))
    }
}

/// AIS 船舶类型编号 (仅包含数据源会产生的几类)，线上以整数表示。
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(into = "u8", try_from = "u8")]
pub enum VesselType {
    Fishing = 30,
    Pleasure = 37,
    Tug = 52,
    Passenger = 60,
    Cargo = 70,
    Tanker = 80,
}

impl VesselType {
    pub const ALL: [VesselType; 6] = [
        VesselType::Fishing,
        VesselType::Tug,
        VesselType::Passenger,
        VesselType::Cargo,
        VesselType::Tanker,
        VesselType::Pleasure,
    ];
}

impl From<VesselType> for u8 {
    fn from(kind: VesselType) -> Self {
        kind as u8
    }
}

impl TryFrom<u8> for VesselType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        VesselType::ALL
            .iter()
            .copied()
            .find(|kind| *kind as u8 == value)
            .ok_or_else(|| format!("不支持的 AIS 船舶类型编号: {}", value))
    }
}

/// 岸桥吊具状态。
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SpreaderStatus {
    Engaged,
    Disengaged,
}

/// 告警级别，设备告警与独立告警共用。
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Info,
    Warning,
    Critical,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_wire_strings_match_serde() {
        for category in TelemetryCategory::PERIODIC
            .iter()
            .chain(std::iter::once(&TelemetryCategory::Alert))
        {
            let json = serde_json::to_string(category).expect("类别序列化不应失败");
            assert_eq!(json, format!("\"{}\"", category.as_str()));
            assert_eq!(category.as_str().parse::<TelemetryCategory>(), Ok(*category));
        }
    }

    #[test]
    fn test_unknown_category_string_is_rejected() {
        let err = "vessel_updates".parse::<TelemetryCategory>().unwrap_err();
        assert_eq!(err, UnknownCategory("vessel_updates".to_string()));
        assert!(serde_json::from_str::<TelemetryCategory>("\"VesselUpdate\"").is_err());
    }

    #[test]
    fn test_periodic_categories_exclude_alert() {
        assert!(!TelemetryCategory::PERIODIC.contains(&TelemetryCategory::Alert));
        assert_eq!(TelemetryCategory::PERIODIC.len(), 4);
    }

    #[test]
    fn test_navigation_status_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&NavigationStatus::Moored).unwrap(), "5");
        let status: NavigationStatus = serde_json::from_str("14").unwrap();
        assert_eq!(status, NavigationStatus::AisSearchAndRescue);
        assert!(serde_json::from_str::<NavigationStatus>("16").is_err());
    }

    #[test]
    fn test_vessel_type_rejects_unlisted_codes() {
        assert_eq!(serde_json::to_string(&VesselType::Tanker).unwrap(), "80");
        assert_eq!(serde_json::from_str::<VesselType>("37").unwrap(), VesselType::Pleasure);
        assert!(serde_json::from_str::<VesselType>("71").is_err());
    }

    #[test]
    fn test_lowercase_string_enums() {
        assert_eq!(serde_json::to_string(&SpreaderStatus::Disengaged).unwrap(), "\"disengaged\"");
        assert_eq!(serde_json::to_string(&AlertLevel::Critical).unwrap(), "\"critical\"");
    }
}
