//! `common_models` 公共模型库 crate。
//!
//! 本 crate 集中定义了遥测分发服务端 (`maritime_server`) 与客户端 (`maritime_client`)
//! 之间共享的数据结构和枚举类型：
//! - **消息载荷 (`ws_payloads`)**: 船舶 AIS、港口作业指标、岸桥设备监测、海洋气象和告警记录，
//!   以及把它们按类别打上标签的 `TelemetryPayload`。
//! - **通用枚举 (`enums`)**: 消息类别 `TelemetryCategory` 以及 AIS 编码等枚举。
//!
//! 所有模型都派生 `Serialize`/`Deserialize`/`Debug`/`Clone`，字段命名与现有前端的 JSON 协议保持一致。

pub mod enums;
pub mod timestamp;
pub mod ws_payloads;

pub use enums::TelemetryCategory;
pub use ws_payloads::TelemetryPayload;
