//! `maritime_server` 海事遥测实时分发服务端核心库。
//!
//! 服务端为每个 WebSocket 连接建立一个推送会话：连接建立时立即推送一批船舶数据，
//! 之后按固定间隔随机推送船舶、港口指标、岸桥设备或气象数据，连接断开即停止。
//!
//! 主要模块包括：
//! - `config`: 应用配置的加载与校验。
//! - `error`: 应用特定的错误类型。
//! - `producer`: 遥测生产者接口、按会话创建生产者的工厂与类别抽样。
//! - `data_generator`: 基于可复现随机源的模拟数据生成器。
//! - `ws_server`: 会话、推送定时器、会话注册表与 WebSocket 服务。

pub mod config;
pub mod data_generator;
pub mod error;
pub mod producer;
pub mod ws_server;
