use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::AppError;

/// WebSocket 服务的默认主机地址
pub const DEFAULT_WS_HOST: &str = "0.0.0.0";
/// WebSocket 服务的默认端口号
pub const DEFAULT_WS_PORT: u16 = 8080;
/// 覆盖监听端口的环境变量
pub const PORT_ENV_VAR: &str = "MARITIME_WS_PORT";
/// 默认的配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "app_settings.json";

/// WebSocket 监听配置
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WebSocketConfig {
    /// WebSocket 服务绑定的主机地址
    pub host: String,
    /// WebSocket 服务监听的端口号
    pub port: u16,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_WS_HOST.to_string(),
            port: DEFAULT_WS_PORT,
        }
    }
}

impl WebSocketConfig {
    /// `host:port` 形式的监听地址
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 推送节奏与批量大小配置
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PushConfig {
    /// 定时推送间隔（单位：毫秒）
    pub interval_ms: u64,
    /// 连接建立时首次推送的船舶条数
    pub initial_vessel_count: usize,
    /// 定时推送船舶批量时的条数
    pub periodic_vessel_count: usize,
    /// 定时推送岸桥批量时的台数
    pub periodic_equipment_count: usize,
    /// 每个会话出站队列的容量
    pub outbound_queue: usize,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5000,
            initial_vessel_count: 25,
            periodic_vessel_count: 5,
            periodic_equipment_count: 3,
            outbound_queue: 32,
        }
    }
}

impl PushConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// 应用的主配置结构体
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// WebSocket 服务的相关配置
    pub websocket: WebSocketConfig,
    /// 推送相关配置
    pub push: PushConfig,
    /// 数据生成的基准随机种子；为空时使用系统熵源
    pub seed: Option<u64>,
}

impl AppConfig {
    /// 从 JSON 配置文件加载配置，再应用环境变量覆盖。
    ///
    /// 文件不存在时使用默认配置；文件无法读取或内容无效时记录警告并使用默认配置。
    /// 不会写入任何文件。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let mut config = load_from_file(path.as_ref());
        config.apply_env_overrides();
        config
    }

    /// 检查数值配置。推送间隔与出站队列容量都必须大于 0。
    pub fn validate(&self) -> Result<(), AppError> {
        if self.push.interval_ms == 0 {
            return Err(AppError::ConfigError("push.interval_ms 必须大于 0".to_string()));
        }
        if self.push.outbound_queue == 0 {
            return Err(AppError::ConfigError("push.outbound_queue 必须大于 0".to_string()));
        }
        Ok(())
    }

    /// 应用 `MARITIME_WS_PORT` 环境变量。
    pub fn apply_env_overrides(&mut self) {
        if let Ok(raw) = env::var(PORT_ENV_VAR) {
            self.apply_port_override(&raw);
        }
    }

    fn apply_port_override(&mut self, raw: &str) {
        match raw.trim().parse::<u16>() {
            Ok(port) => {
                info!("[配置模块] 环境变量 {} 覆盖监听端口: {}", PORT_ENV_VAR, port);
                self.websocket.port = port;
            }
            Err(e) => {
                warn!(
                    "[配置模块] 环境变量 {}='{}' 不是有效端口 ({}), 保持端口 {}",
                    PORT_ENV_VAR, raw, e, self.websocket.port
                );
            }
        }
    }
}

fn load_from_file(path: &Path) -> AppConfig {
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => {
                info!("[配置模块] 已成功从配置文件 {:?} 加载应用配置。", path);
                config
            }
            Err(e) => {
                warn!("[配置模块] 警告：从 {:?} 反序列化配置失败: {}。将使用默认配置。", path, e);
                AppConfig::default()
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("[配置模块] 未找到配置文件 {:?}，使用默认配置。", path);
            AppConfig::default()
        }
        Err(e) => {
            warn!("[配置模块] 读取配置文件 {:?} 失败: {}。将使用默认配置。", path, e);
            AppConfig::default()
        }
    }
}
