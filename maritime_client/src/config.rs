// maritime_client/src/config.rs

//! 客户端配置：服务端地址与重连策略。
//!
//! 配置从可选的 JSON 文件加载 (默认 `client_settings.json`)，
//! 环境变量 `MARITIME_WS_URL` 可以覆盖服务端地址。

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use url::Url;

use crate::error::ClientError;
use crate::ws_client::reconnect::ReconnectPolicy;

/// 默认的服务端地址
pub const DEFAULT_WS_URL: &str = "ws://localhost:8080";
/// 覆盖服务端地址的环境变量
pub const URL_ENV_VAR: &str = "MARITIME_WS_URL";
/// 默认的配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "client_settings.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// 分发服务的 WebSocket 地址
    pub url: String,
    /// 断线重连策略
    pub reconnect: ReconnectPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_WS_URL.to_string(),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// 指定地址、其余使用默认值。
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// 从 JSON 配置文件加载，再应用环境变量覆盖。
    ///
    /// 文件不存在时使用默认配置；文件无法读取或内容无效时记录警告并使用默认配置。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let mut config = load_from_file(path.as_ref());
        if let Ok(url) = env::var(URL_ENV_VAR) {
            info!("[配置模块] 环境变量 {} 覆盖服务端地址: {}", URL_ENV_VAR, url);
            config.url = url;
        }
        config
    }

    /// 检查服务端地址是否为合法的 `ws://` 或 `wss://` URL，且重连延迟大于 0。
    pub fn validate(&self) -> Result<Url, ClientError> {
        if self.reconnect.base_delay.is_zero() {
            return Err(ClientError::Config("reconnect.base_delay_ms 必须大于 0".to_string()));
        }
        let url = Url::parse(&self.url)
            .map_err(|e| ClientError::InvalidUrl(format!("'{}': {}", self.url, e)))?;
        match url.scheme() {
            "ws" | "wss" => Ok(url),
            other => Err(ClientError::InvalidUrl(format!(
                "'{}': 不支持的协议 '{}'",
                self.url, other
            ))),
        }
    }
}

fn load_from_file(path: &Path) -> ClientConfig {
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<ClientConfig>(&content) {
            Ok(config) => {
                info!("[配置模块] 已从配置文件 {:?} 加载客户端配置。", path);
                config
            }
            Err(e) => {
                warn!("[配置模块] 警告：从 {:?} 反序列化配置失败: {}。将使用默认配置。", path, e);
                ClientConfig::default()
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("[配置模块] 未找到配置文件 {:?}，使用默认配置。", path);
            ClientConfig::default()
        }
        Err(e) => {
            warn!("[配置模块] 读取配置文件 {:?} 失败: {}。将使用默认配置。", path, e);
            ClientConfig::default()
        }
    }
}
