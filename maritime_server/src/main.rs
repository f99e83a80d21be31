use anyhow::Context;
use log::{info, warn, LevelFilter};
use maritime_server::config::{AppConfig, DEFAULT_CONFIG_FILE};
use maritime_server::producer::maritime_producer_factory;
use maritime_server::ws_server::connection_manager::ConnectionManager;
use maritime_server::ws_server::service::WsService;
use std::sync::Arc;
use std::time::Duration;

/// 收到退出信号后等待会话自行拆除的最长时间
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_millis()
        .init();
    info!("[主程序] 日志系统已初始化 (env_logger)，默认级别: Info。");

    // 第一个命令行参数可指定配置文件路径
    let config_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
    let config = AppConfig::load(&config_path);
    config.validate().context("应用配置无效")?;
    info!("[主程序] 应用配置已加载: {:?}", config);

    let connection_manager = Arc::new(ConnectionManager::new());
    let service = WsService::new(config, Arc::clone(&connection_manager), maritime_producer_factory());

    tokio::select! {
        result = service.start() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("[主程序] 收到退出信号，正在停止所有推送会话...");
            connection_manager.cancel_all();
            let drained = tokio::time::timeout(SHUTDOWN_GRACE, async {
                while connection_manager.client_count() > 0 {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                }
            })
            .await;
            if drained.is_err() {
                warn!(
                    "[主程序] 仍有 {} 个会话未在 {:?} 内完成拆除",
                    connection_manager.client_count(),
                    SHUTDOWN_GRACE
                );
            }
        }
    }

    info!("[主程序] 服务已退出。");
    Ok(())
}
