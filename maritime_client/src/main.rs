use anyhow::Context;
use log::{info, warn, LevelFilter};
use maritime_client::config::{ClientConfig, DEFAULT_CONFIG_FILE};
use maritime_client::{ClientEvent, MaritimeWsClient};
use tokio::sync::broadcast::error::RecvError;

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
    let config = ClientConfig::load(&config_path);
    info!("[主程序] 客户端配置已加载: {:?}", config);

    let client = MaritimeWsClient::new(config);
    let mut events = client.subscribe();
    client.connect().await.context("启动客户端连接失败")?;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(ClientEvent::StatusChanged(status)) => info!("[主程序] 连接状态: {}", status),
                Ok(ClientEvent::MessageReceived(envelope)) => info!(
                    "[主程序] 收到 {} (记录数: {}, 生成时间: {})",
                    envelope.category(),
                    envelope.payload().cardinality(),
                    envelope.generated_at()
                ),
                Ok(ClientEvent::ParseFailed(reason)) => warn!("[主程序] 丢弃无法解析的帧: {}", reason),
                Err(RecvError::Lagged(skipped)) => warn!("[主程序] 事件处理落后，跳过 {} 条", skipped),
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("[主程序] 收到退出信号，正在断开连接...");
                break;
            }
        }
    }

    client.disconnect().await;
    info!("[主程序] 客户端已退出。");
    Ok(())
}
