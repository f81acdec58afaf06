//! Custody API Gateway

use std::net::SocketAddr;
use std::sync::Arc;

use custody_bootstrap::{init_runtime, shutdown_signal};
use custody_config::GatewayConfig;
use custody_gateway::grpc::GrpcCustodyClient;
use custody_telemetry::init_metrics;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // 加载配置
    let config = GatewayConfig::load()?;

    // 初始化 tracing
    init_runtime(&config);

    let metrics = if config.telemetry.metrics_enabled {
        Some(init_metrics()?)
    } else {
        None
    };

    // 初始化 gRPC 客户端（首次调用时建立连接）
    info!(
        endpoint = %config.custody.endpoint_uri(),
        "Creating custody service client"
    );
    let custody = GrpcCustodyClient::connect_lazy(&config.custody)?;

    let app = custody_gateway::app(Arc::new(custody), metrics, &config.cors_allowed_origins);

    // 启动服务器
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    info!(%addr, "Starting gateway");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}
