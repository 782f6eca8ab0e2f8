pub mod api;
pub mod audit;
pub mod auth;
pub mod config;
pub mod content;
pub mod error;
pub mod mail;
pub mod speech;
pub mod state;
pub mod storage;
pub mod util;
pub mod verification;

use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

use config::Config;
use state::AppState;

/// 启动服务：初始化日志、读取配置、连接数据库并建表，然后监听请求
pub async fn run() -> error::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".to_string()))
        .with_env_filter(EnvFilter::from_env("STORYHUB_LOG"))
        .init();

    let config = Config::from_env()?;

    let pool = storage::new_db_pool(&config.database_url).await?;
    storage::migrate(&pool, storage::SCHEMA).await?;
    tracing::info!("database schema is up to date");

    let app = AppState::from_config(pool, &config)?;

    api::run_server(app, &config.bind_addr).await
}
