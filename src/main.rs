//! Folio - 小说导入服务
//!
//! 架构:
//! - Domain: novel/, analysis/, 分章
//! - Application: commands, queries, ports, analysis
//! - Infrastructure: http, persistence, adapters

use std::sync::Arc;

use folio::application::AnalysisOrchestrator;
use folio::config::{load_config, print_config};
use folio::infrastructure::adapters::{HttpLlmClient, HttpLlmClientConfig, Utf8GbkDecoder};
use folio::infrastructure::http::{AppState, HttpServer, ServerConfig};
use folio::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteProjectRepository, SqlitePromptStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!(
        "{},folio={},tower_http=debug",
        config.log.level, config.log.level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();

    tracing::info!("Folio - 小说导入服务");
    print_config(&config);

    // 确保数据目录存在
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 初始化数据库
    let db_config = DatabaseConfig {
        database_url: config.database.database_url(),
        max_connections: config.database.max_connections,
    };
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;

    // 创建 Repository 适配器
    let project_repo = Arc::new(SqliteProjectRepository::new(pool.clone()));
    let prompt_store = Arc::new(SqlitePromptStore::new(pool));

    // 创建文本生成客户端
    let mut llm_config = HttpLlmClientConfig::new(&config.llm.base_url)
        .with_model(&config.llm.model)
        .with_timeout(config.llm.timeout_secs);
    if let Some(api_key) = &config.llm.api_key {
        llm_config = llm_config.with_api_key(api_key);
    }
    let llm_client = Arc::new(HttpLlmClient::new(llm_config)?);

    let orchestrator = Arc::new(AnalysisOrchestrator::new(
        llm_client,
        prompt_store,
        config.analysis_config(),
    ));

    // 创建 HTTP 服务器
    let server_config = ServerConfig::new(&config.server.host, config.server.port)
        .with_max_body_size(config.server.max_upload_size as usize);
    let state = AppState::new(Arc::new(Utf8GbkDecoder), orchestrator, project_repo);

    let server = HttpServer::new(server_config, state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to listen for ctrl-c");
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
