use std::sync::Arc;
use std::time::Duration;

use faturas_dashboard::api::{self, AppState};
use faturas_dashboard::cache::{MemoryStore, RefreshClock, ResponseCache};
use faturas_dashboard::{create_pool, AppConfig, DashboardService, PgInvoiceStore};
use tracing::info;
use tracing_subscriber::{fmt::time::ChronoLocal, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载配置
    let config = AppConfig::load()?;

    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_env_filter(EnvFilter::new(&config.log.level))
        .with_target(true)
        .with_level(true)
        .init();

    info!("Starting server with config: {:?}", config);

    if config.auth.jwt_secret.trim().is_empty() {
        return Err("auth.jwt_secret 未配置 (APP__AUTH__JWT_SECRET)".into());
    }

    // 创建数据库连接池
    let pool = create_pool(&config.database).await?;
    info!("Database pool created");

    let store = Arc::new(PgInvoiceStore::new(pool));
    let clock = Arc::new(RefreshClock::new(Duration::from_secs(
        config.cache.refresh_cooldown_secs,
    )));
    let cache = Arc::new(ResponseCache::new(Arc::new(MemoryStore::new()), clock));

    let state = AppState {
        dashboard: Arc::new(DashboardService::new(store)),
        cache,
        cache_config: config.cache.clone(),
        jwt_secret: Arc::from(config.auth.jwt_secret.as_str()),
    };
    let app = api::router(state);

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  GET    /api/stats/resumo        - resumo + comparativo");
    info!("  GET    /api/heatmap             - heatmap hora × dia");
    info!("  GET    /api/produtos            - top produtos");
    info!("  GET    /api/faturas             - lista de faturas");
    info!("  GET    /api/faturas/pdf         - PDF da fatura");
    info!("  GET    /api/estabelecimentos    - estabelecimentos do utilizador");
    info!("  GET    /api/filiais             - filiais");
    info!("  GET    /api/ultima-atualizacao  - última atualização");
    info!("  DELETE /api/limparcache         - limpar cache");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
