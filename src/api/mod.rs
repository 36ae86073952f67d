pub mod auth;
pub mod handlers;

pub use handlers::*;

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::ServiceBuilder;

use crate::cache::ResponseCache;
use crate::config::CacheConfig;
use crate::service::{DashboardService, Period};

/// 共享状态
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<DashboardService>,
    pub cache: Arc<ResponseCache>,
    pub cache_config: CacheConfig,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    /// 今日数据缓存时间短, 其它时段长
    pub fn ttl_for(&self, period: Period) -> Duration {
        match period {
            Period::Today => Duration::from_secs(self.cache_config.ttl_today_secs),
            _ => Duration::from_secs(self.cache_config.ttl_other_secs),
        }
    }
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    tracing::info!("{} {} -> {} ({:?})", method, path, response.status().as_u16(), start.elapsed());
    response
}

/// 构建路由
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/stats/resumo", get(handlers::stats_summary))
        .route("/api/heatmap", get(handlers::heatmap))
        .route("/api/produtos", get(handlers::top_products))
        .route("/api/faturas", get(handlers::invoice_list))
        .route("/api/faturas/pdf", get(handlers::invoice_pdf))
        .route("/api/estabelecimentos", get(handlers::establishments))
        .route("/api/filiais", get(handlers::branches))
        .route("/api/ultima-atualizacao", get(handlers::last_update))
        .route("/api/limparcache", delete(handlers::clear_cache))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_auth));

    Router::new()
        .route("/health", get(handlers::health_check))
        .merge(protected)
        .layer(ServiceBuilder::new().layer(middleware::from_fn(log_requests)))
        .with_state(state)
}
