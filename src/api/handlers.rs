use axum::{
    extract::{Extension, Json, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::api::auth::AuthUser;
use crate::api::AppState;
use crate::cache::{cache_key, Cached};
use crate::error::AppError;
use crate::models::{Branch, Establishment};
use crate::service::PeriodQuery;

const LAST_UPDATE_HEADER: &str = "x-last-update";

/// 查询参数: ?nif=&filial=&periodo=&refresh=
#[derive(Debug, Default, Deserialize)]
pub struct PeriodParams {
    pub nif: Option<String>,
    pub filial: Option<String>,
    pub periodo: Option<String>,
    pub refresh: Option<String>,
}

impl PeriodParams {
    fn query(&self) -> Result<PeriodQuery, AppError> {
        PeriodQuery::parse(
            self.nif.as_deref(),
            self.filial.as_deref(),
            self.periodo.as_deref(),
        )
    }

    fn force_refresh(&self) -> bool {
        matches!(self.refresh.as_deref().map(str::trim), Some("true" | "1"))
    }
}

#[derive(Debug, Deserialize)]
pub struct NifParams {
    pub nif: Option<String>,
}

impl NifParams {
    fn nif(&self) -> Result<&str, AppError> {
        self.nif
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::Validation("NIF inválido".to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct PdfParams {
    pub numero_fatura: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LastUpdateResponse {
    pub nif: String,
    pub ultima_atualizacao: Option<String>,
    pub cooldown_restante: u64,
}

#[derive(Debug, Serialize)]
pub struct ClearCacheResponse {
    pub success: bool,
    pub message: String,
    pub chaves_limpas: usize,
}

/// `refresh=true` 视为手动刷新: 冷却中拒绝, 否则开始冷却
fn begin_manual_refresh(state: &AppState, params: &PeriodParams) -> Result<bool, AppError> {
    if !params.force_refresh() {
        return Ok(false);
    }
    state
        .cache
        .clock()
        .try_begin_refresh(Local::now())
        .map_err(AppError::Cooldown)?;
    Ok(true)
}

/// 缓存数据 + x-last-update 头
fn cached_json<T: Serialize>(cached: Cached<T>) -> Response {
    (
        [(LAST_UPDATE_HEADER, cached.last_update.to_rfc3339())],
        Json(cached.data),
    )
        .into_response()
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 汇总统计
pub async fn stats_summary(
    State(state): State<AppState>,
    Query(params): Query<PeriodParams>,
) -> Result<Response, AppError> {
    let query = params.query()?;
    let key = cache_key("resumo", &query.nif, query.branch.as_deref(), query.period.code());

    let force = begin_manual_refresh(&state, &params)?;

    let cached = state
        .cache
        .fetch(&key, state.ttl_for(query.period), force, || {
            state.dashboard.stats_summary(&query, Local::now().naive_local())
        })
        .await?;

    Ok(cached_json(cached))
}

/// 商品排行
pub async fn top_products(
    State(state): State<AppState>,
    Query(params): Query<PeriodParams>,
) -> Result<Response, AppError> {
    let query = params.query()?;
    let key = cache_key("produtos", &query.nif, query.branch.as_deref(), query.period.code());

    let force = begin_manual_refresh(&state, &params)?;

    let cached = state
        .cache
        .fetch(&key, state.ttl_for(query.period), force, || {
            state.dashboard.top_products(&query, Local::now().naive_local())
        })
        .await?;

    Ok(cached_json(cached))
}

/// 发票列表
pub async fn invoice_list(
    State(state): State<AppState>,
    Query(params): Query<PeriodParams>,
) -> Result<Response, AppError> {
    let query = params.query()?;
    let key = cache_key("faturas", &query.nif, query.branch.as_deref(), query.period.code());

    let force = begin_manual_refresh(&state, &params)?;

    let cached = state
        .cache
        .fetch(&key, state.ttl_for(query.period), force, || {
            state.dashboard.invoice_list(&query, Local::now().naive_local())
        })
        .await?;

    Ok(cached_json(cached))
}

/// 小时 × 星期 热力图
pub async fn heatmap(
    State(state): State<AppState>,
    Query(params): Query<PeriodParams>,
) -> Result<Response, AppError> {
    let query = params.query()?;
    let key = cache_key("heatmap", &query.nif, query.branch.as_deref(), query.period.code());

    let force = begin_manual_refresh(&state, &params)?;

    let cached = state
        .cache
        .fetch(&key, state.ttl_for(query.period), force, || {
            state.dashboard.heatmap(&query, Local::now().naive_local())
        })
        .await?;

    Ok(cached_json(cached))
}

/// 发票 PDF 下载
pub async fn invoice_pdf(
    State(state): State<AppState>,
    Query(params): Query<PdfParams>,
) -> Result<Response, AppError> {
    let number = params.numero_fatura.unwrap_or_default();
    let bytes = state.dashboard.invoice_pdf(&number).await?;

    // 文件名只保留安全字符
    let file_name: String = number
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"fatura_{}.pdf\"", file_name),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// 当前用户的门店
pub async fn establishments(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Establishment>>, AppError> {
    let list = state.dashboard.establishments(&user.user_id).await?;
    Ok(Json(list))
}

/// 门店分店
pub async fn branches(
    State(state): State<AppState>,
    Query(params): Query<NifParams>,
) -> Result<Json<Vec<Branch>>, AppError> {
    let list = state.dashboard.branches(params.nif()?).await?;
    Ok(Json(list))
}

/// 最后刷新时间和冷却剩余
pub async fn last_update(
    State(state): State<AppState>,
    Query(params): Query<NifParams>,
) -> Result<Json<LastUpdateResponse>, AppError> {
    let nif = params.nif()?;
    let clock = state.cache.clock();

    Ok(Json(LastUpdateResponse {
        nif: nif.to_string(),
        ultima_atualizacao: clock
            .last_update()
            .map(|t| t.format("%d-%m %H:%M").to_string()),
        cooldown_restante: clock.cooldown_remaining(Local::now()),
    }))
}

/// 清除 NIF 的缓存, 冷却期内拒绝
pub async fn clear_cache(
    State(state): State<AppState>,
    Query(params): Query<NifParams>,
) -> Result<Json<ClearCacheResponse>, AppError> {
    let nif = params.nif()?;
    let now = Local::now();
    let clock = state.cache.clock();

    clock.try_begin_refresh(now).map_err(AppError::Cooldown)?;

    let removed = state.cache.invalidate_nif(nif);
    tracing::info!("NIF {} 缓存已清除: {} 条", nif, removed);

    Ok(Json(ClearCacheResponse {
        success: true,
        message: format!("Cache limpo para o NIF {}", nif),
        chaves_limpas: removed,
    }))
}
