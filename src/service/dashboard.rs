use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use chrono::NaiveDateTime;
use std::sync::Arc;

use crate::db::InvoiceStore;
use crate::error::AppError;
use crate::models::{
    parse_nif_list, Branch, Establishment, Heatmap, InvoiceList, InvoiceListEntry, InvoiceListStats,
    PeriodInfo, PeriodStats, StatsSummary, TopProducts,
};
use crate::pdf::render_text_pdf;
use crate::service::aggregator::aggregate;
use crate::service::heatmap::{build_heatmap, group_by_weekday_hour};
use crate::service::hourly::group_by_hour;
use crate::service::period::Period;
use crate::service::products::rank_products;
use crate::service::variance::{compare, round_to};

const EMPTY_LIST_MESSAGE: &str = "Nenhuma fatura encontrada para esse período.";

/// 已校验的查询参数: NIF + 可选分店 + 时段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodQuery {
    pub nif: String,
    pub branch: Option<String>,
    pub period: Period,
}

impl PeriodQuery {
    /// nif 必填; filial 为空视为不过滤; periodo 缺省为 0
    pub fn parse(
        nif: Option<&str>,
        branch: Option<&str>,
        period: Option<&str>,
    ) -> Result<Self, AppError> {
        let nif = nif.map(str::trim).unwrap_or_default();
        if nif.is_empty() {
            return Err(AppError::Validation("NIF inválido".to_string()));
        }

        let branch = branch
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(str::to_string);

        let code = match period.map(str::trim).filter(|p| !p.is_empty()) {
            None => 0,
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| AppError::Validation("Período inválido".to_string()))?,
        };

        Ok(Self {
            nif: nif.to_string(),
            branch,
            period: Period::from_code(code)?,
        })
    }
}

fn to_f64(value: &BigDecimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// 仪表盘服务: 查询一次, 内存中计算
pub struct DashboardService {
    store: Arc<dyn InvoiceStore>,
}

impl DashboardService {
    pub fn new(store: Arc<dyn InvoiceStore>) -> Self {
        Self { store }
    }

    /// 汇总统计 + 同比变化 + 分小时对比
    pub async fn stats_summary(
        &self,
        query: &PeriodQuery,
        now: NaiveDateTime,
    ) -> Result<StatsSummary, AppError> {
        let bounds = query.period.resolve(now)?;
        let (from, to) = bounds.fetch_range();

        let invoices = self
            .store
            .invoices_between(&query.nif, query.branch.as_deref(), from, to)
            .await?;

        let (current, previous) = aggregate(&invoices, &bounds);
        let hourly = group_by_hour(&invoices, &bounds);

        if hourly.skipped > 0 {
            tracing::debug!(
                "NIF {} {}: {} 张发票小时无法解析, 未计入分小时统计",
                query.nif, query.period.label(), hourly.skipped
            );
        }

        tracing::info!(
            "NIF {} {}: 本期 {} 张, 上期 {} 张 (共查询 {} 张)",
            query.nif,
            query.period.label(),
            current.invoice_count,
            previous.invoice_count,
            invoices.len()
        );

        Ok(build_summary(query.period, &current, &previous, hourly.slots))
    }

    /// 本期 小时 × 星期 热力图, 附上期合计对比
    pub async fn heatmap(
        &self,
        query: &PeriodQuery,
        now: NaiveDateTime,
    ) -> Result<Heatmap, AppError> {
        let bounds = query.period.resolve(now)?;
        let (from, to) = bounds.fetch_range();

        let invoices = self
            .store
            .invoices_between(&query.nif, query.branch.as_deref(), from, to)
            .await?;
        let grid = group_by_weekday_hour(&invoices, &bounds);

        if grid.skipped > 0 {
            tracing::debug!(
                "NIF {} {}: 热力图跳过 {} 张小时无法解析的发票",
                query.nif, query.period.label(), grid.skipped
            );
        }

        Ok(build_heatmap(&grid, query.period, &bounds))
    }

    /// 本期商品排行
    pub async fn top_products(
        &self,
        query: &PeriodQuery,
        now: NaiveDateTime,
    ) -> Result<TopProducts, AppError> {
        let bounds = query.period.resolve(now)?;
        let (from, to) = bounds.current_range();

        let invoices = self
            .store
            .invoices_between(&query.nif, query.branch.as_deref(), from, to)
            .await?;
        let ranking = rank_products(&invoices);

        Ok(TopProducts {
            data_inicio: from.format("%Y-%m-%d").to_string(),
            data_fim: to.format("%Y-%m-%d").to_string(),
            periodo: query.period.label().to_string(),
            total_itens: ranking.total_quantity,
            total_montante: round_to(to_f64(&ranking.total_amount), 2),
            itens: ranking.entries,
        })
    }

    /// 本期发票列表
    pub async fn invoice_list(
        &self,
        query: &PeriodQuery,
        now: NaiveDateTime,
    ) -> Result<InvoiceList, AppError> {
        let bounds = query.period.resolve(now)?;
        let (from, to) = bounds.current_range();

        let summaries = self
            .store
            .invoice_summaries(&query.nif, query.branch.as_deref(), from, to)
            .await?;

        let total = summaries
            .iter()
            .fold(BigDecimal::zero(), |acc, s| acc + &s.total);
        let count = summaries.len() as i64;
        let average = if count > 0 {
            &total / &BigDecimal::from(count)
        } else {
            BigDecimal::zero()
        };

        Ok(InvoiceList {
            message: summaries.is_empty().then(|| EMPTY_LIST_MESSAGE.to_string()),
            faturas: summaries.iter().map(InvoiceListEntry::from).collect(),
            periodo: PeriodInfo {
                nome: query.period.label().to_string(),
                codigo: query.period.code(),
                inicio: from.format("%Y-%m-%d").to_string(),
                fim: to.format("%Y-%m-%d").to_string(),
            },
            estatisticas: InvoiceListStats {
                total_faturas: count,
                total_montante: round_to(to_f64(&total), 2),
                ticket_medio: round_to(to_f64(&average), 2),
            },
        })
    }

    /// 发票全文导出为 PDF
    pub async fn invoice_pdf(&self, number: &str) -> Result<Vec<u8>, AppError> {
        let number = number.trim();
        if number.is_empty() {
            return Err(AppError::Validation("Número da fatura é obrigatório".to_string()));
        }

        let document = self
            .store
            .invoice_document(number)
            .await?
            .ok_or_else(|| AppError::NotFound("Fatura não encontrada".to_string()))?;

        let text = document
            .full_text
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                AppError::NotFound("Texto completo da fatura não encontrado".to_string())
            })?;

        Ok(render_text_pdf(&text))
    }

    /// 用户关联的门店, 保持用户 NIF 列表的顺序
    pub async fn establishments(&self, user_id: &str) -> Result<Vec<Establishment>, AppError> {
        let Some(raw) = self.store.user_nifs(user_id).await? else {
            return Ok(Vec::new());
        };
        let nifs = parse_nif_list(&raw);
        if nifs.is_empty() {
            return Ok(Vec::new());
        }

        let mut rows = self.store.establishments(&nifs).await?;
        rows.sort_by_key(|row| nifs.iter().position(|n| *n == row.nif));

        Ok(rows.into_iter().map(Establishment::from).collect())
    }

    /// 门店的分店列表, 未知 NIF 返回空
    pub async fn branches(&self, nif: &str) -> Result<Vec<Branch>, AppError> {
        let nif = nif.trim();
        if nif.is_empty() {
            return Err(AppError::Validation("NIF inválido".to_string()));
        }

        Ok(self
            .store
            .establishment(nif)
            .await?
            .map(|row| Establishment::from(row).branches)
            .unwrap_or_default())
    }
}

/// 组装 /api/stats/resumo 响应
pub fn build_summary(
    period: Period,
    current: &PeriodStats,
    previous: &PeriodStats,
    hourly: Vec<crate::models::HourlySlot>,
) -> StatsSummary {
    StatsSummary {
        periodo: period.label().to_string(),
        total_vendas: compare(to_f64(&current.total), to_f64(&previous.total)),
        numero_recibos: compare(current.invoice_count as f64, previous.invoice_count as f64),
        itens_vendidos: compare(current.item_count as f64, previous.item_count as f64),
        ticket_medio: compare(
            to_f64(&current.average_ticket),
            to_f64(&previous.average_ticket),
        ),
        comparativo_por_hora: hourly,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_requires_a_nif() {
        assert!(matches!(
            PeriodQuery::parse(None, None, None),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            PeriodQuery::parse(Some("   "), None, Some("1")),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn query_defaults_and_trims() {
        let q = PeriodQuery::parse(Some(" 514757876 "), Some("  "), None).unwrap();

        assert_eq!(q.nif, "514757876");
        assert_eq!(q.branch, None);
        assert_eq!(q.period, Period::Today);

        let q = PeriodQuery::parse(Some("514757876"), Some(" 2 "), Some("4")).unwrap();
        assert_eq!(q.branch.as_deref(), Some("2"));
        assert_eq!(q.period, Period::ThisQuarter);
    }

    #[test]
    fn query_rejects_bad_period_codes() {
        for raw in ["abc", "6", "-1", "1.5"] {
            assert!(
                matches!(
                    PeriodQuery::parse(Some("514757876"), None, Some(raw)),
                    Err(AppError::Validation(_))
                ),
                "{}",
                raw
            );
        }
    }

    #[test]
    fn summary_formats_each_metric() {
        let current = PeriodStats {
            total: BigDecimal::from(150),
            invoice_count: 3,
            item_count: 10,
            average_ticket: BigDecimal::from(50),
        };
        let previous = PeriodStats {
            total: BigDecimal::from(100),
            invoice_count: 4,
            item_count: 0,
            average_ticket: BigDecimal::from(25),
        };

        let summary = build_summary(Period::ThisMonth, &current, &previous, Vec::new());

        assert_eq!(summary.periodo, "Este Mês");
        assert_eq!(summary.total_vendas.formatted, "+50%");
        assert_eq!(summary.numero_recibos.formatted, "-25%");
        assert_eq!(summary.itens_vendidos.formatted, "+0%");
        assert_eq!(summary.ticket_medio.formatted, "+100%");
    }
}
