use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::db::queries;
use crate::models::{EstablishmentRow, Invoice, InvoiceDocument, InvoiceSummary};

/// 数据源: 服务层只依赖此接口
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// 日期范围内的发票及明细, branch 为 None 时不过滤分店
    async fn invoices_between(
        &self,
        nif: &str,
        branch: Option<&str>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Invoice>, sqlx::Error>;

    async fn invoice_summaries(
        &self,
        nif: &str,
        branch: Option<&str>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<InvoiceSummary>, sqlx::Error>;

    async fn invoice_document(&self, number: &str) -> Result<Option<InvoiceDocument>, sqlx::Error>;

    async fn user_nifs(&self, user_id: &str) -> Result<Option<String>, sqlx::Error>;

    async fn establishments(&self, nifs: &[String]) -> Result<Vec<EstablishmentRow>, sqlx::Error>;

    async fn establishment(&self, nif: &str) -> Result<Option<EstablishmentRow>, sqlx::Error>;
}

/// PostgreSQL 实现
pub struct PgInvoiceStore {
    pool: PgPool,
}

impl PgInvoiceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvoiceStore for PgInvoiceStore {
    async fn invoices_between(
        &self,
        nif: &str,
        branch: Option<&str>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Invoice>, sqlx::Error> {
        queries::list_invoices_with_items(&self.pool, nif, branch, from, to).await
    }

    async fn invoice_summaries(
        &self,
        nif: &str,
        branch: Option<&str>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<InvoiceSummary>, sqlx::Error> {
        queries::list_invoice_summaries(&self.pool, nif, branch, from, to).await
    }

    async fn invoice_document(&self, number: &str) -> Result<Option<InvoiceDocument>, sqlx::Error> {
        queries::get_invoice_document(&self.pool, number).await
    }

    async fn user_nifs(&self, user_id: &str) -> Result<Option<String>, sqlx::Error> {
        queries::get_user_nifs(&self.pool, user_id).await
    }

    async fn establishments(&self, nifs: &[String]) -> Result<Vec<EstablishmentRow>, sqlx::Error> {
        queries::list_establishments(&self.pool, nifs).await
    }

    async fn establishment(&self, nif: &str) -> Result<Option<EstablishmentRow>, sqlx::Error> {
        queries::get_establishment(&self.pool, nif).await
    }
}
