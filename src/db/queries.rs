use crate::models::{EstablishmentRow, Invoice, InvoiceDocument, InvoiceLineRow, InvoiceSummary};
use chrono::NaiveDate;
use sqlx::PgPool;

/// 查询日期范围内的发票及明细 (一次往返, LEFT JOIN 后在内存中聚合)
pub async fn list_invoices_with_items(
    pool: &PgPool,
    nif: &str,
    branch: Option<&str>,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<Invoice>, sqlx::Error> {
    let start_time = std::time::Instant::now();

    let rows = sqlx::query_as::<_, InvoiceLineRow>(
        r#"
        SELECT f.id as invoice_id,
               f.data as date,
               f.hora::text as time,
               f.total as total,
               f.numero_fatura as number,
               f.nif_cliente as customer_tax_id,
               f.filial::text as branch,
               f.nif as tax_id,
               i.id as item_id,
               i.nome as item_name,
               i.quantidade::bigint as item_quantity,
               i.preco_unitario as item_unit_price,
               i.total as item_total
        FROM faturas_fatura f
        LEFT JOIN faturas_itemfatura i ON i.fatura_id = f.id
        WHERE f.nif = $1
          AND f.data >= $2
          AND f.data <= $3
          AND ($4::text IS NULL OR f.filial::text = $4)
        ORDER BY f.data, f.id, i.id
        "#
    )
    .bind(nif)
    .bind(from)
    .bind(to)
    .bind(branch)
    .fetch_all(pool)
    .await?;

    let row_count = rows.len();
    let invoices = Invoice::from_rows(rows);
    tracing::debug!(
        "NIF {} {}..{}: {} 行, {} 张发票, 耗时 {:?}",
        nif, from, to, row_count, invoices.len(), start_time.elapsed()
    );

    Ok(invoices)
}

/// 查询发票列表 (按日期降序)
pub async fn list_invoice_summaries(
    pool: &PgPool,
    nif: &str,
    branch: Option<&str>,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<InvoiceSummary>, sqlx::Error> {
    sqlx::query_as::<_, InvoiceSummary>(
        r#"
        SELECT id,
               numero_fatura as number,
               data as date,
               hora::text as time,
               total,
               nif_cliente as customer_tax_id,
               filial::text as branch
        FROM faturas_fatura
        WHERE nif = $1
          AND data >= $2
          AND data <= $3
          AND ($4::text IS NULL OR filial::text = $4)
        ORDER BY data DESC, hora DESC
        "#
    )
    .bind(nif)
    .bind(from)
    .bind(to)
    .bind(branch)
    .fetch_all(pool)
    .await
}

/// 按发票号查询全文
pub async fn get_invoice_document(
    pool: &PgPool,
    number: &str,
) -> Result<Option<InvoiceDocument>, sqlx::Error> {
    sqlx::query_as::<_, InvoiceDocument>(
        r#"
        SELECT numero_fatura as number,
               texto_completo as full_text
        FROM faturas_fatura
        WHERE numero_fatura = $1
        LIMIT 1
        "#
    )
    .bind(number)
    .fetch_optional(pool)
    .await
}

/// 查询用户关联的 NIF 原始值 (JSON 数组或单值)
pub async fn get_user_nifs(
    pool: &PgPool,
    user_id: &str,
) -> Result<Option<String>, sqlx::Error> {
    let raw = sqlx::query_scalar::<_, Option<String>>(
        r#"
        SELECT nif::text
        FROM usuarios
        WHERE id::text = $1
        "#
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(raw.flatten())
}

/// 批量查询门店
pub async fn list_establishments(
    pool: &PgPool,
    nifs: &[String],
) -> Result<Vec<EstablishmentRow>, sqlx::Error> {
    sqlx::query_as::<_, EstablishmentRow>(
        r#"
        SELECT nif,
               nome as name,
               morada as address,
               telefone as phone,
               email,
               responsavel as manager,
               filiais::text as branches
        FROM faturas_empresa
        WHERE nif = ANY($1)
        "#
    )
    .bind(nifs)
    .fetch_all(pool)
    .await
}

/// 查询单个门店
pub async fn get_establishment(
    pool: &PgPool,
    nif: &str,
) -> Result<Option<EstablishmentRow>, sqlx::Error> {
    sqlx::query_as::<_, EstablishmentRow>(
        r#"
        SELECT nif,
               nome as name,
               morada as address,
               telefone as phone,
               email,
               responsavel as manager,
               filiais::text as branches
        FROM faturas_empresa
        WHERE nif = $1
        "#
    )
    .bind(nif)
    .fetch_optional(pool)
    .await
}
