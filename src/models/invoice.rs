use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 发票明细 (faturas_itemfatura)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub id: i64,
    pub name: String,
    pub quantity: i64,
    pub unit_price: BigDecimal,
    pub total: BigDecimal,
}

/// 发票及其明细 (faturas_fatura)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub date: NaiveDate,
    pub time: Option<String>, // HH:MM
    pub total: BigDecimal,
    pub number: String,
    pub customer_tax_id: Option<String>,
    pub branch: Option<String>,
    pub tax_id: String, // 门店 NIF
    pub items: Vec<LineItem>,
}

impl Invoice {
    /// 明细数量合计
    pub fn item_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// 将 LEFT JOIN 展开的行按发票聚合 (保持查询顺序)
    pub fn from_rows(rows: Vec<InvoiceLineRow>) -> Vec<Invoice> {
        let mut invoices: IndexMap<i64, Invoice> = IndexMap::new();

        for row in rows {
            let invoice = invoices.entry(row.invoice_id).or_insert_with(|| Invoice {
                id: row.invoice_id,
                date: row.date,
                time: row.time.clone(),
                total: row.total.clone(),
                number: row.number.clone(),
                customer_tax_id: row.customer_tax_id.clone(),
                branch: row.branch.clone(),
                tax_id: row.tax_id.clone(),
                items: Vec::new(),
            });

            // 无明细的发票只有一行, item_id 为 NULL
            if let Some(item_id) = row.item_id {
                invoice.items.push(LineItem {
                    id: item_id,
                    name: row.item_name.unwrap_or_default(),
                    quantity: row.item_quantity.unwrap_or(0),
                    unit_price: row.item_unit_price.unwrap_or_default(),
                    total: row.item_total.unwrap_or_default(),
                });
            }
        }

        invoices.into_values().collect()
    }
}

/// 发票 + 明细的扁平查询行
#[derive(Debug, Clone, FromRow)]
pub struct InvoiceLineRow {
    pub invoice_id: i64,
    pub date: NaiveDate,
    pub time: Option<String>,
    pub total: BigDecimal,
    pub number: String,
    pub customer_tax_id: Option<String>,
    pub branch: Option<String>,
    pub tax_id: String,
    pub item_id: Option<i64>,
    pub item_name: Option<String>,
    pub item_quantity: Option<i64>,
    pub item_unit_price: Option<BigDecimal>,
    pub item_total: Option<BigDecimal>,
}

/// 发票列表行 (不含明细)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct InvoiceSummary {
    pub id: i64,
    pub number: String,
    pub date: NaiveDate,
    pub time: Option<String>,
    pub total: BigDecimal,
    pub customer_tax_id: Option<String>,
    pub branch: Option<String>,
}

/// 发票全文 (用于 PDF 导出)
#[derive(Debug, Clone, FromRow)]
pub struct InvoiceDocument {
    pub number: String,
    pub full_text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn row(invoice_id: i64, item: Option<(i64, &str, i64)>) -> InvoiceLineRow {
        InvoiceLineRow {
            invoice_id,
            date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            time: Some("10:15".to_string()),
            total: BigDecimal::from_str("12.50").unwrap(),
            number: format!("FT {}", invoice_id),
            customer_tax_id: None,
            branch: Some("1".to_string()),
            tax_id: "514757876".to_string(),
            item_id: item.map(|i| i.0),
            item_name: item.map(|i| i.1.to_string()),
            item_quantity: item.map(|i| i.2),
            item_unit_price: item.map(|_| BigDecimal::from(1)),
            item_total: item.map(|_| BigDecimal::from(1)),
        }
    }

    #[test]
    fn from_rows_groups_items_under_their_invoice() {
        let rows = vec![
            row(7, Some((1, "Café", 2))),
            row(7, Some((2, "Pastel de nata", 3))),
            row(3, Some((3, "Água", 1))),
        ];

        let invoices = Invoice::from_rows(rows);

        assert_eq!(invoices.len(), 2);
        assert_eq!(invoices[0].id, 7); // 保持查询顺序
        assert_eq!(invoices[0].items.len(), 2);
        assert_eq!(invoices[0].item_quantity(), 5);
        assert_eq!(invoices[1].items[0].name, "Água");
    }

    #[test]
    fn invoice_without_items_keeps_an_empty_list() {
        let invoices = Invoice::from_rows(vec![row(9, None)]);

        assert_eq!(invoices.len(), 1);
        assert!(invoices[0].items.is_empty());
        assert_eq!(invoices[0].item_quantity(), 0);
    }
}
