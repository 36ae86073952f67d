use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use indexmap::IndexMap;

use crate::models::{Invoice, ProductEntry};
use crate::service::variance::round_to;

const UNKNOWN_PRODUCT: &str = "Produto Desconhecido";

/// 商品排行及合计
#[derive(Debug, Clone)]
pub struct ProductRanking {
    pub entries: Vec<ProductEntry>,
    pub total_quantity: i64,
    pub total_amount: BigDecimal,
}

/// 按商品名汇总明细, 金额降序 (同额保持首次出现顺序)
pub fn rank_products(invoices: &[Invoice]) -> ProductRanking {
    let mut products: IndexMap<&str, (i64, BigDecimal)> = IndexMap::new();

    for item in invoices.iter().flat_map(|inv| inv.items.iter()) {
        let name = match item.name.trim() {
            "" => UNKNOWN_PRODUCT,
            name => name,
        };
        let entry = products.entry(name).or_insert_with(|| (0, BigDecimal::zero()));
        entry.0 += item.quantity;
        entry.1 += &item.total;
    }

    let total_quantity: i64 = products.values().map(|(q, _)| q).sum();
    let total_amount = products
        .values()
        .fold(BigDecimal::zero(), |acc, (_, amount)| acc + amount);
    let total_f64 = total_amount.to_f64().unwrap_or(0.0);

    let mut entries: Vec<ProductEntry> = products
        .into_iter()
        .map(|(name, (quantity, amount))| {
            let amount = amount.to_f64().unwrap_or(0.0);
            let share = if total_f64 > 0.0 {
                round_to(amount / total_f64 * 100.0, 2)
            } else {
                0.0
            };
            ProductEntry {
                name: name.to_string(),
                quantity,
                amount: round_to(amount, 2),
                share,
            }
        })
        .collect();

    // 按两位小数后的金额排序; sort_by 是稳定排序
    entries.sort_by(|a, b| b.amount.total_cmp(&a.amount));

    ProductRanking {
        entries,
        total_quantity,
        total_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LineItem;
    use chrono::NaiveDate;

    fn item(name: &str, quantity: i64, total: i64) -> LineItem {
        LineItem {
            id: 0,
            name: name.to_string(),
            quantity,
            unit_price: BigDecimal::from(1),
            total: BigDecimal::from(total),
        }
    }

    fn invoice(items: Vec<LineItem>) -> Invoice {
        Invoice {
            id: 1,
            date: NaiveDate::from_ymd_opt(2026, 10, 15).unwrap(),
            time: None,
            total: BigDecimal::zero(),
            number: String::new(),
            customer_tax_id: None,
            branch: None,
            tax_id: "514757876".to_string(),
            items,
        }
    }

    #[test]
    fn sorted_by_amount_with_shares() {
        let invoices = vec![
            invoice(vec![item("Café", 2, 20), item("Bolo", 1, 30)]),
            invoice(vec![item("Café", 3, 30), item("Água", 4, 20)]),
        ];

        let ranking = rank_products(&invoices);

        let names: Vec<_> = ranking.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Café", "Bolo", "Água"]);
        assert_eq!(ranking.entries[0].quantity, 5);
        assert_eq!(ranking.entries[0].share, 50.0);
        assert_eq!(ranking.total_quantity, 10);
        assert_eq!(ranking.total_amount, BigDecimal::from(100));
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let invoices = vec![invoice(vec![
            item("Tosta", 1, 10),
            item("Sumo", 1, 10),
            item("Galão", 1, 10),
        ])];

        let ranking = rank_products(&invoices);

        let names: Vec<_> = ranking.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Tosta", "Sumo", "Galão"]);
    }

    #[test]
    fn amounts_equal_after_rounding_keep_first_seen_order() {
        let mut pao = item("Pão", 1, 0);
        pao.total = "10.001".parse().unwrap();
        let mut bolo = item("Bolo", 1, 0);
        bolo.total = "10.004".parse().unwrap();

        let ranking = rank_products(&[invoice(vec![pao, bolo])]);

        let names: Vec<_> = ranking.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Pão", "Bolo"]);
        assert_eq!(ranking.entries[1].amount, 10.0);
    }

    #[test]
    fn blank_names_are_grouped_as_unknown() {
        let ranking = rank_products(&[invoice(vec![item("", 1, 5), item("  ", 2, 5)])]);

        assert_eq!(ranking.entries.len(), 1);
        assert_eq!(ranking.entries[0].name, UNKNOWN_PRODUCT);
        assert_eq!(ranking.entries[0].quantity, 3);
    }

    #[test]
    fn zero_total_gives_zero_shares() {
        let ranking = rank_products(&[invoice(vec![item("Oferta", 1, 0)])]);
        assert_eq!(ranking.entries[0].share, 0.0);
    }
}
