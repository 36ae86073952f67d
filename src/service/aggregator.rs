use bigdecimal::{BigDecimal, Zero};

use crate::models::{Invoice, PeriodStats};
use crate::service::period::{Bucket, PeriodBounds};

/// 单个分桶的累加器
#[derive(Debug, Default)]
struct Accumulator {
    total: BigDecimal,
    invoice_count: i64,
    item_count: i64,
}

impl Accumulator {
    fn add(&mut self, invoice: &Invoice) {
        self.total += &invoice.total;
        self.invoice_count += 1;
        self.item_count += invoice.item_quantity();
    }

    fn finish(self) -> PeriodStats {
        let average_ticket = if self.invoice_count > 0 {
            &self.total / &BigDecimal::from(self.invoice_count)
        } else {
            BigDecimal::zero()
        };

        PeriodStats {
            total: self.total,
            invoice_count: self.invoice_count,
            item_count: self.item_count,
            average_ticket,
        }
    }
}

/// 按日期将发票分入本期/上期并汇总, 两个区间外的发票忽略
pub fn aggregate(invoices: &[Invoice], bounds: &PeriodBounds) -> (PeriodStats, PeriodStats) {
    let mut current = Accumulator::default();
    let mut previous = Accumulator::default();

    for invoice in invoices {
        match bounds.classify(invoice.date) {
            Some(Bucket::Current) => current.add(invoice),
            Some(Bucket::Previous) => previous.add(invoice),
            None => {}
        }
    }

    (current.finish(), previous.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LineItem;
    use crate::service::period::Period;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn invoice(id: i64, day: (i32, u32, u32), total: &str, quantities: &[i64]) -> Invoice {
        Invoice {
            id,
            date: NaiveDate::from_ymd_opt(day.0, day.1, day.2).unwrap(),
            time: Some("12:00".to_string()),
            total: BigDecimal::from_str(total).unwrap(),
            number: format!("FT A/{}", id),
            customer_tax_id: None,
            branch: None,
            tax_id: "514757876".to_string(),
            items: quantities
                .iter()
                .enumerate()
                .map(|(i, q)| LineItem {
                    id: id * 100 + i as i64,
                    name: "Café".to_string(),
                    quantity: *q,
                    unit_price: BigDecimal::from(1),
                    total: BigDecimal::from(*q),
                })
                .collect(),
        }
    }

    fn mid_october() -> PeriodBounds {
        let now = NaiveDate::from_ymd_opt(2026, 10, 15)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap();
        Period::ThisMonth.resolve(now).unwrap()
    }

    #[test]
    fn month_buckets_on_the_fifteenth() {
        let invoices = vec![
            invoice(1, (2026, 10, 1), "10.00", &[1]),
            invoice(2, (2026, 10, 15), "20.00", &[2, 3]),
            invoice(3, (2026, 10, 16), "99.00", &[9]), // 晚于 now
            invoice(4, (2026, 9, 1), "5.50", &[1]),
            invoice(5, (2026, 9, 30), "4.50", &[]),
            invoice(6, (2026, 8, 31), "77.00", &[7]), // 早于上期
        ];

        let (current, previous) = aggregate(&invoices, &mid_october());

        assert_eq!(current.invoice_count, 2);
        assert_eq!(current.total, BigDecimal::from(30));
        assert_eq!(current.item_count, 6);
        assert_eq!(current.average_ticket, BigDecimal::from(15));

        assert_eq!(previous.invoice_count, 2);
        assert_eq!(previous.total, BigDecimal::from(10));
        assert_eq!(previous.item_count, 1);

        let counted = (current.invoice_count + previous.invoice_count) as usize;
        assert!(counted <= invoices.len());
    }

    #[test]
    fn empty_bucket_has_zero_average_ticket() {
        let (current, previous) = aggregate(&[], &mid_october());

        assert_eq!(current, PeriodStats::default());
        assert_eq!(previous.average_ticket, BigDecimal::zero());
    }
}
