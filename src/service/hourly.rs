use bigdecimal::{BigDecimal, ToPrimitive, Zero};

use crate::models::{HourlySlot, Invoice};
use crate::service::period::{Bucket, PeriodBounds};

pub const HOURS_PER_DAY: usize = 24;

/// 分小时对比结果, skipped 为小时无法解析的发票数
#[derive(Debug, Clone)]
pub struct HourlyBreakdown {
    pub slots: Vec<HourlySlot>,
    pub skipped: usize,
}

/// 取开头的数字作为小时: "09:45" -> 9, "9h30" -> 9
pub fn parse_hour(time: &str) -> Option<usize> {
    let time = time.trim_start();
    let digits = time
        .find(|c: char| !c.is_ascii_digit())
        .map_or(time, |end| &time[..end]);
    let hour = digits.parse::<usize>().ok()?;
    (hour < HOURS_PER_DAY).then_some(hour)
}

/// 将发票金额按小时归入本期/上期, 始终输出 24 行
pub fn group_by_hour(invoices: &[Invoice], bounds: &PeriodBounds) -> HourlyBreakdown {
    let mut current: Vec<BigDecimal> = vec![BigDecimal::zero(); HOURS_PER_DAY];
    let mut previous: Vec<BigDecimal> = vec![BigDecimal::zero(); HOURS_PER_DAY];
    let mut skipped = 0;

    for invoice in invoices {
        let Some(bucket) = bounds.classify(invoice.date) else {
            continue;
        };
        let Some(hour) = invoice.time.as_deref().and_then(parse_hour) else {
            skipped += 1;
            continue;
        };

        match bucket {
            Bucket::Current => current[hour] += &invoice.total,
            Bucket::Previous => previous[hour] += &invoice.total,
        }
    }

    let slots = current
        .iter()
        .zip(previous.iter())
        .enumerate()
        .map(|(hour, (cur, prev))| HourlySlot {
            label: format!("{:02}:00", hour),
            current: cur.to_f64().unwrap_or(0.0),
            previous: prev.to_f64().unwrap_or(0.0),
        })
        .collect();

    HourlyBreakdown { slots, skipped }
}
