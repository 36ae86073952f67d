use crate::models::VarianceResult;

/// 增长 (含持平)
pub const POSITIVE_COLOR: &str = "#28a745";
/// 下降
pub const NEGATIVE_COLOR: &str = "#dc3545";

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// 相对上期的百分比变化, 上期为 0 时定义为 0
pub fn percent_change(current: f64, prior: f64) -> f64 {
    if prior > 0.0 {
        (current - prior) / prior * 100.0
    } else {
        0.0
    }
}

/// "+12.5%" / "-3%": 一位小数, 整数不带 ".0"
pub fn format_percent(percent: f64) -> String {
    let sign = if percent >= 0.0 { '+' } else { '-' };
    format!("{}{}%", sign, round_to(percent.abs(), 1))
}

pub fn compare(current: f64, prior: f64) -> VarianceResult {
    let percent = percent_change(current, prior);
    let color = if percent >= 0.0 { POSITIVE_COLOR } else { NEGATIVE_COLOR };

    VarianceResult {
        current: round_to(current, 2),
        prior: round_to(prior, 2),
        formatted: format_percent(percent),
        color: color.to_string(),
        delta: current - prior,
        percent,
    }
}
