use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("invalid period code: {0}")]
    InvalidPeriod(i64),

    #[error("period boundary out of calendar range")]
    OutOfRange,
}

/// 报表时段 (代码 0-5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Today,
    Yesterday,
    ThisWeek,
    ThisMonth,
    ThisQuarter,
    ThisYear,
}

/// 分桶: 本期 / 上期
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Current,
    Previous,
}

/// 本期与上期的四个边界
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodBounds {
    pub current_start: NaiveDateTime,
    pub current_end: NaiveDateTime,
    pub previous_start: NaiveDateTime,
    pub previous_end: NaiveDateTime,
}

impl Period {
    pub fn from_code(code: i64) -> Result<Self, PeriodError> {
        match code {
            0 => Ok(Period::Today),
            1 => Ok(Period::Yesterday),
            2 => Ok(Period::ThisWeek),
            3 => Ok(Period::ThisMonth),
            4 => Ok(Period::ThisQuarter),
            5 => Ok(Period::ThisYear),
            other => Err(PeriodError::InvalidPeriod(other)),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Period::Today => 0,
            Period::Yesterday => 1,
            Period::ThisWeek => 2,
            Period::ThisMonth => 3,
            Period::ThisQuarter => 4,
            Period::ThisYear => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Period::Today => "Hoje",
            Period::Yesterday => "Ontem",
            Period::ThisWeek => "Esta Semana",
            Period::ThisMonth => "Este Mês",
            Period::ThisQuarter => "Este Trimestre",
            Period::ThisYear => "Este Ano",
        }
    }

    /// 计算本期和对比期的边界
    ///
    /// 周从周日开始 (`num_days_from_sunday() == 0`)。
    /// Today 的上期是 [今日零点, 昨日零点], 起点晚于终点, 恒为空区间。
    pub fn resolve(&self, now: NaiveDateTime) -> Result<PeriodBounds, PeriodError> {
        let today = now.date();

        let bounds = match self {
            Period::Today => PeriodBounds {
                current_start: start_of_day(today),
                current_end: now,
                previous_start: start_of_day(today),
                previous_end: start_of_day(shift_days(today, -1)?),
            },
            Period::Yesterday => {
                let yesterday = shift_days(today, -1)?;
                let before = shift_days(yesterday, -1)?;
                PeriodBounds {
                    current_start: start_of_day(yesterday),
                    current_end: end_of_day(yesterday)?,
                    previous_start: start_of_day(before),
                    previous_end: end_of_day(before)?,
                }
            }
            Period::ThisWeek => {
                let offset = today.weekday().num_days_from_sunday() as i64;
                let week_start = shift_days(today, -offset)?;
                let previous_week_start = shift_days(week_start, -7)?;
                PeriodBounds {
                    current_start: start_of_day(week_start),
                    current_end: end_of_day(shift_days(week_start, 6)?)?,
                    previous_start: start_of_day(previous_week_start),
                    previous_end: end_of_day(shift_days(week_start, -1)?)?,
                }
            }
            Period::ThisMonth => {
                let month_start = first_of_month(today.year(), today.month())?;
                let (year, month) = months_back(today.year(), today.month(), 1);
                PeriodBounds {
                    current_start: start_of_day(month_start),
                    current_end: now,
                    previous_start: start_of_day(first_of_month(year, month)?),
                    previous_end: start_of_day(shift_days(month_start, -1)?),
                }
            }
            Period::ThisQuarter => {
                let quarter_month = 3 * ((today.month() - 1) / 3) + 1;
                let quarter_start = first_of_month(today.year(), quarter_month)?;
                let (year, month) = months_back(today.year(), quarter_month, 3);
                PeriodBounds {
                    current_start: start_of_day(quarter_start),
                    current_end: now,
                    previous_start: start_of_day(first_of_month(year, month)?),
                    previous_end: start_of_day(shift_days(quarter_start, -1)?),
                }
            }
            Period::ThisYear => {
                let year_start = first_of_month(today.year(), 1)?;
                PeriodBounds {
                    current_start: start_of_day(year_start),
                    current_end: now,
                    previous_start: start_of_day(first_of_month(today.year() - 1, 1)?),
                    previous_end: start_of_day(shift_days(year_start, -1)?),
                }
            }
        };

        Ok(bounds)
    }
}

impl PeriodBounds {
    /// 按发票日期分桶, 两个区间都包含时本期优先
    pub fn classify(&self, date: NaiveDate) -> Option<Bucket> {
        if self.current_start.date() <= date && date <= self.current_end.date() {
            Some(Bucket::Current)
        } else if self.previous_start.date() <= date && date <= self.previous_end.date() {
            Some(Bucket::Previous)
        } else {
            None
        }
    }

    /// 一次查询覆盖两个时段的日期范围
    pub fn fetch_range(&self) -> (NaiveDate, NaiveDate) {
        let from = self.current_start.min(self.previous_start).date();
        let to = self.current_end.max(self.previous_end).date();
        (from, to)
    }

    pub fn current_range(&self) -> (NaiveDate, NaiveDate) {
        (self.current_start.date(), self.current_end.date())
    }
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn end_of_day(date: NaiveDate) -> Result<NaiveDateTime, PeriodError> {
    let next = shift_days(date, 1)?;
    Ok(start_of_day(next) - Duration::milliseconds(1))
}

fn shift_days(date: NaiveDate, days: i64) -> Result<NaiveDate, PeriodError> {
    date.checked_add_signed(Duration::days(days))
        .ok_or(PeriodError::OutOfRange)
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate, PeriodError> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(PeriodError::OutOfRange)
}

/// (year, month) 往前推 n 个月
fn months_back(year: i32, month: u32, n: u32) -> (i32, u32) {
    let index = year * 12 + (month as i32 - 1) - n as i32;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}
