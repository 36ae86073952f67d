use chrono::{DateTime, Local, TimeZone};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

const NEVER: i64 = i64::MIN;

fn to_local(ms: i64) -> Option<DateTime<Local>> {
    match ms {
        NEVER => None,
        ms => Local.timestamp_millis_opt(ms).single(),
    }
}

/// 全局时钟: 最后取数时间 + 手动刷新冷却
///
/// 普通的缓存未命中只更新 `last_update`, 不影响冷却;
/// 冷却只由手动刷新 (`refresh=true` 或清除缓存) 开始.
#[derive(Debug)]
pub struct RefreshClock {
    last_update_ms: AtomicI64,
    last_refresh_ms: AtomicI64,
    cooldown: Duration,
}

impl RefreshClock {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            last_update_ms: AtomicI64::new(NEVER),
            last_refresh_ms: AtomicI64::new(NEVER),
            cooldown,
        }
    }

    /// 记录一次取数
    pub fn mark_updated(&self, now: DateTime<Local>) {
        self.last_update_ms.store(now.timestamp_millis(), Ordering::SeqCst);
    }

    pub fn last_update(&self) -> Option<DateTime<Local>> {
        to_local(self.last_update_ms.load(Ordering::SeqCst))
    }

    pub fn last_refresh(&self) -> Option<DateTime<Local>> {
        to_local(self.last_refresh_ms.load(Ordering::SeqCst))
    }

    fn remaining_since(&self, last_ms: i64, now_ms: i64) -> u64 {
        if last_ms == NEVER {
            return 0;
        }
        let elapsed_ms = now_ms.saturating_sub(last_ms).max(0) as u128;
        let cooldown_ms = self.cooldown.as_millis();
        if elapsed_ms >= cooldown_ms {
            return 0;
        }
        ((cooldown_ms - elapsed_ms + 999) / 1000) as u64
    }

    /// 冷却剩余秒数 (向上取整), 0 表示可以刷新
    pub fn cooldown_remaining(&self, now: DateTime<Local>) -> u64 {
        self.remaining_since(self.last_refresh_ms.load(Ordering::SeqCst), now.timestamp_millis())
    }

    /// 开始一次手动刷新; 冷却中返回剩余秒数
    pub fn try_begin_refresh(&self, now: DateTime<Local>) -> Result<(), u64> {
        let now_ms = now.timestamp_millis();
        let mut last = self.last_refresh_ms.load(Ordering::SeqCst);
        loop {
            let remaining = self.remaining_since(last, now_ms);
            if remaining > 0 {
                return Err(remaining);
            }
            match self.last_refresh_ms.compare_exchange(
                last,
                now_ms,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return Ok(()),
                Err(actual) => last = actual,
            }
        }
    }
}
